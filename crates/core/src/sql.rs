//! Database-null adapter (rusqlite)
//!
//! Bridges [`Optional`] and both `Und` representations to SQLite's nullable
//! columns:
//!
//! - **Scan** ([`FromSql`]): delegates to `Option<T>`'s own conversion, then
//!   maps NULL to `None` / null and a value to `Some` / defined. Conversion
//!   errors are rusqlite's, surfaced unchanged.
//! - **Value** ([`ToSql`]): writes the value, or NULL for `None`, null and
//!   undefined.
//!
//! The column has two states only, so undefined is written as NULL and reads
//! back as null.

use crate::optional::Optional;
use crate::{sliceund, und};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};

fn null_output<'a>() -> rusqlite::Result<ToSqlOutput<'a>> {
    Ok(ToSqlOutput::Owned(Value::Null))
}

impl<T: FromSql> FromSql for Optional<T> {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Option::<T>::column_result(value).map(Optional::from_sql_null)
    }
}

impl<T: ToSql> ToSql for Optional<T> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Optional::Some(v) => v.to_sql(),
            Optional::None => null_output(),
        }
    }
}

impl<T: FromSql> FromSql for und::Und<T> {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Option::<T>::column_result(value).map(und::Und::from_sql_null)
    }
}

impl<T: ToSql> ToSql for und::Und<T> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.as_value() {
            Some(v) => v.to_sql(),
            None => null_output(),
        }
    }
}

impl<T: FromSql> FromSql for sliceund::Und<T> {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Option::<T>::column_result(value).map(sliceund::Und::from_sql_null)
    }
}

impl<T: ToSql> ToSql for sliceund::Und<T> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.as_value() {
            Some(v) => v.to_sql(),
            None => null_output(),
        }
    }
}
