//! Tri-state values through SQLite nullable columns.

use rusqlite::{params, Connection};
use und::{sliceund, Optional, Und};

fn open() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE profile (
            id INTEGER PRIMARY KEY,
            nickname TEXT,
            age INTEGER
        );",
    )
    .unwrap();
    conn
}

fn store(conn: &Connection, id: i64, nickname: &Und<String>, age: &sliceund::Und<i64>) {
    conn.execute(
        "INSERT INTO profile (id, nickname, age) VALUES (?1, ?2, ?3)",
        params![id, nickname, age],
    )
    .unwrap();
}

fn load(conn: &Connection, id: i64) -> (Und<String>, sliceund::Und<i64>) {
    conn.query_row(
        "SELECT nickname, age FROM profile WHERE id = ?1",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .unwrap()
}

#[test]
fn test_defined_round_trips() {
    let conn = open();
    store(&conn, 1, &Und::defined("kit".to_string()), &sliceund::Und::defined(30));
    let (nickname, age) = load(&conn, 1);
    assert_eq!(nickname, Und::defined("kit".to_string()));
    assert_eq!(age, sliceund::Und::defined(30));
}

#[test]
fn test_null_and_undefined_both_read_back_null() {
    let conn = open();
    store(&conn, 1, &Und::null(), &sliceund::Und::null());
    store(&conn, 2, &Und::undefined(), &sliceund::Und::undefined());

    for id in [1, 2] {
        let (nickname, age) = load(&conn, id);
        assert!(nickname.is_null());
        assert!(age.is_null());
    }

    let nulls: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM profile WHERE nickname IS NULL AND age IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(nulls, 2);
}

#[test]
fn test_optional_column() {
    let conn = open();
    conn.execute(
        "INSERT INTO profile (id, age) VALUES (?1, ?2)",
        params![1, Optional::some(41i64)],
    )
    .unwrap();
    let age: Optional<i64> = conn
        .query_row("SELECT age FROM profile WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(age, Optional::some(41));

    let nickname: Optional<String> = conn
        .query_row("SELECT nickname FROM profile WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert!(nickname.is_none());
}

#[test]
fn test_conversion_error_is_surfaced() {
    let conn = open();
    store(&conn, 1, &Und::defined("kit".to_string()), &sliceund::Und::null());
    let result: rusqlite::Result<Und<i64>> =
        conn.query_row("SELECT nickname FROM profile WHERE id = 1", [], |row| row.get(0));
    assert!(matches!(
        result,
        Err(rusqlite::Error::InvalidColumnType(..))
    ));
}
