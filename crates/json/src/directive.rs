//! Serialization directive mini-language
//!
//! A directive is a space separated list of `key:"value"` pairs, e.g.
//!
//! ```text
//! json:"name,omitempty" db:"user_name"
//! ```
//!
//! The value of the `json` key is a comma separated list: the first element
//! is the field's wire name (may be empty), the rest are option flags. Wire
//! names on the JSON side come from serde (`#[serde(rename)]`), which keeps
//! encoding and decoding in step, so a codec only accepts a declared name
//! that is empty or equal to the field's own name.
//!
//! Pairs are separated by ASCII spaces only. Values are double quoted and
//! take the usual quoted-string escapes: `\a \b \f \n \r \t \v \\ \"`, `\xHH`,
//! three-digit octal `\NNN`, `\uHHHH` and `\UHHHHHHHH`. Byte escapes must
//! add up to valid UTF-8. Parsing is done once, when a directive is
//! registered with a codec, so a malformed directive is reported at setup
//! time.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Directive key read by the JSON codec
pub const JSON_KEY: &str = "json";

/// Flag that makes the codec omit a field whose value is empty
pub const OMITEMPTY: &str = "omitempty";

/// Error type for directive parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// A pair with no key
    #[error("empty key at position {0}")]
    EmptyKey(usize),
    /// Key not followed by ':'
    #[error("expected ':' after key '{key}' at position {position}")]
    MissingColon {
        /// Key being parsed
        key: String,
        /// Position where ':' was expected
        position: usize,
    },
    /// ':' not followed by an opening quote
    #[error("expected '\"' to open the value of '{key}' at position {position}")]
    MissingQuote {
        /// Key being parsed
        key: String,
        /// Position where '"' was expected
        position: usize,
    },
    /// Value without a closing quote
    #[error("unterminated value for '{key}' starting at position {position}")]
    Unterminated {
        /// Key being parsed
        key: String,
        /// Position of the opening quote
        position: usize,
    },
    /// Unknown or malformed escape sequence inside a value
    #[error("invalid escape '\\{escape}' at position {position}")]
    BadEscape {
        /// Character following the backslash
        escape: char,
        /// Position of the backslash
        position: usize,
    },
    /// The `json` entry names a wire field other than the one it is declared on
    #[error("wire name '{name}' differs from field '{field}'; rename the field with serde")]
    Rename {
        /// Declared wire name
        name: String,
        /// Field the directive is declared on
        field: String,
    },
    /// Byte escapes that do not decode to UTF-8
    #[error("value of '{key}' starting at position {position} is not valid UTF-8")]
    InvalidUtf8 {
        /// Key being parsed
        key: String,
        /// Position of the opening quote
        position: usize,
    },
}

/// One `key:"value"` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Directive key, e.g. `json`
    pub key: String,
    /// Unquoted value
    pub value: String,
}

/// A parsed directive.
///
/// Entries keep their original order, so flattening a parsed directive
/// without changes reproduces an equivalent string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    entries: Vec<Entry>,
}

impl Directive {
    /// An empty directive
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// True if the directive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the first entry with `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// First element of `key`'s value, i.e. the wire name for `json`
    pub fn name(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.split(',').next())
    }

    /// Elements of `key`'s value after the name
    pub fn flags<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.get(key)
            .into_iter()
            .flat_map(|v| v.split(',').skip(1))
    }

    /// True if `flag` is among `key`'s flags (the name is not a flag)
    pub fn has_flag(&self, key: &str, flag: &str) -> bool {
        self.flags(key).any(|f| f == flag)
    }

    /// Make sure `flag` is set on `key`, appending it if needed.
    ///
    /// Only the first entry with `key` is considered. If there is none, an
    /// entry with an empty name and just `flag` is appended, so the wire name
    /// falls back to the field's own name. Returns true if the directive
    /// changed.
    pub fn ensure_flag(&mut self, key: &str, flag: &str) -> bool {
        if self.has_flag(key, flag) {
            return false;
        }
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.value.push(',');
                entry.value.push_str(flag);
            }
            None => self.entries.push(Entry {
                key: key.to_string(),
                value: format!(",{}", flag),
            }),
        }
        true
    }

    /// Check that the `json` name, if any, is `field` itself.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::Rename`] for any other name.
    pub fn check_name(&self, field: &str) -> Result<(), DirectiveError> {
        match self.name(JSON_KEY) {
            Some(name) if !name.is_empty() && name != field => Err(DirectiveError::Rename {
                name: name.to_string(),
                field: field.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Builder form of [`Directive::ensure_flag`]
    pub fn with_flag(mut self, key: &str, flag: &str) -> Self {
        self.ensure_flag(key, flag);
        self
    }
}

/// Rewrite a directive so its `json` entry carries `omitempty`.
///
/// This is the pure string form of the rewrite the codec applies to fields
/// with the is-undefined capability.
///
/// ```
/// use und_json::directive::force_omitempty;
///
/// assert_eq!(force_omitempty("").unwrap(), r#"json:",omitempty""#);
/// assert_eq!(force_omitempty(r#"json:"a""#).unwrap(), r#"json:"a,omitempty""#);
/// ```
pub fn force_omitempty(directive: &str) -> Result<String, DirectiveError> {
    let parsed: Directive = directive.parse()?;
    Ok(parsed.with_flag(JSON_KEY, OMITEMPTY).to_string())
}

fn is_key_char(c: char) -> bool {
    c > ' ' && c != ':' && c != '"' && c != '\u{7f}'
}

fn hex_digits(chars: &[char], start: usize, count: usize) -> Option<u32> {
    let digits = chars.get(start..start + count)?;
    digits
        .iter()
        .try_fold(0u32, |acc, c| Some(acc * 16 + c.to_digit(16)?))
}

fn octal_digits(chars: &[char], start: usize) -> Option<u32> {
    let digits = chars.get(start..start + 3)?;
    digits
        .iter()
        .try_fold(0u32, |acc, c| Some(acc * 8 + c.to_digit(8)?))
        .filter(|v| *v <= 0xff)
}

/// Decode the escape whose backslash sits at `i`.
///
/// Returns the bytes it stands for and the number of chars it spans.
fn unescape(chars: &[char], i: usize) -> Result<(Vec<u8>, usize), DirectiveError> {
    let Some(&escape) = chars.get(i + 1) else {
        // Caller reports the value as unterminated
        return Ok((Vec::new(), 0));
    };
    let bad = || DirectiveError::BadEscape { escape, position: i };
    let simple = |b: u8| Ok((vec![b], 2));
    match escape {
        'a' => simple(0x07),
        'b' => simple(0x08),
        'f' => simple(0x0c),
        'n' => simple(b'\n'),
        'r' => simple(b'\r'),
        't' => simple(b'\t'),
        'v' => simple(0x0b),
        '\\' => simple(b'\\'),
        '"' => simple(b'"'),
        'x' => {
            let byte = hex_digits(chars, i + 2, 2).ok_or_else(bad)?;
            Ok((vec![byte as u8], 4))
        }
        '0'..='7' => {
            let byte = octal_digits(chars, i + 1).ok_or_else(bad)?;
            Ok((vec![byte as u8], 4))
        }
        'u' | 'U' => {
            let width = if escape == 'u' { 4 } else { 8 };
            let c = hex_digits(chars, i + 2, width)
                .and_then(char::from_u32)
                .ok_or_else(bad)?;
            let mut buf = [0u8; 4];
            Ok((c.encode_utf8(&mut buf).as_bytes().to_vec(), 2 + width))
        }
        _ => Err(bad()),
    }
}

impl FromStr for Directive {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let mut entries = Vec::new();
        let mut i = 0;

        loop {
            while i < chars.len() && chars[i] == ' ' {
                i += 1;
            }
            if i >= chars.len() {
                break;
            }

            let key_start = i;
            while i < chars.len() && is_key_char(chars[i]) {
                i += 1;
            }
            if i == key_start {
                return Err(DirectiveError::EmptyKey(i));
            }
            let key: String = chars[key_start..i].iter().collect();

            if i >= chars.len() || chars[i] != ':' {
                return Err(DirectiveError::MissingColon { key, position: i });
            }
            i += 1;

            if i >= chars.len() || chars[i] != '"' {
                return Err(DirectiveError::MissingQuote { key, position: i });
            }
            let quote = i;
            i += 1;

            let mut bytes = Vec::new();
            loop {
                match chars.get(i) {
                    None => {
                        return Err(DirectiveError::Unterminated {
                            key,
                            position: quote,
                        })
                    }
                    Some('"') => {
                        i += 1;
                        break;
                    }
                    Some('\\') => {
                        let (decoded, width) = unescape(&chars, i)?;
                        if width == 0 {
                            return Err(DirectiveError::Unterminated {
                                key,
                                position: quote,
                            });
                        }
                        bytes.extend(decoded);
                        i += width;
                    }
                    Some(&c) => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                        i += 1;
                    }
                }
            }

            let value = match String::from_utf8(bytes) {
                Ok(value) => value,
                Err(_) => {
                    return Err(DirectiveError::InvalidUtf8 {
                        key,
                        position: quote,
                    })
                }
            };
            entries.push(Entry { key, value });
        }

        Ok(Directive { entries })
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\"", self.key)?;
        for c in self.value.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c if c < ' ' || c == '\u{7f}' => write!(f, "\\x{:02x}", c as u32)?,
                c => write!(f, "{}", c)?,
            }
        }
        f.write_str("\"")
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
