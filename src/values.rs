use std::fmt;

/// A resolved option or argument value.
///
/// Numbers are always `f64`, so `--jobs=4` and `--ratio=0.5` land in the same variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Write the value as a literal: strings quoted, arrays bracketed.
    pub(crate) fn write_literal(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    item.write_literal(f)?;
                }
                f.write_char(']')
            }
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write_number(f, *n),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, reason = "guarded by the magnitude check")]
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// The declared type of a value option.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    #[default]
    String,
    Number,
    Boolean,
    /// Comma separated values, each auto-cast. Repeated occurrences accumulate.
    Array,
}

impl ValueKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            ValueKind::String => "String",
            ValueKind::Number => "Number",
            ValueKind::Boolean => "Boolean",
            ValueKind::Array => "Array",
        }
    }

    /// The default of a value option without an explicit one.
    pub(crate) fn zero(self) -> Value {
        match self {
            ValueKind::String => Value::Null,
            ValueKind::Number => Value::Number(0.0),
            ValueKind::Boolean => Value::Bool(false),
            ValueKind::Array => Value::Array(Vec::new()),
        }
    }

    /// Whether a pending option of this kind takes `-12.34` as its value.
    pub(crate) fn accepts_hyphen(self) -> bool {
        matches!(self, ValueKind::Number | ValueKind::Array)
    }
}

/// A user transformation applied to a value after casting and choice validation.
pub type Reviver = Box<dyn Fn(Value) -> Value>;

/// Convert a raw string into `kind`.
///
/// Returns `None` when the string does not represent the kind.
pub(crate) fn cast(raw: &str, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::String => Some(Value::String(raw.to_owned())),
        ValueKind::Number => parse_number(raw).map(Value::Number),
        ValueKind::Boolean => match raw {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ValueKind::Array => Some(Value::Array(raw.split(',').map(auto_cast).collect())),
    }
}

/// Guess the type of an untyped raw string.
#[must_use]
pub fn auto_cast(raw: &str) -> Value {
    match raw {
        "undefined" | "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match parse_number(raw) {
            Some(n) => Value::Number(n),
            None => Value::String(raw.to_owned()),
        },
    }
}

/// Parse a number the way a shell user would write one.
///
/// Accepts decimal and exponent forms, `0x`/`0o`/`0b` integers and a signed `Infinity`.
/// Surrounding whitespace is ignored. A blank string is not a number.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let (sign, unsigned) = match s.as_bytes()[0] {
        b'-' => (-1.0, &s[1..]),
        b'+' => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    // Radix prefixes are unsigned only, and so are their digits.
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.starts_with(['+', '-']) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    // `f64::from_str` also takes "inf" and "NaN", which are words here.
    let is_decimal = unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !is_decimal || !unsigned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok()
}

#[test]
fn numbers() {
    assert_eq!(parse_number("5"), Some(5.0));
    assert_eq!(parse_number(" -12.34 "), Some(-12.34));
    assert_eq!(parse_number("+1e3"), Some(1000.0));
    assert_eq!(parse_number(".5"), Some(0.5));
    assert_eq!(parse_number("0x1F"), Some(31.0));
    assert_eq!(parse_number("0b101"), Some(5.0));
    assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));

    assert_eq!(parse_number(""), None);
    assert_eq!(parse_number("   "), None);
    assert_eq!(parse_number("inf"), None);
    assert_eq!(parse_number("NaN"), None);
    assert_eq!(parse_number("12px"), None);
    assert_eq!(parse_number("-"), None);
    assert_eq!(parse_number("e"), None);
    assert_eq!(parse_number("0xZZ"), None);
    assert_eq!(parse_number("0x+5"), None);
    assert_eq!(parse_number("0b-1"), None);
    assert_eq!(parse_number("-0x10"), None);
}

#[test]
fn casting() {
    assert_eq!(cast("5", ValueKind::Number), Some(Value::Number(5.0)));
    assert_eq!(cast("five", ValueKind::Number), None);
    assert_eq!(cast("true", ValueKind::Boolean), Some(Value::Bool(true)));
    assert_eq!(cast("yes", ValueKind::Boolean), None);
    assert_eq!(cast("1", ValueKind::String), Some(Value::String("1".into())));
    assert_eq!(
        cast("a,1,null,false", ValueKind::Array),
        Some(Value::Array(vec!["a".into(), 1.into(), Value::Null, false.into()])),
    );

    assert_eq!(auto_cast("undefined"), Value::Null);
    assert_eq!(auto_cast("-3"), Value::Number(-3.0));
    assert_eq!(auto_cast("f"), Value::String("f".into()));
}

#[test]
fn display() {
    assert_eq!(Value::Number(5.0).to_string(), "5");
    assert_eq!(Value::Number(-12.34).to_string(), "-12.34");
    assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
    assert_eq!(Value::from(vec![Value::from("a"), 1.into()]).to_string(), "a,1");

    let mut s = String::new();
    Value::from(vec![Value::from("a"), Value::Null]).write_literal(&mut s).unwrap();
    assert_eq!(s, r#"["a", null]"#);
}
