//! The dynamic value carried through path traversal.
//!
//! `Value` is both the interchange type for writes and typed conversions and,
//! through `Value::Map`, a fully dynamic object graph whose keys act as
//! attributes.

use im::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ModkitError;

/// Represents a value read from or written to an attribute.
///
/// # Examples
///
/// ```rust
/// use modkit::value::Value;
/// let n = Value::Int(3);
/// assert_eq!(n.type_name(), "Int");
/// let nil = Value::default();
/// assert!(nil.is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Builds a map value from `(key, value)` pairs.
    ///
    /// ```rust
    /// use modkit::value::Value;
    /// let hero = Value::map([("hp", Value::Int(10))]);
    /// assert_eq!(hero.type_name(), "Map");
    /// ```
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parses JSON text into a value graph.
    pub fn from_json_str(text: &str) -> Result<Self, ModkitError> {
        let json: serde_json::Value = serde_json::from_str(text).map_err(|e| ModkitError::Config {
            message: format!("invalid JSON value: {}", e),
            ctx: crate::ErrorContext::none(),
            source: Some(Box::new(e)),
        })?;
        Ok(Value::from(json))
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }

    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &HashMap<String, Value>) -> fmt::Result {
        // Sorted so output is stable across runs.
        let mut entries: Vec<(&String, &Value)> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        write!(f, "{{")?;
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => Value::fmt_list(f, items),
            Value::Map(map) => Value::fmt_map(f, map),
        }
    }
}

// ============================================================================
// CONVERSIONS INTO VALUE
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(n) => serde_json::Value::from(n),
            // Non-finite floats have no JSON form.
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

// ============================================================================
// CONVERSIONS OUT OF VALUE
// ============================================================================

/// Strict conversion from a `Value` into a Rust type.
///
/// No coercion happens: an `Int` is not a `Number` and text is never parsed.
pub trait FromValue: Sized {
    /// Name used in mismatch diagnostics.
    fn expected() -> &'static str;

    fn from_value(value: Value) -> Result<Self, ModkitError>;
}

fn mismatch<T: FromValue>(value: &Value) -> ModkitError {
    ModkitError::type_mismatch(T::expected(), value.type_name())
}

impl FromValue for Value {
    fn expected() -> &'static str {
        "Value"
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn expected() -> &'static str {
        "Bool"
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        value.as_bool().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for i64 {
    fn expected() -> &'static str {
        "Int"
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        value.as_int().ok_or_else(|| mismatch::<Self>(&value))
    }
}

macro_rules! from_value_narrow_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn expected() -> &'static str {
                    stringify!($ty)
                }

                fn from_value(value: Value) -> Result<Self, ModkitError> {
                    let wide = value.as_int().ok_or_else(|| mismatch::<Self>(&value))?;
                    <$ty>::try_from(wide).map_err(|_| {
                        ModkitError::type_mismatch(stringify!($ty), format!("Int {}", wide))
                    })
                }
            }
        )*
    };
}

from_value_narrow_int!(i32, u32);

// Above `i64::MAX` a u64 is carried as a `Number`, so accept integral
// Numbers in that range as well as non-negative Ints.
impl FromValue for u64 {
    fn expected() -> &'static str {
        "u64"
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        const LOW: f64 = 9_223_372_036_854_775_808.0; // 2^63
        const HIGH: f64 = 18_446_744_073_709_551_616.0; // 2^64
        match value {
            Value::Int(wide) => u64::try_from(wide)
                .map_err(|_| ModkitError::type_mismatch("u64", format!("Int {}", wide))),
            Value::Number(n) if n.fract() == 0.0 && (LOW..=HIGH).contains(&n) => Ok(n as u64),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for f64 {
    fn expected() -> &'static str {
        "Number"
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        value.as_number().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for f32 {
    fn expected() -> &'static str {
        "Number"
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        value
            .as_number()
            .map(|n| n as f32)
            .ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for String {
    fn expected() -> &'static str {
        "String"
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn expected() -> &'static str {
        T::expected()
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn expected() -> &'static str {
        T::expected()
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn expected() -> &'static str {
        "List"
    }

    fn from_value(value: Value) -> Result<Self, ModkitError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_integers_stay_integers() {
        let v = Value::from_json_str(r#"{"hp": 5, "speed": 1.5, "tag": null}"#).unwrap();
        let Value::Map(map) = v else {
            panic!("expected map");
        };
        assert_eq!(map.get("hp"), Some(&Value::Int(5)));
        assert_eq!(map.get("speed"), Some(&Value::Number(1.5)));
        assert_eq!(map.get("tag"), Some(&Value::Nil));
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let err = Value::from_json_str("{nope").unwrap_err();
        assert_eq!(err.error_type(), crate::ErrorType::Config);
    }

    #[test]
    fn test_strict_conversion_rejects_text_as_int() {
        let err = i64::from_value(Value::from("five")).unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch: expected Int, found String");
    }

    #[test]
    fn test_narrow_int_overflow_is_mismatch() {
        assert_eq!(u32::from_value(Value::Int(7)).unwrap(), 7);
        assert!(u32::from_value(Value::Int(-1)).is_err());
    }

    #[test]
    fn test_u64_accepts_its_own_wide_form() {
        assert_eq!(u64::from_value(Value::Int(9)).unwrap(), 9);
        assert_eq!(u64::from_value(Value::Number(u64::MAX as f64)).unwrap(), u64::MAX);
        assert!(u64::from_value(Value::Number(1.0)).is_err());
        assert!(u64::from_value(Value::Number(1e30)).is_err());
        assert!(u64::from_value(Value::Int(-1)).is_err());
    }

    #[test]
    fn test_box_converts_like_its_contents() {
        assert_eq!(*Box::<i64>::from_value(Value::Int(3)).unwrap(), 3);
        assert!(Box::<i64>::from_value(Value::Nil).is_err());
    }

    #[test]
    fn test_option_maps_nil_to_none() {
        assert_eq!(Option::<i64>::from_value(Value::Nil).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(Value::Int(2)).unwrap(), Some(2));
    }

    #[test]
    fn test_display_sorts_map_keys() {
        let v = Value::map([("b", Value::Int(2)), ("a", Value::List(vec![Value::Nil]))]);
        assert_eq!(v.to_string(), "{a: [nil], b: 2}");
    }

    #[test]
    fn test_json_round_trip_through_serde_json_value() {
        let v = Value::map([("name", Value::from("Seelah")), ("lvl", Value::Int(4))]);
        let json: serde_json::Value = v.clone().into();
        assert_eq!(json["lvl"], serde_json::json!(4));
        assert_eq!(Value::from(json), v);
    }
}
