//! Dynamic Value Module - The value type held by state cells.
//!
//! Bound elements produce booleans (checkboxes), strings (text controls),
//! string lists (multi-selects) and "nothing" (an unchecked radio group), so
//! state flowing to and from the document is dynamically shaped. `Value` is
//! the one type all of those share: a small JSON-like tree.
//!
//! Equality over `Value` is *structural* deep equality, and it is what gates a
//! cell's change channel:
//!
//! - Differing kinds are unequal (`Int` and `Float` are distinct kinds).
//! - Primitives compare by exact value; `Float` uses `f64` comparison, so
//!   `NaN != NaN`.
//! - Lists are equal iff same length and order-sensitive pairwise equal.
//! - Maps are equal iff same key set (order-insensitive) and pairwise equal
//!   values. Maps preserve insertion order and are expected to hold unique
//!   keys.
//!
//! # Example
//!
//! ```
//! use filament::{deep_equal, Value};
//!
//! let a = Value::from(vec![Value::from(1), Value::from("two")]);
//! let b = Value::from(vec![Value::from(1), Value::from("two")]);
//! assert!(deep_equal(&a, &b));
//! assert_ne!(Value::from(1), Value::from(1.0)); // kinds differ
//! ```

use std::fmt;

// =============================================================================
// VALUE
// =============================================================================

/// A dynamically shaped value: the currency of state cells and element
/// bindings.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// No value (an unchecked radio group extracts to this).
    Null,
    /// Boolean (checkbox state).
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating-point number. A distinct kind from `Int`.
    Float(f64),
    /// String (text controls, radio values, text content).
    Str(String),
    /// Ordered list (multi-select state).
    List(Vec<Value>),
    /// Key/value map with insertion order preserved. Keys are expected to be
    /// unique; equality is key-set based, not order based.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Short kind name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Check if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer, if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the float, if this is a `Float` (or an `Int`, widened).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the string slice, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list slice, if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the map entries, if this is a `Map`.
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key in a `Map` (first match).
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Host-style truthiness, used when a non-boolean value drives a checkbox:
    /// `Null` is false, numbers are true unless zero (or NaN), strings are
    /// true unless empty, lists and maps are always true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::List(_) | Self::Map(_) => true,
        }
    }
}

// =============================================================================
// DEEP EQUALITY
// =============================================================================

/// Structural deep equality. See the module docs for the exact rules.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, va)| {
                    b.iter()
                        .find(|(kb, _)| kb == key)
                        .is_some_and(|(_, vb)| deep_equal(va, vb))
                })
        }
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}

// =============================================================================
// DISPLAY
// =============================================================================

/// The string written into text controls and text content when syncing.
/// `Null` renders empty, lists join their items with commas, maps render
/// their entries in braces.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

// =============================================================================
// From implementations for ergonomic construction
// =============================================================================

/// `()` is `Null`.
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<(String, Value)>> for Value {
    fn from(entries: Vec<(String, Value)>) -> Self {
        Self::Map(entries)
    }
}

/// `None` is `Null`, `Some` converts the inner value.
impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(opt: Option<V>) -> Self {
        match opt {
            None => Self::Null,
            Some(v) => v.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(entries: &[(&str, Value)]) -> Value {
        Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_primitive_equality() {
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::from(true), Value::from(true));
        assert_ne!(Value::from(true), Value::from(false));
        assert_eq!(Value::from(42), Value::from(42));
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_ne!(Value::from("a"), Value::from("b"));
    }

    #[test]
    fn test_kind_mismatch_is_unequal() {
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::from(0), Value::from(false));
        assert_ne!(Value::Null, Value::from(""));
        assert_ne!(Value::List(vec![]), Value::Map(vec![]));
    }

    #[test]
    fn test_int_and_float_are_distinct_kinds() {
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_eq!(Value::from(1.5), Value::from(1.5));
    }

    #[test]
    fn test_nan_is_not_equal_to_itself() {
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
    }

    #[test]
    fn test_list_equality_is_order_sensitive() {
        let a = Value::from(vec![Value::from(1), Value::from(2)]);
        let b = Value::from(vec![Value::from(1), Value::from(2)]);
        let c = Value::from(vec![Value::from(2), Value::from(1)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Value::from(vec![Value::from(1)]));
    }

    #[test]
    fn test_map_equality_is_key_order_insensitive() {
        let a = map(&[("x", Value::from(1)), ("y", Value::from(2))]);
        let b = map(&[("y", Value::from(2)), ("x", Value::from(1))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_map_key_set_must_match() {
        let a = map(&[("x", Value::from(1))]);
        let b = map(&[("x", Value::from(1)), ("y", Value::from(2))]);
        let c = map(&[("z", Value::from(1))]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_nested_equality() {
        let a = map(&[(
            "items",
            Value::from(vec![map(&[("id", Value::from(1))]), Value::from("x")]),
        )]);
        let b = map(&[(
            "items",
            Value::from(vec![map(&[("id", Value::from(1))]), Value::from("x")]),
        )]);
        let c = map(&[(
            "items",
            Value::from(vec![map(&[("id", Value::from(2))]), Value::from("x")]),
        )]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from(true).is_truthy());
        assert!(Value::from(-1).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::List(vec![]).is_truthy());
        assert!(Value::Map(vec![]).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(7).to_string(), "7");
        assert_eq!(Value::from("ada").to_string(), "ada");
        let list = Value::from(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(list.to_string(), "a,b");
        let entries = map(&[("x", Value::from(1))]);
        assert_eq!(entries.to_string(), "{x: 1}");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(5).as_i64(), Some(5));
        assert_eq!(Value::from(5).as_f64(), Some(5.0));
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert_eq!(Value::from("s").as_i64(), None);
        let m = map(&[("k", Value::from(1))]);
        assert_eq!(m.get("k"), Some(&Value::from(1)));
        assert_eq!(m.get("missing"), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from(true).kind(), "bool");
        assert_eq!(Value::from(1).kind(), "int");
        assert_eq!(Value::from(1.0).kind(), "float");
        assert_eq!(Value::from("s").kind(), "str");
        assert_eq!(Value::List(vec![]).kind(), "list");
        assert_eq!(Value::Map(vec![]).kind(), "map");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3)), Value::from(3));
    }

    // Recursive strategy over NaN-free values with unique map keys.
    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            (-1.0e6..1.0e6f64).prop_map(Value::Float),
            "[a-z]{0,6}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|m| Value::Map(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_deep_equal_reflexive(v in arb_value()) {
            prop_assert!(deep_equal(&v, &v));
        }

        #[test]
        fn prop_deep_equal_symmetric(a in arb_value(), b in arb_value()) {
            prop_assert_eq!(deep_equal(&a, &b), deep_equal(&b, &a));
        }

        #[test]
        fn prop_clone_is_equal(v in arb_value()) {
            prop_assert!(deep_equal(&v, &v.clone()));
        }
    }
}
