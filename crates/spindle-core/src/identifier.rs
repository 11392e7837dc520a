//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type with an efficient string-interner based approach.
//! Element identifiers are compared and hashed constantly during layout, so they are
//! interned once and passed around as `Copy` symbols.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Efficient identifier type using string interning
///
/// # Examples
///
/// ```
/// use spindle_core::identifier::Id;
///
/// let start = Id::new("StartEvent_1");
/// let flow = Id::new("flow_3");
///
/// assert_eq!(start, "StartEvent_1");
/// assert_ne!(start, flow);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        let symbol = interner().get_or_intern(name);
        Self(symbol)
    }

    /// Runs `f` against the string form of this identifier without allocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use spindle_core::identifier::Id;
    ///
    /// let id = Id::new("_42");
    /// assert!(id.with_str(|s| s.starts_with('_')));
    /// ```
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.with_str(str::to_owned);
        write!(f, "{value}")
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        self.with_str(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.with_str(|value| serializer.serialize_str(value))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_interns_to_same_id() {
        let a = Id::new("Task_7");
        let b = Id::new("Task_7");
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_and_compare() {
        let id = Id::new("flow_12");
        assert_eq!(id.to_string(), "flow_12");
        assert!(id == "flow_12");
        assert!(id != "flow_13");
    }

    #[test]
    fn test_from_str() {
        let id: Id = "_3".parse().unwrap();
        assert_eq!(id, Id::new("_3"));
        let id: Id = "_4".into();
        assert_eq!(id, "_4");
    }

    #[test]
    fn test_with_str_does_not_deadlock_on_nested_ids() {
        let outer = Id::new("outer");
        let inner = Id::new("inner");
        let joined = format!("{outer}::{inner}");
        assert_eq!(joined, "outer::inner");
    }
}
