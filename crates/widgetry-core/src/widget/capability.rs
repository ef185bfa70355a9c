//! Capability set of a widget implementation.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Serialize, Serializer};

/// The optional hooks a widget implements, as a small bit-set.
///
/// Computed once when a widget is spawned and tested by the engine instead of
/// calling hooks speculatively. A missing capability is not an error; the
/// engine falls back to the hook's default behaviour.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No optional hooks.
    pub const NONE: Self = Self(0);
    /// `run`: produces the display data.
    pub const RUN: Self = Self(1 << 0);
    /// `form`: enriches the edit-form data.
    pub const FORM: Self = Self(1 << 1);
    /// `save`: transforms options before they are persisted.
    pub const SAVE: Self = Self(1 << 2);
    /// `fields`: declares editable, validated fields.
    pub const FIELDS: Self = Self(1 << 3);

    const NAMED: [(Self, &'static str); 4] = [
        (Self::RUN, "run"),
        (Self::FORM, "form"),
        (Self::SAVE, "save"),
        (Self::FIELDS, "fields"),
    ];

    /// Returns `true` if every capability in `other` is present.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no capability is present.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the union of two sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Looks up a capability by hook name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(cap, _)| *cap)
    }

    /// Hook names contained in this set, in declaration order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(cap, _)| self.contains(*cap))
            .map(|(_, name)| name)
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<_> = self.names().collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for Capabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_and_union() {
        let caps = Capabilities::RUN | Capabilities::FIELDS;
        assert!(caps.contains(Capabilities::RUN));
        assert!(caps.contains(Capabilities::FIELDS));
        assert!(!caps.contains(Capabilities::SAVE));
        assert!(caps.contains(Capabilities::NONE));
    }

    #[test]
    fn test_names_and_display() {
        let mut caps = Capabilities::NONE;
        assert_eq!(caps.to_string(), "none");
        caps |= Capabilities::SAVE;
        caps |= Capabilities::RUN;
        assert_eq!(caps.names().collect::<Vec<_>>(), ["run", "save"]);
        assert_eq!(caps.to_string(), "run,save");
        assert_eq!(Capabilities::from_name("form"), Some(Capabilities::FORM));
        assert_eq!(Capabilities::from_name("render"), None);
    }

    #[test]
    fn test_serializes_as_names() {
        let caps = Capabilities::FORM | Capabilities::FIELDS;
        assert_eq!(
            serde_json::to_value(caps).unwrap(),
            serde_json::json!(["form", "fields"])
        );
    }
}
