//! Feature Flags
//!
//! The active set of named boolean conditions (quality tiers, hardware
//! support, feature toggles). Membership denotes "true".
//!
//! The set is rebuilt whenever settings or the render configuration change
//! and is read-only for the duration of a frame.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::interner::{self, Symbol};

/// An interned flag name with no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureFlag(Symbol);

impl FeatureFlag {
    /// Interns `name` and returns its flag.
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(interner::intern(name))
    }

    #[inline]
    #[must_use]
    pub fn symbol(self) -> Symbol {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        interner::resolve(self.0)
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of currently active feature flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    active: FxHashSet<FeatureFlag>,
}

impl FeatureFlags {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the named flag as active.
    pub fn insert(&mut self, name: &str) {
        self.active.insert(FeatureFlag::new(name));
    }

    /// Marks `name` active only when `enabled` holds.
    pub fn insert_if(&mut self, name: &str, enabled: bool) {
        if enabled {
            self.insert(name);
        }
    }

    #[inline]
    pub fn insert_flag(&mut self, flag: FeatureFlag) {
        self.active.insert(flag);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        interner::get(name).is_some_and(|sym| self.active.remove(&FeatureFlag(sym)))
    }

    /// Returns true if the named flag is active.
    ///
    /// Names that were never interned cannot be active.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        interner::get(name).is_some_and(|sym| self.active.contains(&FeatureFlag(sym)))
    }

    #[inline]
    #[must_use]
    pub fn contains_flag(&self, flag: FeatureFlag) -> bool {
        self.active.contains(&flag)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = FeatureFlag> + '_ {
        self.active.iter().copied()
    }

    /// Active flag names, sorted for stable log output.
    #[must_use]
    pub fn sorted_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.active.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names
    }
}

impl<'a> FromIterator<&'a str> for FeatureFlags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut flags = Self::new();
        for name in iter {
            flags.insert(name);
        }
        flags
    }
}
