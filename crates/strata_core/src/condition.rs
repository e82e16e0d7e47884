//! Condition Expressions
//!
//! A [`Condition`] is a conjunction of required flags, each optionally
//! negated. It is satisfied when every term's polarity matches the
//! presence of its flag in the active [`FeatureFlags`].
//!
//! # Text form
//!
//! Conditions are written as whitespace separated flag names. A leading
//! `!` negates a term:
//!
//! | Text                          | Meaning                              |
//! |-------------------------------|--------------------------------------|
//! | `""`                          | always satisfied                     |
//! | `"bloom"`                     | `bloom` active                       |
//! | `"reflection_dynamic !fsaa"`  | `reflection_dynamic` and not `fsaa`  |

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::errors::StrataError;
use crate::flags::{FeatureFlag, FeatureFlags};

/// One required flag with its required polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionTerm {
    pub flag: FeatureFlag,
    /// `true` if the flag must be present, `false` if it must be absent.
    pub required: bool,
}

/// A conjunction of [`ConditionTerm`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    terms: SmallVec<[ConditionTerm; 4]>,
}

impl Condition {
    /// A condition with no terms; always satisfied.
    #[inline]
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Parses the whitespace separated text form.
    ///
    /// A lone `!` is ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut terms = SmallVec::new();
        for token in text.split_whitespace() {
            let (name, required) = match token.strip_prefix('!') {
                Some(rest) => (rest, false),
                None => (token, true),
            };
            if name.is_empty() {
                continue;
            }
            terms.push(ConditionTerm {
                flag: FeatureFlag::new(name),
                required,
            });
        }
        Self { terms }
    }

    /// Adds a term requiring `name` to be present.
    #[must_use]
    pub fn require(mut self, name: &str) -> Self {
        self.terms.push(ConditionTerm {
            flag: FeatureFlag::new(name),
            required: true,
        });
        self
    }

    /// Adds a term requiring `name` to be absent.
    #[must_use]
    pub fn forbid(mut self, name: &str) -> Self {
        self.terms.push(ConditionTerm {
            flag: FeatureFlag::new(name),
            required: false,
        });
        self
    }

    /// True iff every term's polarity matches the flag set.
    #[must_use]
    pub fn satisfied(&self, flags: &FeatureFlags) -> bool {
        self.terms
            .iter()
            .all(|term| flags.contains_flag(term.flag) == term.required)
    }

    #[inline]
    #[must_use]
    pub fn terms(&self) -> &[ConditionTerm] {
        &self.terms
    }

    #[inline]
    #[must_use]
    pub fn is_always(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromStr for Condition {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if !term.required {
                f.write_str("!")?;
            }
            f.write_str(term.flag.name())?;
        }
        Ok(())
    }
}
