//! # Strata Core
//!
//! Foundational types shared by every part of the render graph:
//!
//! - [`interner`]: global string interner backing flag and key symbols
//! - [`flags`]: the active [`FeatureFlags`] set
//! - [`condition`]: [`Condition`] predicates gating passes and outputs
//! - [`report`]: the [`ReportOnce`] de-duplicating diagnostic sink
//! - [`errors`]: the [`StrataError`] type and [`Result`] alias

pub mod condition;
pub mod errors;
pub mod flags;
pub mod interner;
pub mod report;

pub use condition::{Condition, ConditionTerm};
pub use errors::{Result, StrataError};
pub use flags::{FeatureFlag, FeatureFlags};
pub use interner::Symbol;
pub use report::{ReportOnce, ReportSite};
