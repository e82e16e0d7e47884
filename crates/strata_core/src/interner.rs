//! Global String Interner
//!
//! Converts strings into compact integer [`Symbol`]s so that flag names,
//! camera names and layer names can be compared and hashed as integers.
//!
//! The interner only ever grows; it holds names, never render state.

use lasso::{Spur, ThreadedRodeo};
use once_cell::sync::Lazy;

static INTERNER: Lazy<ThreadedRodeo> = Lazy::new(ThreadedRodeo::new);

/// Compact integer identifier for an interned string.
pub type Symbol = Spur;

/// Interns a string, returning its [`Symbol`].
///
/// Returns the existing symbol if the string was interned before.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up the symbol of an already interned string without allocating.
#[inline]
#[must_use]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
#[inline]
#[must_use]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Pre-interns the condition flag names produced by the quality settings.
///
/// Called once during renderer initialization so later flag lookups on
/// the per-frame path never take the interner's write path.
pub fn preload_flag_names() {
    let common = [
        "fsaa",
        "bloom",
        "normalmaps",
        "ssao",
        "ssao_low",
        "ssao_high",
        "reflection_disabled",
        "reflection_dynamic",
        "shadows_near",
        "shadows_medium",
        "shadows_far",
        "shadow_quality_low",
        "shadow_quality_medium",
        "shadow_quality_high",
        "shadow_quality_vhigh",
        "shadow_quality_ultra",
        "sky_dynamic",
    ];

    for name in common {
        intern(name);
    }
}
