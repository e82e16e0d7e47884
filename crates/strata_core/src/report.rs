//! Report-once Diagnostics
//!
//! Persistent misconfigurations (a pass naming an unknown camera, an
//! output list that resolves to nothing) are hit every frame. [`ReportOnce`]
//! keeps the last message per reporting site and only forwards a message
//! to the log when it differs from the previous one for that site.

use rustc_hash::FxHashMap;

/// Identity of a reporting call-site.
///
/// `scope` names the kind of site (e.g. `"pass"`, `"output"`), `index`
/// distinguishes instances (e.g. the pass position in the configuration)
/// and `slot` distinguishes parts of one instance (e.g. a draw layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportSite {
    pub scope: &'static str,
    pub index: usize,
    pub slot: usize,
}

impl ReportSite {
    #[inline]
    #[must_use]
    pub const fn new(scope: &'static str, index: usize) -> Self {
        Self {
            scope,
            index,
            slot: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_slot(mut self, slot: usize) -> Self {
        self.slot = slot;
        self
    }

    #[inline]
    #[must_use]
    pub const fn pass(index: usize) -> Self {
        Self::new("pass", index)
    }

    #[inline]
    #[must_use]
    pub const fn output(index: usize) -> Self {
        Self::new("output", index)
    }

    /// Culling of the pass at `index`.
    #[inline]
    #[must_use]
    pub const fn cull(index: usize) -> Self {
        Self::new("cull", index)
    }
}

/// De-duplicating diagnostic sink.
#[derive(Debug, Default)]
pub struct ReportOnce {
    last: FxHashMap<ReportSite, String>,
    emitted: usize,
}

impl ReportOnce {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `message` at warn level unless it repeats the last message
    /// recorded for `site`. Returns whether it was logged.
    pub fn report(&mut self, site: ReportSite, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.last.get(&site) == Some(&message) {
            return false;
        }
        log::warn!("{message}");
        self.last.insert(site, message);
        self.emitted += 1;
        true
    }

    /// Number of messages forwarded to the log since creation or [`clear`](Self::clear).
    #[inline]
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Last message recorded for `site`.
    #[must_use]
    pub fn last_message(&self, site: ReportSite) -> Option<&str> {
        self.last.get(&site).map(String::as_str)
    }

    /// Forgets all sites. Called on reconfiguration, when site indices
    /// refer to a different configuration.
    pub fn clear(&mut self) {
        self.last.clear();
        self.emitted = 0;
    }
}
