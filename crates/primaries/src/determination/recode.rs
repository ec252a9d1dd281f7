use super::domain::{Behavior, Histology, SiteCode};

/// Source of site recode values, e.g. a SEER site recode table.
///
/// Rules comparing recodes answer `Unknown` when either tumor has no recode.
pub trait RecodeLookup: Send + Sync {
    fn recode(&self, site: SiteCode, histology: Histology, behavior: Behavior) -> Option<String>;
}

/// Lookup with no table behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecodeLookup;

impl RecodeLookup for NoRecodeLookup {
    fn recode(&self, _: SiteCode, _: Histology, _: Behavior) -> Option<String> {
        None
    }
}

impl<F> RecodeLookup for F
where
    F: Fn(SiteCode, Histology, Behavior) -> Option<String> + Send + Sync,
{
    fn recode(&self, site: SiteCode, histology: Histology, behavior: Behavior) -> Option<String> {
        self(site, histology, behavior)
    }
}
