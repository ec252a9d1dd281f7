use std::sync::Arc;

use tracing::debug;

use super::catalog::{CancerGroup, CancerGroupCatalog, GroupId};
use super::domain::{Tumor, TumorDescriptor};

/// Assigns tumors to the first catalog group that admits them.
#[derive(Debug, Clone)]
pub struct CancerGroupClassifier {
    catalog: Arc<CancerGroupCatalog>,
}

impl CancerGroupClassifier {
    pub fn new(catalog: Arc<CancerGroupCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CancerGroupCatalog {
        &self.catalog
    }

    /// Group id for a raw descriptor. Invalid descriptors belong to no group.
    pub fn classify(&self, descriptor: &TumorDescriptor) -> Option<GroupId> {
        let tumor = descriptor.validate().ok()?;
        self.classify_tumor(&tumor).map(|group| group.id().clone())
    }

    pub fn classify_tumor(&self, tumor: &Tumor) -> Option<&CancerGroup> {
        let group = self
            .catalog
            .groups()
            .iter()
            .find(|group| group.admits(tumor));
        debug!(
            site = %tumor.site,
            histology = %tumor.histology,
            behavior = %tumor.behavior,
            group = group.map(|group| group.id().as_str()),
            "classified tumor"
        );
        group
    }
}
