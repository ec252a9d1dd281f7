use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineConfig;

use super::catalog::{CancerGroup, CancerGroupCatalog, CatalogError};
use super::classifier::CancerGroupClassifier;
use super::dates::UncertainDateComparator;
use super::decision::{MpDecision, MpResult};
use super::domain::{Tumor, TumorDescriptor};
use super::engine::RuleEngine;

/// First diagnosis year covered by the multiple primary rules.
pub const FIRST_RULE_YEAR: i32 = 2007;

const NOT_APPLICABLE: &str =
    "The multiple primary rules are ONLY effective for cases diagnosed January 1, 2007 and after.";
const DIFFERENT_GROUPS: &str = "The two sets of parameters belong to two different cancer groups.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    First,
    Second,
}

impl Position {
    fn label(self) -> &'static str {
        match self {
            Position::First => "first",
            Position::Second => "second",
        }
    }
}

/// Entry point deciding whether two tumors are one primary or several.
#[derive(Debug, Clone)]
pub struct MpOrchestrator {
    classifier: CancerGroupClassifier,
    engine: RuleEngine,
}

impl MpOrchestrator {
    pub fn new(catalog: Arc<CancerGroupCatalog>, engine: RuleEngine) -> Self {
        Self {
            classifier: CancerGroupClassifier::new(catalog),
            engine,
        }
    }

    /// Loads the configured catalog, or the built-in one, and fixes the reference year.
    pub fn from_config(config: &EngineConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_path {
            Some(path) => CancerGroupCatalog::from_path(path, config.overlap_policy)?,
            None => CancerGroupCatalog::standard()?,
        };
        let dates = config
            .reference_year
            .map(UncertainDateComparator::new)
            .unwrap_or_default();

        Ok(Self::new(Arc::new(catalog), RuleEngine::new(dates)))
    }

    pub fn classifier(&self) -> &CancerGroupClassifier {
        &self.classifier
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &CancerGroupCatalog {
        self.classifier.catalog()
    }

    pub fn determine(&self, first: &TumorDescriptor, second: &TumorDescriptor) -> MpDecision {
        let covered = |descriptor: &TumorDescriptor| {
            descriptor
                .diagnosis
                .known_year()
                .is_some_and(|year| year >= FIRST_RULE_YEAR)
        };
        if !covered(first) || !covered(second) {
            return MpDecision::not_applicable(NOT_APPLICABLE);
        }

        let first = match validated(first, Position::First) {
            Ok(tumor) => tumor,
            Err(decision) => return decision,
        };
        let second = match validated(second, Position::Second) {
            Ok(tumor) => tumor,
            Err(decision) => return decision,
        };

        let first_group = match self.grouped(&first, Position::First) {
            Ok(group) => group,
            Err(decision) => return decision,
        };
        let second_group = match self.grouped(&second, Position::Second) {
            Ok(group) => group,
            Err(decision) => return decision,
        };

        if first_group != second_group {
            debug!(
                first = %first_group.id(),
                second = %second_group.id(),
                "tumors fall in different cancer groups"
            );
            return MpDecision::new(MpResult::MultiplePrimaries, DIFFERENT_GROUPS);
        }

        let decision = self.engine.decide(first_group, &first, &second);
        info!(
            group = %first_group.id(),
            result = decision.result.label(),
            step = decision.deciding_step(),
            "multiple primary determination"
        );
        decision
    }

    fn grouped(&self, tumor: &Tumor, position: Position) -> Result<&CancerGroup, MpDecision> {
        self.classifier.classify_tumor(tumor).ok_or_else(|| {
            MpDecision::questionable(format!(
                "The {} tumor provided does not belong to any of the cancer groups.",
                position.label()
            ))
        })
    }
}

fn validated(descriptor: &TumorDescriptor, position: Position) -> Result<Tumor, MpDecision> {
    descriptor.validate().map_err(|error| {
        MpDecision::questionable(format!(
            "Unable to identify cancer group for the {} tumor: {error}. Valid primary site \
             (C000-C999 excluding C809), histology (8000-9999) and behavior (0-3, 6) are required.",
            position.label()
        ))
    })
}
