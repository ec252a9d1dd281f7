//! Registry cancer groups and the catalog that holds them in declared order.

mod definition;

pub use definition::{CatalogDefinition, GroupDefinition, RuleDefinition};

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::domain::{Behavior, Tumor};
use super::ranges::{CodeFilter, RangeParseError};
use super::rules::{Classification, Rule};

const STANDARD_CATALOG: &str = include_str!("../../../catalog/standard.json");

/// Valid topography values a tumor can carry (C809 never validates).
fn site_domain() -> impl Iterator<Item = u16> {
    (0..=999).filter(|site| *site != 809)
}

fn histology_domain() -> impl Iterator<Item = u16> {
    8000..=9999
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog defines no groups")]
    Empty,
    #[error("group '{0}' is defined more than once")]
    DuplicateGroup(GroupId),
    #[error("group '{group}' has an invalid {field} list: {source}")]
    Range {
        group: GroupId,
        field: &'static str,
        #[source]
        source: RangeParseError,
    },
    #[error("group '{0}' allows no behaviors")]
    NoBehaviors(GroupId),
    #[error("group '{0}' has no rules")]
    NoRules(GroupId),
    #[error("group '{group}' repeats step {step}")]
    DuplicateStep { group: GroupId, step: String },
    #[error("rule {step} listed under group '{group}' belongs to group '{owner}'")]
    ForeignRule {
        group: GroupId,
        step: String,
        owner: String,
    },
    #[error("rule {step} of group '{group}' needs a classification")]
    MissingClassification { group: GroupId, step: String },
    #[error("group '{0}' must end with the no-criteria-satisfied rule")]
    MissingCatchAll(GroupId),
    #[error("rule {step} of group '{group}' is a catch-all before the end of the list")]
    MisplacedCatchAll { group: GroupId, step: String },
    #[error("catch-all rule {step} of group '{group}' must classify as a single primary")]
    CatchAllClassification { group: GroupId, step: String },
    #[error("groups '{first}' and '{second}' can match the same tumor")]
    Overlap { first: GroupId, second: GroupId },
    #[error("unable to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// What catalog construction does when two groups can claim the same tumor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Keep first-match order without logging above debug.
    Allow,
    #[default]
    Warn,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overlap policy '{0}', expected allow, warn or reject")]
pub struct ParseOverlapPolicyError(String);

impl FromStr for OverlapPolicy {
    type Err = ParseOverlapPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            _ => Err(ParseOverlapPolicyError(value.to_string())),
        }
    }
}

/// A registry cancer group: which tumors belong to it and the rules that decide pairs of them.
#[derive(Debug, Clone)]
pub struct CancerGroup {
    id: GroupId,
    name: String,
    sites: CodeFilter,
    histologies: CodeFilter,
    behaviors: Vec<Behavior>,
    rules: Vec<Rule>,
}

impl PartialEq for CancerGroup {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CancerGroup {}

impl CancerGroup {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sites: CodeFilter::Any,
            histologies: CodeFilter::Any,
            behaviors: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_sites(mut self, sites: CodeFilter) -> Self {
        self.sites = sites;
        self
    }

    pub fn with_histologies(mut self, histologies: CodeFilter) -> Self {
        self.histologies = histologies;
        self
    }

    pub fn with_behaviors(mut self, behaviors: impl IntoIterator<Item = Behavior>) -> Self {
        self.behaviors = behaviors.into_iter().collect();
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sites(&self) -> &CodeFilter {
        &self.sites
    }

    pub fn histologies(&self) -> &CodeFilter {
        &self.histologies
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Site first; histology is only consulted once the site passes.
    pub fn admits(&self, tumor: &Tumor) -> bool {
        self.sites.admits(tumor.site.value())
            && self.histologies.admits(tumor.histology.value())
            && self.behaviors.contains(&tumor.behavior)
    }

    /// Whether some valid tumor satisfies both groups.
    pub fn overlaps(&self, other: &CancerGroup) -> bool {
        self.behaviors
            .iter()
            .any(|behavior| other.behaviors.contains(behavior))
            && site_domain().any(|site| self.sites.admits(site) && other.sites.admits(site))
            && histology_domain().any(|histology| {
                self.histologies.admits(histology) && other.histologies.admits(histology)
            })
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            site_inclusions: self.sites.inclusions().map(str::to_string),
            site_exclusions: self.sites.exclusions().map(str::to_string),
            histology_inclusions: self.histologies.inclusions().map(str::to_string),
            histology_exclusions: self.histologies.exclusions().map(str::to_string),
            behaviors: self.behaviors.clone(),
            rules: self
                .rules
                .iter()
                .map(|rule| RuleSummary {
                    step: rule.step.clone(),
                    question: rule.question.clone(),
                    reason: rule.reason.clone(),
                    classification: rule.classification,
                    notes: rule.notes.clone(),
                })
                .collect(),
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.behaviors.is_empty() {
            return Err(CatalogError::NoBehaviors(self.id.clone()));
        }
        let Some((last, earlier)) = self.rules.split_last() else {
            return Err(CatalogError::NoRules(self.id.clone()));
        };

        let mut steps = HashSet::new();
        for rule in &self.rules {
            if rule.group_id != self.id {
                return Err(CatalogError::ForeignRule {
                    group: self.id.clone(),
                    step: rule.step.clone(),
                    owner: rule.group_id.to_string(),
                });
            }
            if !steps.insert(rule.step.as_str()) {
                return Err(CatalogError::DuplicateStep {
                    group: self.id.clone(),
                    step: rule.step.clone(),
                });
            }
        }

        if let Some(misplaced) = earlier.iter().find(|rule| rule.is_catch_all()) {
            return Err(CatalogError::MisplacedCatchAll {
                group: self.id.clone(),
                step: misplaced.step.clone(),
            });
        }
        if !last.is_catch_all() {
            return Err(CatalogError::MissingCatchAll(self.id.clone()));
        }
        if last.classification != Classification::SinglePrimary {
            return Err(CatalogError::CatchAllClassification {
                group: self.id.clone(),
                step: last.step.clone(),
            });
        }

        Ok(())
    }
}

/// Read-only view of a group for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_inclusions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_exclusions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histology_inclusions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histology_exclusions: Option<String>,
    pub behaviors: Vec<Behavior>,
    pub rules: Vec<RuleSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub step: String,
    pub question: String,
    pub reason: String,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOverlap {
    pub first: GroupId,
    pub second: GroupId,
}

/// Ordered, validated set of cancer groups. Immutable after construction.
#[derive(Debug, Clone)]
pub struct CancerGroupCatalog {
    groups: Vec<CancerGroup>,
}

impl CancerGroupCatalog {
    pub fn new(groups: Vec<CancerGroup>, policy: OverlapPolicy) -> Result<Self, CatalogError> {
        if groups.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = HashSet::new();
        for group in &groups {
            if !ids.insert(group.id()) {
                return Err(CatalogError::DuplicateGroup(group.id().clone()));
            }
            group.validate()?;
        }

        let catalog = Self { groups };
        let overlaps = catalog.overlaps();
        match policy {
            OverlapPolicy::Reject => {
                if let Some(overlap) = overlaps.into_iter().next() {
                    return Err(CatalogError::Overlap {
                        first: overlap.first,
                        second: overlap.second,
                    });
                }
            }
            OverlapPolicy::Warn => {
                for overlap in &overlaps {
                    warn!(
                        first = %overlap.first,
                        second = %overlap.second,
                        "cancer groups overlap; the first declared group wins"
                    );
                }
            }
            OverlapPolicy::Allow => {
                debug!(overlaps = overlaps.len(), "cancer group overlaps allowed");
            }
        }

        Ok(catalog)
    }

    /// Built-in solid tumor groups. The trailing other-sites group overlaps every other group
    /// and relies on first-match order, so overlaps are allowed.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_json_str(STANDARD_CATALOG, OverlapPolicy::Allow)
    }

    pub fn from_json_str(json: &str, policy: OverlapPolicy) -> Result<Self, CatalogError> {
        let definition: CatalogDefinition = serde_json::from_str(json)?;
        definition.build(policy)
    }

    pub fn from_reader<R: Read>(reader: R, policy: OverlapPolicy) -> Result<Self, CatalogError> {
        let definition: CatalogDefinition = serde_json::from_reader(reader)?;
        definition.build(policy)
    }

    pub fn from_path(path: impl AsRef<Path>, policy: OverlapPolicy) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let catalog = Self::from_reader(BufReader::new(file), policy)?;
        info!(
            path = %path.display(),
            groups = catalog.len(),
            "loaded cancer group catalog"
        );
        Ok(catalog)
    }

    pub fn groups(&self) -> &[CancerGroup] {
        &self.groups
    }

    pub fn get(&self, id: &str) -> Option<&CancerGroup> {
        self.groups.iter().find(|group| group.id().as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Pairs of groups, in declared order, that can match a common tumor.
    pub fn overlaps(&self) -> Vec<GroupOverlap> {
        let mut overlaps = Vec::new();
        for (index, group) in self.groups.iter().enumerate() {
            for other in &self.groups[index + 1..] {
                if group.overlaps(other) {
                    overlaps.push(GroupOverlap {
                        first: group.id().clone(),
                        second: other.id().clone(),
                    });
                }
            }
        }
        overlaps
    }

    pub fn summaries(&self) -> Vec<GroupSummary> {
        self.groups.iter().map(CancerGroup::summary).collect()
    }
}
