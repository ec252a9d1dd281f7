use serde::{Deserialize, Serialize};

use super::super::domain::Behavior;
use super::super::ranges::{CodeFilter, CodeKind, RangeSet};
use super::super::rules::{Classification, Rule, RuleKind};
use super::{CancerGroup, CancerGroupCatalog, CatalogError, GroupId, OverlapPolicy};

/// Serialized catalog: the groups in the order the classifier tries them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDefinition {
    pub groups: Vec<GroupDefinition>,
}

impl CatalogDefinition {
    pub fn build(self, policy: OverlapPolicy) -> Result<CancerGroupCatalog, CatalogError> {
        let groups = self
            .groups
            .into_iter()
            .map(GroupDefinition::build)
            .collect::<Result<Vec<_>, _>>()?;
        CancerGroupCatalog::new(groups, policy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_inclusions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_exclusions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histology_inclusions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histology_exclusions: Option<String>,
    pub behaviors: Vec<Behavior>,
    pub rules: Vec<RuleDefinition>,
}

impl GroupDefinition {
    pub fn build(self) -> Result<CancerGroup, CatalogError> {
        let id = GroupId::new(self.id);
        let parse = |field: &'static str, kind: CodeKind, raw: Option<String>| {
            raw.map(|raw| RangeSet::parse(kind, &raw))
                .transpose()
                .map_err(|source| CatalogError::Range {
                    group: id.clone(),
                    field,
                    source,
                })
        };

        let sites = CodeFilter::from_lists(
            parse("site inclusion", CodeKind::Site, self.site_inclusions)?,
            parse("site exclusion", CodeKind::Site, self.site_exclusions)?,
        );
        let histologies = CodeFilter::from_lists(
            parse("histology inclusion", CodeKind::Histology, self.histology_inclusions)?,
            parse("histology exclusion", CodeKind::Histology, self.histology_exclusions)?,
        );

        let mut group = CancerGroup::new(id.clone(), self.name)
            .with_sites(sites)
            .with_histologies(histologies)
            .with_behaviors(self.behaviors);
        for rule in self.rules {
            group = group.with_rule(rule.build(&id)?);
        }

        Ok(group)
    }
}

/// One rule as written in a catalog file. Wording and classification may be omitted for
/// kinds that carry shared defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl RuleDefinition {
    fn build(self, group: &GroupId) -> Result<Rule, CatalogError> {
        if let Some(owner) = self.group_id {
            if owner != group.as_str() {
                return Err(CatalogError::ForeignRule {
                    group: group.clone(),
                    step: self.step,
                    owner,
                });
            }
        }

        let canned = self.kind.canned();
        let Some(classification) = self
            .classification
            .or_else(|| canned.as_ref().map(|text| text.classification))
        else {
            return Err(CatalogError::MissingClassification {
                group: group.clone(),
                step: self.step,
            });
        };
        let question = self
            .question
            .or_else(|| canned.as_ref().map(|text| text.question.clone()))
            .unwrap_or_default();
        let reason = self
            .reason
            .or_else(|| canned.as_ref().map(|text| text.reason.clone()))
            .unwrap_or_default();

        let mut rule = Rule::new(group.clone(), self.step, classification, self.kind)
            .with_question(question)
            .with_reason(reason);
        for note in self.notes {
            rule = rule.with_note(note);
        }

        Ok(rule)
    }
}
