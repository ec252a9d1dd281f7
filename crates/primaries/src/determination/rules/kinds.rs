use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::super::dates::{DiagnosisOrder, SixtyDayGap, YearsApart};
use super::super::domain::{Behavior, Histology, Tumor};
use super::super::ranges::{HistologyRanges, SiteRanges};
use super::{Classification, RuleContext};

/// NOS histology codes and the specific types they stand in for.
const NOS_SPECIFIC: &[(u16, &[u16])] = &[
    (8000, &[8001, 8002, 8003, 8004, 8005]),
    (8010, &[8011, 8012, 8013, 8014, 8015]),
    (8140, &[8141, 8142, 8143, 8144, 8145, 8147, 8148]),
    (
        8070,
        &[
            8071, 8072, 8073, 8074, 8075, 8076, 8077, 8078, 8080, 8081, 8082, 8083, 8084, 8094,
            8323,
        ],
    ),
    (
        8720,
        &[
            8721, 8722, 8723, 8726, 8728, 8730, 8740, 8741, 8742, 8743, 8744, 8745, 8746, 8761,
            8770, 8771, 8772, 8773, 8774, 8780,
        ],
    ),
    (8800, &[8801, 8802, 8803, 8804, 8805, 8806]),
    (8312, &[8313, 8314, 8315, 8316, 8317, 8318, 8319, 8320]),
];

/// Why a rule could not be answered for a pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingInformation {
    #[error("There is not enough diagnosis date information.")]
    DiagnosisDate,
    #[error(
        "Valid and known laterality{} should be provided.",
        .subject.as_ref().map(|subject| format!(" for {subject}")).unwrap_or_default()
    )]
    Laterality { subject: Option<String> },
    #[error("A site recode could not be determined for both tumors.")]
    SiteRecode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateralityMode {
    /// Any two different accepted codes.
    Different,
    /// Exactly one right (1) and one left (2).
    Opposite,
}

/// Conjunctive filter on a single tumor. Absent fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TumorCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<SiteRanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_sites: Option<SiteRanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histologies: Option<HistologyRanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<Behavior>,
}

impl TumorCriteria {
    pub fn matches(&self, tumor: &Tumor) -> bool {
        self.sites
            .as_ref()
            .map_or(true, |sites| sites.contains(tumor.site))
            && self
                .excluded_sites
                .as_ref()
                .map_or(true, |sites| !sites.contains(tumor.site))
            && self
                .histologies
                .as_ref()
                .map_or(true, |histologies| histologies.contains(tumor.histology))
            && (self.behaviors.is_empty() || self.behaviors.contains(&tumor.behavior))
    }
}

/// One branch of a histology chart. Branches sharing a name form one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartBranch {
    pub name: String,
    pub histologies: HistologyRanges,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<Behavior>,
    /// Joins every other branch of the chart.
    #[serde(default, skip_serializing_if = "is_false")]
    pub universal: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Entries restricted to a behavior win over entries that list none.
fn branch_of<'c>(chart: &'c [ChartBranch], tumor: &Tumor) -> Option<&'c ChartBranch> {
    let listed = |branch: &&ChartBranch| branch.histologies.contains(tumor.histology);
    chart
        .iter()
        .filter(listed)
        .find(|branch| branch.behaviors.contains(&tumor.behavior))
        .or_else(|| {
            chart
                .iter()
                .filter(listed)
                .find(|branch| branch.behaviors.is_empty())
        })
}

fn is_nos_of(nos: &[u16], general: Histology, specific: Histology) -> bool {
    nos.contains(&general.value())
        && NOS_SPECIFIC
            .iter()
            .find(|(code, _)| *code == general.value())
            .map_or(false, |(_, specifics)| specifics.contains(&specific.value()))
}

/// Question a rule asks about a tumor pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Topography differs at the second or third character (Cxx).
    SiteDiffersAtCategory,
    SiteDiffers,
    /// Same listed category (e.g. `C44`) but different fourth character.
    SiteDiffersAtSubsiteWithin {
        categories: Vec<String>,
    },
    HistologyDiffersAtFirstThree,
    YearsApart {
        years: u32,
    },
    /// Invasive tumor diagnosed more than 60 days after an in situ one.
    InvasiveAfterInSitu,
    MoreThanSixtyDaysApart,
    WithinSixtyDays,
    Laterality {
        accepted: Vec<String>,
        mode: LateralityMode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        paired_sites: Option<Vec<SiteRanges>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subject: Option<String>,
    },
    /// False only when both tumors sit on the same known side.
    NotConfinedToOneSide {
        #[serde(default)]
        bilateral: Vec<String>,
    },
    BothMatch {
        criteria: TumorCriteria,
    },
    EitherMatches {
        criteria: TumorCriteria,
    },
    /// One tumor matches `first` and the other matches `second`.
    DifferentCategory {
        first: TumorCriteria,
        second: TumorCriteria,
    },
    DistinctWithin {
        histologies: HistologyRanges,
    },
    NosVersusSpecific {
        nos: Vec<u16>,
    },
    Following {
        earlier: TumorCriteria,
        later: TumorCriteria,
    },
    SameBranch {
        chart: Vec<ChartBranch>,
        #[serde(default)]
        distinct: bool,
    },
    DifferentBranches {
        chart: Vec<ChartBranch>,
        #[serde(default)]
        distinct: bool,
    },
    OffChart {
        chart: Vec<ChartBranch>,
    },
    SiteRecodeDiffers,
    All {
        rules: Vec<RuleKind>,
    },
    Any {
        rules: Vec<RuleKind>,
    },
    Not {
        rule: Box<RuleKind>,
    },
    NotAutomated,
    NoCriteriaSatisfied,
}

/// Default wording for the kinds shared by every group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedText {
    pub classification: Classification,
    pub question: String,
    pub reason: String,
}

impl RuleKind {
    pub fn canned(&self) -> Option<CannedText> {
        let canned = |classification, question: &str, reason: &str| CannedText {
            classification,
            question: question.to_string(),
            reason: reason.to_string(),
        };

        match self {
            RuleKind::SiteDiffersAtCategory => Some(canned(
                Classification::MultiplePrimaries,
                "Are there tumors in sites with ICD-O-3 topography codes that are different at the second (C?xx) and/or third character (Cx?x)?",
                "Tumors in sites with ICD-O-3 topography codes that are different at the second (C?xx) and/or third (Cx?x) character are multiple primaries.",
            )),
            RuleKind::HistologyDiffersAtFirstThree => Some(canned(
                Classification::MultiplePrimaries,
                "Do the tumors have ICD-O-3 histology codes that are different at the first (?xxx), second (x?xx) or third (xx?x) number?",
                "Tumors with ICD-O-3 histology codes that are different at the first (?xxx), second (x?xx) or third (xx?x) number are multiple primaries.",
            )),
            RuleKind::InvasiveAfterInSitu => Some(canned(
                Classification::MultiplePrimaries,
                "Is there an invasive tumor following an in situ tumor more than 60 days after diagnosis?",
                "An invasive tumor following an in situ tumor more than 60 days after diagnosis are multiple primaries.",
            )),
            RuleKind::YearsApart { years } => {
                let span = spelled_years(*years);
                Some(CannedText {
                    classification: Classification::MultiplePrimaries,
                    question: format!("Are there tumors diagnosed more than {span} apart?"),
                    reason: format!("Tumors diagnosed more than {span} apart are multiple primaries."),
                })
            }
            RuleKind::NoCriteriaSatisfied => Some(canned(
                Classification::SinglePrimary,
                "Does not meet any of the criteria?",
                "Tumors that do not meet any of the criteria are abstracted as a single primary.",
            )),
            _ => None,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, RuleKind::NoCriteriaSatisfied)
    }

    /// Answers the question for the pair, or names the information that is missing.
    pub fn holds(
        &self,
        first: &Tumor,
        second: &Tumor,
        context: &RuleContext<'_>,
    ) -> Result<bool, MissingInformation> {
        match self {
            RuleKind::SiteDiffersAtCategory => Ok(first.site.category() != second.site.category()),
            RuleKind::SiteDiffers => Ok(first.site != second.site),
            RuleKind::SiteDiffersAtSubsiteWithin { categories } => {
                let category = format!("C{:02}", first.site.category());
                let listed = categories
                    .iter()
                    .any(|listed| listed.eq_ignore_ascii_case(&category));
                Ok(listed
                    && first.site.category() == second.site.category()
                    && first.site.subsite() != second.site.subsite())
            }
            RuleKind::HistologyDiffersAtFirstThree => {
                Ok(first.histology.first_three() != second.histology.first_three())
            }
            RuleKind::YearsApart { years } => {
                match context
                    .dates
                    .years_apart(&first.diagnosed, &second.diagnosed, *years)
                {
                    YearsApart::Yes => Ok(true),
                    YearsApart::No => Ok(false),
                    YearsApart::Unknown => Err(MissingInformation::DiagnosisDate),
                }
            }
            RuleKind::InvasiveAfterInSitu => {
                let pairing = (first.behavior, second.behavior);
                if pairing != (Behavior::InSitu, Behavior::Invasive)
                    && pairing != (Behavior::Invasive, Behavior::InSitu)
                {
                    return Ok(false);
                }
                match context
                    .dates
                    .days_apart_60(&first.diagnosed, &second.diagnosed, Some(pairing))
                {
                    SixtyDayGap::FirstLater => Ok(first.behavior == Behavior::Invasive),
                    SixtyDayGap::SecondLater => Ok(second.behavior == Behavior::Invasive),
                    SixtyDayGap::Within => Ok(false),
                    SixtyDayGap::Unknown => Err(MissingInformation::DiagnosisDate),
                }
            }
            RuleKind::MoreThanSixtyDaysApart => {
                match context
                    .dates
                    .days_apart_60(&first.diagnosed, &second.diagnosed, None)
                {
                    SixtyDayGap::Unknown => Err(MissingInformation::DiagnosisDate),
                    gap => Ok(gap.is_apart()),
                }
            }
            RuleKind::WithinSixtyDays => {
                match context
                    .dates
                    .days_apart_60(&first.diagnosed, &second.diagnosed, None)
                {
                    SixtyDayGap::Unknown => Err(MissingInformation::DiagnosisDate),
                    gap => Ok(gap == SixtyDayGap::Within),
                }
            }
            RuleKind::Laterality {
                accepted,
                mode,
                paired_sites,
                subject,
            } => {
                if let Some(paired_sites) = paired_sites {
                    let paired = paired_sites
                        .iter()
                        .any(|sites| sites.contains(first.site) && sites.contains(second.site));
                    if !paired {
                        return Ok(false);
                    }
                }

                let is_accepted = |code: &str| accepted.iter().any(|accepted| accepted == code);
                let (left, right) = match (first.laterality(), second.laterality()) {
                    (Some(left), Some(right)) if is_accepted(left) && is_accepted(right) => {
                        (left, right)
                    }
                    _ => {
                        return Err(MissingInformation::Laterality {
                            subject: subject.clone(),
                        })
                    }
                };

                Ok(match mode {
                    LateralityMode::Different => left != right,
                    LateralityMode::Opposite => {
                        matches!((left, right), ("1", "2") | ("2", "1"))
                    }
                })
            }
            RuleKind::NotConfinedToOneSide { bilateral } => {
                let same_side = first.laterality() == second.laterality()
                    && !first
                        .laterality()
                        .is_some_and(|code| bilateral.iter().any(|listed| listed == code));
                Ok(!same_side)
            }
            RuleKind::BothMatch { criteria } => {
                Ok(criteria.matches(first) && criteria.matches(second))
            }
            RuleKind::EitherMatches { criteria } => {
                Ok(criteria.matches(first) || criteria.matches(second))
            }
            RuleKind::DifferentCategory {
                first: category_a,
                second: category_b,
            } => Ok((category_a.matches(first) && category_b.matches(second))
                || (category_b.matches(first) && category_a.matches(second))),
            RuleKind::DistinctWithin { histologies } => Ok(histologies.contains(first.histology)
                && histologies.contains(second.histology)
                && first.histology != second.histology),
            RuleKind::NosVersusSpecific { nos } => {
                Ok(is_nos_of(nos, first.histology, second.histology)
                    || is_nos_of(nos, second.histology, first.histology))
            }
            RuleKind::Following { earlier, later } => {
                let first_follows = later.matches(first) && earlier.matches(second);
                let second_follows = later.matches(second) && earlier.matches(first);
                if !first_follows && !second_follows {
                    return Ok(false);
                }
                match context
                    .dates
                    .diagnosis_order(&first.diagnosed, &second.diagnosed)
                {
                    DiagnosisOrder::FirstLater => Ok(first_follows),
                    DiagnosisOrder::SecondLater => Ok(second_follows),
                    DiagnosisOrder::SameDay => Ok(false),
                    DiagnosisOrder::Unknown => Err(MissingInformation::DiagnosisDate),
                }
            }
            RuleKind::SameBranch { chart, distinct } => {
                if *distinct && first.histology == second.histology {
                    return Ok(false);
                }
                Ok(match (branch_of(chart, first), branch_of(chart, second)) {
                    (Some(one), Some(other)) => {
                        one.name == other.name || one.universal || other.universal
                    }
                    _ => false,
                })
            }
            RuleKind::DifferentBranches { chart, distinct } => {
                if *distinct && first.histology == second.histology {
                    return Ok(false);
                }
                Ok(match (branch_of(chart, first), branch_of(chart, second)) {
                    (Some(one), Some(other)) => {
                        one.name != other.name && !one.universal && !other.universal
                    }
                    _ => false,
                })
            }
            RuleKind::OffChart { chart } => {
                if first.histology == second.histology {
                    return Ok(false);
                }
                Ok(branch_of(chart, first).is_some() != branch_of(chart, second).is_some())
            }
            RuleKind::SiteRecodeDiffers => {
                let recode = |tumor: &Tumor| {
                    context
                        .recodes
                        .recode(tumor.site, tumor.histology, tumor.behavior)
                        .ok_or(MissingInformation::SiteRecode)
                };
                Ok(recode(first)? != recode(second)?)
            }
            RuleKind::All { rules } => {
                for rule in rules {
                    if !rule.holds(first, second, context)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            RuleKind::Any { rules } => {
                for rule in rules {
                    if rule.holds(first, second, context)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            RuleKind::Not { rule } => Ok(!rule.holds(first, second, context)?),
            RuleKind::NotAutomated => Ok(false),
            RuleKind::NoCriteriaSatisfied => Ok(true),
        }
    }
}

fn spelled_years(years: u32) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    let unit = if years == 1 { "year" } else { "years" };
    match WORDS.get(years as usize) {
        Some(word) => format!("{word} ({years}) {unit}"),
        None => format!("{years} {unit}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spelled_years_matches_registry_wording() {
        assert_eq!(spelled_years(5), "five (5) years");
        assert_eq!(spelled_years(1), "one (1) year");
        assert_eq!(spelled_years(12), "12 years");
    }

    #[test]
    fn laterality_message_names_subject() {
        let missing = MissingInformation::Laterality {
            subject: Some("lung cancer".to_string()),
        };
        assert_eq!(
            missing.to_string(),
            "Valid and known laterality for lung cancer should be provided."
        );
        let missing = MissingInformation::Laterality { subject: None };
        assert_eq!(
            missing.to_string(),
            "Valid and known laterality should be provided."
        );
    }

    #[test]
    fn kinds_deserialize_from_tagged_json() {
        let kind: RuleKind = serde_json::from_str(
            r#"{"kind": "all", "rules": [
                {"kind": "both_match", "criteria": {"sites": "C739", "histologies": "8340"}},
                {"kind": "within_sixty_days"}
            ]}"#,
        )
        .expect("rule kind");

        match kind {
            RuleKind::All { rules } => {
                assert_eq!(rules.len(), 2);
                assert_eq!(rules[1], RuleKind::WithinSixtyDays);
            }
            other => panic!("expected all combinator, got {other:?}"),
        }
    }
}
