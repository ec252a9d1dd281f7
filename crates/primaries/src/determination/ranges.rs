use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{Histology, SiteCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeParseError {
    #[error("range list is empty")]
    Empty,
    #[error("'{token}' is not a valid {kind} code")]
    InvalidCode { kind: CodeKind, token: String },
    #[error("range '{token}' must have the form start-end")]
    Malformed { token: String },
    #[error("range '{token}' ends before it starts")]
    Reversed { token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Site,
    Histology,
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeKind::Site => f.write_str("primary site"),
            CodeKind::Histology => f.write_str("histology"),
        }
    }
}

/// Closed interval of numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRange {
    pub start: u16,
    pub end: u16,
}

impl CodeRange {
    pub fn contains(&self, value: u16) -> bool {
        self.start <= value && value <= self.end
    }
}

/// Comma separated list of codes and `start-end` ranges, e.g. `C000-C148, C300-C329`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSet {
    kind: CodeKind,
    raw: String,
    ranges: Vec<CodeRange>,
}

impl RangeSet {
    pub fn parse(kind: CodeKind, raw: &str) -> Result<Self, RangeParseError> {
        let mut ranges = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|token| !token.is_empty()) {
            let bounds: Vec<&str> = token.split('-').map(str::trim).collect();
            let (start, end) = match bounds.as_slice() {
                [single] => {
                    let value = parse_code(kind, single)?;
                    (value, value)
                }
                [start, end] => (parse_code(kind, start)?, parse_code(kind, end)?),
                _ => {
                    return Err(RangeParseError::Malformed {
                        token: token.to_string(),
                    })
                }
            };
            if end < start {
                return Err(RangeParseError::Reversed {
                    token: token.to_string(),
                });
            }
            ranges.push(CodeRange { start, end });
        }

        if ranges.is_empty() {
            return Err(RangeParseError::Empty);
        }

        Ok(Self {
            kind,
            raw: raw.trim().to_string(),
            ranges,
        })
    }

    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn ranges(&self) -> &[CodeRange] {
        &self.ranges
    }

    pub fn contains(&self, value: u16) -> bool {
        self.ranges.iter().any(|range| range.contains(value))
    }
}

fn parse_code(kind: CodeKind, token: &str) -> Result<u16, RangeParseError> {
    let parsed = match kind {
        CodeKind::Site => SiteCode::parse(token).map(SiteCode::value),
        CodeKind::Histology => token
            .parse::<u16>()
            .ok()
            .filter(|_| token.len() == 4 && token.bytes().all(|byte| byte.is_ascii_digit())),
    };

    parsed.ok_or_else(|| RangeParseError::InvalidCode {
        kind,
        token: token.to_string(),
    })
}

/// Topography ranges. Serialized back to comma separated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteRanges(RangeSet);

impl SiteRanges {
    pub fn parse(raw: &str) -> Result<Self, RangeParseError> {
        RangeSet::parse(CodeKind::Site, raw).map(Self)
    }

    pub fn contains(&self, site: SiteCode) -> bool {
        self.0.contains(site.value())
    }

    pub fn set(&self) -> &RangeSet {
        &self.0
    }
}

impl TryFrom<String> for SiteRanges {
    type Error = RangeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SiteRanges> for String {
    fn from(value: SiteRanges) -> Self {
        value.0.raw
    }
}

/// Histology ranges. Codes below 8000 are allowed so a range can start at 0000.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HistologyRanges(RangeSet);

impl HistologyRanges {
    pub fn parse(raw: &str) -> Result<Self, RangeParseError> {
        RangeSet::parse(CodeKind::Histology, raw).map(Self)
    }

    pub fn contains(&self, histology: Histology) -> bool {
        self.0.contains(histology.value())
    }

    pub fn set(&self) -> &RangeSet {
        &self.0
    }
}

impl TryFrom<String> for HistologyRanges {
    type Error = RangeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HistologyRanges> for String {
    fn from(value: HistologyRanges) -> Self {
        value.0.raw
    }
}

/// Inclusion-or-exclusion test a group applies to one code dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeFilter {
    Any,
    Include(RangeSet),
    Exclude(RangeSet),
}

impl CodeFilter {
    /// Inclusions win when both lists are present.
    pub fn from_lists(inclusions: Option<RangeSet>, exclusions: Option<RangeSet>) -> Self {
        match (inclusions, exclusions) {
            (Some(included), _) => Self::Include(included),
            (None, Some(excluded)) => Self::Exclude(excluded),
            (None, None) => Self::Any,
        }
    }

    pub fn admits(&self, value: u16) -> bool {
        match self {
            CodeFilter::Any => true,
            CodeFilter::Include(set) => set.contains(value),
            CodeFilter::Exclude(set) => !set.contains(value),
        }
    }

    pub fn inclusions(&self) -> Option<&str> {
        match self {
            CodeFilter::Include(set) => Some(set.raw()),
            _ => None,
        }
    }

    pub fn exclusions(&self) -> Option<&str> {
        match self {
            CodeFilter::Exclude(set) => Some(set.raw()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_site_tokens() {
        let ranges = SiteRanges::parse("C659, C669, C670-C679,c680-C689").expect("ranges");
        let site = |raw: &str| SiteCode::parse(raw).expect("site");

        assert!(ranges.contains(site("C659")));
        assert!(ranges.contains(site("C675")));
        assert!(ranges.contains(site("C689")));
        assert!(!ranges.contains(site("C660")));
        assert_eq!(ranges.set().ranges().len(), 4);
    }

    #[test]
    fn histology_bounds_are_inclusive() {
        let ranges = HistologyRanges::parse("9590-9989, 9140").expect("ranges");
        let histology = |value: u16| Histology::from_number(value).expect("histology");

        assert!(ranges.contains(histology(9590)));
        assert!(ranges.contains(histology(9989)));
        assert!(ranges.contains(histology(9140)));
        assert!(!ranges.contains(histology(9990)));
    }

    #[test]
    fn rejects_bad_tokens() {
        assert_eq!(
            SiteRanges::parse("C50"),
            Err(RangeParseError::InvalidCode {
                kind: CodeKind::Site,
                token: "C50".to_string(),
            })
        );
        assert_eq!(
            HistologyRanges::parse("8200-8100"),
            Err(RangeParseError::Reversed {
                token: "8200-8100".to_string(),
            })
        );
        assert_eq!(
            HistologyRanges::parse("8000-8100-8200"),
            Err(RangeParseError::Malformed {
                token: "8000-8100-8200".to_string(),
            })
        );
        assert_eq!(HistologyRanges::parse(" , "), Err(RangeParseError::Empty));
    }

    #[test]
    fn filter_prefers_inclusions() {
        let included = RangeSet::parse(CodeKind::Histology, "8720-8780").expect("set");
        let excluded = RangeSet::parse(CodeKind::Histology, "8000-9999").expect("set");
        let filter = CodeFilter::from_lists(Some(included), Some(excluded));

        assert!(filter.admits(8743));
        assert!(!filter.admits(8140));
        assert!(CodeFilter::Any.admits(9999));
    }

    #[test]
    fn deserializes_from_plain_strings() {
        let ranges: SiteRanges = serde_json::from_str("\"C500-C509\"").expect("ranges");
        assert_eq!(ranges.set().raw(), "C500-C509");
        assert!(serde_json::from_str::<SiteRanges>("\"breast\"").is_err());
    }
}
