use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dates::PartialDate;

/// Diagnosis date as reported by a registry, one string per component.
///
/// `9999` (year) and `99` (month, day) are the registry sentinels for an unknown part; missing,
/// blank and non-numeric components are treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisDate {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
}

impl DiagnosisDate {
    pub fn new(
        year: impl Into<String>,
        month: impl Into<String>,
        day: impl Into<String>,
    ) -> Self {
        Self {
            year: Some(year.into()),
            month: Some(month.into()),
            day: Some(day.into()),
        }
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self::new(
            format!("{year:04}"),
            format!("{month:02}"),
            format!("{day:02}"),
        )
    }

    pub fn year_month(year: i32, month: u32) -> Self {
        Self::new(format!("{year:04}"), format!("{month:02}"), "99")
    }

    pub fn year_only(year: i32) -> Self {
        Self::new(format!("{year:04}"), "99", "99")
    }

    pub fn unknown() -> Self {
        Self::new("9999", "99", "99")
    }

    /// Numeric year, `None` when blank, non-numeric or the `9999` sentinel.
    pub fn known_year(&self) -> Option<i32> {
        parse_digits(self.year.as_deref()).filter(|year| *year != 9999)
    }

    /// Normalized partial date; out-of-range months and impossible days degrade to unknown.
    pub fn partial(&self) -> PartialDate {
        let month = parse_digits(self.month.as_deref())
            .filter(|month| *month != 99)
            .and_then(|month| u32::try_from(month).ok());
        let day = parse_digits(self.day.as_deref())
            .filter(|day| *day != 99)
            .and_then(|day| u32::try_from(day).ok());

        PartialDate::new(self.known_year(), month, day)
    }
}

fn parse_digits(value: Option<&str>) -> Option<i32> {
    let value = value?;
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Raw view of one tumor as received from a caller. Nothing is validated until [`validate`].
///
/// [`validate`]: TumorDescriptor::validate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TumorDescriptor {
    #[serde(default)]
    pub primary_site: Option<String>,
    #[serde(default)]
    pub histology: Option<String>,
    #[serde(default)]
    pub behavior: Option<String>,
    #[serde(default)]
    pub laterality: Option<String>,
    #[serde(default)]
    pub diagnosis: DiagnosisDate,
}

impl TumorDescriptor {
    pub fn new(
        primary_site: impl Into<String>,
        histology: impl Into<String>,
        behavior: impl Into<String>,
    ) -> Self {
        Self {
            primary_site: Some(primary_site.into()),
            histology: Some(histology.into()),
            behavior: Some(behavior.into()),
            laterality: None,
            diagnosis: DiagnosisDate::default(),
        }
    }

    pub fn with_laterality(mut self, laterality: impl Into<String>) -> Self {
        self.laterality = Some(laterality.into());
        self
    }

    pub fn diagnosed(mut self, diagnosis: DiagnosisDate) -> Self {
        self.diagnosis = diagnosis;
        self
    }

    /// Checks site, then histology, then behavior, and builds the typed tumor.
    pub fn validate(&self) -> Result<Tumor, InvalidTumor> {
        let site = match self.primary_site.as_deref() {
            None | Some("") => return Err(InvalidTumor::Missing { field: "primary site" }),
            Some(raw) => SiteCode::parse(raw).ok_or_else(|| InvalidTumor::Site(raw.to_string()))?,
        };
        if site == SiteCode::UNKNOWN_PRIMARY {
            return Err(InvalidTumor::UnknownPrimarySite);
        }

        let histology = match self.histology.as_deref() {
            None | Some("") => return Err(InvalidTumor::Missing { field: "histology" }),
            Some(raw) => {
                Histology::parse(raw).ok_or_else(|| InvalidTumor::Histology(raw.to_string()))?
            }
        };

        let behavior = match self.behavior.as_deref() {
            None | Some("") => return Err(InvalidTumor::Missing { field: "behavior" }),
            Some(raw) => {
                Behavior::from_code(raw).ok_or_else(|| InvalidTumor::Behavior(raw.to_string()))?
            }
        };

        Ok(Tumor {
            site,
            histology,
            behavior,
            laterality: self.laterality.clone(),
            diagnosed: self.diagnosis.partial(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTumor {
    #[error("{field} is missing")]
    Missing { field: &'static str },
    #[error("primary site '{0}' is not a topography code between C000 and C999")]
    Site(String),
    #[error("primary site C809 (unknown primary) cannot be grouped")]
    UnknownPrimarySite,
    #[error("histology '{0}' is not an ICD-O-3 code between 8000 and 9999")]
    Histology(String),
    #[error("behavior '{0}' is not one of 0, 1, 2, 3 or 6")]
    Behavior(String),
}

/// Validated, typed tumor. Only [`TumorDescriptor::validate`] produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tumor {
    pub site: SiteCode,
    pub histology: Histology,
    pub behavior: Behavior,
    pub laterality: Option<String>,
    pub diagnosed: PartialDate,
}

impl Tumor {
    pub fn laterality(&self) -> Option<&str> {
        self.laterality.as_deref()
    }
}

/// ICD-O-3 topography code, stored as the three digits after the `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteCode(u16);

impl SiteCode {
    pub const UNKNOWN_PRIMARY: SiteCode = SiteCode(809);

    /// Accepts `Cxyz` in either case.
    pub fn parse(raw: &str) -> Option<Self> {
        let bytes = raw.as_bytes();
        if bytes.len() != 4 || !bytes[0].eq_ignore_ascii_case(&b'C') {
            return None;
        }
        let digits = &raw[1..];
        if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }

    pub const fn from_number(value: u16) -> Option<Self> {
        if value <= 999 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// Second and third characters, e.g. `50` for `C509`.
    pub const fn category(self) -> u16 {
        self.0 / 10
    }

    pub const fn subsite(self) -> u16 {
        self.0 % 10
    }
}

impl fmt::Display for SiteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{:03}", self.0)
    }
}

/// Four digit ICD-O-3 histology code in the 8000-9999 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Histology(u16);

impl Histology {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != 4 || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok().and_then(Self::from_number)
    }

    pub const fn from_number(value: u16) -> Option<Self> {
        if value >= 8000 && value <= 9999 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn first_three(self) -> u16 {
        self.0 / 10
    }
}

impl fmt::Display for Histology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// ICD-O-3 behavior code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Behavior {
    #[serde(rename = "0")]
    Benign,
    #[serde(rename = "1")]
    Uncertain,
    #[serde(rename = "2")]
    InSitu,
    #[serde(rename = "3")]
    Invasive,
    #[serde(rename = "6")]
    Metastatic,
}

impl Behavior {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Benign),
            "1" => Some(Self::Uncertain),
            "2" => Some(Self::InSitu),
            "3" => Some(Self::Invasive),
            "6" => Some(Self::Metastatic),
            _ => None,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Benign => "0",
            Self::Uncertain => "1",
            Self::InSitu => "2",
            Self::Invasive => "3",
            Self::Metastatic => "6",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Benign => "benign",
            Self::Uncertain => "uncertain/borderline",
            Self::InSitu => "in situ",
            Self::Invasive => "invasive",
            Self::Metastatic => "metastatic",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
