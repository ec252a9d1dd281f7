use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use super::catalog::GroupId;
use super::decision::MpResult;
use super::domain::{DiagnosisDate, TumorDescriptor};
use super::orchestrator::MpOrchestrator;

/// Errors raised while reading a batch of tumor pairs.
#[derive(Debug)]
pub enum BatchError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Io(err) => write!(f, "failed to read tumor pairs: {}", err),
            BatchError::Csv(err) => write!(f, "invalid tumor pair CSV data: {}", err),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Io(err) => Some(err),
            BatchError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        BatchError::Io(err)
    }
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        BatchError::Csv(err)
    }
}

/// Decision for one CSV row. Row numbers start at 1 after the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairDetermination {
    pub row: usize,
    pub result: MpResult,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

pub fn determine_pairs<R: Read>(
    reader: R,
    orchestrator: &MpOrchestrator,
) -> Result<Vec<PairDetermination>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);
    let mut determinations = Vec::new();

    for (index, record) in csv_reader.deserialize::<PairRow>().enumerate() {
        let row = record?;
        let (first, second) = row.into_descriptors();
        let decision = orchestrator.determine(&first, &second);
        determinations.push(PairDetermination {
            row: index + 1,
            step: decision.deciding_step().map(str::to_string),
            result: decision.result,
            reason: decision.reason,
            group: decision.group,
        });
    }

    Ok(determinations)
}

pub fn determine_pairs_from_path(
    path: impl AsRef<Path>,
    orchestrator: &MpOrchestrator,
) -> Result<Vec<PairDetermination>, BatchError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let determinations = determine_pairs(file, orchestrator)?;
    info!(
        path = %path.display(),
        pairs = determinations.len(),
        "determined tumor pairs"
    );
    Ok(determinations)
}

#[derive(Debug, Deserialize)]
struct PairRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    site1: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    histology1: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    behavior1: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    laterality1: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    year1: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    month1: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    day1: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    site2: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    histology2: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    behavior2: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    laterality2: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    year2: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    month2: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    day2: Option<String>,
}

impl PairRow {
    fn into_descriptors(self) -> (TumorDescriptor, TumorDescriptor) {
        let first = TumorDescriptor {
            primary_site: self.site1,
            histology: self.histology1,
            behavior: self.behavior1,
            laterality: self.laterality1,
            diagnosis: DiagnosisDate {
                year: self.year1,
                month: self.month1,
                day: self.day1,
            },
        };
        let second = TumorDescriptor {
            primary_site: self.site2,
            histology: self.histology2,
            behavior: self.behavior2,
            laterality: self.laterality2,
            diagnosis: DiagnosisDate {
                year: self.year2,
                month: self.month2,
                day: self.day2,
            },
        };
        (first, second)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
