use crate::infra::{load_orchestrator, parse_diagnosis_date};
use clap::Args;
use primaries::determination::router::ClassificationView;
use primaries::determination::{determine_pairs_from_path, DiagnosisDate, TumorDescriptor};
use primaries::error::AppError;
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DetermineArgs {
    /// Primary site of the first tumor (e.g. C509)
    #[arg(long)]
    pub(crate) site1: String,
    /// ICD-O-3 histology of the first tumor (e.g. 8500)
    #[arg(long)]
    pub(crate) histology1: String,
    /// Behavior code of the first tumor (0, 1, 2, 3 or 6)
    #[arg(long)]
    pub(crate) behavior1: String,
    /// Laterality code of the first tumor
    #[arg(long)]
    pub(crate) laterality1: Option<String>,
    /// Diagnosis date of the first tumor (YYYY, YYYY-MM or YYYY-MM-DD)
    #[arg(long, value_parser = parse_diagnosis_date)]
    pub(crate) date1: DiagnosisDate,
    /// Primary site of the second tumor
    #[arg(long)]
    pub(crate) site2: String,
    /// ICD-O-3 histology of the second tumor
    #[arg(long)]
    pub(crate) histology2: String,
    /// Behavior code of the second tumor
    #[arg(long)]
    pub(crate) behavior2: String,
    /// Laterality code of the second tumor
    #[arg(long)]
    pub(crate) laterality2: Option<String>,
    /// Diagnosis date of the second tumor
    #[arg(long, value_parser = parse_diagnosis_date)]
    pub(crate) date2: DiagnosisDate,
    /// Year treated as the current year when resolving unknown date parts
    #[arg(long)]
    pub(crate) reference_year: Option<i32>,
    /// Print a one-line summary instead of the full decision
    #[arg(long)]
    pub(crate) summary: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Primary site (e.g. C341)
    #[arg(long)]
    pub(crate) site: String,
    /// ICD-O-3 histology
    #[arg(long)]
    pub(crate) histology: String,
    /// Behavior code
    #[arg(long)]
    pub(crate) behavior: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GroupsArgs {
    /// List overlapping group pairs instead of the group definitions
    #[arg(long)]
    pub(crate) overlaps: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with site1..day1 and site2..day2 columns, one tumor pair per row
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Year treated as the current year when resolving unknown date parts
    #[arg(long)]
    pub(crate) reference_year: Option<i32>,
}

fn descriptor(
    site: String,
    histology: String,
    behavior: String,
    laterality: Option<String>,
    date: DiagnosisDate,
) -> TumorDescriptor {
    let descriptor = TumorDescriptor::new(site, histology, behavior).diagnosed(date);
    match laterality {
        Some(laterality) => descriptor.with_laterality(laterality),
        None => descriptor,
    }
}

pub(crate) fn run_determine(args: DetermineArgs) -> Result<(), AppError> {
    let orchestrator = load_orchestrator(args.reference_year)?;
    let first = descriptor(
        args.site1,
        args.histology1,
        args.behavior1,
        args.laterality1,
        args.date1,
    );
    let second = descriptor(
        args.site2,
        args.histology2,
        args.behavior2,
        args.laterality2,
        args.date2,
    );

    let decision = orchestrator.determine(&first, &second);
    if args.summary {
        println!("{}", decision.summary());
    } else {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    }
    Ok(())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let orchestrator = load_orchestrator(None)?;
    let descriptor = TumorDescriptor::new(args.site, args.histology, args.behavior);

    let payload = match descriptor.validate() {
        Ok(tumor) => match orchestrator.classifier().classify_tumor(&tumor) {
            Some(group) => serde_json::to_value(ClassificationView {
                group_id: group.id().to_string(),
                group_name: group.name().to_string(),
            })?,
            None => json!({ "error": "tumor does not belong to any cancer group" }),
        },
        Err(error) => json!({ "error": error.to_string() }),
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub(crate) fn run_groups(args: GroupsArgs) -> Result<(), AppError> {
    let orchestrator = load_orchestrator(None)?;
    let catalog = orchestrator.catalog();

    let output = if args.overlaps {
        serde_json::to_string_pretty(&catalog.overlaps())?
    } else {
        serde_json::to_string_pretty(&catalog.summaries())?
    };
    println!("{output}");
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let orchestrator = load_orchestrator(args.reference_year)?;
    for determination in determine_pairs_from_path(&args.input, &orchestrator)? {
        println!("{}", serde_json::to_string(&determination)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use primaries::determination::{MpOrchestrator, MpResult};

    #[test]
    fn descriptor_keeps_optional_laterality() {
        let with = descriptor(
            "C341".into(),
            "8140".into(),
            "3".into(),
            Some("1".into()),
            DiagnosisDate::year_only(2012),
        );
        assert_eq!(with.laterality.as_deref(), Some("1"));

        let without = descriptor(
            "C341".into(),
            "8140".into(),
            "3".into(),
            None,
            DiagnosisDate::year_only(2012),
        );
        assert!(without.laterality.is_none());
        assert_eq!(without.diagnosis, DiagnosisDate::year_only(2012));
    }

    #[test]
    fn command_descriptors_feed_the_orchestrator() {
        let orchestrator = MpOrchestrator::from_config(&Default::default())
            .expect("built-in catalog loads");
        let first = descriptor(
            "C509".into(),
            "8500".into(),
            "3".into(),
            None,
            parse_diagnosis_date("2018-03-01").expect("date parses"),
        );
        let second = descriptor(
            "C341".into(),
            "8140".into(),
            "3".into(),
            None,
            parse_diagnosis_date("2018-04-01").expect("date parses"),
        );

        let decision = orchestrator.determine(&first, &second);
        assert_eq!(decision.result, MpResult::MultiplePrimaries);
        assert!(decision.group.is_none());
    }
}
