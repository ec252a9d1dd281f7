use crate::infra::load_orchestrator;
use clap::Args;
use primaries::determination::{DiagnosisDate, MpOrchestrator, RuleVerdict, TumorDescriptor};
use primaries::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Year treated as the current year. Defaults to the configured or calendar year.
    #[arg(long)]
    pub(crate) reference_year: Option<i32>,
    /// List every rule visited for each scenario.
    #[arg(long)]
    pub(crate) show_rules: bool,
}

struct Scenario {
    title: &'static str,
    first: TumorDescriptor,
    second: TumorDescriptor,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            title: "Breast and lung primaries",
            first: TumorDescriptor::new("C509", "8500", "3")
                .diagnosed(DiagnosisDate::ymd(2018, 3, 1)),
            second: TumorDescriptor::new("C341", "8140", "3")
                .diagnosed(DiagnosisDate::ymd(2018, 4, 1)),
        },
        Scenario {
            title: "Invasive breast tumor three months after in situ",
            first: TumorDescriptor::new("C509", "8500", "2")
                .with_laterality("1")
                .diagnosed(DiagnosisDate::ymd(2010, 1, 1)),
            second: TumorDescriptor::new("C509", "8500", "3")
                .with_laterality("1")
                .diagnosed(DiagnosisDate::ymd(2010, 4, 5)),
        },
        Scenario {
            title: "Breast tumors with year-only diagnosis dates",
            first: TumorDescriptor::new("C509", "8500", "2")
                .with_laterality("1")
                .diagnosed(DiagnosisDate::year_only(2015)),
            second: TumorDescriptor::new("C509", "8500", "3")
                .with_laterality("1")
                .diagnosed(DiagnosisDate::year_only(2015)),
        },
        Scenario {
            title: "Unknown diagnosis year",
            first: TumorDescriptor::new("C509", "8500", "3")
                .diagnosed(DiagnosisDate::unknown()),
            second: TumorDescriptor::new("C509", "8500", "3")
                .diagnosed(DiagnosisDate::ymd(2012, 5, 1)),
        },
        Scenario {
            title: "Head and neck tumors six years apart",
            first: TumorDescriptor::new("C019", "8070", "3")
                .diagnosed(DiagnosisDate::ymd(2010, 3, 1)),
            second: TumorDescriptor::new("C019", "8070", "3")
                .diagnosed(DiagnosisDate::ymd(2016, 3, 2)),
        },
        Scenario {
            title: "One tumor in each lung",
            first: TumorDescriptor::new("C341", "8140", "3")
                .with_laterality("1")
                .diagnosed(DiagnosisDate::ymd(2014, 2, 10)),
            second: TumorDescriptor::new("C341", "8140", "3")
                .with_laterality("2")
                .diagnosed(DiagnosisDate::ymd(2014, 2, 20)),
        },
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let orchestrator = load_orchestrator(args.reference_year)?;
    render_demo(&orchestrator, args.show_rules);
    Ok(())
}

fn render_demo(orchestrator: &MpOrchestrator, show_rules: bool) {
    println!(
        "Multiple primary determination demo (reference year {}, {} cancer groups)",
        orchestrator.engine().dates().reference_year(),
        orchestrator.catalog().len()
    );

    for scenario in scenarios() {
        let decision = orchestrator.determine(&scenario.first, &scenario.second);
        println!("\n{}", scenario.title);
        println!("- {}", decision.summary());

        if show_rules && !decision.applied_rules.is_empty() {
            println!("  Rules visited:");
            for rule in &decision.applied_rules {
                let verdict = match rule.verdict {
                    RuleVerdict::True => "yes",
                    RuleVerdict::False => "no",
                    RuleVerdict::Unknown => "unknown",
                };
                println!("    - {} {} -> {}", rule.step, rule.question, verdict);
            }
        }
    }
}
