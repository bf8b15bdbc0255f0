/// bulk import - one purchase per line, bad lines reported
use installment_tracker_rs::view::render_summary;
use installment_tracker_rs::{
    IncomeDraft, IncomeKind, InMemoryStore, InstallmentTracker, Money, SafeTimeProvider, TimeSource,
    TrackerConfig,
};
use tracing_subscriber::EnvFilter;

const LINES: &str = "\
Microphone | 161.90 | 7/10 | Nubank
Airline miles | 32,20 | 1/1 | Nubank
Dentist | 100.00 | 6/10 | Inter
Broken line without fields
Tablet | 250.00 | 13/12 | Inter
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let time = SafeTimeProvider::new(TimeSource::System);
    let config = TrackerConfig::load()?;
    let symbol = config.currency_symbol.clone();
    let mut tracker = InstallmentTracker::new(InMemoryStore::new(), config);

    let report = tracker.import(LINES, &time);
    println!("imported {} of {}", report.imported_count(), report.total);
    for failure in &report.failures {
        println!("  line {}: {} ({})", failure.line_number, failure.line, failure.reason);
    }

    tracker.record_income(
        IncomeDraft {
            description: "Salary".to_string(),
            amount: Money::from_major(4_500),
            kind: IncomeKind::Salary,
        },
        &time,
    )?;

    println!("\ncards: {}", tracker.cards(&time).join(", "));
    print!("\n{}", render_summary(&tracker.summary(&time), &symbol));

    Ok(())
}
