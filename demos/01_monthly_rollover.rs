/// monthly rollover - watch installments advance as controlled time passes
use chrono::{Duration, TimeZone, Utc};
use installment_tracker_rs::view::render_statement;
use installment_tracker_rs::{
    Event, InMemoryStore, InstallmentTracker, Money, PurchaseDraft, SafeTimeProvider, TimeSource,
    TrackerConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== monthly rollover ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let config = TrackerConfig::default().with_rollover_day(5);
    let symbol = config.currency_symbol.clone();
    let mut tracker = InstallmentTracker::new(InMemoryStore::new(), config);

    tracker.register(
        PurchaseDraft::builder()
            .description("Microphone")
            .card("Nubank")
            .installment_amount(Money::from_minor(16_190))
            .current_installment(7, 10)
            .build()?,
        &time,
    )?;
    tracker.register(
        PurchaseDraft::builder()
            .description("Dentist")
            .card("Inter")
            .installment_amount(Money::from_major(100))
            .current_installment(2, 3)
            .build()?,
        &time,
    )?;
    tracker.take_events();

    print!("{}", render_statement(&tracker.current_statement(&time), &symbol));

    // walk forward month by month
    for _ in 0..4 {
        controller.advance(Duration::days(30));
        println!("\n--- {} ---", time.now().format("%Y-%m-%d"));

        match tracker.run_rollover_if_due(&time)? {
            Some(report) => println!(
                "rolled over {}: {} open, {} completed",
                report.month, report.updated, report.completed
            ),
            None => println!("rollover not due"),
        }

        for event in tracker.take_events() {
            if let Event::PurchaseCompleted { description, month, .. } = event {
                println!("completed in {}: {}", month, description);
            }
        }

        print!("{}", render_statement(&tracker.current_statement(&time), &symbol));
    }

    Ok(())
}
