/// json state - listings, projections and events as json
use chrono::{TimeZone, Utc};
use installment_tracker_rs::view::to_json_pretty;
use installment_tracker_rs::{
    InMemoryStore, InstallmentTerms, InstallmentTracker, Money, PurchaseDraft, PurchaseFilter,
    PurchaseListView, SafeTimeProvider, TimeSource, TrackerConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    ));
    let mut tracker = InstallmentTracker::new(InMemoryStore::new(), TrackerConfig::default());

    let phone = tracker.register(
        PurchaseDraft::builder()
            .description("Phone")
            .card("Inter")
            .category("Electronics")
            .total_amount(Money::from_major(2_800))
            .current_installment(12, 14)
            .build()?,
        &time,
    )?;

    // starts in august
    tracker.register(
        PurchaseDraft::builder()
            .description("Course")
            .card("Itau")
            .total_amount(Money::from_major(1_200))
            .terms(InstallmentTerms::parse("2024-08", 1, 12)?)
            .build()?,
        &time,
    )?;

    println!("all purchases");
    println!("-------------");
    let all = tracker.list(&PurchaseFilter::all(), &time);
    println!("{}\n", PurchaseListView::from_purchases(&all).to_json_pretty()?);

    println!("upcoming for {}", phone.description);
    println!("-------------");
    println!("{}\n", to_json_pretty(&tracker.upcoming(phone.id, &time, Some(6))?)?);

    println!("next statement");
    println!("-------------");
    println!("{}\n", to_json_pretty(&tracker.next_statement(&time))?);

    println!("events");
    println!("-------------");
    println!("{}", to_json_pretty(&tracker.take_events())?);

    Ok(())
}
