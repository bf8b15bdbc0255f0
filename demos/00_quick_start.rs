/// quick start - register a purchase and see where it stands
use installment_tracker_rs::{
    InMemoryStore, InstallmentTracker, Money, PurchaseDraft, PurchaseView, SafeTimeProvider,
    TimeSource, TrackerConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut tracker = InstallmentTracker::new(InMemoryStore::new(), TrackerConfig::default());

    // paying installment 6 of 10 this month
    let purchase = tracker.register(
        PurchaseDraft::builder()
            .description("Headphones")
            .card("Nubank")
            .total_amount(Money::from_major(619))
            .current_installment(6, 10)
            .build()?,
        &time,
    )?;

    println!("{}", PurchaseView::from_purchase(&purchase).to_json_pretty()?);

    Ok(())
}
