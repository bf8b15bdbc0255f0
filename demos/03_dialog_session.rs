/// dialog session - the guided registration flow a chat front end would drive
use installment_tracker_rs::{
    Draft, Flow, InMemoryStore, InstallmentTracker, SafeTimeProvider, SessionStep, SessionStore,
    TimeSource, TrackerConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut tracker = InstallmentTracker::new(InMemoryStore::new(), TrackerConfig::default());
    let mut sessions = SessionStore::new();
    let user = 1001;

    let prompt = sessions.start(user, Flow::Purchase);
    println!("bot: {}", prompt.text());

    // the second answer is rejected and asked again
    for answer in ["Bluetooth headphones", "lots", "619,00", "6", "10", "Nubank"] {
        println!("user: {}", answer);

        match sessions.feed(user, answer) {
            Ok(SessionStep::Prompt(next)) => println!("bot: {}", next.text()),
            Ok(SessionStep::Completed(Draft::Purchase(draft))) => {
                let purchase = tracker.register(draft, &time)?;
                println!(
                    "bot: saved {} {} on {}",
                    purchase.description,
                    purchase.installment_label(),
                    purchase.card
                );
            }
            Ok(SessionStep::Completed(Draft::Income(draft))) => {
                tracker.record_income(draft, &time)?;
            }
            Err(err) => {
                let again = sessions.pending_prompt(user).map(|p| p.text()).unwrap_or_default();
                println!("bot: {}. {}", err, again);
            }
        }
    }

    Ok(())
}
