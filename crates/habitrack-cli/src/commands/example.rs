use clap::Subcommand;
use habitrack_core::{Clock, Database, ExampleData, SystemClock};

#[derive(Subcommand)]
pub enum ExampleAction {
    /// Insert the demo habits
    Activate,
    /// Remove the demo habits
    Deactivate,
}

pub fn run(action: ExampleAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let examples = ExampleData::new(SystemClock.now());

    match action {
        ExampleAction::Activate => {
            let inserted = examples.activate(&db)?;
            println!("Example data activated ({inserted} habits added).");
        }
        ExampleAction::Deactivate => {
            let deleted = examples.deactivate(&db)?;
            println!("Example data deactivated ({deleted} habits removed).");
        }
    }
    Ok(())
}
