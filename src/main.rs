use std::env;
use std::error::Error;
use std::fs;
use std::process::ExitCode;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use fluxbuilder::{BuilderConfig, QueryBuilder, QueryBuilderState};

const USAGE: &str = "usage: fluxbuilder <state.json> [config.json]";

fn main() -> ExitCode {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    match run(env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Assembles the query of a saved builder snapshot and prints it to stdout
fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let state_path = args.first().ok_or(USAGE)?;
    let config = match args.get(1) {
        Some(path) => BuilderConfig::from_json_file(path)?,
        None => BuilderConfig::default(),
    };

    let state: QueryBuilderState = serde_json::from_str(&fs::read_to_string(state_path)?)?;
    info!(
        "Loaded builder snapshot with {} tag card(s) from {}",
        state.tags.len(),
        state_path
    );

    let builder = QueryBuilder::from_state(state, config);
    let query = builder.build_query();
    if query.is_empty() {
        return Err("snapshot has no selected bucket".into());
    }

    println!("{}", query);
    Ok(())
}
