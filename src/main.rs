//! Bonus Ledger CLI
//!
//! Command-line interface for replaying bonus-point operations from CSV
//! files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --strategy serial operations.csv > balances.csv
//! cargo run -- --strategy concurrent --batch-size 2000 --max-concurrent 8 operations.csv > balances.csv
//! cargo run -- --max-retries 5 --base-delay-ms 50 operations.csv > balances.csv
//! ```
//!
//! The program reads operation rows from the input CSV file, replays them
//! through the ledger using the selected strategy, and writes the final
//! account balances to stdout. Set `RUST_LOG=warn` (or finer) to see
//! rejected operations.
//!
//! # Processing Strategies
//!
//! - **serial**: single-threaded replay in file order (default)
//! - **concurrent**: batched replay with per-account parallelism
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use bonus_ledger::cli;
use bonus_ledger::strategy;
use std::process;

fn main() {
    pretty_env_logger::init();

    let args = cli::parse_args();

    let config = args.to_replay_config();
    let strategy = strategy::create_strategy(args.strategy, config);

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
