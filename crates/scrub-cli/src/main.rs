use scrub_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; a missing state dir is not fatal.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    let cli = Cli::parse_or_exit();
    if let Err(err) = cli::run(cli).await {
        eprintln!("m3u-scrub error: {:#}", err);
        std::process::exit(1);
    }
}
