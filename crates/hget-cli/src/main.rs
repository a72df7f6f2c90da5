use hget_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }

    if let Err(err) = Cli::run_from_args() {
        eprintln!("hget error: {:#}", err);
        std::process::exit(1);
    }
}
