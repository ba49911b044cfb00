//! Logging initialization for the host binary.

use tracing::{debug, trace};

pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Diagnostics go to stderr so stdout stays free for command output.
pub fn init_logging(verbose: u8) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| log_level(verbose).to_string());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2) // Show target module for -vv and above
        .with_line_number(verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("typetrial started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}
