//! Logging initialization
//!
//! Every tracing event is written to two sinks at once: the console and the
//! append-only session log. The session log later becomes the mail body, so
//! the recipient sees exactly what the console saw.

use tracing::Level;
use upkeep_common::session_log::TeeWriter;

/// Initialize the global subscriber over the session log tee
pub fn init(writer: TeeWriter, verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(move || writer.clone())
        .init();
}
