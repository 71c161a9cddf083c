//! Ctrl-C handling: the first interrupt kills the run.

use anyhow::{Context, Result};
use atmo_core::ShutdownHandle;

/// Maps SIGINT onto `request_kill` for the given run.
pub fn install(handle: ShutdownHandle) -> Result<()> {
    ctrlc::set_handler(move || {
        if !handle.kill_requested() {
            eprintln!("interrupted; cancelling remaining downloads");
        }
        handle.request_kill();
    })
    .context("install Ctrl-C handler")
}
