//! Mail delivery of the maintenance report
//!
//! Hands the session transcript to the local mail submission tool. The
//! caller logs a delivery failure and moves on: a run that completed but
//! could not notify is still a completed run.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::info;

/// Send the transcript as the mail body via the local `mail` tool
pub fn send(recipient: &str, subject: &str, body: &str) -> Result<()> {
    let mut child = Command::new("mail")
        .arg("-s")
        .arg(subject)
        .arg(recipient)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawning mail")?;

    child
        .stdin
        .take()
        .context("mail stdin unavailable")?
        .write_all(body.as_bytes())
        .context("writing mail body")?;

    let status = child.wait().context("waiting for mail")?;
    if !status.success() {
        bail!("mail exited with {}", status.code().unwrap_or(-1));
    }

    info!("report mailed to {}", recipient);
    Ok(())
}
