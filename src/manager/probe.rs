//! On-demand status probe for a single service
//!
//! Runs `systemctl is-active <name>` and takes whichever completion signal
//! arrives first: status text on stdout, diagnostic text on stderr, or the
//! process exiting after both streams closed without data.

use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{CommandError, ServiceRegistry, Systemctl};
use crate::units::{ActiveState, ServiceEntry};

/// First completion signal of an is-active query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Text written to stdout
    Status(String),
    /// Text written to stderr
    Diagnostic(String),
    /// Exited without writing anything
    Exited(Option<i32>),
}

/// Read until the stream yields a non-blank line or closes
///
/// Bytes are collected in `pending` and decoded only once a newline (or the
/// end of the stream) arrives, so tokens and UTF-8 sequences split across
/// reads stay whole. `pending` lives with the caller: dropping the future
/// between reads loses nothing.
async fn first_text<R: AsyncRead + Unpin>(
    reader: &mut R,
    pending: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    let mut buf = [0u8; 4096];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            let text = String::from_utf8_lossy(pending).trim().to_string();
            return Ok((!text.is_empty()).then_some(text));
        }
        pending.extend_from_slice(&buf[..n]);

        if let Some(end) = pending.iter().rposition(|&b| b == b'\n') {
            let text = String::from_utf8_lossy(&pending[..end]).trim().to_string();
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
}

/// Run an is-active query and return the first completion signal
pub async fn query_is_active(systemctl: &Systemctl, name: &str) -> Result<ProbeOutcome, CommandError> {
    let mut child = systemctl.spawn_is_active(name)?;

    let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(CommandError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "child output not captured",
        )));
    };

    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();

    loop {
        tokio::select! {
            biased;

            out = first_text(&mut stdout, &mut stdout_buf), if stdout_open => match out? {
                Some(text) => return Ok(ProbeOutcome::Status(text)),
                None => stdout_open = false,
            },

            err = first_text(&mut stderr, &mut stderr_buf), if stderr_open => match err? {
                Some(text) => return Ok(ProbeOutcome::Diagnostic(text)),
                None => stderr_open = false,
            },

            status = child.wait(), if !stdout_open && !stderr_open => {
                return Ok(ProbeOutcome::Exited(status?.code()));
            }
        }
    }
}

/// Asks the OS for a service's live status and folds it into the registry
#[derive(Debug, Clone)]
pub struct StatusProber {
    registry: Arc<ServiceRegistry>,
    systemctl: Arc<Systemctl>,
}

impl StatusProber {
    pub fn new(registry: Arc<ServiceRegistry>, systemctl: Arc<Systemctl>) -> Self {
        Self { registry, systemctl }
    }

    /// Probe one service
    ///
    /// On success the registry entry is replaced with a copy carrying the new
    /// status. On failure the registry is untouched. Concurrent probes of the
    /// same service are not serialized; the last to finish wins.
    pub async fn probe(&self, entry: &ServiceEntry) -> Result<ActiveState, CommandError> {
        let outcome = query_is_active(&self.systemctl, entry.name()).await?;

        match outcome {
            ProbeOutcome::Status(text) => {
                let token = text.split_whitespace().next().unwrap_or_default();
                let active = ActiveState::from_token(token)
                    .ok_or_else(|| CommandError::UnrecognizedStatus(text.clone()))?;
                self.registry.replace_one(entry.with_status(active)).await;
                log::debug!("{} is {} ({})", entry.name(), active, token);
                Ok(active)
            }
            ProbeOutcome::Diagnostic(text) => Err(CommandError::Diagnostic(text)),
            ProbeOutcome::Exited(code) => Err(CommandError::Exited(code)),
        }
    }
}
