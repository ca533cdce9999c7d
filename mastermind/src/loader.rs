//! Reads the mastermind file and keeps the active snapshot fresh.
//!
//! The file is JSON lines. Each line is either a publisher record
//! `{"type":"pub","pid":..,"aid":..}` or a directive
//! `{"type":"dir","aid":..,"vid":..,"fractions":[..]}`. Lines that fail to parse
//! or carry empty identifiers are skipped and counted.

use crate::Mastermind;
use crate::metrics_defs::{MASTERMIND_INVALID_RECORD, MASTERMIND_LOAD_FAIL, MASTERMIND_LOAD_SUCCESS};
use crate::types::{Directive, Fraction, Snapshot};
use serde::Deserialize;
use shared::counter;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("mastermind file contains no publishers")]
    NoPublishers,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Record {
    #[serde(rename = "pub")]
    Publisher { pid: String, aid: String },
    #[serde(rename = "dir")]
    Directive {
        aid: String,
        vid: String,
        fractions: Vec<Fraction>,
    },
}

/// Outcome of a parse, reported alongside the snapshot.
#[derive(Debug, Default, PartialEq)]
pub struct ParseSummary {
    pub publishers: usize,
    pub directives: usize,
    pub skipped: usize,
}

pub fn parse_snapshot<R: BufRead>(reader: R) -> Result<(Snapshot, ParseSummary), LoadError> {
    let mut snapshot = Snapshot::default();
    let mut summary = ParseSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<Record>(line) {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(line = index + 1, error = %err, "Skipping unparsable mastermind line");
                counter!(MASTERMIND_INVALID_RECORD, "kind" => "parse").increment(1);
                summary.skipped += 1;
                continue;
            }
        };

        match record {
            Record::Publisher { pid, aid } => {
                if pid.is_empty() || aid.is_empty() {
                    counter!(MASTERMIND_INVALID_RECORD, "kind" => "publisher").increment(1);
                    summary.skipped += 1;
                    continue;
                }
                snapshot.insert_publisher(pid, aid);
                summary.publishers += 1;
            }
            Record::Directive { aid, vid, fractions } => {
                if aid.is_empty() || vid.is_empty() || fractions.is_empty() {
                    counter!(MASTERMIND_INVALID_RECORD, "kind" => "directive").increment(1);
                    summary.skipped += 1;
                    continue;
                }
                snapshot.insert_directive(aid, vid, Directive { fractions });
                summary.directives += 1;
            }
        }
    }

    if summary.publishers == 0 {
        return Err(LoadError::NoPublishers);
    }

    Ok((snapshot, summary))
}

pub async fn load_file(path: &Path) -> Result<(Snapshot, ParseSummary), LoadError> {
    let data = tokio::fs::read(path).await?;
    parse_snapshot(data.as_slice())
}

#[derive(Debug)]
pub enum Command {
    // Reload the file outside of the normal interval.
    // The worker sends the outcome once the attempt finishes.
    Refresh(oneshot::Sender<Result<(), LoadError>>),
    // Stop the worker
    Shutdown,
}

/// Periodically reloads the mastermind file into a `Mastermind` handle.
pub struct Loader {
    mastermind: Mastermind,
    path: PathBuf,
    interval: Duration,
}

impl Loader {
    pub fn new(mastermind: Mastermind, path: impl Into<PathBuf>, interval: Duration) -> Self {
        Loader {
            mastermind,
            path: path.into(),
            interval,
        }
    }

    /// Loads the file and installs it. On failure the active snapshot is kept.
    pub async fn reload(&self) -> Result<(), LoadError> {
        match load_file(&self.path).await {
            Ok((snapshot, summary)) => {
                tracing::info!(
                    path = %self.path.display(),
                    publishers = summary.publishers,
                    directives = summary.directives,
                    skipped = summary.skipped,
                    "Installed mastermind snapshot"
                );
                self.mastermind.install(snapshot);
                counter!(MASTERMIND_LOAD_SUCCESS).increment(1);
                Ok(())
            }
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "Failed to load mastermind file");
                counter!(MASTERMIND_LOAD_FAIL).increment(1);
                Err(err)
            }
        }
    }

    /// Loads once immediately, then on every interval tick or Refresh command,
    /// until Shutdown is received or the command channel closes.
    pub async fn run(self, mut rx: mpsc::Receiver<Command>) {
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let _ = self.reload().await;
                }
                cmd = rx.recv() => match cmd {
                    Some(Command::Refresh(reply)) => {
                        let _ = reply.send(self.reload().await);
                    }
                    Some(Command::Shutdown) | None => {
                        tracing::info!("Mastermind loader stopped");
                        return;
                    }
                },
            }
        }
    }
}
