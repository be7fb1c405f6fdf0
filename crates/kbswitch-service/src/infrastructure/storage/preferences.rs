//! Background writer for the persisted `last_layout` value.
//!
//! The layout service must never wait on the file system, so
//! [`LastLayoutWriter::record_last_layout`] only queues the value. A tokio
//! task drains the queue, collapses bursts to the newest value, and rewrites
//! the `last_layout` field of the config file in place (every other field is
//! re-read from disk first, so concurrent settings edits are not lost).

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::switch_layout::PreferenceStore;

use super::config::{load_config_from, save_config_to, ConfigError};

/// Queues `last_layout` updates for the background writer task.
#[derive(Debug, Clone)]
pub struct LastLayoutWriter {
    tx: mpsc::UnboundedSender<String>,
}

impl LastLayoutWriter {
    /// Spawns the writer task for the config file at `path`.
    ///
    /// Must be called from within a tokio runtime. The task ends once every
    /// clone of the returned writer has been dropped.
    pub fn spawn(path: PathBuf) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let handle = tokio::spawn(async move {
            while let Some(mut layout) = rx.recv().await {
                while let Ok(newer) = rx.try_recv() {
                    layout = newer;
                }
                let path = path.clone();
                let written = tokio::task::spawn_blocking(move || write_last_layout(&path, &layout))
                    .await;
                match written {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "failed to persist last layout"),
                    Err(e) => warn!(error = %e, "last layout writer panicked"),
                }
            }
            debug!("last layout writer stopped");
        });

        (Self { tx }, handle)
    }
}

impl PreferenceStore for LastLayoutWriter {
    fn record_last_layout(&self, layout: &str) {
        if self.tx.send(layout.to_string()).is_err() {
            warn!(layout, "last layout writer is gone; value not persisted");
        }
    }
}

fn write_last_layout(path: &std::path::Path, layout: &str) -> Result<(), ConfigError> {
    let mut config = load_config_from(path)?;
    if config.switching.last_layout == layout {
        return Ok(());
    }
    config.switching.last_layout = layout.to_string();
    save_config_to(path, &config)?;
    debug!(layout, path = %path.display(), "last layout persisted");
    Ok(())
}
