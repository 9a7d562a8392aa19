//! # Shader Hot-Reloading
//!
//! Watches the WGSL override file passed on the command line and reports
//! changes to the render loop, which rebuilds the pipeline in place. The
//! watcher runs on the thread the [`notify`](https://crates.io/crates/notify)
//! crate owns, so detection never blocks a frame; paths travel over an
//! `mpsc` channel drained once per frame.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tracing::{error, info};

/// Start watching the directory containing `shader_path`.
///
/// Returns the watcher, which must be kept alive for events to keep
/// flowing, and the receiving end of the reload channel. Each message is
/// the path of the shader to re-read.
///
/// # Errors
///
/// Fails when the shader file does not exist or the underlying file
/// watcher cannot be created.
pub fn start(shader_path: &Path) -> Result<(RecommendedWatcher, Receiver<PathBuf>)> {
    let shader_path = shader_path
        .canonicalize()
        .with_context(|| format!("shader override {} not found", shader_path.display()))?;
    let watch_dir = shader_path
        .parent()
        .context("shader override has no parent directory")?
        .to_path_buf();

    let (tx, rx) = channel();
    let target = shader_path.clone();
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        handle_file_event(result, &target, &tx);
    })
    .context("failed to create file watcher")?;

    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", watch_dir.display()))?;

    info!("shader watcher active on {}", shader_path.display());
    Ok((watcher, rx))
}

/// Forward modification events for the watched shader onto the channel.
fn handle_file_event(result: notify::Result<Event>, target: &Path, tx: &Sender<PathBuf>) {
    let event = match result {
        Ok(event) => event,
        Err(e) => {
            error!("file watcher error: {e:?}");
            return;
        }
    };

    if !event.kind.is_modify() && !event.kind.is_create() {
        return;
    }

    for path in &event.paths {
        // Editors often save by replacing the file, so match on the name
        // rather than the full reported path.
        if path.file_name() == target.file_name() {
            let _ = tx.send(target.to_path_buf());
            return;
        }
    }
}
