//! Application orchestration.
//!
//! Converts the parsed command line into [`render::ViewerOptions`], starts
//! the shader watcher when an override file was given, and hands control
//! to the render loop. The watcher is optional: if it cannot be started
//! the viewer still runs, just without hot reload.

use anyhow::Result;

use crate::config::Args;
use crate::watcher;

pub fn run(args: &Args) -> Result<()> {
    tracing_subscriber::fmt::init();

    let options = args.viewer_options()?;
    tracing::info!(
        width = options.width,
        height = options.height,
        quality = options.quality.label(),
        "starting viewer"
    );

    let mut reload_rx = None;
    let _shader_watcher = match &options.shader_override {
        Some(path) => match watcher::start(path) {
            Ok((watcher_instance, rx)) => {
                reload_rx = Some(rx);
                Some(watcher_instance)
            }
            Err(e) => {
                tracing::error!("failed to start shader watcher: {e:?}");
                None
            }
        },
        None => None,
    };

    render::run(options, reload_rx)
}
