//! # Mandelbulb Viewer
//!
//! Entry point for the viewer binary.
//!
//! Opens a window and renders a Mandelbulb fractal by raymarching a
//! distance field in a fullscreen-quad fragment shader. The camera flies
//! freely with WASD and mouse look (hold the left button); number keys
//! pick the quality tier, `T` toggles power animation, `C` cycles the
//! colour palette, `R` resets the camera and `F2` writes a screenshot.
//! Pass `--shader` to replace the built-in WGSL and have edits to the
//! file hot-reloaded while the viewer runs.

mod app;
mod config;
mod watcher;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    app::run(&args)
}
