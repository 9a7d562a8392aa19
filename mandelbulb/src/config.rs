//! Command line arguments and their conversion into viewer options.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use render::{Quality, ViewerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "mandelbulb",
    version,
    about = "Interactive Mandelbulb raymarching viewer"
)]
pub struct Args {
    /// Initial window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Base fractal power exponent
    #[arg(long, default_value_t = 8.0)]
    pub power: f32,

    /// Raymarching quality tier
    #[arg(long, value_enum, default_value = "low")]
    pub quality: QualityArg,

    /// Start with the fractal power oscillating over time
    #[arg(long)]
    pub animated: bool,

    /// First palette colour as an RRGGBB hex string
    #[arg(long, default_value = "ffffff")]
    pub colour_a: String,

    /// Second palette colour as an RRGGBB hex string
    #[arg(long, default_value = "ffffff")]
    pub colour_b: String,

    /// WGSL file replacing the built-in shader, watched for changes
    #[arg(long)]
    pub shader: Option<PathBuf>,

    /// Directory screenshots are written to
    #[arg(long, default_value = ".")]
    pub screenshot_dir: PathBuf,
}

/// CLI-facing mirror of [`render::Quality`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    Low,
    Medium,
    High,
}

impl From<QualityArg> for Quality {
    fn from(value: QualityArg) -> Self {
        match value {
            QualityArg::Low => Quality::Low,
            QualityArg::Medium => Quality::Medium,
            QualityArg::High => Quality::High,
        }
    }
}

/// Parse an `RRGGBB` hex string (with or without a leading `#`) into
/// normalized rgb.
pub fn parse_colour(input: &str) -> Result<[f32; 3]> {
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 {
        bail!("colour must be a 6 digit hex string, got {input:?}");
    }
    let value = u32::from_str_radix(hex, 16)
        .with_context(|| format!("colour {input:?} is not valid hex"))?;
    Ok([
        ((value >> 16) & 0xff) as f32 / 255.0,
        ((value >> 8) & 0xff) as f32 / 255.0,
        (value & 0xff) as f32 / 255.0,
    ])
}

impl Args {
    pub fn viewer_options(&self) -> Result<ViewerOptions> {
        Ok(ViewerOptions {
            width: self.width,
            height: self.height,
            power: self.power,
            quality: self.quality.into(),
            animated: self.animated,
            colour_a: parse_colour(&self.colour_a)?,
            colour_b: parse_colour(&self.colour_b)?,
            shader_override: self.shader.clone(),
            screenshot_dir: self.screenshot_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_prefixed_hex() {
        assert_eq!(parse_colour("ffffff").unwrap(), [1.0, 1.0, 1.0]);
        assert_eq!(parse_colour("#000000").unwrap(), [0.0, 0.0, 0.0]);
        let [r, g, b] = parse_colour("FF8000").unwrap();
        assert!((r - 1.0).abs() < 1e-6);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert!(b.abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_colours() {
        assert!(parse_colour("fff").is_err());
        assert!(parse_colour("zzzzzz").is_err());
        assert!(parse_colour("#12345").is_err());
        assert!(parse_colour("").is_err());
    }

    #[test]
    fn defaults_build_valid_options() {
        let args = Args::try_parse_from(["mandelbulb"]).unwrap();
        let options = args.viewer_options().unwrap();
        assert_eq!(options.width, 1280);
        assert_eq!(options.height, 720);
        assert_eq!(options.power, 8.0);
        assert_eq!(options.quality, Quality::Low);
        assert!(!options.animated);
        assert_eq!(options.colour_a, [1.0, 1.0, 1.0]);
        assert!(options.shader_override.is_none());
    }

    #[test]
    fn cli_flags_reach_the_options() {
        let args = Args::try_parse_from([
            "mandelbulb",
            "--width",
            "640",
            "--height",
            "480",
            "--power",
            "6.5",
            "--quality",
            "high",
            "--animated",
            "--colour-a",
            "ff0000",
            "--colour-b",
            "0000ff",
        ])
        .unwrap();
        let options = args.viewer_options().unwrap();
        assert_eq!(options.width, 640);
        assert_eq!(options.height, 480);
        assert_eq!(options.power, 6.5);
        assert_eq!(options.quality, Quality::High);
        assert!(options.animated);
        assert_eq!(options.colour_a, [1.0, 0.0, 0.0]);
        assert_eq!(options.colour_b, [0.0, 0.0, 1.0]);
    }
}
