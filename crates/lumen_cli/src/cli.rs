use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Progressive path tracer: renders a preset or scene file for a number of
/// accumulated frames and writes the result as an image.
#[derive(Debug, Parser)]
#[command(name = "lumen", version)]
pub struct Args {
    /// Built-in scene to render (see --list-presets)
    #[arg(short, long, default_value = "book-cover", conflicts_with = "scene")]
    pub preset: String,

    /// JSON scene file to render instead of a preset
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Number of progressive frames to accumulate
    #[arg(short, long, default_value_t = 64)]
    pub frames: u32,

    /// Override the image width; the scene's aspect ratio is kept
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Override camera samples per pixel per frame
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Override the maximum bounce count
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Seed for the per-frame seed generator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Also write the flattened BVH (9 native-endian f32 per node) here
    #[arg(long)]
    pub dump_bvh: Option<PathBuf>,

    /// Print the preset names and exit
    #[arg(long)]
    pub list_presets: bool,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_overrides_parse() {
        let args = Args::try_parse_from([
            "lumen",
            "--preset",
            "cornell-box",
            "--frames",
            "8",
            "--width",
            "120",
            "--max-depth",
            "4",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.preset, "cornell-box");
        assert_eq!(args.frames, 8);
        assert_eq!(args.width, Some(120));
        assert_eq!(args.max_depth, Some(4));
        assert!(args.samples.is_none());
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_scene_conflicts_with_preset() {
        assert!(Args::try_parse_from(["lumen", "--preset", "glass", "--scene", "room.json"]).is_err());
        assert!(Args::try_parse_from(["lumen", "--scene", "room.json"]).is_ok());
    }
}
