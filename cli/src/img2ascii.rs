//! `img2ascii`: converts an image to ASCII art

use crate::print_output;
use b_tools::{AsciiConfig, Backend, Error, Geometry, Result};
use clap::Parser;
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "img2ascii")]
#[command(version, about = "Converts an image to ASCII art")]
pub struct Img2AsciiArgs {
    /// Path to input image file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to output file. If unspecified, uses stdout.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Backend to use for creating the ASCII art (native, imagemagick, jp2a)
    #[arg(long, default_value = "native")]
    pub backend: Backend,

    /// Width and height (in terms of characters) for the output
    #[arg(long, default_value = "80x24")]
    pub geometry: Geometry,

    /// Take the negative of the image before converting
    #[arg(long)]
    pub negate: bool,

    /// The number of colors (brightness levels) to use
    #[arg(long, default_value_t = 2)]
    pub ncolors: usize,

    /// Characters to draw with, darkest first (native backend)
    #[arg(long)]
    pub palette: Option<String>,

    /// Draw edge characters along detected outlines (native backend)
    #[arg(long)]
    pub edges: bool,

    /// Turn on debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Turn off logging except for reporting errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Img2AsciiArgs {
    pub const fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Info
        }
    }

    /// Build the rendering configuration from the flags
    pub fn config(&self) -> AsciiConfig {
        let mut config = AsciiConfig {
            geometry: self.geometry,
            negate: self.negate,
            ncolors: self.ncolors,
            draw_edges: self.edges,
            ..Default::default()
        };
        if let Some(palette) = &self.palette {
            config.palette.clone_from(palette);
        }
        config
    }
}

/// Convert the input and write the result
///
/// # Errors
/// Any input, configuration, backend or output error
pub fn run(args: &Img2AsciiArgs) -> Result<()> {
    log::debug!("args: {args:?}");

    if args.backend != Backend::Native && (args.palette.is_some() || args.edges) {
        log::warn!("--palette and --edges only apply to the native backend");
    }

    let config = args.config();
    let art = args.backend.render(&args.input, &config)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &art).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            log::info!("Wrote {}", path.display());
            Ok(())
        }
        None => print_output(&art),
    }
}
