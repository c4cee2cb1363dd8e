//! b-tools - small command-line utilities
//!
//! Two independent tools share this library:
//! - conda environment export ([`conda`])
//! - image to ASCII art conversion ([`Backend`], [`process_image`])
//!
//! # Example
//! ```no_run
//! use b_tools::{AsciiConfig, Backend};
//! use std::path::Path;
//!
//! let config = AsciiConfig::default();
//! let art = Backend::Native.render(Path::new("photo.jpg"), &config).unwrap();
//! print!("{art}");
//! ```

pub mod ascii;
pub mod backends;
pub mod common;
pub mod conda;
pub mod config;
pub mod edges;
pub mod error;
pub mod filters;
pub mod loader;
pub mod lut;
pub mod processor;

// Re-export main types for convenience
pub use backends::Backend;
pub use config::{AsciiConfig, Geometry};
pub use error::{Error, Result};
pub use processor::{convert_file, process_image};
