//! Command-line front ends for the b-tools library
//!
//! Each binary parses its arguments here, initialises logging and hands the
//! work to `b_tools`.

pub mod conda_tool;
pub mod img2ascii;
pub mod logging;

use std::io::Write;
use std::path::Path;

/// Write `text` to stdout
pub(crate) fn print_output(text: &str) -> b_tools::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|source| b_tools::Error::Io {
            path: Path::new("<stdout>").to_path_buf(),
            source,
        })
}
