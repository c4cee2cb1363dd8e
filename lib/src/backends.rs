//! Rendering backends for image to ASCII conversion
//!
//! The native backend runs entirely in-process. The others shell out to an
//! external converter and post-process its text output.

use crate::common::{find_executable, run_captured};
use crate::config::AsciiConfig;
use crate::error::{Error, Result};
use crate::loader::sniff_format;
use crate::processor::convert_file;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// How long an external converter may run
pub const EXTERNAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Which converter produces the ASCII art
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Native,
    ImageMagick,
    Jp2a,
}

impl Backend {
    pub const ALL: [Self; 3] = [Self::Native, Self::ImageMagick, Self::Jp2a];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::ImageMagick => "imagemagick",
            Self::Jp2a => "jp2a",
        }
    }

    /// Convert the image at `input` to ASCII art
    ///
    /// The input is always validated as an image file first, whichever
    /// backend does the conversion.
    ///
    /// # Errors
    /// Input validation errors, configuration errors, or failures of the
    /// external converter
    pub fn render(self, input: &Path, config: &AsciiConfig) -> Result<String> {
        config.validate()?;

        match self {
            Self::Native => convert_file(input, config),
            Self::ImageMagick => {
                sniff_format(input)?;
                render_imagemagick(input, config)
            }
            Self::Jp2a => {
                sniff_format(input)?;
                render_jp2a(input, config)
            }
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidConfig(format!("unknown backend '{s}'")))
    }
}

/// Leading arguments ImageMagick needs before a conversion
///
/// The v7 `magick` front end takes the `convert` subcommand; the legacy
/// `convert` binary takes none.
pub fn imagemagick_prefix(exe: &Path) -> Vec<OsString> {
    let is_magick = exe
        .file_stem()
        .is_some_and(|stem| stem.eq_ignore_ascii_case("magick"));

    if is_magick {
        vec![OsString::from("convert")]
    } else {
        Vec::new()
    }
}

/// Arguments for an ImageMagick conversion to XPM on stdout
pub fn imagemagick_args(input: &Path, config: &AsciiConfig) -> Vec<OsString> {
    let mut args = vec![
        input.as_os_str().to_os_string(),
        OsString::from("-geometry"),
        OsString::from(config.geometry.to_string()),
        OsString::from("-colors"),
        OsString::from(config.ncolors.to_string()),
    ];
    if config.negate {
        args.push(OsString::from("-negate"));
    }
    args.push(OsString::from("xpm:-"));
    args
}

fn render_imagemagick(input: &Path, config: &AsciiConfig) -> Result<String> {
    let exe = find_executable("ImageMagick", &["magick", "convert"])?;
    render_imagemagick_with(&exe, input, config)
}

/// Run the ImageMagick at `exe` and keep the XPM pixel rows
fn render_imagemagick_with(exe: &Path, input: &Path, config: &AsciiConfig) -> Result<String> {
    let mut args = imagemagick_prefix(exe);
    args.extend(imagemagick_args(input, config));

    let output = run_captured(exe, &args, EXTERNAL_TIMEOUT)?;
    if !output.status.success() {
        return Err(Error::CommandFailed {
            program: exe.to_path_buf(),
            status: output.status,
            stderr: output.stderr,
        });
    }

    let body = parse_xpm_body(&output.stdout);
    if body.trim().is_empty() {
        return Err(Error::EmptyOutput {
            backend: Backend::ImageMagick.name(),
        });
    }
    Ok(body)
}

/// Extract the pixel rows of an XPM document
///
/// Everything up to and including the line mentioning `pixels` is header
/// (dimensions and colormap). Each following line that starts with `"` is
/// one row of pixel keys, ending at its closing `"`. With many colors the
/// keys include `,` and `;`, so only the quote delimits a row.
pub fn parse_xpm_body(xpm: &str) -> String {
    let mut rows = Vec::new();
    let mut in_body = false;

    for line in xpm.lines() {
        let line = line.trim();
        if in_body {
            if let Some(row) = line.strip_prefix('"') {
                let end = row.rfind('"').unwrap_or(row.len());
                rows.push(&row[..end]);
            }
        } else if line.contains("pixels") {
            in_body = true;
        }
    }

    let mut text = rows.join("\n");
    text.push('\n');
    text
}

/// Arguments for a jp2a conversion
pub fn jp2a_args(input: &Path, config: &AsciiConfig) -> Vec<OsString> {
    let mut args = vec![OsString::from(format!("--width={}", config.geometry.width))];
    if config.geometry.is_height_bounded() {
        args.push(OsString::from(format!("--height={}", config.geometry.height)));
    }
    if config.negate {
        args.push(OsString::from("--invert"));
    }
    args.push(input.as_os_str().to_os_string());
    args
}

fn render_jp2a(input: &Path, config: &AsciiConfig) -> Result<String> {
    let exe = find_executable("jp2a", &["jp2a"])?;
    render_jp2a_with(&exe, input, config)
}

fn render_jp2a_with(exe: &Path, input: &Path, config: &AsciiConfig) -> Result<String> {
    let output = run_captured(exe, &jp2a_args(input, config), EXTERNAL_TIMEOUT)?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            program: exe.to_path_buf(),
            status: output.status,
            stderr: output.stderr,
        });
    }
    if output.stdout.trim().is_empty() {
        return Err(Error::EmptyOutput {
            backend: Backend::Jp2a.name(),
        });
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use crate::common::script::{exec_lock, write_script};
    use crate::config::Geometry;
    #[cfg(unix)]
    use std::fs;
    #[cfg(unix)]
    use tempfile::TempDir;

    const SAMPLE_XPM: &str = r#"/* XPM */
static char *magick[] = {
/* columns rows colors chars-per-pixel */
"4 3 2 1 ",
"  c black",
". c white",
/* pixels */
"  ..",
" .. ",
"..  "
};
"#;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_parse_xpm_body() {
        assert_eq!(parse_xpm_body(SAMPLE_XPM), "  ..\n .. \n..  \n");
    }

    #[test]
    fn test_parse_xpm_keeps_punctuation_keys() {
        let xpm = "/* pixels */\n\"ab;;\",\n\"ab,,\",\n\"ab}}\"\n};\n";
        assert_eq!(parse_xpm_body(xpm), "ab;;\nab,,\nab}}\n");
    }

    #[test]
    fn test_parse_xpm_without_pixels_marker() {
        assert_eq!(parse_xpm_body("\"4 3 2 1\",\n\"  ..\",\n"), "\n");
    }

    #[test]
    fn test_backend_names() {
        for backend in Backend::ALL {
            assert_eq!(backend.to_string().parse::<Backend>().unwrap(), backend);
        }
        assert_eq!("ImageMagick".parse::<Backend>().unwrap(), Backend::ImageMagick);
        assert!("gimp".parse::<Backend>().is_err());
    }

    #[test]
    fn test_imagemagick_args() {
        let config = AsciiConfig {
            geometry: Geometry::new(40, 12),
            ncolors: 4,
            negate: true,
            ..Default::default()
        };
        let args = strings(&imagemagick_args(Path::new("cat.webp"), &config));
        assert_eq!(
            args,
            ["cat.webp", "-geometry", "40x12", "-colors", "4", "-negate", "xpm:-"]
        );
    }

    #[test]
    fn test_jp2a_args() {
        let config = AsciiConfig {
            geometry: Geometry::new(80, Geometry::UNBOUNDED),
            ..Default::default()
        };
        let args = strings(&jp2a_args(Path::new("cat.jpg"), &config));
        assert_eq!(args, ["--width=80", "cat.jpg"]);

        let config = AsciiConfig {
            negate: true,
            ..Default::default()
        };
        let args = strings(&jp2a_args(Path::new("cat.jpg"), &config));
        assert_eq!(args, ["--width=80", "--height=24", "--invert", "cat.jpg"]);
    }

    #[test]
    fn test_external_backends_validate_input_first() {
        let err = Backend::ImageMagick
            .render(Path::new("-"), &AsciiConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::StdinUnsupported));
    }

    #[test]
    fn test_imagemagick_prefix() {
        assert_eq!(strings(&imagemagick_prefix(Path::new("/usr/bin/magick"))), ["convert"]);
        assert_eq!(strings(&imagemagick_prefix(Path::new("C:/IM/magick.exe"))), ["convert"]);
        assert!(imagemagick_prefix(Path::new("/usr/bin/convert")).is_empty());
    }

    /// A script that records its arguments next to itself, then prints `stdout`
    #[cfg(unix)]
    fn recording_script(dir: &Path, name: &str, stdout: &str) -> std::path::PathBuf {
        let body = format!(
            "#!/bin/sh\necho \"$@\" > \"$(dirname \"$0\")/args.txt\"\ncat <<'OUT'\n{stdout}OUT\n"
        );
        write_script(dir, name, &body)
    }

    #[cfg(unix)]
    fn recorded_args(dir: &Path) -> String {
        fs::read_to_string(dir.join("args.txt")).unwrap().trim_end().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn test_magick_gets_convert_subcommand() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let exe = recording_script(dir.path(), "magick", SAMPLE_XPM);

        let art = render_imagemagick_with(&exe, Path::new("cat.png"), &AsciiConfig::default())
            .unwrap();
        assert_eq!(art, "  ..\n .. \n..  \n");
        assert_eq!(
            recorded_args(dir.path()),
            "convert cat.png -geometry 80x24 -colors 2 xpm:-"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_legacy_convert_runs_without_subcommand() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let exe = recording_script(dir.path(), "convert", SAMPLE_XPM);
        let config = AsciiConfig {
            negate: true,
            ..Default::default()
        };

        render_imagemagick_with(&exe, Path::new("cat.png"), &config).unwrap();
        assert_eq!(
            recorded_args(dir.path()),
            "cat.png -geometry 80x24 -colors 2 -negate xpm:-"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_imagemagick_many_color_keys() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let xpm = "/* XPM */\nstatic char *magick[] = {\n\"3 2 3 1 \",\n\"; c #000000\",\n\", c #808080\",\n\"  c #FFFFFF\",\n/* pixels */\n\" ,;\",\n\";, \"\n};\n";
        let exe = recording_script(dir.path(), "magick", xpm);

        let art = render_imagemagick_with(&exe, Path::new("cat.png"), &AsciiConfig::default())
            .unwrap();
        assert_eq!(art, " ,;\n;, \n");
    }

    #[cfg(unix)]
    #[test]
    fn test_imagemagick_failure_keeps_stderr() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let exe = write_script(
            dir.path(),
            "magick",
            "#!/bin/sh\necho 'no decode delegate for this image format' >&2\nexit 1\n",
        );

        let err = render_imagemagick_with(&exe, Path::new("cat.png"), &AsciiConfig::default())
            .unwrap_err();
        match err {
            Error::CommandFailed { program, status, stderr } => {
                assert_eq!(program, exe);
                assert_eq!(status.code(), Some(1));
                assert!(stderr.contains("no decode delegate"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_imagemagick_empty_output() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let exe = write_script(dir.path(), "magick", "#!/bin/sh\nexit 0\n");

        let err = render_imagemagick_with(&exe, Path::new("cat.png"), &AsciiConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyOutput { backend: "imagemagick" }));
    }

    #[cfg(unix)]
    #[test]
    fn test_jp2a_output_passes_through() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let exe = recording_script(dir.path(), "jp2a", "  @@\n@@  \n");
        let config = AsciiConfig {
            geometry: Geometry::new(4, Geometry::UNBOUNDED),
            negate: true,
            ..Default::default()
        };

        let art = render_jp2a_with(&exe, Path::new("cat.jpg"), &config).unwrap();
        assert_eq!(art, "  @@\n@@  \n");
        assert_eq!(recorded_args(dir.path()), "--width=4 --invert cat.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_jp2a_failure_and_empty_output() {
        let _guard = exec_lock();
        let dir = TempDir::new().unwrap();
        let config = AsciiConfig::default();

        let exe = write_script(dir.path(), "jp2a", "#!/bin/sh\necho 'Not a JPEG file' >&2\nexit 1\n");
        let err = render_jp2a_with(&exe, Path::new("cat.jpg"), &config).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { ref stderr, .. } if stderr.contains("Not a JPEG")));

        let exe = write_script(dir.path(), "jp2a-quiet", "#!/bin/sh\necho\n");
        let err = render_jp2a_with(&exe, Path::new("cat.jpg"), &config).unwrap_err();
        assert!(matches!(err, Error::EmptyOutput { backend: "jp2a" }));
    }
}
