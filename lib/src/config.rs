use crate::error::{Error, Result};
use crate::lut::DEFAULT_PALETTE;
use std::fmt;
use std::str::FromStr;

/// Width of one character cell in resampled pixels
pub const CELL_WIDTH: u32 = 4;
/// Height of one character cell in resampled pixels
pub const CELL_HEIGHT: u32 = 8;
/// Largest character grid the native backend renders
pub const MAX_CELLS: u64 = 1_000_000;

/// Upper bound on the output grid, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Height used when only a width was given
    pub const UNBOUNDED: u32 = u32::MAX;

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_height_bounded(&self) -> bool {
        self.height != Self::UNBOUNDED
    }

    /// Largest grid inside this bound that keeps the image aspect ratio
    ///
    /// # Arguments
    /// * `image_width` - Source width in pixels
    /// * `image_height` - Source height in pixels
    /// * `char_aspect` - Width of a character cell divided by its height
    ///
    /// # Returns
    /// `(cols, rows)`, never smaller than 1x1
    pub fn fit(&self, image_width: u32, image_height: u32, char_aspect: f32) -> (u32, u32) {
        let iw = image_width.max(1) as f64;
        let ih = image_height.max(1) as f64;
        let aspect = char_aspect as f64;

        // Columns we could afford if height were the limiting side
        let cols_for_height = (self.height as f64 * iw / (ih * aspect)).floor();
        let cols = (self.width as f64).min(cols_for_height).max(1.0);
        let rows = (cols * ih * aspect / iw).round().clamp(1.0, self.height as f64);

        (cols as u32, rows as u32)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl FromStr for Geometry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidGeometry(s.to_string());
        let trimmed = s.trim();

        let (width, height) = match trimmed.split_once(['x', 'X']) {
            Some((w, h)) => (w.parse::<u32>(), h.parse::<u32>()),
            None => (trimmed.parse::<u32>(), Ok(Self::UNBOUNDED)),
        };

        match (width, height) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Self::new(w, h)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_height_bounded() {
            write!(f, "{}x{}", self.width, self.height)
        } else {
            write!(f, "{}", self.width)
        }
    }
}

/// Configuration for image to ASCII conversion
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Output size
    pub geometry: Geometry,  // default 80x24
    pub char_aspect: f32,    // cell width / height, default 0.5

    /// Tone mapping
    pub negate: bool,        // default false
    pub ncolors: usize,      // 2..=palette length, default 2
    pub palette: String,     // darkest to brightest

    /// Edge detection
    pub draw_edges: bool,    // default false
    pub sigma: f32,          // default 1.0
    pub sigma_scale: f32,    // DoG second sigma scale, default 1.6
    pub tau: f32,            // DoG threshold multiplier, default 1.0
    pub threshold: f32,      // DoG threshold, default 0.005
    pub edge_threshold: u32, // votes needed for an edge in a cell, default 8
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            char_aspect: 0.5,

            negate: false,
            ncolors: 2,
            palette: DEFAULT_PALETTE.to_string(),

            draw_edges: false,
            sigma: 1.0,
            sigma_scale: 1.6,
            tau: 1.0,
            threshold: 0.005,
            edge_threshold: 8,
        }
    }
}

impl AsciiConfig {
    /// Palette as a vector of characters, darkest first
    pub fn palette_chars(&self) -> Vec<char> {
        self.palette.chars().collect()
    }

    /// Validates the configuration parameters
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] naming the first out-of-range parameter
    pub fn validate(&self) -> Result<()> {
        let palette_len = self.palette.chars().count();
        if palette_len < 2 {
            return Err(Error::InvalidConfig(format!(
                "palette needs at least 2 characters, got {palette_len}"
            )));
        }
        if self.ncolors < 2 || self.ncolors > palette_len {
            return Err(Error::InvalidConfig(format!(
                "ncolors must be between 2 and {palette_len}, got {}",
                self.ncolors
            )));
        }
        if !(self.char_aspect > 0.0 && self.char_aspect <= 4.0) {
            return Err(Error::InvalidConfig(format!(
                "char_aspect must be in (0.0, 4.0], got {}",
                self.char_aspect
            )));
        }
        if !(self.sigma > 0.0 && self.sigma <= 5.0) {
            return Err(Error::InvalidConfig(format!(
                "sigma must be in (0.0, 5.0], got {}",
                self.sigma
            )));
        }
        if !(self.sigma_scale > 0.0 && self.sigma_scale <= 5.0) {
            return Err(Error::InvalidConfig(format!(
                "sigma_scale must be in (0.0, 5.0], got {}",
                self.sigma_scale
            )));
        }
        if !(0.0..=1.1).contains(&self.tau) {
            return Err(Error::InvalidConfig(format!(
                "tau must be between 0.0 and 1.1, got {}",
                self.tau
            )));
        }
        if !(0.001..=0.1).contains(&self.threshold) {
            return Err(Error::InvalidConfig(format!(
                "threshold must be between 0.001 and 0.1, got {}",
                self.threshold
            )));
        }
        if self.edge_threshold > CELL_WIDTH * CELL_HEIGHT {
            return Err(Error::InvalidConfig(format!(
                "edge_threshold must be <= {}, got {}",
                CELL_WIDTH * CELL_HEIGHT,
                self.edge_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AsciiConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_ncolors() {
        let mut config = AsciiConfig::default();
        config.ncolors = 1;
        assert!(config.validate().is_err());

        config.ncolors = 11;
        assert!(config.validate().is_err());

        config.ncolors = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_palette() {
        let config = AsciiConfig {
            palette: "#".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_sigma() {
        let mut config = AsciiConfig::default();
        config.sigma = 0.0;
        assert!(config.validate().is_err());

        config.sigma = 6.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_edge_threshold() {
        let config = AsciiConfig {
            edge_threshold: 33,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_geometry() {
        assert_eq!("80x24".parse::<Geometry>().unwrap(), Geometry::new(80, 24));
        assert_eq!("120X40".parse::<Geometry>().unwrap(), Geometry::new(120, 40));
        assert_eq!(
            "100".parse::<Geometry>().unwrap(),
            Geometry::new(100, Geometry::UNBOUNDED)
        );
    }

    #[test]
    fn test_parse_geometry_rejects_garbage() {
        for bad in ["", "x", "0x10", "10x0", "ax3", "10x", "-5x5", "10x10x10"] {
            assert!(bad.parse::<Geometry>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_geometry_display_round_trips() {
        assert_eq!(Geometry::new(80, 24).to_string(), "80x24");
        assert_eq!(Geometry::new(64, Geometry::UNBOUNDED).to_string(), "64");
    }

    #[test]
    fn test_fit_square_image_is_height_limited() {
        // Square image, cells twice as tall as wide: 24 rows allow 48 columns
        let (cols, rows) = Geometry::new(80, 24).fit(100, 100, 0.5);
        assert_eq!((cols, rows), (48, 24));
    }

    #[test]
    fn test_fit_wide_image_is_width_limited() {
        let (cols, rows) = Geometry::new(80, 24).fit(200, 50, 0.5);
        assert_eq!((cols, rows), (80, 10));
    }

    #[test]
    fn test_fit_unbounded_height() {
        let (cols, rows) = Geometry::new(40, Geometry::UNBOUNDED).fit(100, 200, 0.5);
        assert_eq!((cols, rows), (40, 40));
    }

    #[test]
    fn test_fit_never_empty() {
        let (cols, rows) = Geometry::new(80, 24).fit(10_000, 1, 0.5);
        assert!(cols >= 1 && rows >= 1);
        let (cols, rows) = Geometry::new(80, 24).fit(1, 10_000, 0.5);
        assert!(cols >= 1 && rows >= 1);
    }
}
