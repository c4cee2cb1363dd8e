//! Character lookup tables
//!
//! These define the characters used for edges and luminance-based fill.

use crate::edges::EdgeDirection;

/// Fill ramp from darkest (space) to brightest (@)
pub const DEFAULT_PALETTE: &str = " .:-=+*#%@";

/// Edge characters indexed by [`EdgeDirection`] discriminant
pub const EDGE_CHARS: [char; 4] = [
    '|',  // Vertical
    '-',  // Horizontal
    '/',  // Diagonal1
    '\\', // Diagonal2
];

/// Get the character drawn for an edge direction
pub fn get_edge_char(direction: EdgeDirection) -> Option<char> {
    match direction {
        EdgeDirection::Vertical => Some(EDGE_CHARS[0]),
        EdgeDirection::Horizontal => Some(EDGE_CHARS[1]),
        EdgeDirection::Diagonal1 => Some(EDGE_CHARS[2]),
        EdgeDirection::Diagonal2 => Some(EDGE_CHARS[3]),
        EdgeDirection::None => None,
    }
}

/// Quantize a luminance value to one of `ncolors` levels
///
/// # Arguments
/// * `luminance` - Normalized luminance value [0.0, 1.0]
/// * `ncolors` - Number of levels, at least 2
///
/// # Returns
/// Level index in `0..ncolors`
pub fn quantize(luminance: f32, ncolors: usize) -> usize {
    let lum = luminance.clamp(0.0, 1.0);
    let level = (lum * ncolors as f32).floor() as usize;
    level.min(ncolors.saturating_sub(1))
}

/// Get the fill character for a luminance value
///
/// Levels are spread evenly over the palette so the first and last
/// palette characters are always reachable.
///
/// # Arguments
/// * `luminance` - Normalized luminance value [0.0, 1.0]
/// * `palette` - Characters ordered darkest to brightest
/// * `ncolors` - Number of distinct levels to use
pub fn get_fill_char(luminance: f32, palette: &[char], ncolors: usize) -> char {
    let Some(&last) = palette.last() else {
        return ' ';
    };
    if ncolors < 2 || palette.len() < 2 {
        return last;
    }

    let level = quantize(luminance, ncolors);
    let index = level * (palette.len() - 1) / (ncolors - 1);
    palette.get(index).copied().unwrap_or(last)
}
