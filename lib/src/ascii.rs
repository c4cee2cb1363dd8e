use crate::config::{AsciiConfig, CELL_HEIGHT, CELL_WIDTH};
use crate::edges::EdgeDirection;
use crate::lut::{get_edge_char, get_fill_char};
use image::GrayImage;
use rayon::prelude::*;

/// Select the character for one cell
///
/// Edges win over fill when edge drawing is enabled.
///
/// # Arguments
/// * `edge_dir` - Edge direction voted for this cell
/// * `luminance` - Average luminance for this cell [0.0, 1.0]
/// * `palette` - Fill characters, darkest first
/// * `config` - Configuration settings
pub fn select_ascii_char(
    edge_dir: EdgeDirection,
    luminance: f32,
    palette: &[char],
    config: &AsciiConfig,
) -> char {
    let edge = if config.draw_edges {
        get_edge_char(edge_dir)
    } else {
        None
    };

    edge.unwrap_or_else(|| get_fill_char(luminance, palette, config.ncolors))
}

/// Downscale luminance to one average value per character cell
///
/// # Arguments
/// * `lum` - Luminance image of exactly `cols * CELL_WIDTH` x `rows * CELL_HEIGHT`
///
/// # Returns
/// Average luminance per cell in [0.0, 1.0], row-major
///
/// # Panics
/// If the image dimensions are not a whole number of cells
pub fn downscale_to_cells(lum: &GrayImage) -> Vec<f32> {
    let (width, height) = lum.dimensions();
    assert!(
        width % CELL_WIDTH == 0 && height % CELL_HEIGHT == 0,
        "Dimensions must be whole cells"
    );

    let cols = width / CELL_WIDTH;
    let rows = height / CELL_HEIGHT;
    let area = (CELL_WIDTH * CELL_HEIGHT) as f32;

    (0..(cols * rows) as usize)
        .into_par_iter()
        .map(|cell_idx| {
            let cell_x = (cell_idx as u32) % cols;
            let cell_y = (cell_idx as u32) / cols;
            let mut sum = 0.0;

            for local_y in 0..CELL_HEIGHT {
                for local_x in 0..CELL_WIDTH {
                    let px = cell_x * CELL_WIDTH + local_x;
                    let py = cell_y * CELL_HEIGHT + local_y;
                    sum += lum.get_pixel(px, py)[0] as f32 / 255.0;
                }
            }

            sum / area
        })
        .collect()
}

/// Invert per-cell luminance in place
pub fn negate_cells(cell_lum: &mut [f32]) {
    for lum in cell_lum {
        *lum = 1.0 - *lum;
    }
}

/// Select characters for all cells and join them into text
///
/// # Arguments
/// * `edges` - Edge direction per cell (ignored unless `config.draw_edges`)
/// * `cell_lum` - Average luminance per cell
/// * `cols` - Number of cells horizontally
/// * `config` - Configuration settings
///
/// # Returns
/// One line per row of cells, each exactly `cols` characters, with a trailing newline
///
/// # Panics
/// If `edges` and `cell_lum` differ in length
pub fn render_text(
    edges: &[EdgeDirection],
    cell_lum: &[f32],
    cols: u32,
    config: &AsciiConfig,
) -> String {
    assert_eq!(edges.len(), cell_lum.len());
    let palette = config.palette_chars();
    let cols = cols.max(1) as usize;

    let lines: Vec<String> = cell_lum
        .par_chunks(cols)
        .zip(edges.par_chunks(cols))
        .map(|(lum_row, edge_row)| {
            lum_row
                .iter()
                .zip(edge_row)
                .map(|(&lum, &edge)| select_ascii_char(edge, lum, &palette, config))
                .collect::<String>()
        })
        .collect();

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
