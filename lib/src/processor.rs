use crate::ascii::{downscale_to_cells, negate_cells, render_text};
use crate::config::{AsciiConfig, CELL_HEIGHT, CELL_WIDTH, MAX_CELLS};
use crate::edges::{EdgeDirection, detect_edges_per_cell};
use crate::error::{Error, Result};
use crate::filters::{calculate_luminance, difference_of_gaussians, resample, sobel_filter};
use crate::loader::load_image;
use image::RgbaImage;
use std::path::Path;

/// Converts an image to ASCII art
///
/// Pipeline:
/// 1. Extract luminance from the color image
/// 2. Fit the character grid to the geometry and resample to whole cells
/// 3. Average luminance per cell
/// 4. Optionally negate the cell averages
/// 5. Optionally detect edges on the un-negated image (DoG, Sobel, voting)
/// 6. Select one character per cell and join rows
///
/// # Errors
/// Returns [`crate::Error::InvalidConfig`] if the configuration is out of
/// range or the fitted grid has more than [`MAX_CELLS`] characters
pub fn process_image(input: &RgbaImage, config: &AsciiConfig) -> Result<String> {
    config.validate()?;

    let (width, height) = input.dimensions();
    let (cols, rows) = config.geometry.fit(width, height, config.char_aspect);
    log::debug!("Fitting {width}x{height} image into {cols}x{rows} characters");
    if u64::from(cols) * u64::from(rows) > MAX_CELLS {
        return Err(Error::InvalidConfig(format!(
            "{cols}x{rows} characters exceeds the limit of {MAX_CELLS}"
        )));
    }

    let lum = calculate_luminance(input);
    let working = resample(&lum, cols * CELL_WIDTH, rows * CELL_HEIGHT);

    let mut cell_lum = downscale_to_cells(&working);
    if config.negate {
        negate_cells(&mut cell_lum);
    }

    let edges = if config.draw_edges {
        let sigma2 = config.sigma * config.sigma_scale;
        let dog = difference_of_gaussians(
            &working,
            config.sigma,
            sigma2,
            config.tau,
            config.threshold,
        );
        let (angles, valid_mask) = sobel_filter(&dog);
        detect_edges_per_cell(&angles, &valid_mask, cols, rows, config.edge_threshold)
    } else {
        vec![EdgeDirection::None; cell_lum.len()]
    };

    Ok(render_text(&edges, &cell_lum, cols, config))
}

/// Load an image file and convert it to ASCII art
pub fn convert_file(path: &Path, config: &AsciiConfig) -> Result<String> {
    let image = load_image(path)?;
    process_image(&image.to_rgba8(), config)
}
