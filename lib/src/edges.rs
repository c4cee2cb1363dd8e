use crate::config::{CELL_HEIGHT, CELL_WIDTH};
use rayon::prelude::*;
use std::f32::consts::PI;

/// Edge direction classification for character selection
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeDirection {
    None = -1,
    Vertical = 0,   // | (0° or 180°)
    Horizontal = 1, // - (90°)
    Diagonal1 = 2,  // /
    Diagonal2 = 3,  // \
}

const DIRECTIONS: [EdgeDirection; 4] = [
    EdgeDirection::Vertical,
    EdgeDirection::Horizontal,
    EdgeDirection::Diagonal1,
    EdgeDirection::Diagonal2,
];

/// Classify edge direction from a gradient angle
///
/// Angles are in radians from atan2(Gy, Gx). The gradient points across
/// the edge, so a horizontal gradient (angle 0) is a vertical edge.
pub fn classify_edge_direction(angle: f32) -> EdgeDirection {
    let abs_theta = angle.abs() / PI;

    if (0.0..0.05).contains(&abs_theta) || (0.9..=1.0).contains(&abs_theta) {
        EdgeDirection::Vertical
    } else if (0.45..0.55).contains(&abs_theta) {
        EdgeDirection::Horizontal
    } else if (0.05..0.45).contains(&abs_theta) {
        if angle > 0.0 {
            EdgeDirection::Diagonal2
        } else {
            EdgeDirection::Diagonal1
        }
    } else if (0.55..0.9).contains(&abs_theta) {
        if angle > 0.0 {
            EdgeDirection::Diagonal1
        } else {
            EdgeDirection::Diagonal2
        }
    } else {
        EdgeDirection::None
    }
}

/// Detect edges with direction voting per character cell
///
/// Each `CELL_WIDTH` x `CELL_HEIGHT` cell votes on the most common edge
/// direction among its valid pixels.
///
/// # Arguments
/// * `angles` - Edge angle for each pixel (from Sobel filter)
/// * `valid_mask` - Which pixels carry an edge
/// * `cols` - Number of cells horizontally
/// * `rows` - Number of cells vertically
/// * `edge_threshold` - Minimum votes for the winning direction
///
/// # Returns
/// One `EdgeDirection` per cell, row-major (size: cols * rows)
///
/// # Panics
/// If the slices do not cover exactly `cols * rows` cells
pub fn detect_edges_per_cell(
    angles: &[f32],
    valid_mask: &[bool],
    cols: u32,
    rows: u32,
    edge_threshold: u32,
) -> Vec<EdgeDirection> {
    let width = cols * CELL_WIDTH;
    let pixel_count = (width * rows * CELL_HEIGHT) as usize;
    assert_eq!(angles.len(), pixel_count, "angles must cover every cell");
    assert_eq!(valid_mask.len(), pixel_count, "valid_mask must cover every cell");

    (0..(cols * rows) as usize)
        .into_par_iter()
        .map(|cell_idx| {
            let cell_x = (cell_idx as u32) % cols;
            let cell_y = (cell_idx as u32) / cols;

            // [Vertical, Horizontal, Diagonal1, Diagonal2]
            let mut buckets = [0u32; 4];

            for local_y in 0..CELL_HEIGHT {
                for local_x in 0..CELL_WIDTH {
                    let px = cell_x * CELL_WIDTH + local_x;
                    let py = cell_y * CELL_HEIGHT + local_y;
                    let idx = (py * width + px) as usize;

                    if valid_mask[idx] {
                        let direction = classify_edge_direction(angles[idx]);
                        if direction != EdgeDirection::None {
                            buckets[direction as usize] += 1;
                        }
                    }
                }
            }

            // Ties go to the earlier direction
            let (winner, votes) = buckets
                .iter()
                .enumerate()
                .fold((EdgeDirection::None, 0), |best, (i, &count)| {
                    if count > best.1 { (DIRECTIONS[i], count) } else { best }
                });

            if votes < edge_threshold.max(1) {
                EdgeDirection::None
            } else {
                winner
            }
        })
        .collect()
}
