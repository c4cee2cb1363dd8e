use image::{GrayImage, Luma, RgbaImage, imageops};
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Gradient magnitude below which a pixel carries no edge
const MIN_GRADIENT: f32 = 0.01;

/// Calculate luminance from an RGBA image
///
/// Formula: L = 0.2127*R + 0.7152*G + 0.0722*B, scaled by alpha so
/// transparent regions read as black.
pub fn calculate_luminance(img: &RgbaImage) -> GrayImage {
    let (width, height) = img.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let pixel = img.get_pixel(x, y);
        let r = pixel[0] as f32 / 255.0;
        let g = pixel[1] as f32 / 255.0;
        let b = pixel[2] as f32 / 255.0;
        let a = pixel[3] as f32 / 255.0;

        let luminance = (0.2127 * r + 0.7152 * g + 0.0722 * b) * a;
        Luma([(luminance.clamp(0.0, 1.0) * 255.0).round() as u8])
    })
}

/// Resample a luminance image to exactly `width` x `height`
///
/// Triangle filtering averages over the source footprint when shrinking,
/// which keeps thin features visible without Lanczos ringing on hard edges.
pub fn resample(lum: &GrayImage, width: u32, height: u32) -> GrayImage {
    if lum.dimensions() == (width, height) {
        return lum.clone();
    }
    imageops::resize(lum, width, height, imageops::FilterType::Triangle)
}

/// Compute Difference of Gaussians (DoG) edge detection
///
/// DoG = blur(sigma1) - tau * blur(sigma2)
/// Then threshold: result >= threshold ? 255 : 0
///
/// # Arguments
/// * `img` - Input grayscale image
/// * `sigma1` - First Gaussian sigma (typically smaller), must be > 0
/// * `sigma2` - Second Gaussian sigma (typically larger), must be > 0
/// * `tau` - Multiplier for second blur
/// * `threshold` - Binary threshold value
///
/// # Returns
/// Binary edge image (0 or 255)
pub fn difference_of_gaussians(
    img: &GrayImage,
    sigma1: f32,
    sigma2: f32,
    tau: f32,
    threshold: f32,
) -> GrayImage {
    let blur1 = gaussian_blur_f32(img, sigma1);
    let blur2 = gaussian_blur_f32(img, sigma2);

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let g1 = blur1.get_pixel(x, y)[0] as f32 / 255.0;
        let g2 = blur2.get_pixel(x, y)[0] as f32 / 255.0;
        let dog = g1 - tau * g2;

        Luma([if dog >= threshold { 255 } else { 0 }])
    })
}

/// Sobel gradients of a binary edge image
///
/// # Returns
/// A tuple of (angles, valid_mask) in row-major order where:
/// - angles: edge angles in radians (atan2(Gy, Gx))
/// - valid_mask: whether the gradient at that pixel is significant
pub fn sobel_filter(edges: &GrayImage) -> (Vec<f32>, Vec<bool>) {
    let gx = horizontal_sobel(edges);
    let gy = vertical_sobel(edges);

    gx.pixels()
        .zip(gy.pixels())
        .map(|(hx, vy)| {
            let x = hx[0] as f32 / 255.0;
            let y = vy[0] as f32 / 255.0;

            if (x * x + y * y).sqrt() > MIN_GRADIENT {
                (y.atan2(x), true)
            } else {
                (0.0, false)
            }
        })
        .unzip()
}
