use image::{imageops, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into_with, Interpolation};
use nalgebra::Matrix3;

use crate::annotation::AnnotationRecord;
use crate::geometry::{perspective_transform, rectangle_corners, transform_point, Quad};

/// Fill for output pixels that map outside the source image
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// An upright crop of one text region and its transcription
#[derive(Debug, Clone)]
pub struct RectifiedCrop {
    pub image: RgbImage,
    pub transcription: String,
}

impl RectifiedCrop {
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}

/// Rectify the region of one annotation record.
///
/// The transcription is carried over untouched.
pub fn rectify(image: &RgbImage, record: &AnnotationRecord, padding: i32) -> RectifiedCrop {
    RectifiedCrop {
        image: rectify_quad(image, &record.quad, padding),
        transcription: record.transcription.clone(),
    }
}

/// Pad `quad`, then warp its contents into an upright rectangle.
///
/// The output is `round(w) x round(h)` where `w` and `h` are the lengths of the
/// padded top and left edges. A side that rounds to zero gives an empty image.
pub fn rectify_quad(image: &RgbImage, quad: &Quad, padding: i32) -> RgbImage {
    let padded = quad.padded(padding);
    let (w, h) = (padded.width(), padded.height());
    let (out_width, out_height) = (w.round() as u32, h.round() as u32);

    log::debug!(
        "Rectifying {:?} -> {}x{} (w={:.2}, h={:.2})",
        padded.points,
        out_width,
        out_height,
        w,
        h
    );

    if out_width == 0 || out_height == 0 {
        return RgbImage::new(out_width, out_height);
    }

    // Solved output -> source, so the sampler needs no matrix inversion
    match perspective_transform(&rectangle_corners(w, h), &padded.as_f64()) {
        Some(inverse) => warp_perspective(image, &inverse, out_width, out_height),
        None => {
            log::warn!(
                "Degenerate quadrilateral {:?}, emitting blank crop",
                padded.points
            );
            RgbImage::from_pixel(out_width, out_height, BACKGROUND)
        }
    }
}

/// Resample `image` into a `width x height` raster.
///
/// `inverse` maps output pixel coordinates back to source coordinates. Samples
/// are blended bilinearly with a black surround, so source pixels on the last
/// row and column are still reached and uncovered output pixels are black.
pub fn warp_perspective(
    image: &RgbImage,
    inverse: &Matrix3<f64>,
    width: u32,
    height: u32,
) -> RgbImage {
    let bordered = with_border(image);
    let mut output = RgbImage::from_pixel(width, height, BACKGROUND);

    warp_into_with(
        &bordered,
        |x, y| {
            let (sx, sy) = transform_point(inverse, x as f64, y as f64);
            ((sx + 1.0) as f32, (sy + 1.0) as f32)
        },
        Interpolation::Bilinear,
        BACKGROUND,
        &mut output,
    );

    output
}

/// Copy of `image` inside a one pixel `BACKGROUND` frame
fn with_border(image: &RgbImage) -> RgbImage {
    let mut bordered = RgbImage::from_pixel(image.width() + 2, image.height() + 2, BACKGROUND);
    imageops::replace(&mut bordered, image, 1, 1);
    bordered
}
