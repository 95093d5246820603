//! CPU image backend: decoding through the `image` crate, alpha
//! compositing, nearest-neighbour rotation and Catmull-Rom resizing.

use std::path::Path;

use fliper_core::{Color, FrameBuffer};
use image::imageops::{self, FilterType};

use crate::backend::{DecodeError, ImageBackend, Layer};

/// The default backend. Pure CPU, single threaded, deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for CpuBackend {
    fn decode(&self, path: &Path) -> Result<FrameBuffer, DecodeError> {
        crate::image_loader::load_image(path)
    }

    fn composite(&self, background: Color, width: u32, height: u32, layers: &[Layer<'_>]) -> FrameBuffer {
        let mut frame = FrameBuffer::solid(width, height, &background);
        for layer in layers {
            frame.composite_over(layer.image, clamp_offset(layer.x), clamp_offset(layer.y));
        }
        frame
    }

    fn rotate(&self, image: &FrameBuffer, degrees: f64, fill: Color) -> FrameBuffer {
        rotate_filled(image, degrees, fill)
    }

    fn resize(&self, image: &FrameBuffer, width: u32, height: u32) -> FrameBuffer {
        resize_exact(image, width, height)
    }

    fn replace_alpha(&self, image: &FrameBuffer, alpha: u8) -> FrameBuffer {
        image.with_alpha(alpha)
    }
}

/// Offsets far outside the i32 range are off-canvas either way.
fn clamp_offset(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Rotate `fb` counter-clockwise by `degrees` around its center, keeping
/// its dimensions. Destination pixels that map outside the source take
/// `fill`.
pub fn rotate_filled(fb: &FrameBuffer, degrees: f64, fill: Color) -> FrameBuffer {
    if degrees % 360.0 == 0.0 {
        return fb.clone();
    }

    let (w, h) = (fb.width, fb.height);
    let fill = fill.to_rgba8();
    let mut out = FrameBuffer::solid(w, h, &Color::TRANSPARENT);

    let (sin, cos) = degrees.to_radians().sin_cos();
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;

    for y in 0..h {
        for x in 0..w {
            // Inverse-map the destination pixel center into the source.
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let sx = (dx * cos - dy * sin + cx).floor();
            let sy = (dx * sin + dy * cos + cy).floor();

            let pixel = if sx >= 0.0 && sy >= 0.0 && sx < w as f64 && sy < h as f64 {
                fb.get_pixel(sx as u32, sy as u32).unwrap_or(fill)
            } else {
                fill
            };
            out.set_pixel(x, y, pixel);
        }
    }
    out
}

/// Resample `fb` to exactly `width`x`height`.
pub fn resize_exact(fb: &FrameBuffer, width: u32, height: u32) -> FrameBuffer {
    if fb.width == width && fb.height == height {
        return fb.clone();
    }
    if width == 0 || height == 0 || fb.width == 0 || fb.height == 0 {
        return FrameBuffer::solid(width, height, &Color::TRANSPARENT);
    }

    match image::RgbaImage::from_raw(fb.width, fb.height, fb.data.clone()) {
        Some(img) => {
            let resized = imageops::resize(&img, width, height, FilterType::CatmullRom);
            FrameBuffer {
                data: resized.into_raw(),
                width,
                height,
            }
        }
        None => FrameBuffer::solid(width, height, &Color::TRANSPARENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(w: u32, h: u32, x: u32, y: u32) -> FrameBuffer {
        let mut fb = FrameBuffer::solid(w, h, &Color::BLUE);
        fb.set_pixel(x, y, [255, 0, 0, 255]);
        fb
    }

    #[test]
    fn test_composite_paints_in_order() {
        let backend = CpuBackend::new();
        let a = FrameBuffer::solid(2, 2, &Color::RED);
        let b = FrameBuffer::solid(2, 2, &Color::GREEN);
        let frame = backend.composite(
            Color::WHITE,
            4,
            4,
            &[
                Layer { image: &a, x: 0, y: 0 },
                Layer { image: &b, x: 1, y: 1 },
            ],
        );
        assert_eq!(frame.get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(frame.get_pixel(1, 1), Some([0, 255, 0, 255]));
        assert_eq!(frame.get_pixel(3, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_composite_clips_far_offsets() {
        let backend = CpuBackend::new();
        let a = FrameBuffer::solid(2, 2, &Color::RED);
        let frame = backend.composite(
            Color::BLACK,
            2,
            2,
            &[Layer { image: &a, x: i64::MAX, y: i64::MIN }],
        );
        assert!(frame.data.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_rotate_quarter_turn_moves_marker() {
        let fb = marked(3, 3, 2, 1);
        let rotated = rotate_filled(&fb, 90.0, Color::WHITE);
        assert_eq!(rotated.get_pixel(1, 0), Some([255, 0, 0, 255]));
        assert_eq!(rotated.get_pixel(2, 1), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_rotate_full_turn_is_identity() {
        let fb = marked(4, 3, 0, 2);
        assert_eq!(rotate_filled(&fb, 360.0, Color::WHITE), fb);
        assert_eq!(rotate_filled(&fb, 0.0, Color::WHITE), fb);
    }

    #[test]
    fn test_rotate_fills_uncovered_corners() {
        let fb = FrameBuffer::solid(4, 4, &Color::RED);
        let rotated = rotate_filled(&fb, 45.0, Color::GREEN);
        assert_eq!(rotated.get_pixel(0, 0), Some([0, 255, 0, 255]));
        assert_eq!(rotated.get_pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!((rotated.width, rotated.height), (4, 4));
    }

    #[test]
    fn test_resize_exact_dimensions() {
        let fb = FrameBuffer::solid(4, 2, &Color::RED);
        let resized = resize_exact(&fb, 8, 3);
        assert_eq!((resized.width, resized.height), (8, 3));
        let px = resized.get_pixel(4, 1).unwrap();
        assert!(px[0] >= 250 && px[1] <= 5 && px[3] >= 250);
    }

    #[test]
    fn test_resize_to_zero_is_empty() {
        let fb = FrameBuffer::solid(4, 2, &Color::RED);
        let resized = resize_exact(&fb, 0, 5);
        assert_eq!(resized.pixel_count(), 0);
    }

    #[test]
    fn test_replace_alpha() {
        let backend = CpuBackend::new();
        let fb = FrameBuffer::solid(2, 2, &Color::RED);
        let faded = backend.replace_alpha(&fb, 10);
        assert_eq!(faded.uniform_alpha(), 10);
        assert_eq!(faded.get_pixel(1, 1), Some([255, 0, 0, 10]));
    }
}
