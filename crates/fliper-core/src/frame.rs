use crate::Color;

/// Largest pixel count a canvas or object image may have (8192 x 8192).
pub const MAX_PIXELS: u64 = 1 << 26;

/// A raw pixel buffer: a decoded image, a transformed object image, or a
/// composited frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let pixel = color.to_rgba8();
        let pixel_count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Whether a `width` x `height` buffer stays within [`MAX_PIXELS`].
    /// Takes floats so oversized sizes can be checked before any cast.
    pub fn fits(width: f64, height: f64) -> bool {
        width >= 0.0 && height >= 0.0 && width * height <= MAX_PIXELS as f64
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + 4].copy_from_slice(&rgba);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// The alpha of the top-left pixel. Fades replace the alpha channel of
    /// the whole image at once, so any pixel speaks for all of them.
    /// An empty buffer reads as fully opaque.
    pub fn uniform_alpha(&self) -> u8 {
        self.get_pixel(0, 0).map(|p| p[3]).unwrap_or(255)
    }

    /// Copy of this buffer with every pixel's alpha set to `alpha`.
    pub fn with_alpha(&self, alpha: u8) -> FrameBuffer {
        let mut out = self.clone();
        for px in out.data.chunks_exact_mut(4) {
            px[3] = alpha;
        }
        out
    }

    /// Alpha-composite `src` on top of `self` at position (dx, dy).
    /// Pixels falling outside `self` are clipped.
    pub fn composite_over(&mut self, src: &FrameBuffer, dx: i32, dy: i32) {
        let dst_width = self.width as i64;
        let dst_height = self.height as i64;
        let (dx, dy) = (dx as i64, dy as i64);

        let mut start_y = 0;
        let mut end_y = src.height as i64;
        let mut start_x = 0;
        let mut end_x = src.width as i64;

        if dy < 0 { start_y = -dy; }
        if dy + end_y > dst_height { end_y = dst_height - dy; }
        if dx < 0 { start_x = -dx; }
        if dx + end_x > dst_width { end_x = dst_width - dx; }

        if start_x >= end_x || start_y >= end_y {
            return;
        }

        let src_stride = (src.width * 4) as usize;
        let dst_stride = (self.width * 4) as usize;

        for sy in start_y..end_y {
            let dst_y = dy + sy;
            let src_row_start = (sy as usize * src_stride) + (start_x as usize * 4);
            let dst_row_start = (dst_y as usize * dst_stride) + ((dx + start_x) as usize * 4);
            let len = (end_x - start_x) as usize * 4;

            let src_slice = &src.data[src_row_start..src_row_start + len];
            let dst_slice = &mut self.data[dst_row_start..dst_row_start + len];

            for (s, d) in src_slice.chunks_exact(4).zip(dst_slice.chunks_exact_mut(4)) {
                let sa = s[3] as u32;
                if sa == 0 {
                    continue;
                }
                if sa == 255 {
                    d.copy_from_slice(s);
                    continue;
                }

                let da = d[3] as u32;
                let inv_sa = 255 - sa;
                let out_a = sa + ((da * inv_sa) / 255);

                if out_a == 0 { continue; }

                let blend = |sc: u8, dc: u8| -> u8 {
                    ((sc as u32 * sa * 255 + dc as u32 * da * inv_sa) / (out_a * 255)) as u8
                };

                d[0] = blend(s[0], d[0]);
                d[1] = blend(s[1], d[1]);
                d[2] = blend(s[2], d[2]);
                d[3] = out_a as u8;
            }
        }
    }
}
