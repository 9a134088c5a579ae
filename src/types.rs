// Core types shared by the mask builder, the sampler and the window loop.

use crate::surface::CompositeMode;
use image::{Rgba, RgbaImage};

/// The visible output surface. Cleared and fully repainted on every render.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // surface width in device pixels
    pub height: usize,     // surface height in device pixels
    pub pixels: Vec<u32>,  // each entry is 0xAARRGGBB, straight (not premultiplied) alpha
    pub composite: CompositeMode, // how the next fills combine with what is already there
}

impl FrameBuffer {
    /// A fully transparent surface of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u32; width * height],
            composite: CompositeMode::SourceOver,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Straight-alpha channels of one pixel, or None outside the surface.
    pub fn argb(&self, x: usize, y: usize) -> Option<(u8, u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let p = self.pixels[y * self.width + x];
        Some(((p >> 24) as u8, (p >> 16) as u8, (p >> 8) as u8, p as u8))
    }

    /// Composite the surface over white paper into `screen` as 0x00RRGGBB for minifb.
    /// Visual: transparent areas read as white, full-opacity dots as solid ink.
    pub fn flatten_on_paper(&self, screen: &mut FrameBuffer) {
        if screen.dimensions() != self.dimensions() {
            *screen = FrameBuffer::new(self.width, self.height);
        }
        for (dst, &p) in screen.pixels.iter_mut().zip(&self.pixels) {
            let a = (p >> 24) & 0xFF;
            let inv = 255 - a;
            let mix = |c: u32| (c * a + 255 * inv + 127) / 255;
            let r = mix((p >> 16) & 0xFF);
            let g = mix((p >> 8) & 0xFF);
            let b = mix(p & 0xFF);
            *dst = (r << 16) | (g << 8) | b;
        }
    }
}

/// Offscreen glyph coverage. RGB is always black; alpha carries coverage.
/// Visual: never shown directly; the halftone dots are sampled from it.
#[derive(Clone, Debug, PartialEq)]
pub struct TextMask {
    image: RgbaImage,
}

impl TextMask {
    /// A fully transparent mask of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { image: RgbaImage::new(width as u32, height as u32) }
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Reset every pixel to transparent, keeping the allocation.
    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    /// Raw RGBA at (x, y), or None outside the mask.
    pub fn rgba(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.image.get_pixel(x as u32, y as u32).0)
    }

    /// Coverage at (x, y) in 0..1; zero outside the mask.
    pub fn alpha(&self, x: usize, y: usize) -> f32 {
        self.rgba(x, y).map_or(0.0, |p| p[3] as f32 / 255.0)
    }

    /// Source-over a black fragment with the given coverage.
    pub fn cover(&mut self, x: i64, y: i64, coverage: u8) {
        if coverage == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let px = self.image.get_pixel_mut(x, y);
        let dst = px.0[3] as u32;
        let src = coverage as u32;
        let out = src + (dst * (255 - src) + 127) / 255;
        *px = Rgba([0, 0, 0, out.min(255) as u8]);
    }

    /// Count of pixels with any coverage. Cheap enough for logs and tests.
    pub fn covered_pixels(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] > 0).count()
    }
}

/// One snapshot of the user-tunable knobs. Copied out of `Controls` per render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderParameters {
    pub text: String,
    pub weight: f32,   // 1..1000, variable font weight axis
    pub dither: f32,   // 0..1, lower = more binary
    pub size: f32,     // font size as a fraction of min(W, H)
    pub spacing: u32,  // halftone grid step in pixels, >= 1
    pub leading: f32,  // line height as a multiple of font size
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            text: String::from("HALFTONE"),
            weight: 500.0,
            dither: 0.45,
            size: 0.18,
            spacing: 10,
            leading: 1.05,
        }
    }
}

/// Normalized pointer position. `active` is false once the pointer leaves the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub x: f32, // 0..1 across the surface
    pub y: f32, // 0..1 down the surface
    pub active: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5, active: false }
    }
}

/// A filled circle the sampler wants painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub opacity: f32,
}
