// Text mask builder: rasterizes the current text into the offscreen mask.
// Visual expectation: black glyphs centered on the surface, one block of lines,
// sized relative to the shorter surface side.

use log::debug;

use crate::font::{FontSpec, TextRasterizer};
use crate::types::{RenderParameters, TextMask};

/// Text below this size stops reading as letters once halftoned.
pub const MIN_FONT_PX: f32 = 18.0;

/// `max(18, round(min(W, H) * size))`.
pub fn font_size_px(width: usize, height: usize, size: f32) -> f32 {
    let base = width.min(height) as f32;
    (base * size).round().max(MIN_FONT_PX)
}

/// Split the text into lines after normalizing CRLF and trimming.
/// Blank input becomes a single space so there is always one line to draw.
pub fn layout_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    let body = if trimmed.is_empty() { " " } else { trimmed };
    body.split('\n').map(str::to_owned).collect()
}

/// Y coordinate of each line's center, with the block centered on `height / 2`.
pub fn line_centers(line_count: usize, height: usize, line_height: f32) -> Vec<f32> {
    let block_h = line_count.saturating_sub(1) as f32 * line_height;
    let start_y = height as f32 * 0.5 - block_h * 0.5;
    (0..line_count).map(|i| start_y + i as f32 * line_height).collect()
}

pub struct MaskBuilder<R: TextRasterizer> {
    rasterizer: R,
    family: String,
    fallback: String,
}

impl<R: TextRasterizer> MaskBuilder<R> {
    pub fn new(rasterizer: R, family: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            rasterizer,
            family: family.into(),
            fallback: fallback.into(),
        }
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// The font this builder would use for `params` on a `width` x `height` surface.
    pub fn font_for(&self, params: &RenderParameters, width: usize, height: usize) -> FontSpec {
        FontSpec {
            family: self.family.clone(),
            fallback: self.fallback.clone(),
            weight: params.weight.round().clamp(1.0, 1000.0) as u16,
            size_px: font_size_px(width, height, params.size),
        }
    }

    /// Rebuild `mask` in place from scratch. Its dimensions are the surface dimensions.
    /// A zero-area mask is left untouched.
    pub fn build_into(&mut self, params: &RenderParameters, mask: &mut TextMask) {
        if mask.is_empty() {
            return;
        }
        let (w, h) = mask.dimensions();
        mask.clear();

        let lines = layout_lines(&params.text);
        let font = self.font_for(params, w, h);
        let lh = font.size_px * params.leading;
        let cx = w as f32 * 0.5;

        for (line, cy) in lines.iter().zip(line_centers(lines.len(), h, lh)) {
            self.rasterizer.fill_text_centered(mask, line, cx, cy, &font);
        }
        debug!("mask {w}x{h}: {} line(s) at {font}", lines.len());
    }

    /// Build a fresh mask of the given size.
    pub fn build(&mut self, params: &RenderParameters, width: usize, height: usize) -> TextMask {
        let mut mask = TextMask::new(width, height);
        self.build_into(params, &mut mask);
        mask
    }
}
