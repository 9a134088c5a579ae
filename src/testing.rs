// Deterministic stand-ins used by unit tests across the crate.

use crate::font::{FontSpec, TextRasterizer};
use crate::types::TextMask;

/// Draws every non-space character as a solid black block.
/// Advance is 0.6 em; block height is 0.7 em; heavier weights get wider blocks.
#[derive(Default)]
pub struct BlockRasterizer {
    pub calls: usize,
}

impl BlockRasterizer {
    pub fn advance(size_px: f32) -> f32 {
        size_px * 0.6
    }
}

impl TextRasterizer for BlockRasterizer {
    fn fill_text_centered(&mut self, mask: &mut TextMask, line: &str, cx: f32, cy: f32, font: &FontSpec) {
        self.calls += 1;

        let advance = Self::advance(font.size_px);
        let block_w = advance * (0.5 + font.weight as f32 / 1000.0 * 0.4);
        let block_h = font.size_px * 0.7;
        let count = line.chars().count() as f32;
        let left = cx - advance * count / 2.0;
        let (top, bottom) = (cy - block_h / 2.0, cy + block_h / 2.0);

        for (i, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = left + i as f32 * advance + (advance - block_w) / 2.0;
            let x1 = x0 + block_w;
            // Pixel centers inside the block are fully covered
            let px0 = (x0 - 0.5).ceil().max(0.0) as i64;
            let px1 = (x1 - 0.5).floor() as i64;
            let py0 = (top - 0.5).ceil().max(0.0) as i64;
            let py1 = (bottom - 0.5).floor() as i64;
            for y in py0..=py1 {
                for x in px0..=px1 {
                    mask.cover(x, y, 255);
                }
            }
        }
    }
}
