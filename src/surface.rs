// The drawing capability the renderer paints through.
// Visual effects provided here:
// 1) Anti-aliased filled circles (the halftone dots).
// 2) Source-over stacking of translucent dots.
// 3) Destination-out erasing, used to punch text out of a dot grid.

use crate::types::{FrameBuffer, TextMask};

/// How a fill combines with the pixels already on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeMode {
    /// Paint on top (canvas "source-over").
    #[default]
    SourceOver,
    /// Remove existing pixels where the fill lands (canvas "destination-out").
    DestinationOut,
}

/// A pixel surface the halftone passes draw into.
///
/// The renderer only talks to this trait, so tests can swap in an in-memory
/// buffer and a real window can present the same pixels.
pub trait Surface {
    /// Reallocate to `width` x `height`, discarding the old contents.
    fn allocate(&mut self, width: usize, height: usize);

    fn dimensions(&self) -> (usize, usize);

    /// Make every pixel fully transparent and reset the composite mode.
    fn clear(&mut self);

    fn set_composite(&mut self, mode: CompositeMode);

    /// Fill a circle of `radius` centered at (`cx`, `cy`) with ink at `opacity`.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, opacity: f32);

    /// Apply the mask's coverage as an ink fill under the current composite mode.
    fn draw_mask(&mut self, mask: &TextMask);

    /// The painted pixels, row-major 0xAARRGGBB.
    fn read_pixels(&self) -> &[u32];
}

/// Ink is always black in this design.
const INK_RGB: (u32, u32, u32) = (0, 0, 0);

/// Combine a black fragment with coverage `a` (0..1) into one straight-alpha pixel.
#[inline]
fn composite_pixel(dst: u32, a: f32, mode: CompositeMode) -> u32 {
    if a <= 0.0 {
        return dst;
    }
    let a = a.min(1.0);
    let da = ((dst >> 24) & 0xFF) as f32 / 255.0;

    match mode {
        CompositeMode::SourceOver => {
            let out_a = a + da * (1.0 - a);
            if out_a <= 0.0 {
                return 0;
            }
            // Straight-alpha "over": weight each color by its contribution.
            let mix = |src: u32, dst_c: u32| {
                let c = (src as f32 * a + dst_c as f32 * da * (1.0 - a)) / out_a;
                (c.round().clamp(0.0, 255.0)) as u32
            };
            let r = mix(INK_RGB.0, (dst >> 16) & 0xFF);
            let g = mix(INK_RGB.1, (dst >> 8) & 0xFF);
            let b = mix(INK_RGB.2, dst & 0xFF);
            let a8 = (out_a * 255.0).round().clamp(0.0, 255.0) as u32;
            (a8 << 24) | (r << 16) | (g << 8) | b
        }
        CompositeMode::DestinationOut => {
            let out_a = da * (1.0 - a);
            let a8 = (out_a * 255.0).round().clamp(0.0, 255.0) as u32;
            if a8 == 0 {
                return 0;
            }
            (a8 << 24) | (dst & 0x00FF_FFFF)
        }
    }
}

impl Surface for FrameBuffer {
    fn allocate(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0u32; width * height];
        self.composite = CompositeMode::SourceOver;
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        for p in &mut self.pixels {
            *p = 0;
        }
        self.composite = CompositeMode::SourceOver;
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.composite = mode;
    }

    /// Visual: a round dot with a one-pixel soft edge.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, opacity: f32) {
        if radius <= 0.0 || opacity <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }

        // Scan just the bounding box, padded by the anti-alias fringe
        let x0 = ((cx - radius - 1.0).floor().max(0.0)) as usize;
        let y0 = ((cy - radius - 1.0).floor().max(0.0)) as usize;
        let x1 = ((cx + radius + 1.0).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((cy + radius + 1.0).ceil().max(0.0) as usize).min(self.height);

        for y in y0..y1 {
            let row = y * self.width;
            let py = y as f32 + 0.5 - cy;
            for x in x0..x1 {
                let px = x as f32 + 0.5 - cx;
                let d = (px * px + py * py).sqrt();
                // Coverage ramps from 1 to 0 across the pixel straddling the edge
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let idx = row + x;
                self.pixels[idx] = composite_pixel(self.pixels[idx], coverage * opacity, self.composite);
            }
        }
    }

    fn draw_mask(&mut self, mask: &TextMask) {
        let w = self.width.min(mask.width());
        let h = self.height.min(mask.height());
        for y in 0..h {
            for x in 0..w {
                let a = mask.alpha(x, y);
                if a <= 0.0 {
                    continue;
                }
                let idx = y * self.width + x;
                self.pixels[idx] = composite_pixel(self.pixels[idx], a, self.composite);
            }
        }
    }

    fn read_pixels(&self) -> &[u32] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(fb: &FrameBuffer, x: usize, y: usize) -> u8 {
        fb.argb(x, y).map_or(0, |p| p.0)
    }

    #[test_log::test]
    fn filled_circle_is_opaque_at_center_and_clear_far_away() {
        let mut fb = FrameBuffer::new(40, 40);
        fb.fill_circle(20.0, 20.0, 6.0, 1.0);

        assert_eq!(alpha_at(&fb, 20, 20), 255);
        assert_eq!(alpha_at(&fb, 19, 19), 255);
        assert_eq!(alpha_at(&fb, 0, 0), 0);
        assert_eq!(alpha_at(&fb, 30, 20), 0);
        // Ink is black
        assert_eq!(fb.argb(20, 20), Some((255, 0, 0, 0)));
    }

    #[test_log::test]
    fn translucent_dots_stack_toward_opaque() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.fill_circle(5.0, 5.0, 3.0, 0.5);
        let once = alpha_at(&fb, 5, 5);
        fb.fill_circle(5.0, 5.0, 3.0, 0.5);
        let twice = alpha_at(&fb, 5, 5);

        assert!((126..=129).contains(&once), "once = {once}");
        assert!(twice > once);
        assert!((189..=193).contains(&twice), "twice = {twice}");
    }

    #[test_log::test]
    fn destination_out_erases_existing_ink() {
        let mut fb = FrameBuffer::new(20, 20);
        fb.fill_circle(10.0, 10.0, 8.0, 1.0);
        assert_eq!(alpha_at(&fb, 10, 10), 255);

        fb.set_composite(CompositeMode::DestinationOut);
        fb.fill_circle(10.0, 10.0, 3.0, 1.0);
        assert_eq!(alpha_at(&fb, 10, 10), 0);
        // Outside the eraser the ink survives
        assert_eq!(alpha_at(&fb, 10, 16), 255);
    }

    #[test_log::test]
    fn draw_mask_punches_text_shape() {
        let mut fb = FrameBuffer::new(8, 8);
        fb.fill_circle(4.0, 4.0, 10.0, 1.0);

        let mut mask = TextMask::new(8, 8);
        mask.cover(2, 2, 255);
        mask.cover(3, 2, 128);

        fb.set_composite(CompositeMode::DestinationOut);
        fb.draw_mask(&mask);

        assert_eq!(alpha_at(&fb, 2, 2), 0);
        assert!((126..=128).contains(&alpha_at(&fb, 3, 2)));
        assert_eq!(alpha_at(&fb, 5, 5), 255);
    }

    #[test_log::test]
    fn circles_off_the_edge_do_not_panic() {
        let mut fb = FrameBuffer::new(16, 16);
        fb.fill_circle(-3.0, -3.0, 8.0, 1.0);
        fb.fill_circle(100.0, 3.0, 2.0, 1.0);
        fb.fill_circle(15.9, 15.9, 4.0, 1.0);
        assert_eq!(alpha_at(&fb, 0, 0), 255);
        assert_eq!(alpha_at(&fb, 15, 15), 255);

        let mut empty = FrameBuffer::new(0, 0);
        empty.fill_circle(0.0, 0.0, 3.0, 1.0);
        assert!(empty.read_pixels().is_empty());
    }

    #[test_log::test]
    fn clear_resets_pixels_and_mode() {
        let mut fb = FrameBuffer::new(6, 6);
        fb.fill_circle(3.0, 3.0, 2.0, 1.0);
        fb.set_composite(CompositeMode::DestinationOut);
        fb.clear();

        assert!(fb.read_pixels().iter().all(|&p| p == 0));
        assert_eq!(fb.composite, CompositeMode::SourceOver);
    }

    #[test_log::test]
    fn allocate_matches_requested_size() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.allocate(33, 17);
        assert_eq!(fb.dimensions(), (33, 17));
        assert_eq!(fb.read_pixels().len(), 33 * 17);
    }

    #[test_log::test]
    fn paper_shows_white_where_transparent() {
        let mut fb = FrameBuffer::new(12, 12);
        fb.fill_circle(6.0, 6.0, 3.0, 1.0);
        let mut screen = FrameBuffer::new(0, 0);
        fb.flatten_on_paper(&mut screen);

        assert_eq!(screen.dimensions(), (12, 12));
        assert_eq!(screen.pixels[0], 0x00FF_FFFF);
        assert_eq!(screen.pixels[6 * 12 + 6], 0x0000_0000);
    }
}
