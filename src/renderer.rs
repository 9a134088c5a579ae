// One full redraw: mask -> clear -> backdrop -> text dots -> overlay.
// Each render is a pure function of the parameter snapshot and pointer state;
// nothing from the previous frame survives the clear.

use log::debug;

use crate::backdrop::Backdrop;
use crate::error::Error;
use crate::font::TextRasterizer;
use crate::halftone::{paint_dots, sample_text_dots};
use crate::mask::MaskBuilder;
use crate::surface::Surface;
use crate::types::{PointerState, RenderParameters, TextMask};

/// What the last render painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub width: usize,
    pub height: usize,
    pub backdrop_dots: usize,
    pub text_dots: usize,
    pub overlay_dots: usize,
}

pub struct HalftoneRenderer<R: TextRasterizer> {
    builder: MaskBuilder<R>,
    backdrop: Backdrop,
    mask: TextMask, // offscreen buffer, always the same size as the output surface
}

impl<R: TextRasterizer> HalftoneRenderer<R> {
    pub fn new(builder: MaskBuilder<R>, backdrop: Backdrop) -> Self {
        Self { builder, backdrop, mask: TextMask::new(0, 0) }
    }

    pub fn backdrop(&self) -> Backdrop {
        self.backdrop
    }

    pub fn set_backdrop(&mut self, backdrop: Backdrop) {
        self.backdrop = backdrop;
    }

    /// The mask built by the most recent render.
    pub fn mask(&self) -> &TextMask {
        &self.mask
    }

    /// Reallocate the output surface and the offscreen mask together.
    pub fn allocate<S: Surface + ?Sized>(&mut self, surface: &mut S, width: usize, height: usize) {
        surface.allocate(width, height);
        self.mask = TextMask::new(width, height);
    }

    /// Repaint `surface` from scratch for this snapshot.
    pub fn render<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        params: &RenderParameters,
        pointer: PointerState,
    ) -> Result<RenderStats, Error> {
        let (w, h) = surface.dimensions();
        if (w, h) != self.mask.dimensions() {
            return Err(Error::SizeMismatch { expected: (w, h), actual: self.mask.dimensions() });
        }
        if params.spacing == 0 {
            return Err(Error::InvalidSpacing);
        }

        surface.clear();
        let mut stats = RenderStats { width: w, height: h, ..RenderStats::default() };
        if w == 0 || h == 0 {
            return Ok(stats);
        }

        // 1) Text mask (offscreen)
        self.builder.build_into(params, &mut self.mask);

        // 2) Whatever lives under the text
        stats.backdrop_dots = self.backdrop.paint_behind(surface, &self.mask, params, pointer)?;

        // 3) Text halftone
        if self.backdrop.draws_text_dots() {
            let dots = sample_text_dots(&self.mask, params.dither, params.spacing)?;
            paint_dots(surface, &dots);
            stats.text_dots = dots.len();
        }

        // 4) Anything over the text
        stats.overlay_dots = self.backdrop.paint_in_front(surface, &self.mask, params)?;

        debug!("render {stats:?}");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halftone::radius_base;
    use crate::testing::BlockRasterizer;
    use crate::types::FrameBuffer;

    fn renderer(backdrop: Backdrop) -> HalftoneRenderer<BlockRasterizer> {
        let builder = MaskBuilder::new(BlockRasterizer::default(), "Roboto Flex", "sans-serif");
        HalftoneRenderer::new(builder, backdrop)
    }

    fn ab_params() -> RenderParameters {
        RenderParameters {
            text: "AB".into(),
            weight: 500.0,
            dither: 0.45,
            size: 0.18,
            spacing: 10,
            ..RenderParameters::default()
        }
    }

    fn ink_columns(fb: &FrameBuffer) -> (usize, usize) {
        let mut lo = usize::MAX;
        let mut hi = 0;
        for y in 0..fb.height {
            for x in 0..fb.width {
                if fb.argb(x, y).is_some_and(|p| p.0 > 0) {
                    lo = lo.min(x);
                    hi = hi.max(x);
                }
            }
        }
        (lo, hi)
    }

    #[test_log::test]
    fn render_refuses_mismatched_buffers() {
        let mut r = renderer(Backdrop::None);
        let mut fb = FrameBuffer::new(0, 0);
        r.allocate(&mut fb, 100, 80);

        // Surface resized behind the renderer's back
        fb.allocate(120, 80);
        let err = r.render(&mut fb, &ab_params(), PointerState::default());
        assert!(matches!(err, Err(Error::SizeMismatch { expected: (120, 80), actual: (100, 80) })));
    }

    #[test_log::test]
    fn resize_then_render_matches_new_dimensions() {
        let mut r = renderer(Backdrop::Glow);
        let mut fb = FrameBuffer::new(0, 0);
        for &(w, h) in &[(400, 300), (37, 91), (1, 1)] {
            r.allocate(&mut fb, w, h);
            let stats = r.render(&mut fb, &ab_params(), PointerState::default()).expect("render");
            assert_eq!((stats.width, stats.height), (w, h));
            assert_eq!(fb.dimensions(), (w, h));
            assert_eq!(r.mask().dimensions(), (w, h));
        }
    }

    #[test_log::test]
    fn zero_area_surface_renders_nothing() {
        let mut r = renderer(Backdrop::Glow);
        let mut fb = FrameBuffer::new(0, 0);
        r.allocate(&mut fb, 0, 300);
        let stats = r.render(&mut fb, &ab_params(), PointerState::default()).expect("render");
        assert_eq!(stats.text_dots + stats.backdrop_dots + stats.overlay_dots, 0);
    }

    #[test_log::test]
    fn ab_scenario_dots_stay_inside_the_glyphs() {
        let mut r = renderer(Backdrop::None);
        let mut fb = FrameBuffer::new(0, 0);
        r.allocate(&mut fb, 400, 300);
        let params = ab_params();
        let stats = r.render(&mut fb, &params, PointerState::default()).expect("render");
        assert!(stats.text_dots > 0);

        let dots = sample_text_dots(r.mask(), params.dither, params.spacing).expect("valid");
        let max_r = params.spacing as f32 * 0.28 * 1.6;
        for d in &dots {
            assert!(d.radius >= 0.6 && d.radius <= max_r, "radius {}", d.radius);
            assert!(d.x >= 167.0 && d.x <= 233.0, "x {}", d.x);
            assert!(d.y >= 131.0 && d.y <= 169.0, "y {}", d.y);
        }
        // Full-ink samples use the biggest radius for this dither
        let full = radius_base(10, 0.45) * 1.5;
        assert!(dots.iter().all(|d| (d.radius - full).abs() < 1e-4));

        // Painted ink stays in a band around the glyph box
        let (lo, hi) = ink_columns(&fb);
        assert!(lo >= 160 && hi <= 240, "ink columns {lo}..{hi}");
    }

    #[test_log::test]
    fn render_is_repeatable() {
        let mut r = renderer(Backdrop::Glow);
        let mut fb = FrameBuffer::new(0, 0);
        r.allocate(&mut fb, 200, 120);
        let pointer = PointerState { x: 0.2, y: 0.7, active: true };

        r.render(&mut fb, &ab_params(), pointer).expect("render");
        let first = fb.pixels.clone();
        r.render(&mut fb, &ab_params(), pointer).expect("render");
        assert_eq!(first, fb.pixels);
    }

    #[test_log::test]
    fn previous_frame_never_leaks_into_the_next() {
        let mut r = renderer(Backdrop::None);
        let mut fb = FrameBuffer::new(0, 0);
        r.allocate(&mut fb, 200, 120);

        r.render(&mut fb, &ab_params(), PointerState::default()).expect("render");
        let blank = RenderParameters { text: String::new(), ..ab_params() };
        let stats = r.render(&mut fb, &blank, PointerState::default()).expect("render");

        assert_eq!(stats.text_dots, 0);
        assert!(fb.read_pixels().iter().all(|&p| p == 0));
    }

    #[test_log::test]
    fn punch_skips_text_dots_and_traces_outlines() {
        let mut r = renderer(Backdrop::Punch);
        let mut fb = FrameBuffer::new(0, 0);
        r.allocate(&mut fb, 400, 300);
        let stats = r.render(&mut fb, &ab_params(), PointerState::default()).expect("render");

        assert_eq!(stats.text_dots, 0);
        assert_eq!(stats.backdrop_dots, 40 * 30);
        assert!(stats.overlay_dots > 0);
    }

    #[test_log::test]
    fn switching_backdrop_changes_the_next_render() {
        let mut r = renderer(Backdrop::None);
        let mut fb = FrameBuffer::new(0, 0);
        r.allocate(&mut fb, 400, 300);

        let plain = r.render(&mut fb, &ab_params(), PointerState::default()).expect("render");
        assert_eq!(plain.backdrop_dots, 0);

        r.set_backdrop(r.backdrop().next());
        assert_eq!(r.backdrop(), Backdrop::Glow);
        let glow = r.render(&mut fb, &ab_params(), PointerState::default()).expect("render");
        assert!(glow.backdrop_dots > 0);
        assert_eq!(glow.text_dots, plain.text_dots);
    }

    #[test_log::test]
    fn zero_spacing_is_a_precondition_error() {
        let mut r = renderer(Backdrop::None);
        let mut fb = FrameBuffer::new(0, 0);
        r.allocate(&mut fb, 50, 50);
        let params = RenderParameters { spacing: 0, ..ab_params() };
        assert!(matches!(r.render(&mut fb, &params, PointerState::default()), Err(Error::InvalidSpacing)));
    }
}
