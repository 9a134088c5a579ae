// Background strategies painted around the text halftone.
//
// * `None`  - text dots on blank paper.
// * `Glow`  - a faint dot field that swells around the pointer (Gaussian
//   falloff) and is knocked back under the glyphs.
// * `Punch` - a bold uniform dot grid with the text erased out of it
//   (destination-out), then dots tracing the glyph outlines.

use serde::Deserialize;

use crate::error::Error;
use crate::halftone::{dot_radius, grid, ink_at, paint_dots, radius_base, threshold};
use crate::surface::{CompositeMode, Surface};
use crate::types::{Dot, PointerState, RenderParameters, TextMask};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backdrop {
    None,
    #[default]
    Glow,
    Punch,
}

impl Backdrop {
    /// The next strategy in the none -> glow -> punch cycle.
    pub fn next(self) -> Self {
        match self {
            Backdrop::None => Backdrop::Glow,
            Backdrop::Glow => Backdrop::Punch,
            Backdrop::Punch => Backdrop::None,
        }
    }

    /// Whether the regular text-dot pass runs. Punch draws the text as negative space instead.
    pub fn draws_text_dots(self) -> bool {
        !matches!(self, Backdrop::Punch)
    }

    /// Paint everything that sits under the text dots. Returns the number of dots drawn.
    pub fn paint_behind<S: Surface + ?Sized>(
        self,
        surface: &mut S,
        mask: &TextMask,
        params: &RenderParameters,
        pointer: PointerState,
    ) -> Result<usize, Error> {
        if params.spacing == 0 {
            return Err(Error::InvalidSpacing);
        }
        let (w, h) = surface.dimensions();
        match self {
            Backdrop::None => Ok(0),
            Backdrop::Glow => {
                let dots = glow_dots(mask, params.spacing, pointer);
                paint_dots(surface, &dots);
                Ok(dots.len())
            }
            Backdrop::Punch => {
                let dots = grid_dots(w, h, params.spacing);
                paint_dots(surface, &dots);

                // Erase the glyph shapes out of the grid
                surface.set_composite(CompositeMode::DestinationOut);
                surface.draw_mask(mask);
                surface.set_composite(CompositeMode::SourceOver);
                Ok(dots.len())
            }
        }
    }

    /// Paint anything that goes over the text pass.
    pub fn paint_in_front<S: Surface + ?Sized>(
        self,
        surface: &mut S,
        mask: &TextMask,
        params: &RenderParameters,
    ) -> Result<usize, Error> {
        match self {
            Backdrop::Punch => {
                let dots = outline_dots(mask, params.dither, params.spacing)?;
                paint_dots(surface, &dots);
                Ok(dots.len())
            }
            Backdrop::None | Backdrop::Glow => Ok(0),
        }
    }
}

/// Glow grid step: a bit denser than the text grid, never below 4px.
pub fn glow_step(spacing: u32) -> usize {
    ((spacing as f32 * 0.65).round() as usize).max(4)
}

/// Visual: a faint, even dot texture that grows fuller and darker near the
/// pointer (or the surface center when the pointer is away), and fades under
/// the letters so they stay readable.
pub fn glow_dots(mask: &TextMask, spacing: u32, pointer: PointerState) -> Vec<Dot> {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let step = glow_step(spacing);
    let (mx, my) = if pointer.active {
        (pointer.x * w as f32, pointer.y * h as f32)
    } else {
        (w as f32 * 0.5, h as f32 * 0.5)
    };

    // Reach of the field; bigger = broader
    let sigma = w.min(h) as f32 * 0.28;
    let inv_2s2 = 1.0 / (2.0 * sigma * sigma);
    let base_r = step as f32 * 0.18;

    let mut dots = Vec::new();
    for y in grid(h, step) {
        for x in grid(w, step) {
            let dx = x as f32 - mx;
            let dy = y as f32 - my;
            let g = (-(dx * dx + dy * dy) * inv_2s2).exp();

            // Knock back: a=1 inside text leaves 15% of the field
            let knock = 1.0 - mask.alpha(x, y) * 0.85;

            let radius = (base_r + g * (step as f32 * 0.22)).max(0.45) * knock;
            let opacity = (0.08 + g * 0.18) * knock;
            if opacity < 0.01 || radius < 0.2 {
                continue;
            }
            dots.push(Dot { x: x as f32, y: y as f32, radius, opacity });
        }
    }
    dots
}

/// Visual: a bold, perfectly regular black dot grid covering the surface.
pub fn grid_dots(width: usize, height: usize, spacing: u32) -> Vec<Dot> {
    let step = spacing.max(1) as usize;
    let radius = spacing as f32 * 0.34;
    let mut dots = Vec::new();
    for y in grid(height, step) {
        for x in grid(width, step) {
            dots.push(Dot { x: x as f32, y: y as f32, radius, opacity: 1.0 });
        }
    }
    dots
}

/// Dots on grid cells that are inked but border un-inked pixels.
/// Visual: a crisp dotted contour around each punched-out letter.
pub fn outline_dots(mask: &TextMask, dither: f32, spacing: u32) -> Result<Vec<Dot>, Error> {
    if spacing == 0 {
        return Err(Error::InvalidSpacing);
    }
    let (w, h) = mask.dimensions();
    let thresh = threshold(dither);
    let base = radius_base(spacing, dither);
    let reach = (spacing as usize / 2).max(1);

    // Off-surface neighbours count as blank
    let blank = |x: Option<usize>, y: Option<usize>| match (x, y) {
        (Some(x), Some(y)) if x < w && y < h => ink_at(mask, x, y) < thresh,
        _ => true,
    };

    let mut dots = Vec::new();
    for y in grid(h, spacing as usize) {
        for x in grid(w, spacing as usize) {
            let ink = ink_at(mask, x, y);
            if ink < thresh {
                continue;
            }
            let on_edge = blank(x.checked_sub(reach), Some(y))
                || blank(Some(x + reach), Some(y))
                || blank(Some(x), y.checked_sub(reach))
                || blank(Some(x), Some(y + reach));
            if on_edge {
                dots.push(Dot { x: x as f32, y: y as f32, radius: dot_radius(base, ink), opacity: 1.0 });
            }
        }
    }
    Ok(dots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameBuffer;

    /// Solid square of full coverage from (x0, y0) inclusive to (x1, y1) exclusive.
    fn square_mask(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> TextMask {
        let mut m = TextMask::new(w, h);
        for y in y0..y1 {
            for x in x0..x1 {
                m.cover(x as i64, y as i64, 255);
            }
        }
        m
    }

    fn dot_at(dots: &[Dot], x: f32, y: f32) -> Option<Dot> {
        dots.iter().copied().find(|d| d.x == x && d.y == y)
    }

    #[test_log::test]
    fn backdrops_cycle_through_every_mode() {
        assert_eq!(Backdrop::None.next(), Backdrop::Glow);
        assert_eq!(Backdrop::Glow.next(), Backdrop::Punch);
        assert_eq!(Backdrop::Punch.next(), Backdrop::None);
    }

    #[test_log::test]
    fn glow_step_has_a_floor() {
        assert_eq!(glow_step(1), 4);
        assert_eq!(glow_step(10), 7);
        assert_eq!(glow_step(20), 13);
    }

    #[test_log::test]
    fn glow_peaks_at_the_pointer() {
        let mask = TextMask::new(200, 200);
        let pointer = PointerState { x: 0.0, y: 0.0, active: true };
        let dots = glow_dots(&mask, 10, pointer);

        let near = dot_at(&dots, 0.0, 0.0).expect("dot at pointer");
        let far = dot_at(&dots, 196.0, 196.0).expect("dot far away");
        assert!(near.radius > far.radius);
        assert!(near.opacity > far.opacity);
        assert!((near.opacity - 0.26).abs() < 1e-5);
        assert!(near.opacity <= 0.26 + 1e-6);
    }

    #[test_log::test]
    fn glow_centers_when_pointer_is_away() {
        let mask = TextMask::new(140, 140);
        let away = PointerState { x: 0.0, y: 0.0, active: false };
        let dots = glow_dots(&mask, 10, away);
        // Step 7 puts a grid point exactly on the center (70, 70)
        let center = dot_at(&dots, 70.0, 70.0).expect("center dot");
        assert!(dots.iter().all(|d| d.opacity <= center.opacity + 1e-6));
    }

    #[test_log::test]
    fn glow_is_knocked_back_under_text() {
        let mask = square_mask(100, 100, 40, 40, 60, 60);
        let pointer = PointerState { x: 0.5, y: 0.5, active: true };
        let plain = glow_dots(&TextMask::new(100, 100), 10, pointer);
        let knocked = glow_dots(&mask, 10, pointer);

        let a = dot_at(&plain, 49.0, 49.0).expect("plain dot");
        let b = dot_at(&knocked, 49.0, 49.0).expect("knocked dot");
        assert!((b.opacity - a.opacity * 0.15).abs() < 1e-5);
        assert!((b.radius - a.radius * 0.15).abs() < 1e-5);

        // Outside the text nothing changes
        assert_eq!(dot_at(&plain, 7.0, 7.0), dot_at(&knocked, 7.0, 7.0));
    }

    #[test_log::test]
    fn grid_covers_every_cell() {
        let dots = grid_dots(100, 50, 10);
        assert_eq!(dots.len(), 10 * 5);
        assert!(dots.iter().all(|d| (d.radius - 3.4).abs() < 1e-5 && d.opacity == 1.0));
    }

    #[test_log::test]
    fn outline_only_marks_edge_cells() {
        let mask = square_mask(100, 100, 20, 20, 81, 81);
        let dots = outline_dots(&mask, 0.5, 10).expect("valid");
        let cells: Vec<(f32, f32)> = dots.iter().map(|d| (d.x, d.y)).collect();

        assert!(cells.contains(&(20.0, 20.0)));
        assert!(cells.contains(&(80.0, 50.0)));
        assert!(!cells.contains(&(50.0, 50.0)), "interior cell must not be traced");
        assert!(!cells.contains(&(10.0, 10.0)), "blank cell must not be traced");
    }

    #[test_log::test]
    fn punch_leaves_text_as_paper() {
        let mask = square_mask(100, 100, 30, 30, 70, 70);
        let params = RenderParameters { spacing: 10, ..RenderParameters::default() };
        let mut fb = FrameBuffer::new(100, 100);

        let drawn = Backdrop::Punch
            .paint_behind(&mut fb, &mask, &params, PointerState::default())
            .expect("valid");
        assert_eq!(drawn, 100);
        assert!(!Backdrop::Punch.draws_text_dots());

        // Grid dot inside the text got erased; grid dot outside survives
        assert_eq!(fb.argb(50, 50).map(|p| p.0), Some(0));
        assert_eq!(fb.argb(10, 10).map(|p| p.0), Some(255));
        // Composite mode is restored for later passes
        assert_eq!(fb.composite, CompositeMode::SourceOver);
    }

    #[test_log::test]
    fn none_paints_nothing() {
        let mask = square_mask(40, 40, 10, 10, 30, 30);
        let params = RenderParameters::default();
        let mut fb = FrameBuffer::new(40, 40);
        let behind = Backdrop::None.paint_behind(&mut fb, &mask, &params, PointerState::default());
        let front = Backdrop::None.paint_in_front(&mut fb, &mask, &params);
        assert_eq!(behind.expect("valid"), 0);
        assert_eq!(front.expect("valid"), 0);
        assert!(fb.read_pixels().iter().all(|&p| p == 0));
    }
}
