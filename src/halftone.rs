// Halftone sampler: walks the mask on a fixed grid and turns ink into dots.
// Visual expectation: darker / more opaque glyph regions get larger dots;
// samples below the threshold get no dot at all (hard cutoff, not random).

use crate::error::Error;
use crate::surface::Surface;
use crate::types::{Dot, TextMask};

/// Smallest dot ever emitted, so every surviving sample stays visible.
pub const MIN_DOT_RADIUS: f32 = 0.6;

/// Ink cutoff. 0.45 at dither 0 (binary look), 0.10 at dither 1 (lets light ink through).
#[inline]
pub fn threshold(dither: f32) -> f32 {
    0.10 + (1.0 - dither) * 0.35
}

/// Base radius before ink scaling. Grows with grid spacing and with dither.
#[inline]
pub fn radius_base(spacing: u32, dither: f32) -> f32 {
    spacing as f32 * 0.28 * (0.35 + dither * 0.65)
}

/// Final radius for a sample carrying `ink`, never below `MIN_DOT_RADIUS`.
#[inline]
pub fn dot_radius(base: f32, ink: f32) -> f32 {
    (base * (0.25 + ink * 1.25)).max(MIN_DOT_RADIUS)
}

/// Rec. 709 luminance of an RGBA sample in 0..1.
#[inline]
pub fn luminance(rgba: [u8; 4]) -> f32 {
    (0.2126 * rgba[0] as f32 + 0.7152 * rgba[1] as f32 + 0.0722 * rgba[2] as f32) / 255.0
}

/// "How much dark coverage is here": `(1 - luminance) * alpha`.
#[inline]
pub fn ink(rgba: [u8; 4]) -> f32 {
    (1.0 - luminance(rgba)) * (rgba[3] as f32 / 255.0)
}

/// Ink at (x, y); zero outside the mask.
#[inline]
pub fn ink_at(mask: &TextMask, x: usize, y: usize) -> f32 {
    mask.rgba(x, y).map_or(0.0, ink)
}

/// Grid coordinates `0, step, 2*step, ...` below `len`.
pub(crate) fn grid(len: usize, step: usize) -> impl Iterator<Item = usize> {
    (0..len).step_by(step.max(1))
}

/// One dot per grid cell whose ink reaches the threshold, in row-major order.
pub fn sample_text_dots(mask: &TextMask, dither: f32, spacing: u32) -> Result<Vec<Dot>, Error> {
    if spacing == 0 {
        return Err(Error::InvalidSpacing);
    }
    let thresh = threshold(dither);
    let base = radius_base(spacing, dither);
    let step = spacing as usize;

    let mut dots = Vec::new();
    for y in grid(mask.height(), step) {
        for x in grid(mask.width(), step) {
            let ink = ink_at(mask, x, y);
            if ink < thresh {
                continue; // visual: blank paper here
            }
            dots.push(Dot {
                x: x as f32,
                y: y as f32,
                radius: dot_radius(base, ink),
                opacity: 1.0,
            });
        }
    }
    Ok(dots)
}

/// Paint every dot with the surface's current composite mode.
pub fn paint_dots<S: Surface + ?Sized>(surface: &mut S, dots: &[Dot]) {
    for d in dots {
        surface.fill_circle(d.x, d.y, d.radius, d.opacity);
    }
}
