// Halftone type: text rendered as a grid of ink dots, live-tuned by weight,
// dither, size and spacing.
//
// A render is a pure function of a `RenderParameters` snapshot and the
// pointer state: the text is rasterized into an offscreen mask, the mask is
// sampled on a grid, and each sample becomes a dot on the output surface
// over an optional backdrop.

pub mod backdrop;
pub mod config;
pub mod controls;
pub mod error;
pub mod font;
pub mod halftone;
pub mod mask;
pub mod renderer;
pub mod surface;
pub mod types;

#[cfg(test)]
mod testing;

pub use backdrop::Backdrop;
pub use config::Config;
pub use controls::Controls;
pub use error::Error;
pub use font::{FontSpec, GlyphRasterizer, TextRasterizer};
pub use mask::MaskBuilder;
pub use renderer::{HalftoneRenderer, RenderStats};
pub use surface::{CompositeMode, Surface};
pub use types::{Dot, FrameBuffer, PointerState, RenderParameters, TextMask};
