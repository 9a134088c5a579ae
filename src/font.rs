// Glyph rasterization into the offscreen text mask.
//
// `TextRasterizer` is the seam the mask builder draws through. The real
// implementation shapes text with cosmic-text and rasterizes glyphs with its
// swash cache; tests use a deterministic block rasterizer instead.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent, Weight,
};
use log::{debug, warn};

use crate::error::Error;
use crate::types::TextMask;

/// Everything needed to pick and size a face for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,   // preferred variable-weight family
    pub fallback: String, // generic family used when `family` is not installed
    pub weight: u16,
    pub size_px: f32,
}

impl fmt::Display for FontSpec {
    /// CSS-like shorthand, e.g. `500 54px "Roboto Flex", sans-serif`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}px \"{}\", {}",
            self.weight, self.size_px, self.family, self.fallback
        )
    }
}

pub trait TextRasterizer {
    /// Draw `line` in black into `mask`, centered horizontally and vertically on (`cx`, `cy`).
    fn fill_text_centered(&mut self, mask: &mut TextMask, line: &str, cx: f32, cy: f32, font: &FontSpec);
}

/// Map a generic CSS family keyword to cosmic-text's generic families.
fn generic_family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        "sans-serif" | "system-ui" => Family::SansSerif,
        _ => Family::Name(name),
    }
}

/// cosmic-text backed rasterizer using the system font database.
pub struct GlyphRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    installed: HashMap<String, bool>, // family name -> found in the font db
}

impl GlyphRasterizer {
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    /// Use a prepared font system (e.g. one with extra font data loaded).
    pub fn with_font_system(font_system: FontSystem) -> Self {
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            installed: HashMap::new(),
        }
    }

    /// Load a font file's bytes into the database, e.g. a bundled variable face.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.font_system.db_mut().load_font_data(data);
        self.installed.clear();
    }

    /// Read a font file (e.g. a bundled Roboto Flex) and add it to the database.
    pub fn load_font_file(&mut self, path: &Path) -> Result<(), Error> {
        let data = fs::read(path)
            .map_err(|e| Error::Config(format!("read font {}: {e}", path.display())))?;
        self.load_font_data(data);
        Ok(())
    }

    fn is_installed(&mut self, family: &str) -> bool {
        if let Some(&found) = self.installed.get(family) {
            return found;
        }
        let found = self.font_system.db().faces().any(|face| {
            face.families
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(family))
        });
        if !found {
            debug!("font family {family:?} not installed, using fallback");
        }
        self.installed.insert(family.to_owned(), found);
        found
    }
}

impl Default for GlyphRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRasterizer for GlyphRasterizer {
    fn fill_text_centered(&mut self, mask: &mut TextMask, line: &str, cx: f32, cy: f32, font: &FontSpec) {
        if line.trim().is_empty() || font.size_px <= 0.0 {
            return;
        }

        let family = if self.is_installed(&font.family) {
            Family::Name(&font.family)
        } else {
            generic_family(&font.fallback)
        };
        let attrs = Attrs::new().family(family).weight(Weight(font.weight));

        // Line box height == font size, so centering the box centers the em square
        let metrics = Metrics::new(font.size_px, font.size_px);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, line, &attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let Some(run) = buffer.layout_runs().next() else {
            return;
        };
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        for glyph in run.glyphs {
            min_x = min_x.min(glyph.x);
            max_x = max_x.max(glyph.x + glyph.w);
        }
        if min_x > max_x {
            return;
        }
        let text_width = max_x - min_x;
        let offset_x = cx - text_width / 2.0 - min_x;
        let offset_y = cy - run.line_height / 2.0;

        for run in buffer.layout_runs() {
            let baseline = run.line_y;

            for glyph in run.glyphs {
                let physical = glyph.physical((offset_x, offset_y), 1.0);

                let Some(image) = self
                    .swash_cache
                    .get_image(&mut self.font_system, physical.cache_key)
                else {
                    continue;
                };

                let gx = physical.x as i64 + image.placement.left as i64;
                let gy = physical.y as i64 + baseline as i64 - image.placement.top as i64;
                let gw = image.placement.width as usize;
                let gh = image.placement.height as usize;

                'rows: for row in 0..gh {
                    for col in 0..gw {
                        let i = row * gw + col;
                        let coverage = match image.content {
                            SwashContent::Mask => image.data.get(i).copied(),
                            SwashContent::Color => image.data.get(i * 4 + 3).copied(),
                            SwashContent::SubpixelMask => image.data.get(i * 4 + 1).copied(),
                        };
                        match coverage {
                            Some(c) => mask.cover(gx + col as i64, gy + row as i64, c),
                            None => {
                                warn!("glyph bitmap shorter than its placement");
                                break 'rows;
                            }
                        }
                    }
                }
            }
        }
    }
}
