// What you SEE:
// • Your text, rebuilt as a grid of black halftone dots on white paper.
// • Move the pointer: a faint dot field swells around it, and (MOUSE ON)
//   left/right drives font weight, up/down drives dither. Hold Shift for fine control.
// • M or Space toggles mouse control, B cycles the backdrop (none / glow / punch). Tab enters text editing; Tab/Esc leaves it.
// • ←/→ weight, ↑/↓ dither (only with MOUSE OFF), -/= size, [/] spacing. ESC quits.
//
// Nothing animates on a clock: the surface is repainted only after an input changes something.

mod draw;

use std::path::PathBuf;

use draw::{draw_text_5x7, Action, Drawer};
use halftone_type::{
    Config, Controls, Error, FrameBuffer, GlyphRasterizer, HalftoneRenderer, MaskBuilder,
};
use log::{debug, info};

const TITLE: &str = "Halftone Type";
const HUD_INK: u32 = 0x00_20_20_20;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    /* --- Config ---
       Optional path as the first argument, else config.toml next to the binary / in cwd. */
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let (config, source) = Config::load(explicit.as_deref())?;
    match &source {
        Some(path) => info!("config loaded from {}", path.display()),
        None => info!("config: built-in defaults"),
    }

    /* --- State + window ---
       Visual: window opens; the first frame is drawn as soon as we know its size. */
    let mut controls = Controls::new(config.initial_parameters(), config.render.mouse_control);
    let mut drawer = Drawer::new(TITLE, config.window.width, config.window.height)?;

    let mut rasterizer = GlyphRasterizer::new();
    if let Some(path) = &config.font.path {
        rasterizer.load_font_file(path)?;
        info!("font file loaded from {}", path.display());
    }
    let builder = MaskBuilder::new(rasterizer, &config.font.family, &config.font.fallback);
    let mut renderer = HalftoneRenderer::new(builder, config.backdrop.mode);
    info!("backdrop: {:?}, font: {:?}", renderer.backdrop(), config.font.family);

    /* --- Reusable buffers ---
       `surface` is the halftone (with alpha); `screen` is what the window shows. */
    let mut surface = FrameBuffer::new(0, 0);
    let mut screen = FrameBuffer::new(0, 0);

    let mut window_size = (0usize, 0usize);
    let mut last_mouse: Option<(f32, f32)> = None;
    let mut editing = false;
    let mut dirty = true;

    /* ------------------------------ Event loop ------------------------------ */
    'events: while drawer.is_open() {
        /* 1) Resize: reallocate both buffers before any render sees them. */
        let size = drawer.size();
        if size != window_size {
            window_size = size;
            let (w, h) = controls.resize(size.0 as f32, size.1 as f32, config.window.device_pixel_ratio);
            renderer.allocate(&mut surface, w, h);
            info!("surface resized to {w}x{h}");
            dirty = true;
        }

        /* 2) Keyboard */
        for action in drawer.poll_actions(editing) {
            match action {
                Action::Quit => break 'events,
                Action::ToggleEditing => editing = !editing,
                Action::ToggleMouseControl => controls.toggle_mouse_control(),
                Action::CycleBackdrop => {
                    renderer.set_backdrop(renderer.backdrop().next());
                    info!("backdrop: {:?}", renderer.backdrop());
                }
                Action::Type(ch) => controls.push_char(ch),
                Action::Backspace => controls.pop_char(),
                Action::Weight(d) => {
                    if !controls.nudge_weight(d) {
                        continue;
                    }
                }
                Action::Dither(d) => {
                    if !controls.nudge_dither(d) {
                        continue;
                    }
                }
                Action::Size(d) => controls.nudge_size(d),
                Action::Spacing(d) => controls.nudge_spacing(d),
            }
            dirty = true;
        }

        /* 3) Pointer: every move re-renders so the glow follows it. */
        let mouse = drawer.mouse_pos_norm();
        if mouse != last_mouse {
            match mouse {
                Some((x, y)) => controls.set_pointer(x, y, true, drawer.shift_down()),
                None => controls.pointer_left(),
            }
            last_mouse = mouse;
            dirty = true;
        }

        if !dirty {
            drawer.idle();
            continue;
        }

        /* 4) Render from a snapshot, then present on paper with the HUD on top. */
        let params = controls.snapshot();
        let stats = renderer.render(&mut surface, &params, controls.pointer())?;
        debug!("{stats:?}");

        surface.flatten_on_paper(&mut screen);
        let status = controls.status_line();
        draw_text_5x7(&mut screen, 8, 8, &status, HUD_INK);
        let hint = if editing {
            "EDITING TEXT | TAB/ESC: DONE"
        } else {
            "TAB: EDIT TEXT | M/SPACE: MOUSE | B: BACKDROP | [ ]: SPACING | -/=: SIZE"
        };
        draw_text_5x7(&mut screen, 8, 18, hint, HUD_INK);

        drawer.set_title(&format!("{TITLE} | {status}"));
        drawer.present(&screen)?;
        dirty = false;
    }

    Ok(())
}
