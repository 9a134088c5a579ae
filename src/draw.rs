// Window + input + HUD utilities for the interactive binary.
// Visual effects provided here:
// 1) A resizable window that shows the halftone surface on white paper.
// 2) Keyboard/pointer polling turned into parameter actions.
// 3) A tiny 5x7 bitmap font for the status line.

use std::sync::mpsc::{self, Receiver, Sender};

use halftone_type::error::Error;
use halftone_type::types::FrameBuffer;
use minifb::{InputCallback, Key, KeyRepeat, MouseMode, ScaleMode, Window, WindowOptions};

/// One user intent decoded from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Quit,
    ToggleMouseControl,
    ToggleEditing,
    CycleBackdrop,
    Type(char),
    Backspace,
    Weight(f32),
    Dither(f32),
    Size(f32),
    Spacing(i32),
}

/// Forwards typed characters from minifb's callback into a channel.
struct TypedChars(Sender<char>);

impl InputCallback for TypedChars {
    fn add_char(&mut self, uni_char: u32) {
        if let Some(ch) = char::from_u32(uni_char) {
            if !ch.is_control() {
                let _ = self.0.send(ch);
            }
        }
    }
}

pub struct Drawer {
    window: Window,           // the on-screen window you see
    typed: Receiver<char>,    // characters typed since the last poll
}

impl Drawer {
    /// Create a resizable window; the surface is stretched to fill it.
    /// Visual: a new blank window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions {
            resize: true,
            scale_mode: ScaleMode::Stretch,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        // Input polling rate only; frames are redrawn when something changes
        window.set_target_fps(60);

        let (tx, rx) = mpsc::channel();
        window.set_input_callback(Box::new(TypedChars(tx)));
        Ok(Self { window, typed: rx })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, screen: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&screen.pixels, screen.width, screen.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// Pump window events without touching the displayed image.
    pub fn idle(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// Logical window size in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Pointer position normalized to 0..1, or None when it is outside the window.
    pub fn mouse_pos_norm(&self) -> Option<(f32, f32)> {
        let (w, h) = self.size();
        if w == 0 || h == 0 {
            return None;
        }
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| (x / w as f32, y / h as f32))
    }

    /// True while either Shift is held (fine pointer control).
    pub fn shift_down(&self) -> bool {
        self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift)
    }

    /// Decode this frame's key presses. `editing` routes typing into the text.
    pub fn poll_actions(&mut self, editing: bool) -> Vec<Action> {
        let mut actions = Vec::new();
        let typed: Vec<char> = self.typed.try_iter().collect();

        if self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            actions.push(if editing { Action::ToggleEditing } else { Action::Quit });
        }
        if self.window.is_key_pressed(Key::Tab, KeyRepeat::No) {
            actions.push(Action::ToggleEditing);
        }

        if editing {
            actions.extend(typed.into_iter().map(Action::Type));
            if self.window.is_key_pressed(Key::Enter, KeyRepeat::No) {
                actions.push(Action::Type('\n'));
            }
            if self.window.is_key_pressed(Key::Backspace, KeyRepeat::Yes) {
                actions.push(Action::Backspace);
            }
        } else {
            // M always, Space only outside the text field
            if self.window.is_key_pressed(Key::M, KeyRepeat::No)
                || self.window.is_key_pressed(Key::Space, KeyRepeat::No)
            {
                actions.push(Action::ToggleMouseControl);
            }
            if self.window.is_key_pressed(Key::B, KeyRepeat::No) {
                actions.push(Action::CycleBackdrop);
            }
        }

        // Slider keys auto-repeat; none of them apply while typing
        actions.extend(
            self.window
                .get_keys_pressed(KeyRepeat::Yes)
                .into_iter()
                .filter_map(|key| slider_action(key, editing)),
        );
        actions
    }
}

/// Map a slider key to its nudge. Arrows stay locked by `Controls` while mouse control is on.
fn slider_action(key: Key, editing: bool) -> Option<Action> {
    if editing {
        return None;
    }
    match key {
        Key::Minus => Some(Action::Size(-0.005)),
        Key::Equal => Some(Action::Size(0.005)),
        Key::LeftBracket => Some(Action::Spacing(-1)),
        Key::RightBracket => Some(Action::Spacing(1)),
        Key::Left => Some(Action::Weight(-10.0)),
        Key::Right => Some(Action::Weight(10.0)),
        Key::Down => Some(Action::Dither(-0.01)),
        Key::Up => Some(Action::Dither(0.01)),
        _ => None,
    }
}

/* ---------- Software drawing: pixels, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/* ---------- 5x7 bitmap font (uppercase ASCII + the status punctuation) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // Punctuation used by the status line and hints
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '=' => g!(0b00000,0b00000,0b11111,0b00000,0b11111,0b00000,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '[' => g!(0b01110,0b01000,0b01000,0b01000,0b01000,0b01000,0b01110),
        ']' => g!(0b01110,0b00010,0b00010,0b00010,0b00010,0b00010,0b01110),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
/// Visual: an ink glyph with a 1-pixel paper halo so it reads over the dots.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Halo pass: offset by (1,1) in paper white
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32 + 1, y + ry as i32 + 1, 0x00FF_FFFF);
                }
            }
        }

        // Foreground pass: actual glyph in chosen color
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx as i32, y + ry as i32, color);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs; lowercase is shown as uppercase.
/// Visual: a compact HUD string appears; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}
