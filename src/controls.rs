// Host-side parameter cell. Input handlers mutate it; each render copies a snapshot out.
// All clamping happens here so the render core can trust its inputs.

use log::info;

use crate::types::{PointerState, RenderParameters};

pub const WEIGHT_RANGE: (f32, f32) = (1.0, 1000.0);
pub const SIZE_RANGE: (f32, f32) = (0.01, 1.0);

/// Pointer-driven weight spans 100 (left edge) .. 1000 (right edge).
pub const POINTER_WEIGHT_MIN: f32 = 100.0;
pub const POINTER_WEIGHT_SPAN: f32 = 900.0;

/// Fraction of the remaining distance covered per pointer move.
pub const SMOOTHING: f32 = 0.25;
/// Extra damping while the fine modifier (Shift) is held.
pub const FINE_FACTOR: f32 = 0.25;

/// Round to `1 / scale` steps with ties going up, so `{:.N}` never sees an exact tie.
fn round_half_up(value: f32, scale: f32) -> f32 {
    (value * scale).round() / scale
}

pub struct Controls {
    params: RenderParameters,
    pointer: PointerState,
    mouse_control: bool,        // pointer drives weight/dither; sliders are locked
    surface: (usize, usize),    // device-pixel size from the last resize
}

impl Controls {
    pub fn new(params: RenderParameters, mouse_control: bool) -> Self {
        let mut controls = Self {
            params: RenderParameters::default(),
            pointer: PointerState::default(),
            mouse_control,
            surface: (0, 0),
        };
        // Route the initial values through the same clamps as live input
        controls.set_text(&params.text);
        controls.set_weight(params.weight);
        controls.set_dither(params.dither);
        controls.set_size(params.size);
        controls.set_spacing(params.spacing);
        controls.params.leading = params.leading.max(0.0);
        controls
    }

    /// Copy-on-read: the render works on its own snapshot.
    pub fn snapshot(&self) -> RenderParameters {
        self.params.clone()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn mouse_control(&self) -> bool {
        self.mouse_control
    }

    pub fn surface_size(&self) -> (usize, usize) {
        self.surface
    }

    pub fn text(&self) -> &str {
        &self.params.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.params.text = text.replace("\r\n", "\n");
    }

    pub fn push_char(&mut self, ch: char) {
        self.params.text.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.params.text.pop();
    }

    pub fn set_weight(&mut self, value: f32) {
        self.params.weight = value.clamp(WEIGHT_RANGE.0, WEIGHT_RANGE.1);
    }

    pub fn set_dither(&mut self, value: f32) {
        self.params.dither = value.clamp(0.0, 1.0);
    }

    pub fn set_size(&mut self, value: f32) {
        self.params.size = value.clamp(SIZE_RANGE.0, SIZE_RANGE.1);
    }

    pub fn set_spacing(&mut self, value: u32) {
        self.params.spacing = value.max(1);
    }

    /// Slider-style nudge. Refused (returns false) while mouse control locks the slider.
    pub fn nudge_weight(&mut self, delta: f32) -> bool {
        if self.mouse_control {
            return false;
        }
        self.set_weight(self.params.weight.round() + delta);
        true
    }

    /// Slider-style nudge. Refused (returns false) while mouse control locks the slider.
    pub fn nudge_dither(&mut self, delta: f32) -> bool {
        if self.mouse_control {
            return false;
        }
        // Slider steps are hundredths
        self.set_dither(((self.params.dither + delta) * 100.0).round() / 100.0);
        true
    }

    pub fn nudge_size(&mut self, delta: f32) {
        self.set_size(((self.params.size + delta) * 1000.0).round() / 1000.0);
    }

    pub fn nudge_spacing(&mut self, delta: i32) {
        let next = (self.params.spacing as i64 + delta as i64).max(1);
        self.set_spacing(next.min(u32::MAX as i64) as u32);
    }

    /// Record a pointer position (normalized, clamped to 0..1).
    /// With mouse control on, weight and dither ease toward pointer-derived targets.
    /// `fine` selects the slower easing rate.
    pub fn set_pointer(&mut self, x: f32, y: f32, active: bool, fine: bool) {
        if !active {
            self.pointer_left();
            return;
        }
        let x = x.clamp(0.0, 1.0);
        let y = y.clamp(0.0, 1.0);
        self.pointer = PointerState { x, y, active: true };

        if self.mouse_control {
            let rate = SMOOTHING * if fine { FINE_FACTOR } else { 1.0 };
            let target_weight = POINTER_WEIGHT_MIN + x * POINTER_WEIGHT_SPAN;
            let target_dither = y;

            let weight = self.params.weight + (target_weight - self.params.weight) * rate;
            let dither = self.params.dither + (target_dither - self.params.dither) * rate;
            self.set_weight(weight);
            self.set_dither(dither);
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer.active = false;
    }

    pub fn set_mouse_control(&mut self, enabled: bool) {
        if self.mouse_control != enabled {
            info!("mouse control {}", if enabled { "on" } else { "off" });
        }
        self.mouse_control = enabled;
    }

    pub fn toggle_mouse_control(&mut self) {
        self.set_mouse_control(!self.mouse_control);
    }

    /// New device-pixel surface size: `floor(width * dpr) x floor(height * dpr)`, dpr >= 1.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> (usize, usize) {
        let dpr = if device_pixel_ratio.is_finite() { device_pixel_ratio.max(1.0) } else { 1.0 };
        let w = (width.max(0.0) * dpr).floor() as usize;
        let h = (height.max(0.0) * dpr).floor() as usize;
        self.surface = (w, h);
        self.surface
    }

    /// e.g. `mouse=on weight=500 dither=0.45 size=0.180 spacing=10`
    pub fn status_line(&self) -> String {
        format!(
            "mouse={} weight={} dither={:.2} size={:.3} spacing={}",
            if self.mouse_control { "on" } else { "off" },
            self.params.weight.round() as i32,
            round_half_up(self.params.dither, 100.0),
            round_half_up(self.params.size, 1000.0),
            self.params.spacing,
        )
    }
}
