use std::path::PathBuf;

use bon::Builder;

/// Storage key under which the raw entry text is persisted.
pub const STORAGE_KEY: &str = "class_spin_picker_entries";

/// Minimum segment count for a single-winner spin.
pub const MIN_SEGMENTS_SINGLE: usize = 2;
/// Minimum segment count for a dual-winner spin.
pub const MIN_SEGMENTS_DUAL: usize = 3;

/// Color representation for wheel and UI elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

// Slate tones used by the chrome around the wheel.
pub const BACKGROUND: Color = Color::from_hex(0x0f172a);
pub const PANEL: Color = Color::from_hex(0x1e293b);
pub const PANEL_BORDER: Color = Color::from_hex(0x334155);
pub const TEXT: Color = Color::from_hex(0xf1f5f9);
pub const TEXT_MUTED: Color = Color::from_hex(0x94a3b8);
pub const TEXT_DIM: Color = Color::from_hex(0x64748b);
pub const ACCENT: Color = Color::from_hex(0x3b82f6);
pub const DANGER: Color = Color::from_hex(0xf87171);
pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);

pub fn default_palette() -> Vec<Color> {
    [
        0xef4444, 0xf97316, 0xf59e0b, 0x84cc16, 0x10b981, 0x14b8a6, 0x06b6d4, 0x3b82f6,
        0x6366f1, 0x8b5cf6, 0xd946ef, 0xec4899,
    ]
    .into_iter()
    .map(Color::from_hex)
    .collect()
}

pub fn default_roster() -> Vec<String> {
    [
        "Ava", "Ben", "Chloe", "Daniel", "Emma", "Felix", "Grace", "Hugo", "Isla", "Jack",
        "Kai", "Lily", "Mason", "Nora", "Oscar", "Poppy",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Physics of a single spin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinTuning {
    /// Lower bound of the seeded angular velocity, radians per frame.
    pub min_velocity: f64,
    /// Upper bound (exclusive) of the seeded angular velocity.
    pub max_velocity: f64,
    /// Multiplicative decay applied every frame.
    pub decay: f64,
    /// Velocity below which the wheel is considered at rest.
    pub epsilon: f64,
    /// Fixed pointer position; 0 is 3 o'clock.
    pub pointer_angle: f64,
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            min_velocity: 0.3,
            max_velocity: 0.7,
            decay: 0.985,
            epsilon: 0.001,
            pointer_angle: 0.0,
        }
    }
}

#[derive(Debug, Clone, Builder)]
pub struct PickerConfig {
    #[builder(default = "ClassSpin".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 960)]
    pub window_width: usize,
    #[builder(default = 640)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Wheel geometry
    #[builder(default = 20)]
    pub wheel_margin: i32,
    #[builder(default = 45)]
    pub hub_radius: i32,
    #[builder(default = 40.0)]
    pub label_inset: f64,
    #[builder(default = 15)]
    pub label_max_chars: usize,
    #[builder(default = 20)]
    pub pointer_size: i32,

    // Text sizes
    #[builder(default = 20.0)]
    pub list_font_size: f32,
    #[builder(default = 18.0)]
    pub button_font_size: f32,
    #[builder(default = 56.0)]
    pub winner_font_size: f32,

    // Spin behavior
    #[builder(default)]
    pub spin: SpinTuning,
    #[builder(default = false)]
    pub pick_two: bool,

    // Content
    #[builder(default = default_palette())]
    pub palette: Vec<Color>,
    #[builder(default = default_roster())]
    pub default_roster: Vec<String>,

    // Persistence & resources
    pub storage_path: Option<PathBuf>,
    pub font_path: Option<PathBuf>,

    // Celebration
    #[builder(default = false)]
    pub mute: bool,
    #[builder(default = 150)]
    pub confetti_count: usize,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_unpack_channels() {
        assert_eq!(Color::from_hex(0x3b82f6), Color::new(0x3b, 0x82, 0xf6));
        assert_eq!(Color::from_hex(0x3b82f6).as_tuple(), (0x3b, 0x82, 0xf6));
    }

    #[test]
    fn builder_defaults_match_default_config() {
        let config = PickerConfig::default();
        assert_eq!(config.title, "ClassSpin");
        assert_eq!(config.label_max_chars, 15);
        assert_eq!(config.spin, SpinTuning::default());
        assert_eq!(config.palette.len(), 12);
        assert!(config.storage_path.is_none());
        assert!(!config.pick_two);
    }

    #[test]
    fn builder_overrides_single_fields() {
        let config = PickerConfig::builder()
            .window_width(400)
            .pick_two(true)
            .mute(true)
            .build();
        assert_eq!(config.window_width, 400);
        assert_eq!(config.window_height, 640);
        assert!(config.pick_two);
        assert!(config.mute);
    }
}
