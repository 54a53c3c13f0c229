use bevy::prelude::*;
use once_cell::sync::Lazy;
use serde::Deserialize;

const DRESSER_UI_JSON: &str = include_str!("./content/dresser_ui.json");

static EMBEDDED_CONFIG: Lazy<DresserUiConfig> = Lazy::new(DresserUiConfig::load_embedded);

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    NonPositive { field: &'static str, value: i32 },
    DegenerateGrid { available_width: i32, slot_size: i32 },
    EmptyGridHeight { available_height: i32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "{message}"),
            Self::NonPositive { field, value } => {
                write!(f, "`{field}` must be positive, got {value}")
            }
            Self::DegenerateGrid {
                available_width,
                slot_size,
            } => write!(
                f,
                "grid area is {available_width}px wide, narrower than one {slot_size}px slot"
            ),
            Self::EmptyGridHeight { available_height } => {
                write!(f, "grid area has no visible height ({available_height}px)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Pixel insets between the window edge and the item grid.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

/// Fixed layout constants of the popup window, in screen pixels.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PopupLayout {
    pub title: String,
    pub window_width: i32,
    pub window_height: i32,
    pub insets: Insets,
    pub slot_size: i32,
    pub pixels_per_scroll: i32,
    pub title_offset_y: i32,
    pub title_background_width: i32,
    pub title_background_height: i32,
    pub title_font_size: f32,
    pub close_button_size: i32,
    pub close_button_margin: i32,
}

impl PopupLayout {
    pub fn window_size(&self) -> IVec2 {
        IVec2::new(self.window_width, self.window_height)
    }

    pub fn available_width(&self) -> i32 {
        self.window_width - self.insets.left - self.insets.right
    }

    pub fn available_height(&self) -> i32 {
        self.window_height - self.insets.top - self.insets.bottom
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("window_width", self.window_width),
            ("window_height", self.window_height),
            ("slot_size", self.slot_size),
            ("pixels_per_scroll", self.pixels_per_scroll),
            ("close_button_size", self.close_button_size),
        ];
        if let Some((field, value)) = sizes.into_iter().find(|(_, value)| *value <= 0) {
            return Err(ConfigError::NonPositive { field, value });
        }

        let available_width = self.available_width();
        if available_width < self.slot_size {
            return Err(ConfigError::DegenerateGrid {
                available_width,
                slot_size: self.slot_size,
            });
        }

        let available_height = self.available_height();
        if available_height <= 0 {
            return Err(ConfigError::EmptyGridHeight { available_height });
        }

        Ok(())
    }
}

impl Default for PopupLayout {
    fn default() -> Self {
        Self {
            title: String::from("Outfits"),
            window_width: 800,
            window_height: 600,
            insets: Insets {
                top: 104,
                left: 32,
                bottom: 40,
                right: 32,
            },
            slot_size: 64,
            pixels_per_scroll: 64,
            title_offset_y: 20,
            title_background_width: 256,
            title_background_height: 64,
            title_font_size: 28.0,
            close_button_size: 64,
            close_button_margin: 16,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerButton {
    Left,
    #[default]
    Right,
    Middle,
}

impl From<TriggerButton> for MouseButton {
    fn from(button: TriggerButton) -> Self {
        match button {
            TriggerButton::Left => MouseButton::Left,
            TriggerButton::Right => MouseButton::Right,
            TriggerButton::Middle => MouseButton::Middle,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Only this area's furniture is ever tracked.
    pub home_area: String,
    /// Case-insensitive substring matched against furniture item ids.
    pub keyword: String,
    pub trigger: TriggerButton,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            home_area: String::from("FarmHouse"),
            keyword: String::from("dresser"),
            trigger: TriggerButton::Right,
        }
    }
}

/// Texture paths handed to the asset server. `None` draws flat colour.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetPaths {
    pub title_background: Option<String>,
    pub close_button: Option<String>,
    pub slot_background: Option<String>,
}

#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
pub struct DresserUiConfig {
    pub popup: PopupLayout,
    pub detector: DetectorConfig,
    pub assets: AssetPaths,
    /// Screen size assumed when the host has no primary window.
    pub fallback_viewport: [i32; 2],
}

impl DresserUiConfig {
    /// The embedded configuration, or the built-in defaults if it fails to load.
    pub fn load() -> Self {
        EMBEDDED_CONFIG.clone()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|error| {
            ConfigError::Parse(format!("failed to parse dresser ui config: {error}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.popup.validate()
    }

    pub fn fallback_viewport(&self) -> IVec2 {
        IVec2::from_array(self.fallback_viewport)
    }

    fn load_embedded() -> Self {
        match Self::from_json(DRESSER_UI_JSON) {
            Ok(config) => config,
            Err(error) => {
                warn!("failed to load dresser ui config: {error}; using safe defaults");
                Self::default()
            }
        }
    }
}

impl Default for DresserUiConfig {
    fn default() -> Self {
        Self {
            popup: PopupLayout::default(),
            detector: DetectorConfig::default(),
            assets: AssetPaths::default(),
            fallback_viewport: [1280, 720],
        }
    }
}
