use crate::config::ThemeName;
use coaster_core::CategoryColor;
use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Unselected tile background
    pub tile_bg: Color,
    /// Selected tile background
    pub selected_bg: Color,
    /// Tile under the cursor
    pub cursor: Color,
    /// Text drawn on solved rows
    pub solved_fg: Color,
    /// Remaining-mistake markers
    pub mistake: Color,
    pub error: Color,
    pub success: Color,
    /// Info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            tile_bg: Color::Rgb { r: 45, g: 50, b: 65 },
            selected_bg: Color::Rgb { r: 90, g: 95, b: 120 },
            cursor: Color::Rgb { r: 255, g: 210, b: 100 },
            solved_fg: Color::Rgb { r: 20, g: 22, b: 30 },
            mistake: Color::Rgb { r: 160, g: 165, b: 185 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            tile_bg: Color::Rgb { r: 225, g: 225, b: 235 },
            selected_bg: Color::Rgb { r: 90, g: 95, b: 120 },
            cursor: Color::Rgb { r: 200, g: 120, b: 20 },
            solved_fg: Color::Rgb { r: 30, g: 30, b: 40 },
            mistake: Color::Rgb { r: 90, g: 90, b: 110 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    /// Background of a solved row
    pub fn group_color(&self, color: CategoryColor) -> Color {
        hex_to_color(color.hex()).unwrap_or(self.tile_bg)
    }
}

/// Parse `#rrggbb`
pub fn hex_to_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}
