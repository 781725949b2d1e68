//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Block colours for grid values 1..=7: green, yellow, red, blue, magenta, cyan, orange.
    pub blocks: [Color; 7],
    /// Empty grid cells.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, tokens).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and empty rack slots.
    pub inactive_fg: Color,
    /// Ghost preview where the piece fits.
    pub ghost_ok: Color,
    /// Ghost preview where it doesn't.
    pub ghost_bad: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

const ONEDARK_BLOCKS: [Color; 7] = [
    Color::from_u32(0x0098_C379), // mem_box / green
    Color::from_u32(0x00E5_C07B), // title / yellow
    Color::from_u32(0x00E0_6C75), // cpu_end / red
    Color::from_u32(0x0061_AFEF), // cpu_box / blue
    Color::from_u32(0x00C6_78DD), // net_box / magenta
    Color::from_u32(0x0056_B6C2), // hi_fg / cyan
    Color::from_u32(0x00D1_9A66), // proc_misc / orange
];

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            blocks: ONEDARK_BLOCKS,
            bg: Color::from_u32(0x0031_353F),
            div_line: Color::from_u32(0x003F_444F),
            main_fg: Color::from_u32(0x00AB_B2BF),
            title: Color::from_u32(0x00E5_C07B),
            inactive_fg: Color::from_u32(0x005C_6370),
            ghost_ok: Color::from_u32(0x0098_C379),
            ghost_bad: Color::from_u32(0x00E0_6C75),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override block colours for high-contrast or colorblind.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.blocks = [
                    Color::from_u32(0x0000_FF00),
                    Color::from_u32(0x00FF_FF00),
                    Color::from_u32(0x00FF_0000),
                    Color::from_u32(0x0000_88FF),
                    Color::from_u32(0x00FF_00FF),
                    Color::from_u32(0x0000_FFFF),
                    Color::from_u32(0x00FF_8800),
                ];
            }
            crate::Palette::Colorblind => {
                // Paul Tol's vibrant set
                self.blocks = [
                    Color::from_u32(0x0000_77BB),
                    Color::from_u32(0x00EE_7733),
                    Color::from_u32(0x0000_9988),
                    Color::from_u32(0x00CC_3311),
                    Color::from_u32(0x00EE_3377),
                    Color::from_u32(0x00BB_BB00),
                    Color::from_u32(0x0033_BBEE),
                ];
                self.ghost_ok = Color::from_u32(0x0000_77BB);
                self.ghost_bad = Color::from_u32(0x00EE_7733);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let d = Self::onedark_default();
        let get = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|k| map.get(*k).and_then(|v| parse_hex(v).ok()))
                .unwrap_or(fallback)
        };
        Self {
            blocks: [
                get(&["mem_box", "cpu_start"], d.blocks[0]),
                get(&["title", "cpu_mid"], d.blocks[1]),
                get(&["cpu_end", "temp_end"], d.blocks[2]),
                get(&["cpu_box"], d.blocks[3]),
                get(&["net_box"], d.blocks[4]),
                get(&["hi_fg"], d.blocks[5]),
                get(&["proc_misc", "download_end"], d.blocks[6]),
            ],
            bg: get(&["meter_bg"], d.bg),
            div_line: get(&["div_line"], d.div_line),
            main_fg: get(&["main_fg"], d.main_fg),
            title: get(&["title"], d.title),
            inactive_fg: get(&["inactive_fg"], d.inactive_fg),
            ghost_ok: get(&["mem_box", "cpu_start"], d.ghost_ok),
            ghost_bad: get(&["cpu_end", "temp_end"], d.ghost_bad),
        }
    }

    /// Colour for a grid value; 0 (empty) maps to the background.
    #[inline]
    pub fn block_color(&self, value: u8) -> Color {
        match value {
            0 => self.bg,
            v => self.blocks[(v as usize - 1) % self.blocks.len()],
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .map(|v| v * scale)
            .ok_or_else(bad)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2, 1)?, channel(2..4, 1)?, channel(4..6, 1)?),
        3 => (channel(0..1, 17)?, channel(1..2, 17)?, channel(2..3, 17)?),
        _ => return Err(bad()),
    };
    Ok(Color::Rgb(r, g, b))
}
