use std::fmt;

pub const SMALL_BRUSH: u32 = 4;
pub const LARGE_BRUSH: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(0xff, 0x00, 0x00);
    pub const BLUE: Rgb = Rgb::new(0x00, 0x00, 0xff);
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const GREEN: Rgb = Rgb::new(0x00, 0xff, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Accepts `#rrggbb` or `rrggbb`, case-insensitive.
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Everything a hotkey or the tray can ask the overlay to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleOverlay,
    ClearCanvas,
    SetColor(Rgb),
    SetBrushSize(u32),
    ToggleClickThrough,
    Undo,
    Redo,
}

impl Command {
    pub fn describe(&self) -> String {
        match self {
            Command::ToggleOverlay => "Toggle overlay".to_string(),
            Command::ClearCanvas => "Clear canvas".to_string(),
            Command::SetColor(color) => match *color {
                Rgb::RED => "Pen color: red".to_string(),
                Rgb::BLUE => "Pen color: blue".to_string(),
                Rgb::WHITE => "Pen color: white".to_string(),
                Rgb::GREEN => "Pen color: green".to_string(),
                other => format!("Pen color: {other}"),
            },
            Command::SetBrushSize(size) => format!("Brush size: {size}px"),
            Command::ToggleClickThrough => "Toggle click-through".to_string(),
            Command::Undo => "Undo".to_string(),
            Command::Redo => "Redo".to_string(),
        }
    }
}
