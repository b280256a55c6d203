//! Color parsing and the resolved theme

use ratatui::style::Color;

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parse hex color string (e.g., "#2ecc71" or "2ecc71")
pub fn parse_hex(s: &str) -> Result<Rgb, String> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return Err(format!(
            "invalid hex color: expected 6 characters, got {}",
            s.len()
        ));
    }

    let channel = |range: std::ops::Range<usize>, name: &str| {
        u8::from_str_radix(&s[range], 16)
            .map_err(|_| format!("invalid hex color: bad {} component in '{}'", name, s))
    };

    Ok(Rgb {
        r: channel(0..2, "red")?,
        g: channel(2..4, "green")?,
        b: channel(4..6, "blue")?,
    })
}

/// Parse ANSI color name to ratatui Color
pub fn parse_ansi_name(name: &str) -> Option<Color> {
    match name.to_lowercase().replace('-', "_").as_str() {
        "default" | "reset" => Some(Color::Reset),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "light_red" | "lightred" => Some(Color::LightRed),
        "light_green" | "lightgreen" => Some(Color::LightGreen),
        "light_yellow" | "lightyellow" => Some(Color::LightYellow),
        "light_blue" | "lightblue" => Some(Color::LightBlue),
        "light_magenta" | "lightmagenta" => Some(Color::LightMagenta),
        "light_cyan" | "lightcyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        _ => None,
    }
}

/// Resolve a color string: hex or ANSI name
pub fn resolve_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if value.starts_with('#') {
        return parse_hex(value)
            .ok()
            .map(|rgb| Color::Rgb(rgb.r, rgb.g, rgb.b));
    }
    parse_ansi_name(value)
}

/// Map a ratatui color onto crossterm's for plain-terminal output
pub fn to_crossterm(color: Color) -> crossterm::style::Color {
    use crossterm::style::Color as Ct;
    match color {
        Color::Reset => Ct::Reset,
        Color::Black => Ct::Black,
        Color::Red => Ct::DarkRed,
        Color::Green => Ct::DarkGreen,
        Color::Yellow => Ct::DarkYellow,
        Color::Blue => Ct::DarkBlue,
        Color::Magenta => Ct::DarkMagenta,
        Color::Cyan => Ct::DarkCyan,
        Color::Gray => Ct::Grey,
        Color::DarkGray => Ct::DarkGrey,
        Color::LightRed => Ct::Red,
        Color::LightGreen => Ct::Green,
        Color::LightYellow => Ct::Yellow,
        Color::LightBlue => Ct::Blue,
        Color::LightMagenta => Ct::Magenta,
        Color::LightCyan => Ct::Cyan,
        Color::White => Ct::White,
        Color::Rgb(r, g, b) => Ct::Rgb { r, g, b },
        Color::Indexed(i) => Ct::AnsiValue(i),
    }
}

/// Resolved theme, all ratatui Colors ready to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub added: Color,
    pub removed: Color,
    pub muted: Color,
    pub accent: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::Reset,
            added: Color::Green,
            removed: Color::Red,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}
