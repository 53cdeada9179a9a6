/// sRGB color with channels in `0.0..=1.0`. Alpha travels separately, the way
/// parsed CSS colors are handed around in this crate: `(Color, alpha)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn channels(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// Perceived brightness on the 0..=255 scale (ITU-R BT.601 weights).
    pub fn brightness(self) -> f32 {
        let [r, g, b] = self.channels();
        (r as f32 * 299.0 + g as f32 * 587.0 + b as f32 * 114.0) / 1000.0
    }

    pub fn mix(self, other: Color, amount: f32) -> Color {
        let amount = amount.clamp(0.0, 1.0);
        Color::rgb(
            self.r + (other.r - self.r) * amount,
            self.g + (other.g - self.g) * amount,
            self.b + (other.b - self.b) * amount,
        )
    }
}

pub(crate) fn blend_over_white(color: Color, alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha >= 1.0 {
        return color;
    }
    Color::rgb(
        color.r * alpha + (1.0 - alpha),
        color.g * alpha + (1.0 - alpha),
        color.b * alpha + (1.0 - alpha),
    )
}

pub(crate) fn format_rgb(color: Color) -> String {
    let [r, g, b] = color.channels();
    format!("rgb({}, {}, {})", r, g, b)
}

pub(crate) fn format_rgba(color: Color, alpha: f32) -> String {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha >= 1.0 {
        return format_rgb(color);
    }
    let [r, g, b] = color.channels();
    format!("rgba({}, {}, {}, {})", r, g, b, format_number(alpha))
}

pub(crate) fn parse_color(raw: &str) -> Option<(Color, f32)> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(named) = named_color(&lower) {
        return Some(named);
    }
    let (name, inner) = lower.strip_suffix(')')?.split_once('(')?;
    let (args, alpha) = split_color_args(inner);
    let alpha = match alpha {
        Some(alpha) => parse_alpha(alpha)?,
        None => 1.0,
    };
    let color = match (name.trim(), args.as_slice()) {
        ("rgb" | "rgba", [r, g, b]) => {
            Color::rgb(parse_channel(r)?, parse_channel(g)?, parse_channel(b)?)
        }
        ("hsl" | "hsla", [h, s, l]) => {
            hsl_to_rgb(parse_hue(h)?, parse_percent(s)?, parse_percent(l)?)
        }
        ("color", ["srgb", r, g, b]) => {
            Color::rgb(parse_unit(r)?, parse_unit(g)?, parse_unit(b)?)
        }
        _ => return None,
    };
    Some((color, alpha))
}

/// Splits function arguments into channel tokens and an optional alpha,
/// taken either after `/` or as a fourth comma argument.
pub(crate) fn split_color_args(inner: &str) -> (Vec<&str>, Option<&str>) {
    let (channels, slash_alpha) = match inner.split_once('/') {
        Some((channels, alpha)) => (channels, Some(alpha.trim())),
        None => (inner, None),
    };
    let mut parts: Vec<&str> = channels
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if slash_alpha.is_some() {
        return (parts, slash_alpha);
    }
    if channels.contains(',') && parts.len() == 4 {
        let alpha = parts.pop();
        return (parts, alpha);
    }
    (parts, None)
}

fn parse_hue(raw: &str) -> Option<f32> {
    let degrees = if let Some(turns) = raw.strip_suffix("turn") {
        turns.parse::<f32>().ok()? * 360.0
    } else if let Some(rad) = raw.strip_suffix("rad") {
        rad.parse::<f32>().ok()?.to_degrees()
    } else if let Some(grad) = raw.strip_suffix("grad") {
        grad.parse::<f32>().ok()? * 0.9
    } else {
        raw.strip_suffix("deg").unwrap_or(raw).parse::<f32>().ok()?
    };
    degrees.is_finite().then_some(degrees.rem_euclid(360.0))
}

fn parse_percent(raw: &str) -> Option<f32> {
    let value = raw.strip_suffix('%').unwrap_or(raw).parse::<f32>().ok()? / 100.0;
    value.is_finite().then_some(value.clamp(0.0, 1.0))
}

fn parse_unit(raw: &str) -> Option<f32> {
    let value = match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok()? / 100.0,
        None => raw.parse::<f32>().ok()?,
    };
    value.is_finite().then_some(value.clamp(0.0, 1.0))
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Color {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    Color::rgb(r + m, g + m, b + m)
}

fn parse_channel(raw: &str) -> Option<f32> {
    let value = match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok()? / 100.0,
        None => raw.parse::<f32>().ok()? / 255.0,
    };
    value.is_finite().then_some(value.clamp(0.0, 1.0))
}

fn parse_alpha(raw: &str) -> Option<f32> {
    let value = match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok()? / 100.0,
        None => raw.parse::<f32>().ok()?,
    };
    value.is_finite().then_some(value.clamp(0.0, 1.0))
}

fn parse_hex_color(hex: &str) -> Option<(Color, f32)> {
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|ch| [ch, ch]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };
    let byte = |idx: usize| u8::from_str_radix(expanded.get(idx..idx + 2)?, 16).ok();
    let color = Color::from_u8(byte(0)?, byte(2)?, byte(4)?);
    let alpha = if expanded.len() == 8 {
        byte(6)? as f32 / 255.0
    } else {
        1.0
    };
    Some((color, alpha))
}

fn named_color(name: &str) -> Option<(Color, f32)> {
    let color = match name {
        "transparent" => return Some((Color::BLACK, 0.0)),
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::from_u8(255, 0, 0),
        "green" => Color::from_u8(0, 128, 0),
        "blue" => Color::from_u8(0, 0, 255),
        "gray" | "grey" => Color::from_u8(128, 128, 128),
        "silver" => Color::from_u8(192, 192, 192),
        "maroon" => Color::from_u8(128, 0, 0),
        "purple" => Color::from_u8(128, 0, 128),
        "navy" => Color::from_u8(0, 0, 128),
        "teal" => Color::from_u8(0, 128, 128),
        "orange" => Color::from_u8(255, 165, 0),
        "yellow" => Color::from_u8(255, 255, 0),
        _ => return None,
    };
    Some((color, 1.0))
}

/// Parses a px length. A bare `0` counts as `0px`; other unitless numbers do not.
pub(crate) fn parse_px(raw: &str) -> Option<f32> {
    let s = raw.trim();
    if let Some(number) = s.strip_suffix("px") {
        return number.trim().parse::<f32>().ok().filter(|v| v.is_finite());
    }
    s.parse::<f32>().ok().filter(|v| *v == 0.0)
}

pub(crate) fn format_px(value: f32) -> String {
    format!("{}px", format_number(value))
}

pub(crate) fn format_number(value: f32) -> String {
    let rounded = (value as f64 * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let mut out = format!("{:.3}", rounded);
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    out
}

/// Splits a CSS value on top-level whitespace, keeping `rgb(0, 0, 0)` and
/// quoted family names intact.
pub(crate) fn split_css_tokens(raw: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for ch in raw.chars() {
        match ch {
            '"' | '\'' if quote == Some(ch) => {
                quote = None;
                current.push(ch);
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(ch);
                current.push(ch);
            }
            '(' if quote.is_none() => {
                depth += 1;
                current.push(ch);
            }
            ')' if quote.is_none() => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if c.is_whitespace() && depth == 0 && quote.is_none() => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_rgb_and_named_colors() {
        let (color, alpha) = parse_color("#6d6d6d").expect("hex");
        assert_eq!(color.channels(), [109, 109, 109]);
        assert_eq!(alpha, 1.0);

        let (color, alpha) = parse_color("rgba(0,0,0,0)").expect("rgba");
        assert_eq!(color.channels(), [0, 0, 0]);
        assert_eq!(alpha, 0.0);

        let (color, alpha) = parse_color("rgb(150 88 138 / 50%)").expect("space syntax");
        assert_eq!(color.channels(), [150, 88, 138]);
        assert!((alpha - 0.5).abs() < 1e-6);

        let (_, alpha) = parse_color("#00000080").expect("hex alpha");
        assert!((alpha - 128.0 / 255.0).abs() < 1e-6);

        assert_eq!(parse_color("transparent").map(|(_, a)| a), Some(0.0));
        assert!(parse_color("var(--accent)").is_none());
        assert!(parse_color("rgb(1, 2)").is_none());
    }

    #[test]
    fn parses_hsl_and_srgb_functions() {
        let (color, alpha) = parse_color("hsl(0, 100%, 50%)").expect("hsl");
        assert_eq!(color.channels(), [255, 0, 0]);
        assert_eq!(alpha, 1.0);

        let (color, _) = parse_color("hsl(120deg 100% 25%)").expect("hsl space syntax");
        assert_eq!(color.channels(), [0, 128, 0]);

        let (color, alpha) = parse_color("hsla(0, 0%, 0%, 0.5)").expect("hsla");
        assert_eq!(color.channels(), [0, 0, 0]);
        assert!((alpha - 0.5).abs() < 1e-6);

        let (_, alpha) = parse_color("hsl(0 0% 0% / 50%)").expect("hsl slash alpha");
        assert!((alpha - 0.5).abs() < 1e-6);

        let (color, alpha) = parse_color("color(srgb 1 0.5 0 / 0.25)").expect("color()");
        assert_eq!(color.channels(), [255, 128, 0]);
        assert!((alpha - 0.25).abs() < 1e-6);

        assert!(parse_color("color(display-p3 1 0 0)").is_none());
        assert!(parse_color("oklch(0.5 0.1 20)").is_none());
    }

    #[test]
    fn formats_like_computed_style_serialization() {
        assert_eq!(format_rgb(Color::from_u8(1, 2, 3)), "rgb(1, 2, 3)");
        assert_eq!(format_rgba(Color::BLACK, 0.0), "rgba(0, 0, 0, 0)");
        assert_eq!(format_rgba(Color::BLACK, 0.25), "rgba(0, 0, 0, 0.25)");
        assert_eq!(format_rgba(Color::WHITE, 1.0), "rgb(255, 255, 255)");
    }

    #[test]
    fn blend_over_white_composites_translucent_colors() {
        let blended = blend_over_white(Color::BLACK, 0.5);
        assert_eq!(blended.channels(), [128, 128, 128]);
        assert_eq!(blend_over_white(Color::BLACK, 1.0), Color::BLACK);
    }

    #[test]
    fn px_helpers() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px("0"), Some(0.0));
        assert_eq!(parse_px("1.5"), None);
        assert_eq!(parse_px("normal"), None);
        assert_eq!(format_px(14.0), "14px");
        assert_eq!(format_px(12.25), "12.25px");
        assert_eq!(format_px(0.0), "0px");
    }

    #[test]
    fn splits_on_top_level_whitespace_only() {
        assert_eq!(
            split_css_tokens("1px solid rgb(150, 88, 138)"),
            vec!["1px", "solid", "rgb(150, 88, 138)"]
        );
        assert_eq!(
            split_css_tokens("italic 700 14px/1.5 \"Source Sans Pro\", serif"),
            vec!["italic", "700", "14px/1.5", "\"Source Sans Pro\",", "serif"]
        );
    }
}
