use crate::extract::RoleStyles;
use crate::scope::{Scope, StyleDeclaration};
use crate::types::{
    Color, blend_over_white, format_rgb, format_rgba, parse_color, split_color_args,
};

pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

const HOVER_MIX: f32 = 0.1;
const LIGHT_THRESHOLD: f32 = 128.0;
const HOVER_PROPERTIES: &[&str] = &["color", "backgroundColor", "borderColor"];

/// `"<width> <style> <color>"`, or an empty string when width or color is
/// missing. A missing style falls back to `solid`.
pub fn generate_outline_style(
    width: Option<&str>,
    style: Option<&str>,
    color: Option<&str>,
) -> String {
    fn present(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }
    let (Some(width), Some(color)) = (present(width), present(color)) else {
        return String::new();
    };
    let style = present(style).unwrap_or("solid");
    format!("{width} {style} {color}")
}

/// Approximates a `:hover` variant of `base` by nudging its colors 10% away
/// from their current lightness. Returns a fresh map.
pub fn generate_hover_rules(base: &RoleStyles) -> RoleStyles {
    let mut hover = RoleStyles::new();
    for property in HOVER_PROPERTIES {
        let Some((color, alpha)) = base.get(*property).and_then(|value| parse_color(value)) else {
            continue;
        };
        if alpha <= 0.0 {
            continue;
        }
        let target = if is_light(color, alpha) {
            Color::BLACK
        } else {
            Color::WHITE
        };
        hover.insert(
            property.to_string(),
            format_rgba(color.mix(target, HOVER_MIX), alpha),
        );
    }
    hover
}

/// First non-transparent background along `selectors`, else
/// [`DEFAULT_BACKGROUND_COLOR`].
pub fn get_background_color<S: Scope>(selectors: &[&str], scope: &S) -> String {
    resolve_background_color(selectors, scope).unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string())
}

/// Walks the fallback chain; `None` when every candidate is missing,
/// transparent, or unparseable.
pub fn resolve_background_color<S: Scope>(selectors: &[&str], scope: &S) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let node = scope.query_selector(selector)?;
        let value = scope
            .computed_style(&node)
            .get_property_value("background-color");
        let value = value.trim();
        let (_, alpha) = parse_color(value)?;
        (alpha > 0.0).then(|| value.to_string())
    })
}

/// Light/dark split used to pick the widget's base theme. Unparseable input
/// counts as light.
pub fn is_color_light(color: &str) -> bool {
    match parse_color(color) {
        Some((color, alpha)) => is_light(color, alpha),
        None => true,
    }
}

fn is_light(color: Color, alpha: f32) -> bool {
    blend_over_white(color, alpha).brightness() >= LIGHT_THRESHOLD
}

/// Rewrites any alpha-bearing color as its composite over white. Values that
/// already carry three channels, and values that are not colors, come back
/// untouched. Color functions this crate cannot composite lose their alpha
/// argument instead.
pub fn maybe_convert_rgba_to_rgb(color: &str) -> String {
    let trimmed = color.trim();
    let Some((parsed, alpha)) = parse_color(trimmed) else {
        return drop_alpha_argument(trimmed).unwrap_or_else(|| trimmed.to_string());
    };
    let lower = trimmed.to_ascii_lowercase();
    let four_channel = lower.starts_with("rgba") || lower.starts_with("hsla");
    if alpha < 1.0 || four_channel {
        format_rgb(blend_over_white(parsed, alpha))
    } else {
        trimmed.to_string()
    }
}

/// `oklch(0.5 0.1 20 / 0.5)` becomes `oklch(0.5 0.1 20)`; a fourth comma
/// argument is dropped the same way.
fn drop_alpha_argument(value: &str) -> Option<String> {
    let (name, inner) = value.strip_suffix(')')?.split_once('(')?;
    let (channels, alpha) = split_color_args(inner);
    alpha?;
    let separator = if inner.contains(',') { ", " } else { " " };
    let name = match name.trim() {
        "rgba" => "rgb",
        "hsla" => "hsl",
        other => other,
    };
    Some(format!("{name}({})", channels.join(separator)))
}
