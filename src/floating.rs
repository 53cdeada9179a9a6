use crate::appearance::{AppearanceDescriptor, LabelMode, RuleKey};
use crate::extract::RoleStyles;
use crate::types::{format_px, parse_px};

/// Switches `appearance` to floating labels. The floated label's transform is
/// folded into its font metrics, since the widget only understands sizes.
/// Returns a new descriptor; neither argument is modified.
pub fn handle_appearance_for_floating_label(
    appearance: &AppearanceDescriptor,
    floating_label_rules: &RoleStyles,
) -> AppearanceDescriptor {
    let mut adapted = appearance.clone();
    adapted.labels = LabelMode::Floating;

    let mut floating = floating_label_rules.clone();
    let scale = floating
        .remove("transform")
        .and_then(|transform| transform_scale(&transform));
    if let Some(scale) = scale {
        if let Some(size) = floating.get("fontSize").and_then(|v| parse_px(v)) {
            floating.insert("fontSize".to_string(), format_px(size * scale));
        }
        if let Some(line_height) = floating.get("lineHeight").and_then(|v| parse_px(v)) {
            floating.insert(
                "lineHeight".to_string(),
                format_px((line_height * scale).floor()),
            );
        }
    }

    let resting_size = [
        adapted.rules.get(&RuleKey::LabelResting),
        adapted.rules.get(&RuleKey::Label),
        Some(floating_label_rules),
    ]
    .into_iter()
    .flatten()
    .find_map(|rules| rules.get("fontSize").cloned());

    if !floating.is_empty() {
        adapted.rules.insert(RuleKey::LabelFloating, floating);
    }
    if let Some(size) = resting_size {
        adapted
            .rules
            .entry(RuleKey::LabelResting)
            .or_default()
            .entry("fontSize".to_string())
            .or_insert(size);
    }
    adapted
}

/// Uniform scale factor of a `transform`, averaged over both axes. Transform
/// lists such as `translateY(4px) scale(.75)` multiply the factors of every
/// function. `None` for `none`, for lists that never scale, and for anything
/// unparseable.
pub(crate) fn transform_scale(transform: &str) -> Option<f32> {
    let transform = transform.trim().to_ascii_lowercase();
    let mut rest = transform.as_str();
    let (mut x, mut y) = (1.0f32, 1.0f32);
    let mut scaled = false;
    while !rest.trim().is_empty() {
        let (function, tail) = rest.split_once(')')?;
        rest = tail;
        let (name, args) = function.split_once('(')?;
        let Some((fx, fy)) = function_scale(name.trim(), args)? else {
            continue;
        };
        x *= fx;
        y *= fy;
        scaled = true;
    }
    let scale = (x + y) / 2.0;
    (scaled && scale.is_finite() && scale > 0.0).then_some(scale)
}

/// Per-axis factors of one transform function. `Some(None)` for functions
/// that move or turn without resizing.
fn function_scale(name: &str, args: &str) -> Option<Option<(f32, f32)>> {
    if name.starts_with("translate")
        || name.starts_with("rotate")
        || name.starts_with("skew")
        || name == "perspective"
    {
        return Some(None);
    }
    let args: Vec<f32> = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|arg| !arg.is_empty())
        .map(parse_factor)
        .collect::<Option<_>>()?;
    let length = |parts: &[f32]| parts.iter().map(|v| v * v).sum::<f32>().sqrt();
    let factors = match (name, args.as_slice()) {
        ("matrix", [a, b, c, d, _, _]) => (length(&[*a, *b]), length(&[*c, *d])),
        ("matrix3d", m) if m.len() == 16 => (length(&m[0..3]), length(&m[4..7])),
        ("scale", [x]) => (*x, *x),
        ("scale", [x, y]) | ("scale3d", [x, y, _]) => (*x, *y),
        ("scalex", [x]) => (*x, 1.0),
        ("scaley", [y]) => (1.0, *y),
        ("scalez", [_]) => (1.0, 1.0),
        _ => return None,
    };
    Some(Some(factors))
}

fn parse_factor(raw: &str) -> Option<f32> {
    match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok().map(|v| v / 100.0),
        None => raw.parse::<f32>().ok(),
    }
}
