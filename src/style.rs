use crate::scope::StyleDeclaration;
use crate::types::{format_px, format_rgba, parse_color, parse_px, split_css_tokens};
use kuchiki::{NodeRef, Selectors};
use lightningcss::properties::Property;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute, StyleSheet};
use lightningcss::traits::ToCss;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

const ROOT_FONT_SIZE_PX: f32 = 16.0;
const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

// (name, initial value, inherited)
const LONGHANDS: &[(&str, &str, bool)] = &[
    ("color", "rgb(0, 0, 0)", true),
    ("font-family", "serif", true),
    ("font-size", "16px", true),
    ("font-style", "normal", true),
    ("font-variant", "normal", true),
    ("font-weight", "400", true),
    ("letter-spacing", "normal", true),
    ("line-height", "normal", true),
    ("text-indent", "0px", true),
    ("text-transform", "none", true),
    ("text-shadow", "none", true),
    ("visibility", "visible", true),
    ("text-decoration", "none", false),
    ("background-color", "rgba(0, 0, 0, 0)", false),
    ("padding-top", "0px", false),
    ("padding-right", "0px", false),
    ("padding-bottom", "0px", false),
    ("padding-left", "0px", false),
    ("margin-top", "0px", false),
    ("margin-right", "0px", false),
    ("margin-bottom", "0px", false),
    ("margin-left", "0px", false),
    ("border-top-width", "medium", false),
    ("border-right-width", "medium", false),
    ("border-bottom-width", "medium", false),
    ("border-left-width", "medium", false),
    ("border-top-style", "none", false),
    ("border-right-style", "none", false),
    ("border-bottom-style", "none", false),
    ("border-left-style", "none", false),
    ("border-top-color", "currentcolor", false),
    ("border-right-color", "currentcolor", false),
    ("border-bottom-color", "currentcolor", false),
    ("border-left-color", "currentcolor", false),
    ("border-radius", "0px", false),
    ("box-shadow", "none", false),
    ("outline-width", "medium", false),
    ("outline-style", "none", false),
    ("outline-color", "currentcolor", false),
    ("outline-offset", "0px", false),
    ("transition", "all 0s ease 0s", false),
    ("transform", "none", false),
    ("display", "inline", false),
    ("position", "static", false),
    ("overflow", "visible", false),
    ("width", "auto", false),
    ("height", "auto", false),
];

const LENGTH_PROPERTIES: &[&str] = &[
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "border-radius",
    "outline-offset",
    "text-indent",
    "letter-spacing",
    "width",
    "height",
];

const LINE_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
    "auto",
];

struct RuleEntry {
    selectors: Selectors,
    order: usize,
    normal: Vec<(String, String)>,
    important: Vec<(String, String)>,
}

/// Author-origin cascade over kuchiki nodes.
pub(crate) struct StyleResolver {
    rules: Vec<RuleEntry>,
}

impl StyleResolver {
    pub fn new(css: &str) -> Self {
        let mut rules = Vec::new();
        if !css.trim().is_empty() {
            if let Ok(sheet) = StyleSheet::parse(css, ParserOptions::default()) {
                append_rule_list(&sheet.rules, &mut rules);
            }
        }
        Self { rules }
    }

    pub fn compute(&self, node: &NodeRef) -> ComputedStyle {
        let parent = node
            .parent()
            .filter(|parent| parent.as_element().is_some())
            .map(|parent| self.compute(&parent));
        self.compute_with_parent(node, parent.as_ref())
    }

    fn compute_with_parent(&self, node: &NodeRef, parent: Option<&ComputedStyle>) -> ComputedStyle {
        let declared = self.cascade(node);
        let parent_value = |name: &str| parent.and_then(|p| p.values.get(name).cloned());

        let mut values: BTreeMap<String, String> = BTreeMap::new();
        for &(name, initial, inherited) in LONGHANDS {
            let specified = match declared.get(name).map(String::as_str) {
                Some("inherit") => parent_value(name).unwrap_or_else(|| initial.to_string()),
                Some("initial") => initial.to_string(),
                Some("unset") if inherited => {
                    parent_value(name).unwrap_or_else(|| initial.to_string())
                }
                Some("unset") => initial.to_string(),
                Some(value) => value.to_string(),
                None if inherited => parent_value(name).unwrap_or_else(|| initial.to_string()),
                None => initial.to_string(),
            };
            values.insert(name.to_string(), specified);
        }
        for (name, value) in &declared {
            if !values.contains_key(name.as_str()) {
                values.insert(name.clone(), value.clone());
            }
        }

        let parent_font = parent
            .and_then(|p| p.values.get("font-size"))
            .and_then(|v| parse_px(v))
            .unwrap_or(ROOT_FONT_SIZE_PX);
        let font_px = values
            .get("font-size")
            .and_then(|v| resolve_font_size(v, parent_font))
            .unwrap_or(parent_font);
        values.insert("font-size".to_string(), format_px(font_px));
        if let Some(weight) = values.get_mut("font-weight") {
            *weight = normalize_font_weight(weight);
        }

        for name in LENGTH_PROPERTIES {
            if let Some(value) = values.get_mut(*name) {
                *value = resolve_length(value, font_px);
            }
        }
        if let Some(line_height) = values.get_mut("line-height") {
            *line_height = resolve_line_height(line_height, font_px);
        }

        let parent_color = parent
            .and_then(|p| p.values.get("color").cloned())
            .unwrap_or_else(|| "rgb(0, 0, 0)".to_string());
        let color = values
            .get("color")
            .map(|v| normalize_color(v, &parent_color))
            .unwrap_or_else(|| parent_color.clone());
        values.insert("color".to_string(), color.clone());
        for name in [
            "background-color",
            "border-top-color",
            "border-right-color",
            "border-bottom-color",
            "border-left-color",
            "outline-color",
        ] {
            if let Some(value) = values.get_mut(name) {
                *value = normalize_color(value, &color);
            }
        }

        for side in SIDES {
            resolve_line_width(&mut values, &format!("border-{side}"), font_px);
        }
        resolve_line_width(&mut values, "outline", font_px);

        ComputedStyle { values }
    }

    fn cascade(&self, node: &NodeRef) -> HashMap<String, String> {
        let mut declared = HashMap::new();
        let Some(element) = node.clone().into_element_ref() else {
            return declared;
        };

        let mut matched = Vec::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            let best = rule
                .selectors
                .0
                .iter()
                .filter(|selector| selector.matches(&element))
                .map(|selector| selector.specificity())
                .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            if let Some(specificity) = best {
                matched.push((specificity, rule.order, idx));
            }
        }
        matched.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let inline = element
            .attributes
            .borrow()
            .get("style")
            .map(|style| style.to_string());
        let (inline_normal, inline_important) = inline
            .as_deref()
            .map(parse_inline_style)
            .unwrap_or_default();

        for &(_, _, idx) in &matched {
            apply_declarations(&mut declared, &self.rules[idx].normal);
        }
        apply_declarations(&mut declared, &inline_normal);
        for &(_, _, idx) in &matched {
            apply_declarations(&mut declared, &self.rules[idx].important);
        }
        apply_declarations(&mut declared, &inline_important);
        declared
    }
}

fn append_rule_list(rules: &CssRuleList<'_>, out: &mut Vec<RuleEntry>) {
    for rule in &rules.0 {
        match rule {
            CssRule::Style(style) => {
                let Ok(selector_text) = style.selectors.to_css_string(PrinterOptions::default())
                else {
                    continue;
                };
                let Ok(selectors) = Selectors::compile(&selector_text) else {
                    continue;
                };
                let order = out.len();
                out.push(RuleEntry {
                    selectors,
                    order,
                    normal: expand_properties(&style.declarations.declarations),
                    important: expand_properties(&style.declarations.important_declarations),
                });
            }
            CssRule::Media(media) => {
                let query = media
                    .query
                    .to_css_string(PrinterOptions::default())
                    .unwrap_or_default();
                if query.trim().eq_ignore_ascii_case("print") {
                    continue;
                }
                append_rule_list(&media.rules, out);
            }
            _ => {}
        }
    }
}

fn parse_inline_style(style: &str) -> (Vec<(String, String)>, Vec<(String, String)>) {
    match StyleAttribute::parse(style, ParserOptions::default()) {
        Ok(attr) => (
            expand_properties(&attr.declarations.declarations),
            expand_properties(&attr.declarations.important_declarations),
        ),
        Err(_) => (Vec::new(), Vec::new()),
    }
}

fn apply_declarations(declared: &mut HashMap<String, String>, props: &[(String, String)]) {
    for (name, value) in props {
        declared.insert(name.clone(), value.clone());
    }
}

fn expand_properties(props: &[Property]) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for prop in props {
        let name = prop.property_id().name().to_ascii_lowercase();
        let Ok(value) = prop.value_to_css_string(PrinterOptions::default()) else {
            continue;
        };
        expand_declaration(&name, value.trim(), &mut out);
    }
    out
}

fn expand_declaration(name: &str, value: &str, out: &mut Vec<(String, String)>) {
    let is_global = matches!(value, "inherit" | "initial" | "unset");
    match name {
        "padding" | "margin" => {
            let sides = box_sides(value, is_global);
            for (side, side_value) in SIDES.iter().zip(sides) {
                out.push((format!("{name}-{side}"), side_value));
            }
        }
        "border-width" | "border-style" | "border-color" => {
            let suffix = &name["border-".len()..];
            let sides = box_sides(value, is_global);
            for (side, side_value) in SIDES.iter().zip(sides) {
                out.push((format!("border-{side}-{suffix}"), side_value));
            }
        }
        "border" => {
            for side in SIDES {
                push_line_shorthand(&format!("border-{side}"), value, is_global, out);
            }
        }
        "border-top" | "border-right" | "border-bottom" | "border-left" | "outline" => {
            push_line_shorthand(name, value, is_global, out);
        }
        "background" => {
            let color = if is_global {
                value.to_string()
            } else {
                split_css_tokens(value)
                    .into_iter()
                    .find(|token| parse_color(token).is_some())
                    .unwrap_or_else(|| "rgba(0, 0, 0, 0)".to_string())
            };
            out.push(("background-color".to_string(), color));
        }
        "font" => expand_font(value, is_global, out),
        _ => out.push((name.to_string(), value.to_string())),
    }
}

fn box_sides(value: &str, is_global: bool) -> [String; 4] {
    if is_global {
        return std::array::from_fn(|_| value.to_string());
    }
    let tokens = split_css_tokens(value);
    let pick = |idx: usize| tokens.get(idx).cloned();
    let top = pick(0).unwrap_or_default();
    let right = pick(1).unwrap_or_else(|| top.clone());
    let bottom = pick(2).unwrap_or_else(|| top.clone());
    let left = pick(3).unwrap_or_else(|| right.clone());
    [top, right, bottom, left]
}

fn push_line_shorthand(prefix: &str, value: &str, is_global: bool, out: &mut Vec<(String, String)>) {
    if is_global {
        for suffix in ["width", "style", "color"] {
            out.push((format!("{prefix}-{suffix}"), value.to_string()));
        }
        return;
    }
    let mut width = "medium".to_string();
    let mut style = "none".to_string();
    let mut color = "currentcolor".to_string();
    for token in split_css_tokens(value) {
        let lower = token.to_ascii_lowercase();
        if LINE_STYLES.contains(&lower.as_str()) {
            style = lower;
        } else if lower == "currentcolor" || parse_color(&token).is_some() {
            color = token;
        } else {
            width = token;
        }
    }
    out.push((format!("{prefix}-width"), width));
    out.push((format!("{prefix}-style"), style));
    out.push((format!("{prefix}-color"), color));
}

fn expand_font(value: &str, is_global: bool, out: &mut Vec<(String, String)>) {
    let longhands = [
        "font-style",
        "font-variant",
        "font-weight",
        "font-size",
        "line-height",
        "font-family",
    ];
    if is_global {
        for name in longhands {
            out.push((name.to_string(), value.to_string()));
        }
        return;
    }
    let tokens = split_css_tokens(value);
    let Some(size_idx) = tokens.iter().position(|token| {
        let size = token.split('/').next().unwrap_or("");
        is_font_size_token(size)
    }) else {
        return;
    };
    let mut style = "normal".to_string();
    let mut variant = "normal".to_string();
    let mut weight = "400".to_string();
    for token in &tokens[..size_idx] {
        match token.to_ascii_lowercase().as_str() {
            "italic" | "oblique" => style = token.to_ascii_lowercase(),
            "small-caps" => variant = "small-caps".to_string(),
            "normal" => {}
            other => weight = other.to_string(),
        }
    }
    let (size, glued) = match tokens[size_idx].split_once('/') {
        Some((size, line_height)) => (size.to_string(), Some(line_height)),
        None => (tokens[size_idx].clone(), None),
    };
    let mut rest = &tokens[size_idx + 1..];
    // The line-height may be glued to the size or set apart: `15px/1.5`,
    // `15px/ 1.5`, `15px /1.5` or `15px / 1.5`.
    let glued = match glued {
        Some(line_height) => Some(line_height.to_string()),
        None => match rest.first().and_then(|token| token.strip_prefix('/')) {
            Some(line_height) => {
                rest = &rest[1..];
                Some(line_height.to_string())
            }
            None => None,
        },
    };
    let line_height = match glued {
        Some(line_height) if line_height.is_empty() => match rest.split_first() {
            Some((next, tail)) => {
                rest = tail;
                next.clone()
            }
            None => "normal".to_string(),
        },
        Some(line_height) => line_height,
        None => "normal".to_string(),
    };
    let family = rest.join(" ");
    out.push(("font-style".to_string(), style));
    out.push(("font-variant".to_string(), variant));
    out.push(("font-weight".to_string(), weight));
    out.push(("font-size".to_string(), size));
    out.push(("line-height".to_string(), line_height));
    if !family.is_empty() {
        out.push(("font-family".to_string(), family));
    }
}

fn is_font_size_token(token: &str) -> bool {
    matches!(
        token,
        "xx-small" | "x-small" | "small" | "medium" | "large" | "x-large" | "xx-large"
            | "smaller" | "larger"
    ) || split_length(token).is_some()
}

fn split_length(raw: &str) -> Option<(f32, &str)> {
    let idx = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(raw.len());
    let number = raw[..idx].parse::<f32>().ok()?;
    let unit = &raw[idx..];
    matches!(unit, "" | "px" | "em" | "rem" | "pt" | "%").then_some((number, unit))
}

fn resolve_font_size(value: &str, parent_px: f32) -> Option<f32> {
    let keyword = match value {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }
    let (number, unit) = split_length(value)?;
    match unit {
        "px" => Some(number),
        "em" => Some(number * parent_px),
        "%" => Some(number * parent_px / 100.0),
        "rem" => Some(number * ROOT_FONT_SIZE_PX),
        "pt" => Some(number * 4.0 / 3.0),
        "" if number == 0.0 => Some(0.0),
        _ => None,
    }
}

fn resolve_length(value: &str, font_px: f32) -> String {
    let Some((number, unit)) = split_length(value.trim()) else {
        return value.to_string();
    };
    match unit {
        "px" => format_px(number),
        "em" => format_px(number * font_px),
        "rem" => format_px(number * ROOT_FONT_SIZE_PX),
        "pt" => format_px(number * 4.0 / 3.0),
        "" if number == 0.0 => "0px".to_string(),
        _ => value.to_string(),
    }
}

fn resolve_line_height(value: &str, font_px: f32) -> String {
    match split_length(value.trim()) {
        Some((number, "")) => format_px(number * font_px),
        Some((number, "%")) => format_px(number * font_px / 100.0),
        Some(_) => resolve_length(value, font_px),
        None => value.to_string(),
    }
}

fn resolve_line_width(values: &mut BTreeMap<String, String>, prefix: &str, font_px: f32) {
    let style = values
        .get(&format!("{prefix}-style"))
        .cloned()
        .unwrap_or_default();
    let Some(width) = values.get_mut(&format!("{prefix}-width")) else {
        return;
    };
    *width = if matches!(style.as_str(), "none" | "hidden") {
        "0px".to_string()
    } else {
        match width.as_str() {
            "thin" => "1px".to_string(),
            "medium" => "3px".to_string(),
            "thick" => "5px".to_string(),
            other => resolve_length(other, font_px),
        }
    };
}

fn normalize_color(value: &str, current_color: &str) -> String {
    if value.eq_ignore_ascii_case("currentcolor") {
        return current_color.to_string();
    }
    match parse_color(value) {
        Some((color, alpha)) => format_rgba(color, alpha),
        None => value.to_string(),
    }
}

fn normalize_font_weight(value: &str) -> String {
    match value {
        "normal" => "400".to_string(),
        "bold" => "700".to_string(),
        other => other.to_string(),
    }
}

/// Cascade-resolved values for one element, keyed by dashed longhand name.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    values: BTreeMap<String, String>,
}

impl ComputedStyle {
    fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    fn box_shorthand(&self, names: [String; 4]) -> String {
        let [top, right, bottom, left] = names.map(|name| self.value(&name).to_string());
        if top.is_empty() || right.is_empty() || bottom.is_empty() || left.is_empty() {
            return String::new();
        }
        if right != left {
            return format!("{top} {right} {bottom} {left}");
        }
        if top != bottom {
            return format!("{top} {right} {bottom}");
        }
        if top != right {
            return format!("{top} {right}");
        }
        top
    }

    fn line_shorthand(&self, prefix: &str) -> String {
        let width = self.value(&format!("{prefix}-width"));
        let style = self.value(&format!("{prefix}-style"));
        let color = self.value(&format!("{prefix}-color"));
        if width.is_empty() || style.is_empty() || color.is_empty() {
            return String::new();
        }
        if prefix == "outline" {
            format!("{color} {style} {width}")
        } else {
            format!("{width} {style} {color}")
        }
    }
}

impl StyleDeclaration for ComputedStyle {
    fn get_property_value(&self, property: &str) -> String {
        match property {
            "padding" | "margin" => {
                self.box_shorthand(SIDES.map(|side| format!("{property}-{side}")))
            }
            "border-width" | "border-style" | "border-color" => {
                let suffix = &property["border-".len()..];
                self.box_shorthand(SIDES.map(|side| format!("border-{side}-{suffix}")))
            }
            "border-top" | "border-right" | "border-bottom" | "border-left" | "outline" => {
                self.line_shorthand(property)
            }
            "border" => {
                let sides = SIDES.map(|side| self.line_shorthand(&format!("border-{side}")));
                if sides.iter().all(|side| side == &sides[0]) {
                    sides[0].clone()
                } else {
                    String::new()
                }
            }
            _ => self.value(property).to_string(),
        }
    }
}
