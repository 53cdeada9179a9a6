use crate::derive::{generate_outline_style, maybe_convert_rgba_to_rgb};
use crate::scope::{Scope, StyleDeclaration};
use crate::types::parse_px;
use std::collections::BTreeMap;

/// Sampled styles for one rule, keyed by camelCase property name
/// (`paddingLeft`). Empty means nothing was found.
pub type RoleStyles = BTreeMap<String, String>;

const PADDING_COLOR: &[&str] = &[
    "color",
    "padding",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
];

const TEXT_FONT: &[&str] = &[
    "fontFamily",
    "fontSize",
    "fontVariant",
    "fontWeight",
    "letterSpacing",
    "lineHeight",
    "textDecoration",
    "textShadow",
    "textTransform",
    "transition",
];

const BORDER_BACKGROUND: &[&str] = &[
    "backgroundColor",
    "border",
    "borderTop",
    "borderRight",
    "borderBottom",
    "borderLeft",
    "borderRadius",
    "borderWidth",
    "borderColor",
    "borderStyle",
    "boxShadow",
];

const OUTLINE_PARTS: &[&str] = &["outlineColor", "outlineWidth", "outlineStyle"];

const MARGIN: &[&str] = &["margin", "marginTop", "marginRight", "marginBottom", "marginLeft"];

const BLOCK: &[&str] = &[
    "backgroundColor",
    "borderColor",
    "borderRadius",
    "borderStyle",
    "borderWidth",
    "boxShadow",
    "padding",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
];

const FOOTER_LINK: &[&str] = &[
    "color",
    "fontFamily",
    "fontSize",
    "fontWeight",
    "letterSpacing",
    "lineHeight",
    "textDecoration",
    "textTransform",
];

/// Visual category an element is sampled as. Decides the allow-listed
/// properties and the post-processing applied to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Input,
    Label,
    FloatingLabel,
    Text,
    Tab,
    TabSelected,
    Block,
    Container,
    Header,
    Footer,
    FooterLink,
}

impl Role {
    fn property_groups(self) -> &'static [&'static [&'static str]] {
        match self {
            Role::Input => &[PADDING_COLOR, TEXT_FONT, BORDER_BACKGROUND, OUTLINE_PARTS],
            Role::Label | Role::Text => &[PADDING_COLOR, TEXT_FONT],
            Role::FloatingLabel => &[PADDING_COLOR, TEXT_FONT, &["transform"]],
            Role::Tab => &[PADDING_COLOR, TEXT_FONT, BORDER_BACKGROUND],
            Role::TabSelected => &[PADDING_COLOR, TEXT_FONT, BORDER_BACKGROUND, OUTLINE_PARTS],
            Role::Block => &[BLOCK],
            Role::Container => &[BORDER_BACKGROUND, PADDING_COLOR, MARGIN],
            Role::Header | Role::Footer => &[BORDER_BACKGROUND, PADDING_COLOR, TEXT_FONT],
            Role::FooterLink => &[FOOTER_LINK],
        }
    }

    pub fn properties(self) -> impl Iterator<Item = &'static str> {
        self.property_groups()
            .iter()
            .flat_map(|group| group.iter().copied())
    }

    pub fn synthesizes_outline(self) -> bool {
        matches!(self, Role::Input | Role::TabSelected)
    }
}

/// Samples the first element any of `selectors` resolves to and filters its
/// computed style down to the role's allow-list.
///
/// Only one element is read, even for broad selectors. Later candidates are
/// consulted solely to replace a degenerate `line-height`. A list where nothing
/// resolves yields an empty map.
pub fn get_field_styles<S: Scope>(
    selectors: &[&str],
    role: Role,
    background_color: Option<&str>,
    scope: &S,
) -> RoleStyles {
    let resolved: Vec<S::Node> = selectors
        .iter()
        .filter_map(|selector| scope.query_selector(selector))
        .collect();
    let Some((element, rest)) = resolved.split_first() else {
        return RoleStyles::new();
    };
    let style = scope.computed_style(element);

    let mut styles = RoleStyles::new();
    for property in role.properties() {
        let raw = style.get_property_value(&camel_to_dashed(property));
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let value = match property {
            "color" => maybe_convert_rgba_to_rgb(raw),
            "lineHeight" if is_degenerate_line_height(raw) => {
                match first_usable_line_height(rest, scope) {
                    Some(line_height) => line_height,
                    None => continue,
                }
            }
            _ => raw.to_string(),
        };
        styles.insert(property.to_string(), value);
    }

    if role.synthesizes_outline() {
        let width = styles.remove("outlineWidth");
        let line_style = styles.remove("outlineStyle");
        let color = styles.remove("outlineColor");
        let outline = generate_outline_style(
            width.as_deref(),
            line_style.as_deref(),
            color.as_deref(),
        );
        if !outline.is_empty() {
            styles.insert("outline".to_string(), outline);
        }
    }

    mirror_text_indent(&style.get_property_value("text-indent"), &mut styles);

    if role == Role::Block {
        match background_color {
            Some(color) => {
                styles.insert("backgroundColor".to_string(), color.to_string());
            }
            None => {
                styles.remove("backgroundColor");
            }
        }
    }
    styles
}

fn first_usable_line_height<S: Scope>(candidates: &[S::Node], scope: &S) -> Option<String> {
    candidates.iter().find_map(|node| {
        let line_height = scope.computed_style(node).get_property_value("line-height");
        let line_height = line_height.trim();
        (!line_height.is_empty() && !is_degenerate_line_height(line_height))
            .then(|| line_height.to_string())
    })
}

fn is_degenerate_line_height(value: &str) -> bool {
    matches!(value, "0" | "0px")
}

// The widget has no text-indent; fold it into horizontal padding when the
// theme relies on indent alone for inset text.
fn mirror_text_indent(text_indent: &str, styles: &mut RoleStyles) {
    let text_indent = text_indent.trim();
    let Some(indent) = parse_px(text_indent) else {
        return;
    };
    if indent == 0.0 {
        return;
    }
    let is_zero = |key: &str| {
        styles
            .get(key)
            .and_then(|value| parse_px(value))
            .is_some_and(|value| value == 0.0)
    };
    if is_zero("paddingLeft") && is_zero("paddingRight") {
        styles.insert("paddingLeft".to_string(), text_indent.to_string());
        styles.insert("paddingRight".to_string(), text_indent.to_string());
    }
}

pub(crate) fn camel_to_dashed(property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::HtmlPage;
    use crate::testing::{FixtureScope, checkout_fixture};

    fn map(entries: &[(&str, &str)]) -> RoleStyles {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn input_fixture_folds_outline_parts_into_shorthand() {
        let scope = checkout_fixture();
        let styles = get_field_styles(&[".woocommerce-checkout .form-row input"], Role::Input, None, &scope);
        assert_eq!(
            styles,
            map(&[
                ("backgroundColor", "rgba(0,0,0,0)"),
                ("color", "rgb(109,109,109)"),
                (
                    "fontFamily",
                    "\"Source Sans Pro\", HelveticaNeue-Light, \"Helvetica Neue Light\""
                ),
                ("fontSize", "12px"),
                ("outline", "1px solid rgb(150,88,138)"),
                ("padding", "10px"),
            ])
        );
    }

    #[test]
    fn unresolvable_selectors_yield_empty_for_every_role() {
        let scope = FixtureScope::new(&[("color", "rgb(1, 2, 3)")]).with_missing(&["#nope", ".gone"]);
        for role in [
            Role::Input,
            Role::Label,
            Role::FloatingLabel,
            Role::Text,
            Role::Tab,
            Role::TabSelected,
            Role::Block,
            Role::Container,
            Role::Header,
            Role::Footer,
            Role::FooterLink,
        ] {
            assert!(get_field_styles(&["#nope", ".gone"], role, Some("#fff"), &scope).is_empty());
            assert!(get_field_styles(&[], role, None, &scope).is_empty());
        }
    }

    #[test]
    fn outline_parts_never_leak_for_outline_roles() {
        let without_color = FixtureScope::new(&[
            ("outline-width", "2px"),
            ("outline-style", "dotted"),
            ("color", "rgb(0, 0, 0)"),
        ]);
        for role in [Role::Input, Role::TabSelected] {
            let styles = get_field_styles(&["input"], role, None, &without_color);
            assert!(!styles.contains_key("outlineWidth"));
            assert!(!styles.contains_key("outlineStyle"));
            assert!(!styles.contains_key("outlineColor"));
            assert!(!styles.contains_key("outline"));
        }
    }

    #[test]
    fn color_is_flattened_but_background_keeps_alpha() {
        let scope = FixtureScope::new(&[
            ("color", "rgba(0, 0, 0, 0.5)"),
            ("background-color", "rgba(0, 0, 0, 0.5)"),
        ]);
        let styles = get_field_styles(&["input"], Role::Tab, None, &scope);
        assert_eq!(styles.get("color").map(String::as_str), Some("rgb(128, 128, 128)"));
        assert_eq!(
            styles.get("backgroundColor").map(String::as_str),
            Some("rgba(0, 0, 0, 0.5)")
        );
    }

    #[test]
    fn text_indent_is_mirrored_into_zero_padding() {
        let scope = FixtureScope::new(&[
            ("text-indent", "10px"),
            ("padding-left", "0px"),
            ("padding-right", "0px"),
        ]);
        let styles = get_field_styles(&["input"], Role::Input, None, &scope);
        assert_eq!(styles.get("paddingLeft").map(String::as_str), Some("10px"));
        assert_eq!(styles.get("paddingRight").map(String::as_str), Some("10px"));

        let padded = FixtureScope::new(&[
            ("text-indent", "10px"),
            ("padding-left", "4px"),
            ("padding-right", "0px"),
        ]);
        let styles = get_field_styles(&["input"], Role::Input, None, &padded);
        assert_eq!(styles.get("paddingLeft").map(String::as_str), Some("4px"));
        assert_eq!(styles.get("paddingRight").map(String::as_str), Some("0px"));
    }

    #[test]
    fn degenerate_line_height_borrows_from_later_candidates() {
        let scope = FixtureScope::new(&[("line-height", "0px"), ("font-size", "14px")])
            .with_element_styles(".fallback", &[("line-height", "21px")]);
        let styles = get_field_styles(&[".first", ".missing-zero", ".fallback"], Role::Text, None, &scope);
        assert_eq!(styles.get("lineHeight").map(String::as_str), Some("21px"));
        assert_eq!(styles.get("fontSize").map(String::as_str), Some("14px"));

        let nothing_better = FixtureScope::new(&[("line-height", "0")]);
        let styles = get_field_styles(&[".first", ".second"], Role::Text, None, &nothing_better);
        assert!(!styles.contains_key("lineHeight"));
    }

    #[test]
    fn block_background_always_comes_from_the_argument() {
        let scope = FixtureScope::new(&[("background-color", "rgb(1, 2, 3)"), ("border-radius", "4px")]);
        let styles = get_field_styles(&["label"], Role::Block, Some("#ffffff"), &scope);
        assert_eq!(styles.get("backgroundColor").map(String::as_str), Some("#ffffff"));
        assert_eq!(styles.get("borderRadius").map(String::as_str), Some("4px"));

        let styles = get_field_styles(&["label"], Role::Block, None, &scope);
        assert!(!styles.contains_key("backgroundColor"));
    }

    #[test]
    fn samples_real_cascade_from_html_page() {
        let page = HtmlPage::parse(
            r#"<style>
                .form-row input { padding: 8px 12px; border: 1px solid #cccccc; outline: 2px solid #96588a; font-size: 15px; }
            </style>
            <p class="form-row"><input id="a"></p>"#,
        );
        let styles = get_field_styles(&[".missing", ".form-row input"], Role::Input, None, &page);
        assert_eq!(styles.get("padding").map(String::as_str), Some("8px 12px"));
        assert_eq!(styles.get("paddingLeft").map(String::as_str), Some("12px"));
        assert_eq!(
            styles.get("border").map(String::as_str),
            Some("1px solid rgb(204, 204, 204)")
        );
        assert_eq!(
            styles.get("outline").map(String::as_str),
            Some("2px solid rgb(150, 88, 138)")
        );
        assert_eq!(styles.get("fontSize").map(String::as_str), Some("15px"));
        assert!(!styles.contains_key("outlineWidth"));
    }

    #[test]
    fn camel_case_maps_to_dashed_css_names() {
        assert_eq!(camel_to_dashed("backgroundColor"), "background-color");
        assert_eq!(camel_to_dashed("borderTopLeftRadius"), "border-top-left-radius");
        assert_eq!(camel_to_dashed("color"), "color");
    }
}
