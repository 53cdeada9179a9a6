use crate::debug::DebugLogger;
use crate::derive::{
    DEFAULT_BACKGROUND_COLOR, generate_hover_rules, is_color_light, resolve_background_color,
};
use crate::extract::{Role, RoleStyles, get_field_styles};
use crate::floating::handle_appearance_for_floating_label;
use crate::probe;
use crate::scope::{Scope, StyleDeclaration};
use crate::selectors::{CheckoutContext, get_selectors};
use crate::types::{format_px, parse_px};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Cap for the base font size relative to a context's anchor element (7/8).
pub const DEFAULT_RELATIVE_TEXT_RATIO: f32 = 0.875;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Stripe,
    Night,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Stripe => "stripe",
            Theme::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    Above,
    Floating,
}

impl LabelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelMode::Above => "above",
            LabelMode::Floating => "floating",
        }
    }
}

/// Rule selectors understood by the widget. Ordering follows declaration
/// order, which is also the serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKey {
    Input,
    InputInvalid,
    Label,
    LabelResting,
    LabelFloating,
    Block,
    Tab,
    TabHover,
    TabSelected,
    TabIconHover,
    TabIconSelected,
    Text,
    TextRedirect,
    Heading,
    Button,
    Link,
    Container,
    Header,
    Footer,
    FooterLink,
}

impl RuleKey {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKey::Input => ".Input",
            RuleKey::InputInvalid => ".Input--invalid",
            RuleKey::Label => ".Label",
            RuleKey::LabelResting => ".Label--resting",
            RuleKey::LabelFloating => ".Label--floating",
            RuleKey::Block => ".Block",
            RuleKey::Tab => ".Tab",
            RuleKey::TabHover => ".Tab:hover",
            RuleKey::TabSelected => ".Tab--selected",
            RuleKey::TabIconHover => ".TabIcon:hover",
            RuleKey::TabIconSelected => ".TabIcon--selected",
            RuleKey::Text => ".Text",
            RuleKey::TextRedirect => ".Text--redirect",
            RuleKey::Heading => ".Heading",
            RuleKey::Button => ".Button",
            RuleKey::Link => ".Link",
            RuleKey::Container => ".Container",
            RuleKey::Header => ".Header",
            RuleKey::Footer => ".Footer",
            RuleKey::FooterLink => ".Footer-link",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppearanceVariables {
    pub color_background: Option<String>,
    pub color_text: Option<String>,
    pub font_family: Option<String>,
    pub font_size_base: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppearanceDescriptor {
    pub variables: AppearanceVariables,
    pub theme: Theme,
    pub labels: LabelMode,
    pub rules: BTreeMap<RuleKey, RoleStyles>,
}

impl AppearanceDescriptor {
    pub fn rule(&self, key: RuleKey) -> Option<&RoleStyles> {
        self.rules.get(&key)
    }

    /// The object handed to the widget's `appearance` option.
    pub fn to_json(&self) -> Value {
        let mut variables = Map::new();
        let entries = [
            ("colorBackground", &self.variables.color_background),
            ("colorText", &self.variables.color_text),
            ("fontFamily", &self.variables.font_family),
            ("fontSizeBase", &self.variables.font_size_base),
        ];
        for (name, value) in entries {
            if let Some(value) = value {
                variables.insert(name.to_string(), Value::String(value.clone()));
            }
        }

        let mut rules = Map::new();
        for (key, styles) in &self.rules {
            let properties: Map<String, Value> = styles
                .iter()
                .map(|(property, value)| (property.clone(), Value::String(value.clone())))
                .collect();
            rules.insert(key.as_str().to_string(), Value::Object(properties));
        }

        let mut root = Map::new();
        root.insert("variables".to_string(), Value::Object(variables));
        root.insert("theme".to_string(), Value::String(self.theme.as_str().to_string()));
        root.insert("labels".to_string(), Value::String(self.labels.as_str().to_string()));
        root.insert("rules".to_string(), Value::Object(rules));
        Value::Object(root)
    }
}

pub(crate) struct PassOptions<'a> {
    pub rich_mode: bool,
    pub default_background: &'a str,
    pub relative_text_ratio: f32,
    pub debug: Option<&'a DebugLogger>,
}

impl Default for PassOptions<'_> {
    fn default() -> Self {
        Self {
            rich_mode: false,
            default_background: DEFAULT_BACKGROUND_COLOR,
            relative_text_ratio: DEFAULT_RELATIVE_TEXT_RATIO,
            debug: None,
        }
    }
}

/// Samples the checkout page behind `scope` and assembles the widget's
/// appearance. The hidden probe is always removed before this returns, even
/// if sampling unwinds.
pub fn get_appearance<S: Scope>(
    context: CheckoutContext,
    rich_mode: bool,
    scope: &S,
) -> AppearanceDescriptor {
    let options = PassOptions {
        rich_mode,
        ..PassOptions::default()
    };
    assemble(context, scope, &options)
}

pub(crate) fn assemble<S: Scope>(
    context: CheckoutContext,
    scope: &S,
    options: &PassOptions<'_>,
) -> AppearanceDescriptor {
    let debug = options.debug;
    if let Some(logger) = debug {
        logger.event(
            "appearance.pass",
            json!({ "context": context.key(), "rich_mode": options.rich_mode }),
        );
    }

    let selectors = get_selectors(context, scope);
    let probe = probe::init_with_bundle(scope, &selectors);
    if let Some(logger) = debug {
        logger.event(
            "appearance.probe",
            json!({ "outcome": probe.outcome().as_str() }),
        );
        if !probe.is_active() {
            logger.bump("probe.skipped");
        }
    }

    let input = get_field_styles(&[selectors.probe.input], Role::Input, None, scope);
    let invalid_input = get_field_styles(&[selectors.probe.invalid_input], Role::Input, None, scope);

    let label = get_field_styles(&[selectors.theme_label], Role::Label, None, scope);
    let resting_label: RoleStyles = label
        .get("fontSize")
        .map(|size| ("fontSize".to_string(), size.clone()))
        .into_iter()
        .collect();

    let text = get_field_styles(selectors.text, Role::Text, None, scope);

    let tab = get_field_styles(&[selectors.theme_input], Role::Tab, None, scope);
    let selected_tab = get_field_styles(&[selectors.probe.input], Role::TabSelected, None, scope);

    let tab_hover = generate_hover_rules(&tab);
    let tab_icon_hover = color_only(&tab_hover);
    let tab_icon_selected = color_only(&selected_tab);

    let resolved_background = resolve_background_color(selectors.background, scope);
    if let Some(logger) = debug {
        logger.event(
            "appearance.background",
            json!({
                "color": resolved_background.as_deref().unwrap_or(options.default_background),
                "fallback": resolved_background.is_none(),
            }),
        );
    }
    let background =
        resolved_background.unwrap_or_else(|| options.default_background.to_string());

    let heading = get_field_styles(selectors.heading, Role::Label, None, scope);
    let block = get_field_styles(
        &[selectors.append_target],
        Role::Block,
        Some(background.as_str()),
        scope,
    );
    let button = get_field_styles(selectors.button, Role::Input, None, scope);
    let link = get_field_styles(selectors.link, Role::Label, None, scope);
    let optional = |candidates: Option<&'static [&'static str]>, role: Role| {
        candidates
            .map(|candidates| get_field_styles(candidates, role, None, scope))
            .unwrap_or_default()
    };
    let container = optional(selectors.container, Role::Container);
    let header = optional(selectors.header, Role::Header);
    let footer = optional(selectors.footer, Role::Footer);
    let footer_link = optional(selectors.footer_link, Role::FooterLink);

    let mut variables = AppearanceVariables {
        color_background: Some(background.clone()),
        color_text: text.get("color").cloned(),
        font_family: text.get("fontFamily").cloned(),
        font_size_base: text.get("fontSize").cloned(),
    };

    if let Some(anchor) = selectors.relative_text_size {
        clamp_font_size_base(&mut variables, anchor, options.relative_text_ratio, scope, debug);
    }

    let theme = if is_color_light(&background) {
        Theme::Stripe
    } else {
        Theme::Night
    };
    let labels = if context.uses_floating_labels() {
        LabelMode::Floating
    } else {
        LabelMode::Above
    };

    let mut rules = BTreeMap::new();
    rules.insert(RuleKey::Input, input);
    rules.insert(RuleKey::InputInvalid, invalid_input);
    rules.insert(RuleKey::Label, label);
    rules.insert(RuleKey::LabelResting, resting_label);
    rules.insert(RuleKey::Block, block);
    rules.insert(RuleKey::Tab, tab);
    rules.insert(RuleKey::TabHover, tab_hover);
    rules.insert(RuleKey::TabSelected, selected_tab);
    rules.insert(RuleKey::TabIconHover, tab_icon_hover);
    rules.insert(RuleKey::TabIconSelected, tab_icon_selected);
    rules.insert(RuleKey::TextRedirect, text.clone());
    rules.insert(RuleKey::Text, text);

    let mut appearance = AppearanceDescriptor {
        variables,
        theme,
        labels,
        rules,
    };

    if context.uses_floating_labels() {
        let floating_label =
            get_field_styles(&[selectors.probe.valid_label], Role::FloatingLabel, None, scope);
        appearance = handle_appearance_for_floating_label(&appearance, &floating_label);
    }

    if options.rich_mode {
        appearance.rules.extend([
            (RuleKey::Heading, heading),
            (RuleKey::Button, button),
            (RuleKey::Link, link),
            (RuleKey::Container, container),
            (RuleKey::Header, header),
            (RuleKey::Footer, footer),
            (RuleKey::FooterLink, footer_link),
        ]);
    }

    drop(probe);

    if let Some(logger) = debug {
        for (key, styles) in &appearance.rules {
            logger.event(
                "appearance.rule",
                json!({ "rule": key.as_str(), "properties": styles.len() }),
            );
            logger.bump(if styles.is_empty() {
                "rules.empty"
            } else {
                "rules.populated"
            });
        }
        logger.finish(context.key());
    }
    appearance
}

fn color_only(styles: &RoleStyles) -> RoleStyles {
    styles
        .get("color")
        .map(|color| ("color".to_string(), color.clone()))
        .into_iter()
        .collect()
}

fn clamp_font_size_base<S: Scope>(
    variables: &mut AppearanceVariables,
    anchor: &str,
    ratio: f32,
    scope: &S,
    debug: Option<&DebugLogger>,
) {
    let Some(node) = scope.query_selector(anchor) else {
        return;
    };
    let Some(anchor_size) = parse_px(&scope.computed_style(&node).get_property_value("font-size"))
    else {
        return;
    };
    let Some(base) = variables.font_size_base.as_deref().and_then(parse_px) else {
        return;
    };
    let limit = anchor_size * ratio;
    if base <= limit {
        return;
    }
    let clamped = format_px(limit);
    if let Some(logger) = debug {
        logger.event(
            "appearance.font_size_clamped",
            json!({ "anchor": anchor, "from": format_px(base), "to": &clamped }),
        );
    }
    variables.font_size_base = Some(clamped);
}
