mod appearance;
mod debug;
mod derive;
mod error;
mod extract;
mod floating;
mod fonts;
mod html;
mod probe;
mod scope;
mod selectors;
mod style;
#[cfg(test)]
mod testing;
mod types;

pub use appearance::{
    AppearanceDescriptor, AppearanceVariables, DEFAULT_RELATIVE_TEXT_RATIO, LabelMode, RuleKey,
    Theme, get_appearance,
};
use debug::DebugLogger;
pub use derive::{
    DEFAULT_BACKGROUND_COLOR, generate_hover_rules, generate_outline_style, get_background_color,
    is_color_light, maybe_convert_rgba_to_rgb, resolve_background_color,
};
pub use error::AppearanceError;
pub use extract::{Role, RoleStyles, get_field_styles};
pub use floating::handle_appearance_for_floating_label;
pub use fonts::{FONT_PROVIDER_HOSTS, FontRule, font_rules_for_hosts, get_font_rules_from_page};
pub use html::HtmlPage;
pub use probe::{PROBE_ID_PREFIX, ProbeGuard, ProbeOutcome};
pub use scope::{Scope, StyleDeclaration};
pub use selectors::{
    CheckoutContext, PROBE_SELECTORS, ProbeSelectors, SelectorBundle, SelectorKey, get_selectors,
};
pub use style::ComputedStyle;
pub use types::Color;

/// Hidden-probe lifecycle, for hosts that drive sampling themselves.
pub mod probe_manager {
    pub use crate::probe::{cleanup, init, init_with_bundle};
}

/// Configured extractor. Holds no page state, so one instance can serve any
/// number of sequential passes over different scopes.
pub struct AppearanceExtractor {
    rich_mode: bool,
    default_background: String,
    relative_text_ratio: f32,
    font_provider_hosts: Vec<String>,
    debug: Option<DebugLogger>,
}

pub struct AppearanceBuilder {
    rich_mode: bool,
    default_background: String,
    relative_text_ratio: f32,
    font_provider_hosts: Vec<String>,
    debug_path: Option<std::path::PathBuf>,
}

impl AppearanceExtractor {
    pub fn builder() -> AppearanceBuilder {
        AppearanceBuilder::new()
    }

    pub fn extract<S: Scope>(&self, scope: &S, context: CheckoutContext) -> AppearanceDescriptor {
        let options = appearance::PassOptions {
            rich_mode: self.rich_mode,
            default_background: &self.default_background,
            relative_text_ratio: self.relative_text_ratio,
            debug: self.debug.as_ref(),
        };
        appearance::assemble(context, scope, &options)
    }

    pub fn font_rules<S: Scope>(&self, scope: &S) -> Vec<FontRule> {
        font_rules_for_hosts(scope, &self.font_provider_hosts)
    }

    pub fn rich_mode(&self) -> bool {
        self.rich_mode
    }
}

impl Default for AppearanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppearanceBuilder {
    pub fn new() -> Self {
        Self {
            rich_mode: false,
            default_background: DEFAULT_BACKGROUND_COLOR.to_string(),
            relative_text_ratio: DEFAULT_RELATIVE_TEXT_RATIO,
            font_provider_hosts: FONT_PROVIDER_HOSTS
                .iter()
                .map(|host| host.to_string())
                .collect(),
            debug_path: None,
        }
    }

    /// Also emit heading, button, link and container-level rules.
    pub fn rich_mode(mut self, enabled: bool) -> Self {
        self.rich_mode = enabled;
        self
    }

    /// Background used when no selector in the fallback chain has one.
    pub fn default_background(mut self, color: impl Into<String>) -> Self {
        self.default_background = color.into();
        self
    }

    /// Largest allowed base font size, as a fraction of the context's
    /// relative-size anchor.
    pub fn relative_text_ratio(mut self, ratio: f32) -> Self {
        self.relative_text_ratio = ratio;
        self
    }

    pub fn font_provider_host(mut self, host: impl Into<String>) -> Self {
        self.font_provider_hosts.push(host.into());
        self
    }

    /// Replaces the font provider allow-list.
    pub fn font_provider_hosts<I, H>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        self.font_provider_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn debug_log(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<AppearanceExtractor, AppearanceError> {
        let default_background = self.default_background.trim().to_string();
        if types::parse_color(&default_background).is_none() {
            return Err(AppearanceError::InvalidConfiguration(format!(
                "default_background is not a CSS color: {:?}",
                self.default_background
            )));
        }
        if !self.relative_text_ratio.is_finite()
            || self.relative_text_ratio <= 0.0
            || self.relative_text_ratio > 1.0
        {
            return Err(AppearanceError::InvalidConfiguration(
                "relative_text_ratio must be in (0, 1]".to_string(),
            ));
        }
        let mut font_provider_hosts = Vec::with_capacity(self.font_provider_hosts.len());
        for host in self.font_provider_hosts {
            let host = host.trim().to_ascii_lowercase();
            if host.is_empty() || host.contains(['/', ':', ' ']) {
                return Err(AppearanceError::InvalidConfiguration(format!(
                    "font provider must be a bare hostname: {:?}",
                    host
                )));
            }
            if !font_provider_hosts.contains(&host) {
                font_provider_hosts.push(host);
            }
        }
        let debug = if let Some(path) = self.debug_path {
            Some(DebugLogger::create(path)?)
        } else {
            None
        };
        Ok(AppearanceExtractor {
            rich_mode: self.rich_mode,
            default_background,
            relative_text_ratio: self.relative_text_ratio,
            font_provider_hosts,
            debug,
        })
    }
}
