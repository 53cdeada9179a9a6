use crate::scope::Scope;
use serde_json::{Value, json};
use url::Url;

/// Hosts whose stylesheets are treated as web-font declarations.
pub const FONT_PROVIDER_HOSTS: &[&str] = &[
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    "fast.fonts.com",
    "use.typekit.net",
];

/// A stylesheet the widget can load to match the page's web font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRule {
    pub css_src: String,
}

impl FontRule {
    pub fn to_json(&self) -> Value {
        json!({ "cssSrc": self.css_src })
    }
}

pub fn get_font_rules_from_page<S: Scope>(scope: &S) -> Vec<FontRule> {
    font_rules_for_hosts(scope, FONT_PROVIDER_HOSTS)
}

/// One rule per stylesheet, in document order, whose absolute `href` is
/// served from one of `hosts`. Relative and unparseable hrefs never match.
pub fn font_rules_for_hosts<S: Scope, H: AsRef<str>>(scope: &S, hosts: &[H]) -> Vec<FontRule> {
    scope
        .style_sheet_hrefs()
        .into_iter()
        .filter(|href| {
            Url::parse(href)
                .ok()
                .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
                .is_some_and(|host| hosts.iter().any(|allowed| allowed.as_ref() == host))
        })
        .map(|css_src| FontRule { css_src })
        .collect()
}
