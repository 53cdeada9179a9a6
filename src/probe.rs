use crate::scope::Scope;
use crate::selectors::{CheckoutContext, PROBE_SELECTORS, SelectorBundle, get_selectors};

pub const PROBE_ID_PREFIX: &str = "appearance-probe";

// Upper bound on stale containers removed in one cleanup, so a host that
// ignores removals cannot spin us forever.
const MAX_STALE_PROBES: usize = 8;

const CONTAINER_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("top", "0"),
    ("left", "0"),
    ("width", "0"),
    ("height", "0"),
    ("overflow", "hidden"),
    ("clip", "rect(0 0 0 0)"),
    ("pointer-events", "none"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Created,
    MissingAppendTarget,
    MissingThemeInput,
    ElementCreationFailed,
}

impl ProbeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeOutcome::Created => "created",
            ProbeOutcome::MissingAppendTarget => "missing_append_target",
            ProbeOutcome::MissingThemeInput => "missing_theme_input",
            ProbeOutcome::ElementCreationFailed => "element_creation_failed",
        }
    }
}

/// Holds the hidden probe for the duration of a pass and removes it when
/// dropped, including during unwinding.
pub struct ProbeGuard<'a, S: Scope> {
    scope: &'a S,
    outcome: ProbeOutcome,
}

impl<'a, S: Scope> ProbeGuard<'a, S> {
    pub fn outcome(&self) -> ProbeOutcome {
        self.outcome
    }

    pub fn is_active(&self) -> bool {
        self.outcome == ProbeOutcome::Created
    }
}

impl<'a, S: Scope> Drop for ProbeGuard<'a, S> {
    fn drop(&mut self) {
        cleanup(self.scope);
    }
}

pub fn init<S: Scope>(context: CheckoutContext, scope: &S) -> ProbeGuard<'_, S> {
    let bundle = get_selectors(context, scope);
    init_with_bundle(scope, &bundle)
}

/// Builds the probe under the bundle's append target. Missing targets leave
/// the scope untouched; the returned guard is inert in that case.
pub fn init_with_bundle<'a, S: Scope>(scope: &'a S, bundle: &SelectorBundle) -> ProbeGuard<'a, S> {
    let outcome = match build_probe(scope, bundle) {
        Ok(()) => ProbeOutcome::Created,
        Err(outcome) => {
            // A half-built probe is worse than none.
            cleanup(scope);
            outcome
        }
    };
    ProbeGuard { scope, outcome }
}

pub fn cleanup<S: Scope>(scope: &S) {
    for _ in 0..MAX_STALE_PROBES {
        let Some(container) = scope.query_selector(PROBE_SELECTORS.container) else {
            return;
        };
        scope.remove_node(&container);
    }
}

fn build_probe<S: Scope>(scope: &S, bundle: &SelectorBundle) -> Result<(), ProbeOutcome> {
    let append_target = scope
        .query_selector(bundle.append_target)
        .ok_or(ProbeOutcome::MissingAppendTarget)?;
    let template_input = scope
        .query_selector(bundle.theme_input)
        .ok_or(ProbeOutcome::MissingThemeInput)?;

    cleanup(scope);

    let create = |tag: &str| {
        scope
            .create_element(tag)
            .ok_or(ProbeOutcome::ElementCreationFailed)
    };
    let container = create("div")?;
    scope.set_attribute(&container, "id", id_from_selector(bundle.probe.container));
    for (property, value) in CONTAINER_STYLE {
        scope.set_style_property(&container, property, value);
    }
    scope.append_child(&append_target, &container);

    let invalid_row = create(bundle.row_element)?;
    scope.add_classes(&invalid_row, bundle.invalid_classes);
    let valid_row = create(bundle.row_element)?;
    scope.add_classes(&valid_row, bundle.valid_classes);
    scope.append_child(&container, &invalid_row);
    scope.append_child(&container, &valid_row);

    let input = scope.clone_node(&template_input);
    scope.set_attribute(&input, "id", id_from_selector(bundle.probe.input));
    scope.set_attribute(&input, "value", "");
    scope.append_child(&valid_row, &input);

    let invalid_input = scope.clone_node(&template_input);
    scope.set_attribute(&invalid_input, "id", id_from_selector(bundle.probe.invalid_input));
    scope.set_attribute(&invalid_input, "value", "");
    scope.set_style_property(&invalid_input, "transition", "none");
    scope.append_child(&invalid_row, &invalid_input);

    if let Some(template_label) = scope.query_selector(bundle.theme_label) {
        let valid_label = scope.clone_node(&template_label);
        scope.set_attribute(&valid_label, "id", id_from_selector(bundle.probe.valid_label));
        scope.append_child(&valid_row, &valid_label);

        let invalid_label = scope.clone_node(&template_label);
        scope.set_attribute(
            &invalid_label,
            "id",
            id_from_selector(bundle.probe.invalid_label),
        );
        scope.append_child(&invalid_row, &invalid_label);
    }
    Ok(())
}

fn id_from_selector(selector: &str) -> &str {
    selector.strip_prefix('#').unwrap_or(selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::HtmlPage;
    use crate::scope::StyleDeclaration;

    const CLASSIC: &str = r#"
        <html><head><style>
            .form-row input { color: rgb(51, 51, 51); transition: color 0.3s; }
            .form-row.woocommerce-invalid input { color: rgb(170, 0, 0); }
        </style></head>
        <body><form class="checkout woocommerce-checkout">
            <div class="woocommerce-billing-fields__field-wrapper">
                <p class="form-row" id="billing_first_name_field">
                    <label for="billing_first_name">First name</label>
                    <input id="billing_first_name" name="billing_first_name" value="Jane">
                </p>
            </div>
        </form></body></html>
    "#;

    fn probe_ids(page: &HtmlPage) -> Vec<bool> {
        [
            PROBE_SELECTORS.container,
            PROBE_SELECTORS.input,
            PROBE_SELECTORS.invalid_input,
            PROBE_SELECTORS.valid_label,
            PROBE_SELECTORS.invalid_label,
        ]
        .iter()
        .map(|selector| page.query_selector(selector).is_some())
        .collect()
    }

    #[test]
    fn builds_valid_and_invalid_rows_with_cloned_fields() {
        let page = HtmlPage::parse(CLASSIC);
        let guard = init(CheckoutContext::ShortcodeCheckout, &page);
        assert!(guard.is_active());
        assert_eq!(probe_ids(&page), vec![true; 5]);

        let invalid = page.query_selector("#appearance-probe-invalid-input").expect("invalid");
        let row = invalid.parent().expect("row");
        let classes = row
            .as_element()
            .and_then(|e| e.attributes.borrow().get("class").map(str::to_string));
        assert_eq!(
            classes.as_deref(),
            Some("form-row woocommerce-invalid woocommerce-invalid-required-field")
        );
        assert_eq!(
            page.computed_style(&invalid).get_property_value("color"),
            "rgb(170, 0, 0)"
        );

        let valid = page.query_selector("#appearance-probe-input").expect("valid");
        assert_eq!(
            valid.as_element().and_then(|e| e.attributes.borrow().get("value").map(str::to_string)),
            Some(String::new())
        );
        assert_eq!(
            page.computed_style(&valid).get_property_value("color"),
            "rgb(51, 51, 51)"
        );

        drop(guard);
        assert_eq!(probe_ids(&page), vec![false; 5]);
        assert!(page.query_selector("#billing_first_name").is_some());
    }

    #[test]
    fn repeated_init_never_accumulates_containers() {
        let page = HtmlPage::parse(CLASSIC);
        let first = init(CheckoutContext::ShortcodeCheckout, &page);
        std::mem::forget(first);
        let _second = init(CheckoutContext::ShortcodeCheckout, &page);
        let count = page
            .document()
            .select("#appearance-probe")
            .map(|matches| matches.count())
            .unwrap_or(0);
        assert_eq!(count, 1);
    }

    #[test]
    fn missing_template_is_a_no_op_and_cleanup_stays_safe() {
        let page = HtmlPage::parse("<div class=\"woocommerce-billing-fields__field-wrapper\"></div>");
        let before = page.document().to_string();
        let guard = init(CheckoutContext::ShortcodeCheckout, &page);
        assert_eq!(guard.outcome(), ProbeOutcome::MissingThemeInput);
        assert_eq!(page.document().to_string(), before);
        drop(guard);
        cleanup(&page);
        assert_eq!(page.document().to_string(), before);
    }

    #[test]
    fn missing_append_target_is_reported_first() {
        let page = HtmlPage::parse("<input id=\"billing_first_name\">");
        let guard = init(CheckoutContext::ShortcodeCheckout, &page);
        assert_eq!(guard.outcome(), ProbeOutcome::MissingAppendTarget);
        assert!(!guard.is_active());
    }
}
