use crate::scope::Scope;

/// Checkout surface whose markup decides which selector bundle applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutContext {
    BlocksCheckout,
    ShortcodeCheckout,
    BnplProductPage,
    BnplClassicCart,
    BnplCartBlock,
    HostedCheckout,
}

impl CheckoutContext {
    pub const ALL: [CheckoutContext; 6] = [
        CheckoutContext::BlocksCheckout,
        CheckoutContext::ShortcodeCheckout,
        CheckoutContext::BnplProductPage,
        CheckoutContext::BnplClassicCart,
        CheckoutContext::BnplCartBlock,
        CheckoutContext::HostedCheckout,
    ];

    /// Host keys map onto contexts; anything unrecognized is block checkout.
    pub fn from_key(key: &str) -> Self {
        match key {
            "shortcode_checkout" => CheckoutContext::ShortcodeCheckout,
            "bnpl_product_page" => CheckoutContext::BnplProductPage,
            "bnpl_classic_cart" => CheckoutContext::BnplClassicCart,
            "bnpl_cart_block" => CheckoutContext::BnplCartBlock,
            "hosted_checkout" => CheckoutContext::HostedCheckout,
            _ => CheckoutContext::BlocksCheckout,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CheckoutContext::BlocksCheckout => "blocks_checkout",
            CheckoutContext::ShortcodeCheckout => "shortcode_checkout",
            CheckoutContext::BnplProductPage => "bnpl_product_page",
            CheckoutContext::BnplClassicCart => "bnpl_classic_cart",
            CheckoutContext::BnplCartBlock => "bnpl_cart_block",
            CheckoutContext::HostedCheckout => "hosted_checkout",
        }
    }

    pub fn uses_floating_labels(self) -> bool {
        self == CheckoutContext::BlocksCheckout
    }
}

impl Default for CheckoutContext {
    fn default() -> Self {
        CheckoutContext::BlocksCheckout
    }
}

/// Ids of the hidden probe nodes. Shared by every context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSelectors {
    pub container: &'static str,
    pub input: &'static str,
    pub invalid_input: &'static str,
    pub valid_label: &'static str,
    pub invalid_label: &'static str,
}

pub const PROBE_SELECTORS: ProbeSelectors = ProbeSelectors {
    container: "#appearance-probe",
    input: "#appearance-probe-input",
    invalid_input: "#appearance-probe-invalid-input",
    valid_label: "#appearance-probe-valid-label",
    invalid_label: "#appearance-probe-invalid-label",
};

/// Bundle fields that may be swapped for an alternate when the primary
/// selector matches nothing in the scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKey {
    AppendTarget,
    ThemeInput,
    ThemeLabel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorBundle {
    pub probe: ProbeSelectors,
    pub append_target: &'static str,
    pub theme_input: &'static str,
    pub theme_label: &'static str,
    pub text: &'static [&'static str],
    pub row_element: &'static str,
    pub valid_classes: &'static [&'static str],
    pub invalid_classes: &'static [&'static str],
    pub background: &'static [&'static str],
    pub heading: &'static [&'static str],
    pub button: &'static [&'static str],
    pub link: &'static [&'static str],
    pub container: Option<&'static [&'static str]>,
    pub header: Option<&'static [&'static str]>,
    pub footer: Option<&'static [&'static str]>,
    pub footer_link: Option<&'static [&'static str]>,
    pub relative_text_size: Option<&'static str>,
    alternate_selectors: Option<&'static [(SelectorKey, &'static str)]>,
}

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

impl SelectorBundle {
    /// Unresolved bundle for a context; alternates are still pending.
    pub fn for_context(context: CheckoutContext) -> Self {
        match context {
            CheckoutContext::BlocksCheckout => Self {
                probe: PROBE_SELECTORS,
                append_target: "#billing.wc-block-components-address-form",
                theme_input: "#billing-first_name",
                theme_label: "#billing-first_name ~ label",
                text: &[
                    ".wc-block-components-checkout-step__description",
                    ".wc-block-components-text-input input",
                ],
                row_element: "div",
                valid_classes: &["wc-block-components-text-input", "is-active"],
                invalid_classes: &["wc-block-components-text-input", "has-error"],
                background: &[
                    "#payment-method .wc-block-components-radio-control-accordion-option",
                    "#payment-method",
                    "form.wc-block-checkout__form",
                    ".wc-block-checkout",
                    "body",
                ],
                heading: HEADINGS,
                button: &[".wc-block-components-checkout-place-order-button"],
                link: &["a"],
                container: Some(&[".wp-block-woocommerce-checkout-order-summary-block"]),
                header: Some(&[".wc-block-components-checkout-step__title"]),
                footer: Some(&[".wc-block-checkout__actions"]),
                footer_link: Some(&[".wc-block-components-checkout-return-to-cart-button"]),
                relative_text_size: None,
                alternate_selectors: Some(&[
                    (
                        SelectorKey::AppendTarget,
                        "#shipping.wc-block-components-address-form",
                    ),
                    (SelectorKey::ThemeInput, "#shipping-first_name"),
                    (SelectorKey::ThemeLabel, "#shipping-first_name ~ label"),
                ]),
            },
            CheckoutContext::ShortcodeCheckout => Self {
                probe: PROBE_SELECTORS,
                append_target: ".woocommerce-billing-fields__field-wrapper",
                theme_input: "#billing_first_name",
                theme_label: ".woocommerce-checkout .form-row label",
                text: &[
                    "#payment .payment_methods li .payment_box fieldset",
                    ".woocommerce-checkout .form-row",
                ],
                row_element: "p",
                valid_classes: &["form-row"],
                invalid_classes: &[
                    "form-row",
                    "woocommerce-invalid",
                    "woocommerce-invalid-required-field",
                ],
                background: &[
                    "li.wc_payment_method .payment_box",
                    "#payment",
                    "#order_review",
                    "form.checkout",
                    "body",
                ],
                heading: HEADINGS,
                button: &["#place_order"],
                link: &["a"],
                container: Some(&["#order_review"]),
                header: None,
                footer: None,
                footer_link: None,
                relative_text_size: None,
                alternate_selectors: None,
            },
            CheckoutContext::BnplProductPage => Self {
                probe: PROBE_SELECTORS,
                append_target: ".product .cart .quantity",
                theme_input: ".product .cart .quantity .qty",
                theme_label: ".product .cart .quantity label",
                text: &[".product .summary .price", ".product .summary"],
                row_element: "div",
                valid_classes: &["input-text"],
                invalid_classes: &["input-text"],
                background: &[
                    "#payment-method-message",
                    ".product .summary",
                    ".product",
                    "#main",
                    "body",
                ],
                heading: HEADINGS,
                button: &[".single_add_to_cart_button"],
                link: &["a"],
                container: None,
                header: None,
                footer: None,
                footer_link: None,
                relative_text_size: Some(".product .summary .price"),
                alternate_selectors: None,
            },
            CheckoutContext::BnplClassicCart => Self {
                probe: PROBE_SELECTORS,
                append_target: ".cart .quantity",
                theme_input: ".cart .quantity .qty",
                theme_label: ".cart .quantity label",
                text: &[".cart_totals .order-total td", ".cart_totals"],
                row_element: "div",
                valid_classes: &["input-text"],
                invalid_classes: &["input-text"],
                background: &[
                    "#payment-method-message",
                    ".cart_totals",
                    ".woocommerce-cart-form",
                    "body",
                ],
                heading: HEADINGS,
                button: &[".checkout-button"],
                link: &["a"],
                container: None,
                header: None,
                footer: None,
                footer_link: None,
                relative_text_size: Some(".cart_totals .order-total .amount"),
                alternate_selectors: None,
            },
            CheckoutContext::BnplCartBlock => Self {
                probe: PROBE_SELECTORS,
                append_target: ".wc-block-cart .wc-block-components-quantity-selector",
                theme_input: ".wc-block-components-quantity-selector__input",
                theme_label: ".wc-block-components-totals-item__label",
                text: &[
                    ".wc-block-components-totals-footer-item",
                    ".wc-block-cart__totals-title",
                ],
                row_element: "div",
                valid_classes: &["wc-block-components-text-input"],
                invalid_classes: &["wc-block-components-text-input", "has-error"],
                background: &[
                    "#payment-method-message",
                    ".wc-block-cart__sidebar",
                    ".wc-block-cart",
                    "body",
                ],
                heading: HEADINGS,
                button: &[".wc-block-cart__submit-button"],
                link: &["a"],
                container: None,
                header: None,
                footer: None,
                footer_link: None,
                relative_text_size: Some(".wc-block-components-totals-footer-item-tax-value"),
                alternate_selectors: None,
            },
            CheckoutContext::HostedCheckout => Self {
                probe: PROBE_SELECTORS,
                append_target: ".woocommerce-billing-fields__field-wrapper",
                theme_input: "#billing_first_name",
                theme_label: ".woocommerce-checkout .form-row label",
                text: &[
                    ".woocommerce-checkout .form-row",
                    ".woocommerce-checkout",
                ],
                row_element: "p",
                valid_classes: &["form-row"],
                invalid_classes: &[
                    "form-row",
                    "woocommerce-invalid",
                    "woocommerce-invalid-required-field",
                ],
                background: &["#customer_details", "form.checkout", "#main", "body"],
                heading: HEADINGS,
                button: &["#place_order"],
                link: &["a"],
                container: Some(&["#customer_details"]),
                header: Some(&[".site-header"]),
                footer: Some(&[".site-footer"]),
                footer_link: Some(&[".site-footer a"]),
                relative_text_size: None,
                alternate_selectors: None,
            },
        }
    }

    pub fn get(&self, key: SelectorKey) -> &'static str {
        match key {
            SelectorKey::AppendTarget => self.append_target,
            SelectorKey::ThemeInput => self.theme_input,
            SelectorKey::ThemeLabel => self.theme_label,
        }
    }

    fn set(&mut self, key: SelectorKey, selector: &'static str) {
        match key {
            SelectorKey::AppendTarget => self.append_target = selector,
            SelectorKey::ThemeInput => self.theme_input = selector,
            SelectorKey::ThemeLabel => self.theme_label = selector,
        }
    }

    pub fn has_pending_alternates(&self) -> bool {
        self.alternate_selectors.is_some()
    }

    /// Swaps in each alternate whose primary selector matches nothing, then
    /// drops the alternate table. Calling it again is a no-op.
    pub fn resolve_alternates<S: Scope>(&mut self, scope: &S) {
        let Some(alternates) = self.alternate_selectors.take() else {
            return;
        };
        for &(key, alternate) in alternates {
            if scope.query_selector(self.get(key)).is_none() {
                self.set(key, alternate);
            }
        }
    }
}

pub fn get_selectors<S: Scope>(context: CheckoutContext, scope: &S) -> SelectorBundle {
    let mut bundle = SelectorBundle::for_context(context);
    bundle.resolve_alternates(scope);
    bundle
}
