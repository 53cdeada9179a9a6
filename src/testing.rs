use crate::probe::PROBE_ID_PREFIX;
use crate::scope::{Scope, StyleDeclaration};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

const ROOT: usize = 0;

/// Mock host where every selector that is not explicitly missing resolves to
/// an element, and every element reports the same computed-style table unless
/// overridden per selector. Probe ids only resolve while the probe is attached.
pub(crate) struct FixtureScope {
    styles: HashMap<String, String>,
    element_styles: HashMap<String, HashMap<String, String>>,
    missing: HashSet<String>,
    panic_on_id: Option<String>,
    hrefs: Vec<String>,
    nodes: RefCell<Vec<FixtureNode>>,
    by_selector: RefCell<HashMap<String, usize>>,
}

#[derive(Clone)]
struct FixtureNode {
    attrs: BTreeMap<String, String>,
    parent: Option<usize>,
    source: Option<String>,
}

pub(crate) struct FixtureStyle(HashMap<String, String>);

impl StyleDeclaration for FixtureStyle {
    fn get_property_value(&self, property: &str) -> String {
        self.0.get(property).cloned().unwrap_or_default()
    }
}

impl FixtureScope {
    pub fn new(styles: &[(&str, &str)]) -> Self {
        Self {
            styles: owned(styles),
            element_styles: HashMap::new(),
            missing: HashSet::new(),
            panic_on_id: None,
            hrefs: Vec::new(),
            nodes: RefCell::new(vec![FixtureNode {
                attrs: BTreeMap::new(),
                parent: None,
                source: None,
            }]),
            by_selector: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_missing(mut self, selectors: &[&str]) -> Self {
        self.missing
            .extend(selectors.iter().map(|selector| selector.to_string()));
        self
    }

    pub fn with_element_styles(mut self, selector: &str, styles: &[(&str, &str)]) -> Self {
        self.element_styles
            .insert(selector.to_string(), owned(styles));
        self
    }

    pub fn with_stylesheets(mut self, hrefs: &[&str]) -> Self {
        self.hrefs = hrefs.iter().map(|href| href.to_string()).collect();
        self
    }

    /// Reading the computed style of the element with this id panics.
    pub fn panic_on_id(mut self, id: &str) -> Self {
        self.panic_on_id = Some(id.to_string());
        self
    }

    pub fn attached_probe_count(&self) -> usize {
        let nodes = self.nodes.borrow();
        (0..nodes.len())
            .filter(|idx| {
                nodes[*idx]
                    .attrs
                    .get("id")
                    .is_some_and(|id| id.starts_with(PROBE_ID_PREFIX))
                    && is_attached(&nodes, *idx)
            })
            .count()
    }

    fn find_attached_id(&self, id: &str) -> Option<usize> {
        let nodes = self.nodes.borrow();
        (0..nodes.len()).find(|idx| {
            nodes[*idx].attrs.get("id").is_some_and(|value| value == id) && is_attached(&nodes, *idx)
        })
    }

    fn page_node(&self, selector: &str) -> usize {
        if let Some(idx) = self.by_selector.borrow().get(selector) {
            return *idx;
        }
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(FixtureNode {
            attrs: BTreeMap::new(),
            parent: Some(ROOT),
            source: Some(selector.to_string()),
        });
        let idx = nodes.len() - 1;
        self.by_selector
            .borrow_mut()
            .insert(selector.to_string(), idx);
        idx
    }

    fn with_node(&self, node: usize, apply: impl FnOnce(&mut FixtureNode)) {
        if let Some(entry) = self.nodes.borrow_mut().get_mut(node) {
            apply(entry);
        }
    }
}

impl Scope for FixtureScope {
    type Node = usize;
    type Style = FixtureStyle;

    fn query_selector(&self, selector: &str) -> Option<usize> {
        if self.missing.contains(selector) {
            return None;
        }
        if let Some(id) = simple_id(selector) {
            if let Some(idx) = self.find_attached_id(id) {
                return Some(idx);
            }
            if id.starts_with(PROBE_ID_PREFIX) {
                return None;
            }
        }
        Some(self.page_node(selector))
    }

    fn create_element(&self, _tag: &str) -> Option<usize> {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(FixtureNode {
            attrs: BTreeMap::new(),
            parent: None,
            source: None,
        });
        Some(nodes.len() - 1)
    }

    fn clone_node(&self, node: &usize) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        let mut copy = nodes[*node].clone();
        copy.parent = None;
        nodes.push(copy);
        nodes.len() - 1
    }

    fn append_child(&self, parent: &usize, child: &usize) {
        let parent = *parent;
        self.with_node(*child, |node| node.parent = Some(parent));
    }

    fn remove_node(&self, node: &usize) {
        self.with_node(*node, |node| node.parent = None);
    }

    fn set_attribute(&self, node: &usize, name: &str, value: &str) {
        self.with_node(*node, |node| {
            node.attrs.insert(name.to_string(), value.to_string());
        });
    }

    fn add_classes(&self, node: &usize, classes: &[&str]) {
        self.with_node(*node, |node| {
            let current = node.attrs.entry("class".to_string()).or_default();
            for class in classes {
                if !current.split_whitespace().any(|existing| existing == *class) {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(class);
                }
            }
        });
    }

    fn set_style_property(&self, node: &usize, property: &str, value: &str) {
        self.with_node(*node, |node| {
            let style = node.attrs.entry("style".to_string()).or_default();
            style.push_str(&format!("{property}: {value};"));
        });
    }

    fn computed_style(&self, node: &usize) -> FixtureStyle {
        let (id, source) = {
            let nodes = self.nodes.borrow();
            let entry = &nodes[*node];
            (entry.attrs.get("id").cloned(), entry.source.clone())
        };
        if id.is_some() && id == self.panic_on_id {
            panic!("computed style read failed for #{}", id.unwrap_or_default());
        }
        let mut styles = self.styles.clone();
        if let Some(overrides) = source.and_then(|source| self.element_styles.get(&source)) {
            styles.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        FixtureStyle(styles)
    }

    fn style_sheet_hrefs(&self) -> Vec<String> {
        self.hrefs.clone()
    }
}

/// The storefront computed-style table most tests sample from.
pub(crate) fn checkout_fixture() -> FixtureScope {
    FixtureScope::new(&[
        ("color", "rgb(109,109,109)"),
        ("background-color", "rgba(0,0,0,0)"),
        (
            "font-family",
            "\"Source Sans Pro\", HelveticaNeue-Light, \"Helvetica Neue Light\"",
        ),
        ("font-size", "12px"),
        ("outline-color", "rgb(150,88,138)"),
        ("outline-width", "1px"),
        ("padding", "10px"),
    ])
}

fn owned(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn simple_id(selector: &str) -> Option<&str> {
    let id = selector.strip_prefix('#')?;
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        .then_some(id)
}

fn is_attached(nodes: &[FixtureNode], mut idx: usize) -> bool {
    for _ in 0..nodes.len() {
        if idx == ROOT {
            return true;
        }
        match nodes[idx].parent {
            Some(parent) => idx = parent,
            None => return false,
        }
    }
    false
}
