use crate::scope::Scope;
use crate::style::{ComputedStyle, StyleResolver};
use kuchiki::traits::TendrilSink;
use kuchiki::{NodeData, NodeRef};

/// A parsed HTML document with its author stylesheets, usable as a [`Scope`].
///
/// Stylesheets are collected once, from every `<style>` block present at parse
/// time plus any extra CSS handed in. Elements added later are styled by those
/// rules like any other element.
pub struct HtmlPage {
    document: NodeRef,
    resolver: StyleResolver,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self::parse_with_css(html, "")
    }

    pub fn parse_with_css(html: &str, extra_css: &str) -> Self {
        let document = kuchiki::parse_html().one(html);
        let mut css = String::new();
        if let Ok(styles) = document.select("style") {
            for style in styles {
                let node = style.as_node();
                let nested_in_svg = node.ancestors().any(|ancestor| {
                    if let NodeData::Element(el) = ancestor.data() {
                        el.name.local.as_ref().eq_ignore_ascii_case("svg")
                    } else {
                        false
                    }
                });
                if nested_in_svg {
                    continue;
                }
                css.push_str(&node.text_contents());
                css.push('\n');
            }
        }
        css.push_str(extra_css);
        let resolver = StyleResolver::new(&css);
        Self { document, resolver }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }
}

impl Scope for HtmlPage {
    type Node = NodeRef;
    type Style = ComputedStyle;

    fn query_selector(&self, selector: &str) -> Option<NodeRef> {
        self.document
            .select_first(selector)
            .ok()
            .map(|element| element.as_node().clone())
    }

    fn create_element(&self, tag: &str) -> Option<NodeRef> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return None;
        }
        let fragment = kuchiki::parse_html().one(format!("<body><{tag}></{tag}></body>"));
        let element = fragment.select_first(&format!("body > {tag}")).ok()?;
        let node = element.as_node().clone();
        node.detach();
        Some(node)
    }

    fn clone_node(&self, node: &NodeRef) -> NodeRef {
        deep_clone(node)
    }

    fn append_child(&self, parent: &NodeRef, child: &NodeRef) {
        parent.append(child.clone());
    }

    fn remove_node(&self, node: &NodeRef) {
        node.detach();
    }

    fn set_attribute(&self, node: &NodeRef, name: &str, value: &str) {
        if let Some(element) = node.as_element() {
            element
                .attributes
                .borrow_mut()
                .insert(name, value.to_string());
        }
    }

    fn add_classes(&self, node: &NodeRef, classes: &[&str]) {
        let Some(element) = node.as_element() else {
            return;
        };
        let mut attrs = element.attributes.borrow_mut();
        let mut list: Vec<String> = attrs
            .get("class")
            .map(|current| current.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        for class in classes {
            if !list.iter().any(|existing| existing == class) {
                list.push(class.to_string());
            }
        }
        attrs.insert("class", list.join(" "));
    }

    fn set_style_property(&self, node: &NodeRef, property: &str, value: &str) {
        let Some(element) = node.as_element() else {
            return;
        };
        let mut attrs = element.attributes.borrow_mut();
        let mut style = attrs.get("style").unwrap_or("").trim().to_string();
        if !style.is_empty() && !style.ends_with(';') {
            style.push(';');
        }
        if !style.is_empty() {
            style.push(' ');
        }
        style.push_str(&format!("{property}: {value};"));
        attrs.insert("style", style);
    }

    fn computed_style(&self, node: &NodeRef) -> ComputedStyle {
        self.resolver.compute(node)
    }

    fn style_sheet_hrefs(&self) -> Vec<String> {
        let mut hrefs = Vec::new();
        if let Ok(links) = self.document.select("link[rel][href]") {
            for link in links {
                let attrs = link.attributes.borrow();
                let rel = attrs.get("rel").unwrap_or("").to_ascii_lowercase();
                if rel.split_whitespace().any(|token| token == "stylesheet") {
                    hrefs.push(attrs.get("href").unwrap_or("").to_string());
                }
            }
        }
        hrefs
    }
}

fn deep_clone(node: &NodeRef) -> NodeRef {
    let copy = match node.data() {
        NodeData::Element(element) => NodeRef::new_element(
            element.name.clone(),
            element.attributes.borrow().map.clone(),
        ),
        NodeData::Text(text) => NodeRef::new_text(text.borrow().clone()),
        NodeData::Comment(comment) => NodeRef::new_comment(comment.borrow().clone()),
        _ => NodeRef::new_text(String::new()),
    };
    for child in node.children() {
        copy.append(deep_clone(&child));
    }
    copy
}
