/// Read side of a computed style: `CSSStyleDeclaration.getPropertyValue`.
///
/// Property names are dashed CSS names (`padding-left`). An empty string means
/// the property is not set or not known.
pub trait StyleDeclaration {
    fn get_property_value(&self, property: &str) -> String;
}

/// DOM-like host environment the extraction pipeline reads from and, for the
/// hidden probe only, writes to.
///
/// Implementations must never panic on a malformed selector; they report it as
/// "no match" instead. Node handles are cheap clones referring to the same node.
pub trait Scope {
    type Node: Clone;
    type Style: StyleDeclaration;

    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    fn create_element(&self, tag: &str) -> Option<Self::Node>;

    /// Deep clone, detached from the tree.
    fn clone_node(&self, node: &Self::Node) -> Self::Node;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node);

    /// Detaches the node from its parent. Detaching a detached node is a no-op.
    fn remove_node(&self, node: &Self::Node);

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    fn add_classes(&self, node: &Self::Node, classes: &[&str]);

    /// Sets an inline style declaration, overriding earlier inline values.
    fn set_style_property(&self, node: &Self::Node, property: &str, value: &str);

    fn computed_style(&self, node: &Self::Node) -> Self::Style;

    /// `href` of every linked stylesheet, in document order.
    fn style_sheet_hrefs(&self) -> Vec<String>;
}
