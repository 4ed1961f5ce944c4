//! DOM capability traits and a reference tree implementation
//!
//! The engine never owns a document: elements are borrowed from the live
//! DOM for the duration of a single match call, and every call re-reads
//! current sibling/attribute state. The three traits below describe exactly
//! the capabilities matching needs (the Servo-style mutually-associated
//! node/element/document seam), so any host DOM can plug in.
//!
//! `TreeNode` is a minimal `Rc`-handle implementation of those traits. It
//! exists so the crate's tests have a document to match against, and it is
//! public because embedders without a DOM of their own can use it directly.

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use std::rc::Weak;

// ============================================================================
// Capability traits
// ============================================================================

/// Handle to any DOM node: element, text, comment or the document itself.
///
/// Sibling traversal runs over the full node axis, not just elements; the
/// matcher does its own element filtering because interleaved text and
/// comment nodes must not disturb structural pseudo-classes.
pub trait Node: Clone {
  type Element: Element<Node = Self>;

  fn parent(&self) -> Option<Self>;
  fn prev_sibling(&self) -> Option<Self>;
  fn next_sibling(&self) -> Option<Self>;
  fn first_child(&self) -> Option<Self>;

  /// Returns the element view of this node, or `None` for non-element
  /// nodes (text, comments, the document, fragment boundaries).
  fn as_element(&self) -> Option<Self::Element>;

  /// True for text nodes, including whitespace-only ones.
  fn is_text(&self) -> bool;
}

/// Handle to a DOM element.
///
/// Equality is node identity; `:focus` and `:root` rely on it.
pub trait Element: Clone + PartialEq {
  type Node: Node<Element = Self>;
  type Document: Document<Element = Self>;

  fn as_node(&self) -> Self::Node;

  /// Local (tag) name as written in the markup.
  fn local_name(&self) -> String;

  /// The element's id, or an empty string if it has none.
  fn id(&self) -> String;

  /// Attribute lookup. `None` means the attribute is not present at all,
  /// which matching distinguishes from an empty string value.
  fn attribute(&self, name: &str) -> Option<String>;

  /// The rendered text of this element and its descendants.
  fn text_content(&self) -> String;

  /// The owning document, if this element is part of one.
  fn document(&self) -> Option<Self::Document>;

  /// Whether this element is attached to a document.
  fn is_attached(&self) -> bool;

  /// Capability probe for disableable controls: `Some(disabled)` for
  /// elements that can carry a disabled state, `None` otherwise.
  /// Non-capable elements match neither `:enabled` nor `:disabled`.
  fn disabled_state(&self) -> Option<bool>;

  /// Capability probe for checkable controls: `Some(checked)` for
  /// checkbox/radio inputs and options (selectedness), `None` otherwise.
  fn checked_state(&self) -> Option<bool>;
}

/// Handle to the document an element belongs to.
pub trait Document: Clone {
  type Element: Element<Document = Self>;

  /// The document's top-level root element (`<html>` in HTML documents).
  fn root_element(&self) -> Option<Self::Element>;

  /// The element currently holding focus, if any.
  fn focused_element(&self) -> Option<Self::Element>;

  /// The fragment part of the document URL, without the leading `#`.
  fn url_fragment(&self) -> Option<String>;

  /// Document compatibility mode. Mode 9 and above enables the CSS3
  /// pseudo-class whitelist; below 8 the quirks restriction applies.
  fn compatibility_mode(&self) -> i32;
}

// ============================================================================
// Reference tree implementation
// ============================================================================

/// A node in the reference DOM tree.
#[derive(Clone)]
pub struct TreeNode(Rc<NodeData>);

struct NodeData {
  kind: NodeKind,
  parent: RefCell<Weak<NodeData>>,
  children: RefCell<Vec<TreeNode>>,
}

enum NodeKind {
  Document(DocumentData),
  Element(ElementData),
  Text(String),
  Comment(#[allow(dead_code)] String),
}

struct ElementData {
  tag: String,
  attributes: RefCell<Vec<(String, String)>>,
}

struct DocumentData {
  url_fragment: RefCell<Option<String>>,
  compatibility_mode: Cell<i32>,
  focused: RefCell<Option<TreeNode>>,
}

impl TreeNode {
  /// Creates a new document node.
  pub fn document() -> TreeNode {
    TreeNode(Rc::new(NodeData {
      kind: NodeKind::Document(DocumentData {
        url_fragment: RefCell::new(None),
        compatibility_mode: Cell::new(9),
        focused: RefCell::new(None),
      }),
      parent: RefCell::new(Weak::new()),
      children: RefCell::new(Vec::new()),
    }))
  }

  /// Creates a new element node with the given tag name.
  pub fn element(tag: &str) -> TreeNode {
    TreeNode(Rc::new(NodeData {
      kind: NodeKind::Element(ElementData {
        tag: tag.to_string(),
        attributes: RefCell::new(Vec::new()),
      }),
      parent: RefCell::new(Weak::new()),
      children: RefCell::new(Vec::new()),
    }))
  }

  /// Creates a new text node.
  pub fn text(text: &str) -> TreeNode {
    TreeNode(Rc::new(NodeData {
      kind: NodeKind::Text(text.to_string()),
      parent: RefCell::new(Weak::new()),
      children: RefCell::new(Vec::new()),
    }))
  }

  /// Creates a new comment node.
  pub fn comment(text: &str) -> TreeNode {
    TreeNode(Rc::new(NodeData {
      kind: NodeKind::Comment(text.to_string()),
      parent: RefCell::new(Weak::new()),
      children: RefCell::new(Vec::new()),
    }))
  }

  /// Appends a child node.
  pub fn append(&self, child: TreeNode) {
    *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
    self.0.children.borrow_mut().push(child);
  }

  /// Builder-style `append`.
  pub fn child(self, child: TreeNode) -> TreeNode {
    self.append(child);
    self
  }

  /// Sets an attribute, replacing any existing value.
  pub fn set_attribute(&self, name: &str, value: &str) {
    if let NodeKind::Element(data) = &self.0.kind {
      let mut attrs = data.attributes.borrow_mut();
      if let Some(entry) = attrs
        .iter_mut()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
      {
        entry.1 = value.to_string();
      } else {
        attrs.push((name.to_string(), value.to_string()));
      }
    }
  }

  /// Builder-style `set_attribute`.
  pub fn attr(self, name: &str, value: &str) -> TreeNode {
    self.set_attribute(name, value);
    self
  }

  /// The element view of this node, if it is an element.
  pub fn to_element(&self) -> Option<TreeElement> {
    match self.0.kind {
      NodeKind::Element(_) => Some(TreeElement(self.clone())),
      _ => None,
    }
  }

  /// The document view of this node, if it is a document.
  pub fn to_document(&self) -> Option<TreeDocument> {
    match self.0.kind {
      NodeKind::Document(_) => Some(TreeDocument(self.clone())),
      _ => None,
    }
  }

  fn index_in_parent(&self) -> Option<(TreeNode, usize)> {
    let parent = TreeNode(self.0.parent.borrow().upgrade()?);
    let index = parent
      .0
      .children
      .borrow()
      .iter()
      .position(|c| Rc::ptr_eq(&c.0, &self.0))?;
    Some((parent, index))
  }
}

impl PartialEq for TreeNode {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl Node for TreeNode {
  type Element = TreeElement;

  fn parent(&self) -> Option<TreeNode> {
    self.0.parent.borrow().upgrade().map(TreeNode)
  }

  fn prev_sibling(&self) -> Option<TreeNode> {
    let (parent, index) = self.index_in_parent()?;
    if index == 0 {
      return None;
    }
    let sibling = parent.0.children.borrow()[index - 1].clone();
    Some(sibling)
  }

  fn next_sibling(&self) -> Option<TreeNode> {
    let (parent, index) = self.index_in_parent()?;
    let children = parent.0.children.borrow();
    children.get(index + 1).cloned()
  }

  fn first_child(&self) -> Option<TreeNode> {
    self.0.children.borrow().first().cloned()
  }

  fn as_element(&self) -> Option<TreeElement> {
    self.to_element()
  }

  fn is_text(&self) -> bool {
    matches!(self.0.kind, NodeKind::Text(_))
  }
}

/// An element node in the reference DOM tree.
#[derive(Clone, PartialEq)]
pub struct TreeElement(TreeNode);

/// Tags whose elements can carry a disabled state.
const DISABLEABLE_TAGS: &[&str] = &["button", "input", "optgroup", "option", "select", "textarea"];

impl TreeElement {
  fn data(&self) -> &ElementData {
    match &self.0 .0.kind {
      NodeKind::Element(data) => data,
      _ => unreachable!("TreeElement wraps a non-element node"),
    }
  }

  fn collect_text(node: &TreeNode, out: &mut String) {
    for child in node.0.children.borrow().iter() {
      match &child.0.kind {
        NodeKind::Text(text) => out.push_str(text),
        NodeKind::Element(_) => Self::collect_text(child, out),
        _ => {}
      }
    }
  }
}

impl Element for TreeElement {
  type Node = TreeNode;
  type Document = TreeDocument;

  fn as_node(&self) -> TreeNode {
    self.0.clone()
  }

  fn local_name(&self) -> String {
    self.data().tag.clone()
  }

  fn id(&self) -> String {
    self.attribute("id").unwrap_or_default()
  }

  fn attribute(&self, name: &str) -> Option<String> {
    self
      .data()
      .attributes
      .borrow()
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.clone())
  }

  fn text_content(&self) -> String {
    let mut out = String::new();
    Self::collect_text(&self.0, &mut out);
    out
  }

  fn document(&self) -> Option<TreeDocument> {
    let mut node = self.0.clone();
    while let Some(parent) = node.parent() {
      node = parent;
    }
    node.to_document()
  }

  fn is_attached(&self) -> bool {
    self.document().is_some()
  }

  fn disabled_state(&self) -> Option<bool> {
    let tag = self.data().tag.to_ascii_lowercase();
    if DISABLEABLE_TAGS.contains(&tag.as_str()) {
      Some(self.attribute("disabled").is_some())
    } else {
      None
    }
  }

  fn checked_state(&self) -> Option<bool> {
    let tag = self.data().tag.to_ascii_lowercase();
    match tag.as_str() {
      "input" => {
        let input_type = self.attribute("type").unwrap_or_default().to_ascii_lowercase();
        match input_type.as_str() {
          "checkbox" | "radio" => Some(self.attribute("checked").is_some()),
          _ => None,
        }
      }
      "option" => Some(self.attribute("selected").is_some()),
      _ => None,
    }
  }
}

/// The document node of a reference DOM tree.
#[derive(Clone)]
pub struct TreeDocument(TreeNode);

impl TreeDocument {
  fn data(&self) -> &DocumentData {
    match &self.0 .0.kind {
      NodeKind::Document(data) => data,
      _ => unreachable!("TreeDocument wraps a non-document node"),
    }
  }

  /// The underlying node handle.
  pub fn as_node(&self) -> TreeNode {
    self.0.clone()
  }

  /// Sets the fragment part of the document URL (without the `#`).
  pub fn set_url_fragment(&self, fragment: Option<&str>) {
    *self.data().url_fragment.borrow_mut() = fragment.map(str::to_string);
  }

  /// Sets the document compatibility mode.
  pub fn set_compatibility_mode(&self, mode: i32) {
    self.data().compatibility_mode.set(mode);
  }

  /// Moves focus to the given element, or clears it.
  pub fn set_focused_element(&self, element: Option<&TreeElement>) {
    *self.data().focused.borrow_mut() = element.map(|e| e.as_node());
  }
}

impl Document for TreeDocument {
  type Element = TreeElement;

  fn root_element(&self) -> Option<TreeElement> {
    self
      .0
       .0
      .children
      .borrow()
      .iter()
      .find_map(|child| child.to_element())
  }

  fn focused_element(&self) -> Option<TreeElement> {
    self.data().focused.borrow().as_ref().and_then(|n| n.to_element())
  }

  fn url_fragment(&self) -> Option<String> {
    self.data().url_fragment.borrow().clone()
  }

  fn compatibility_mode(&self) -> i32 {
    self.data().compatibility_mode.get()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sibling_axis_covers_non_element_nodes() {
    let parent = TreeNode::element("ul");
    parent.append(TreeNode::text("  "));
    parent.append(TreeNode::element("li"));
    parent.append(TreeNode::comment("x"));
    parent.append(TreeNode::element("li"));

    let first = parent.first_child().unwrap();
    assert!(first.is_text());
    let li = first.next_sibling().unwrap();
    assert_eq!(li.as_element().unwrap().local_name(), "li");
    assert!(li.next_sibling().unwrap().as_element().is_none());
  }

  #[test]
  fn attribute_absent_vs_empty() {
    let div = TreeNode::element("div").attr("data-x", "");
    let element = div.to_element().unwrap();
    assert_eq!(element.attribute("data-x"), Some(String::new()));
    assert_eq!(element.attribute("data-y"), None);
  }

  #[test]
  fn capability_probes() {
    let input = TreeNode::element("input")
      .attr("type", "checkbox")
      .attr("checked", "");
    let element = input.to_element().unwrap();
    assert_eq!(element.checked_state(), Some(true));
    assert_eq!(element.disabled_state(), Some(false));

    let span = TreeNode::element("span").to_element().unwrap();
    assert_eq!(span.checked_state(), None);
    assert_eq!(span.disabled_state(), None);
  }

  #[test]
  fn document_reachable_from_descendants() {
    let doc = TreeNode::document();
    let html = TreeNode::element("html");
    let body = TreeNode::element("body");
    html.append(body.clone());
    doc.append(html);
    let body_el = body.to_element().unwrap();
    assert!(body_el.is_attached());
    let root = body_el.document().unwrap().root_element().unwrap();
    assert_eq!(root.local_name(), "html");

    let detached = TreeNode::element("div").to_element().unwrap();
    assert!(!detached.is_attached());
  }
}
