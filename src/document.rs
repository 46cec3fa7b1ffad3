use ego_tree::NodeId;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node};
use std::fmt::Debug;
use crate::errors::DocumentError;

pub const KIND_ELEMENT: &'static str = "element";
pub const KIND_TEXT: &'static str = "text";
pub const KIND_COMMENT: &'static str = "comment";
pub const KIND_DOCUMENT: &'static str = "document";
pub const KIND_FRAGMENT: &'static str = "fragment";
pub const KIND_DOCTYPE: &'static str = "doctype";
pub const KIND_PROCESSING_INSTRUCTION: &'static str = "processinginstruction";

/// Read/mutate view over a parsed tree, as consumed by the stripping engine.
///
/// Handles stay valid after mutation: a detached node keeps its handle, it is
/// simply no longer reachable from `root()`.
pub trait DocumentTree {
  type Handle: Copy + Eq + Debug;

  /// The node whose content is stripped and serialized.
  fn root(&self) -> Self::Handle;

  /// Every node below `root` in pre-order, children in document order.
  fn all_descendants(&self, root: Self::Handle) -> Result<Vec<Self::Handle>, DocumentError>;

  fn contains(&self, node: Self::Handle) -> bool;

  /// Lower-case structural kind, `None` for a foreign handle.
  fn node_kind(&self, node: Self::Handle) -> Option<&str>;

  fn tag_name(&self, node: Self::Handle) -> Option<&str>;

  fn attribute(&self, node: Self::Handle, key: &str) -> Option<&str>;

  fn is_attached(&self, node: Self::Handle) -> bool;

  fn remove_node(&mut self, node: Self::Handle) -> Result<(), DocumentError>;

  fn clear_children(&mut self, node: Self::Handle) -> Result<(), DocumentError>;

  fn clear_children_and_attributes(&mut self, node: Self::Handle) -> Result<(), DocumentError>;

  /// Markup of the node's content, without the node's own tag.
  fn serialize_inner(&self, node: Self::Handle) -> Result<String, DocumentError>;
}

pub fn node_kind_name(node: &Node) -> &'static str {
  match node {
    Node::Document => KIND_DOCUMENT,
    Node::Fragment => KIND_FRAGMENT,
    Node::Doctype(_) => KIND_DOCTYPE,
    Node::Comment(_) => KIND_COMMENT,
    Node::Text(_) => KIND_TEXT,
    Node::Element(_) => KIND_ELEMENT,
    Node::ProcessingInstruction(_) => KIND_PROCESSING_INSTRUCTION,
  }
}

/// `scraper::Html` addressed through ego-tree node ids.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
  html: Html,
  root: NodeId,
}

impl HtmlDocument {
  /// Full document; the content root is the document node itself.
  pub fn parse_document(source: &str) -> Self {
    let html = Html::parse_document(source);
    let root = html.tree.root().id();
    HtmlDocument { html, root }
  }

  /// The parser wraps fragments in a synthetic `<html>` element. That element
  /// becomes the content root so the fragment serializes back to its own markup.
  pub fn parse_fragment(source: &str) -> Self {
    let html = Html::parse_fragment(source);
    let tree_root = html.tree.root();
    let root = tree_root
      .children()
      .find(|child| child.value().is_element())
      .map(|child| child.id())
      .unwrap_or(tree_root.id());
    HtmlDocument { html, root }
  }

  pub fn parse(source: &str, fragment: bool) -> Self {
    if fragment {
      HtmlDocument::parse_fragment(source)
    } else {
      HtmlDocument::parse_document(source)
    }
  }

  /// Serialized content of the root, i.e. what a caller persists.
  pub fn to_html(&self) -> Result<String, DocumentError> {
    self.serialize_inner(self.root)
  }

  fn unknown(node: NodeId) -> DocumentError {
    DocumentError::UnknownNode(format!("{:?}", node))
  }
}

fn serialize_to_string<T: html5ever::serialize::Serialize>(node: &T, traversal_scope: TraversalScope) -> Result<String, DocumentError> {
  let opts = SerializeOpts {
    scripting_enabled: false,
    traversal_scope,
    create_missing_parent: false,
  };
  let mut buf = Vec::new();
  serialize(&mut buf, node, opts).map_err(DocumentError::Serialize)?;
  String::from_utf8(buf).map_err(DocumentError::Encoding)
}

impl DocumentTree for HtmlDocument {
  type Handle = NodeId;

  fn root(&self) -> NodeId {
    self.root
  }

  fn all_descendants(&self, root: NodeId) -> Result<Vec<NodeId>, DocumentError> {
    let node = self.html.tree.get(root).ok_or_else(|| HtmlDocument::unknown(root))?;
    // descendants() yields the node itself first
    Ok(node.descendants().skip(1).map(|n| n.id()).collect())
  }

  fn contains(&self, node: NodeId) -> bool {
    self.html.tree.get(node).is_some()
  }

  fn node_kind(&self, node: NodeId) -> Option<&str> {
    self.html.tree.get(node).map(|n| node_kind_name(n.value()))
  }

  fn tag_name(&self, node: NodeId) -> Option<&str> {
    self.html.tree.get(node)?.value().as_element().map(|el| el.name())
  }

  fn attribute(&self, node: NodeId, key: &str) -> Option<&str> {
    self.html.tree.get(node)?.value().as_element()?.attr(key)
  }

  fn is_attached(&self, node: NodeId) -> bool {
    match self.html.tree.get(node) {
      Some(n) => n.ancestors().any(|ancestor| ancestor.id() == self.root),
      None => false,
    }
  }

  fn remove_node(&mut self, node: NodeId) -> Result<(), DocumentError> {
    let mut target = self.html.tree.get_mut(node).ok_or_else(|| HtmlDocument::unknown(node))?;
    // detaching an orphan leaves it untouched
    target.detach();
    Ok(())
  }

  fn clear_children(&mut self, node: NodeId) -> Result<(), DocumentError> {
    let mut target = self.html.tree.get_mut(node).ok_or_else(|| HtmlDocument::unknown(node))?;
    while let Some(mut child) = target.first_child() {
      child.detach();
    }
    Ok(())
  }

  fn clear_children_and_attributes(&mut self, node: NodeId) -> Result<(), DocumentError> {
    self.clear_children(node)?;
    let mut target = self.html.tree.get_mut(node).ok_or_else(|| HtmlDocument::unknown(node))?;
    if let Node::Element(element) = target.value() {
      // rebuilt rather than cleared so cached id/class data goes too
      *element = Element::new(element.name.clone(), Vec::new());
    }
    Ok(())
  }

  fn serialize_inner(&self, node: NodeId) -> Result<String, DocumentError> {
    let node_ref = self.html.tree.get(node).ok_or_else(|| HtmlDocument::unknown(node))?;
    if node == self.html.tree.root().id() {
      // document and fragment nodes emit nothing of their own
      serialize_to_string(&self.html, TraversalScope::IncludeNode)
    } else if let Some(element) = ElementRef::wrap(node_ref) {
      serialize_to_string(&element, TraversalScope::ChildrenOnly(None))
    } else {
      Ok(String::new())
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn find_tag(doc: &HtmlDocument, tag: &str) -> NodeId {
    doc.all_descendants(doc.root()).unwrap()
      .into_iter()
      .find(|n| doc.tag_name(*n) == Some(tag))
      .unwrap()
  }

  #[test]
  fn test_fragment_round_trips_through_root() {
    let doc = HtmlDocument::parse_fragment(r#"<div class="ad">X</div><p>keep</p>"#);
    assert_eq!(doc.node_kind(doc.root()), Some(KIND_ELEMENT));
    assert_eq!(doc.to_html().unwrap(), r#"<div class="ad">X</div><p>keep</p>"#);
  }

  #[test]
  fn test_descendants_are_pre_order() {
    let doc = HtmlDocument::parse_fragment("<div><span>a</span><em>b</em></div><p>c</p>");
    let kinds: Vec<String> = doc.all_descendants(doc.root()).unwrap()
      .into_iter()
      .map(|n| doc.tag_name(n).map(|t| t.to_owned()).unwrap_or_else(|| doc.node_kind(n).unwrap_or("").to_owned()))
      .collect();
    assert_eq!(kinds, vec!["div", "span", "text", "em", "text", "p", "text"]);
  }

  #[test]
  fn test_node_kinds_and_attributes() {
    let doc = HtmlDocument::parse_fragment(r#"<!-- note --><a id="home" href="/">x</a>"#);
    let nodes = doc.all_descendants(doc.root()).unwrap();
    assert_eq!(doc.node_kind(nodes[0]), Some(KIND_COMMENT));
    assert_eq!(doc.tag_name(nodes[0]), None);
    assert_eq!(doc.attribute(nodes[0], "id"), None);
    let anchor = find_tag(&doc, "a");
    assert_eq!(doc.attribute(anchor, "id"), Some("home"));
    assert_eq!(doc.attribute(anchor, "ID"), None);
    assert_eq!(doc.attribute(anchor, "title"), None);
  }

  #[test]
  fn test_document_root_includes_doctype() {
    let doc = HtmlDocument::parse_document("<!DOCTYPE html><html><head></head><body><p>x</p></body></html>");
    assert_eq!(doc.node_kind(doc.root()), Some(KIND_DOCUMENT));
    let nodes = doc.all_descendants(doc.root()).unwrap();
    assert_eq!(doc.node_kind(nodes[0]), Some(KIND_DOCTYPE));
    let html = doc.to_html().unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<body><p>x</p></body>"));
  }

  #[test]
  fn test_remove_node_detaches_subtree() {
    let mut doc = HtmlDocument::parse_fragment("<div><span>a</span></div><p>b</p>");
    let div = find_tag(&doc, "div");
    let span = find_tag(&doc, "span");
    doc.remove_node(div).unwrap();
    assert!(!doc.is_attached(div));
    assert!(!doc.is_attached(span));
    assert!(doc.contains(span));
    assert_eq!(doc.to_html().unwrap(), "<p>b</p>");
    // second removal is a no-op
    doc.remove_node(div).unwrap();
    assert_eq!(doc.to_html().unwrap(), "<p>b</p>");
  }

  #[test]
  fn test_clear_children_keeps_attributes() {
    let mut doc = HtmlDocument::parse_fragment(r#"<ul id="menu"><li>a</li><li>b</li></ul>"#);
    let ul = find_tag(&doc, "ul");
    doc.clear_children(ul).unwrap();
    assert_eq!(doc.to_html().unwrap(), r#"<ul id="menu"></ul>"#);
    assert!(doc.is_attached(ul));
  }

  #[test]
  fn test_clear_children_and_attributes() {
    let mut doc = HtmlDocument::parse_fragment(r#"<section class="x" data-a="1"><p>a</p></section>"#);
    let section = find_tag(&doc, "section");
    doc.clear_children_and_attributes(section).unwrap();
    assert_eq!(doc.to_html().unwrap(), "<section></section>");
    assert_eq!(doc.attribute(section, "class"), None);
    assert_eq!(doc.tag_name(section), Some("section"));
  }

  #[test]
  fn test_foreign_handle_is_rejected() {
    let big = HtmlDocument::parse_fragment("<div><p><span>a</span><span>b</span></p></div>");
    let last = *big.all_descendants(big.root()).unwrap().last().unwrap();
    let mut small = HtmlDocument::parse_fragment("");
    assert!(!small.contains(last));
    assert_eq!(small.node_kind(last), None);
    assert!(matches!(small.remove_node(last), Err(DocumentError::UnknownNode(_))));
  }
}
