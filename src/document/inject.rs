use std::cell::RefCell;
use std::rc::Rc;

use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData};
use tracing::debug;

use super::tree::{Document, HTML_NAMESPACE, html_element_name};

impl Document {
  /// Append the bundle references to the document head, stylesheet first.
  ///
  /// The parser always synthesises a head; should it be missing the tags go to the document
  /// element, or the root as a last resort.
  pub fn inject_bundle_tags(&self, css_url: &str, js_url: &str) {
    let target = find_head(self.root()).unwrap_or_else(|| {
      debug!("document has no <head>, appending bundle tags to the document element");
      document_element(self.root()).unwrap_or_else(|| self.root().clone())
    });

    append(&target, element(
      "link",
      &[("rel", "stylesheet"), ("href", css_url), ("type", "text/css")],
    ));
    append(&target, element(
      "script",
      &[("type", "text/javascript"), ("src", js_url), ("defer", "")],
    ));
  }
}

fn document_element(root: &Handle) -> Option<Handle> {
  root
    .children
    .borrow()
    .iter()
    .find(|child| html_element_name(child) == Some("html"))
    .cloned()
}

fn find_head(root: &Handle) -> Option<Handle> {
  let html = document_element(root)?;
  let children = html.children.borrow();
  children
    .iter()
    .find(|child| html_element_name(child) == Some("head"))
    .cloned()
}

fn element(local: &str, attributes: &[(&str, &str)]) -> Handle {
  let attrs = attributes
    .iter()
    .map(|(name, value)| Attribute {
      name: QualName::new(None, Namespace::from(""), LocalName::from(*name)),
      value: StrTendril::from_slice(value),
    })
    .collect();

  Node::new(NodeData::Element {
    name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(local)),
    attrs: RefCell::new(attrs),
    template_contents: RefCell::new(None),
    mathml_annotation_xml_integration_point: false,
  })
}

fn append(parent: &Handle, child: Handle) {
  child.parent.set(Some(Rc::downgrade(parent)));
  parent.children.borrow_mut().push(child);
}
