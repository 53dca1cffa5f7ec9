use std::io;
use std::rc::Rc;

use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

pub(crate) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parsed HTML document backed by an `RcDom`.
pub struct Document {
  dom: RcDom,
}

impl Document {
  /// Parse `html` the way a browser would, recovering from malformed markup.
  ///
  /// Missing `<html>`, `<head>` and `<body>` elements are synthesised, so the serialised output
  /// always contains a `</head>` marker.
  pub fn parse(html: &str) -> Self {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    Self { dom }
  }

  /// Root document node.
  pub(crate) fn root(&self) -> &Handle {
    &self.dom.document
  }

  /// Remove every node from its parent, keeping sibling order intact.
  pub fn detach_all(&self, nodes: &[Handle]) {
    for node in nodes {
      detach(node);
    }
  }

  /// Serialise the tree back to markup.
  ///
  /// Template contents live in a separate fragment that the serializer skips, so they are moved
  /// under their `<template>` element first.
  pub fn to_html(&self) -> io::Result<String> {
    adopt_template_contents(&self.dom.document);
    let document: SerializableHandle = self.dom.document.clone().into();
    let mut bytes = Vec::new();
    serialize(&mut bytes, &document, SerializeOpts::default())?;
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
  }
}

fn adopt_template_contents(node: &Handle) {
  if let NodeData::Element {
    template_contents, ..
  } = &node.data
  {
    let fragment = template_contents.borrow_mut().take();
    if let Some(fragment) = fragment {
      let moved = fragment.children.take();
      for child in &moved {
        child.parent.set(Some(Rc::downgrade(node)));
      }
      node.children.borrow_mut().extend(moved);
    }
  }

  let children: Vec<Handle> = node.children.borrow().clone();
  for child in &children {
    adopt_template_contents(child);
  }
}

pub(crate) fn parent_of(node: &Handle) -> Option<Handle> {
  let weak = node.parent.take();
  let parent = weak.as_ref().and_then(|weak| weak.upgrade());
  node.parent.set(weak);
  parent
}

fn detach(node: &Handle) {
  let Some(parent) = parent_of(node) else {
    return;
  };
  parent
    .children
    .borrow_mut()
    .retain(|child| !Rc::ptr_eq(child, node));
  node.parent.set(None);
}

/// Local name of an HTML element, or `None` for other nodes and foreign content.
pub(crate) fn html_element_name(node: &Handle) -> Option<&str> {
  match &node.data {
    NodeData::Element { name, .. } if &*name.ns == HTML_NAMESPACE => {
      Some(&*name.local)
    }
    _ => None,
  }
}

pub(crate) fn attribute(node: &Handle, key: &str) -> Option<String> {
  let NodeData::Element { attrs, .. } = &node.data else {
    return None;
  };
  attrs
    .borrow()
    .iter()
    .find(|attr| &*attr.name.local == key)
    .map(|attr| attr.value.to_string())
}

pub(crate) fn text_content(node: &Handle) -> String {
  let mut text = String::new();
  collect_text(node, &mut text);
  text
}

fn collect_text(node: &Handle, out: &mut String) {
  if let NodeData::Text { contents } = &node.data {
    out.push_str(&contents.borrow());
  }
  for child in node.children.borrow().iter() {
    collect_text(child, out);
  }
}

/// XPath-like position of an element, e.g. `/html/head/link[2]`.
///
/// The index is only present when the parent holds more than one element with that name.
pub(crate) fn node_path(node: &Handle) -> String {
  let mut parts = Vec::new();
  let mut current = node.clone();

  loop {
    let NodeData::Element { name, .. } = &current.data else {
      break;
    };
    let local = name.local.to_string();
    let Some(parent) = parent_of(&current) else {
      parts.push(local);
      break;
    };

    let part = {
      let siblings = parent.children.borrow();
      let same_name: Vec<&Handle> = siblings
        .iter()
        .filter(|sibling| match &sibling.data {
          NodeData::Element { name, .. } => *name.local == *local,
          _ => false,
        })
        .collect();
      if same_name.len() > 1 {
        let position = same_name
          .into_iter()
          .position(|sibling| Rc::ptr_eq(sibling, &current))
          .map_or(0, |index| index + 1);
        format!("{local}[{position}]")
      } else {
        local
      }
    };
    parts.push(part);

    current = parent;
  }

  parts.reverse();
  format!("/{}", parts.join("/"))
}
