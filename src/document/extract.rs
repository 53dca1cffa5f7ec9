use markup5ever_rcdom::Handle;

use super::tree::{Document, attribute, html_element_name, node_path, text_content};
use crate::fingerprint::identity;
use crate::models::{Resource, ResourceKind, ResourceOrigin};
use crate::selection::ResourceFilter;

const DEFAULT_SCRIPT_TYPE: &str = "text/javascript";

/// Resources found in a document together with the tags that produced them.
#[derive(Default)]
pub struct Extraction {
  /// Eligible resources in document order.
  pub resources: Vec<Resource>,
  /// Source tags, detached once the bundles are available.
  pub removals: Vec<Handle>,
}

impl Extraction {
  /// Resources of a single kind, still in document order.
  pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
    self
      .resources
      .iter()
      .filter(move |resource| resource.kind == kind)
  }

  /// Returns `true` when nothing in the document can be bundled.
  pub fn is_empty(&self) -> bool {
    self.resources.is_empty()
  }
}

impl Document {
  /// Walk the tree in document order and collect every bundlable `<link>`, `<style>` and
  /// `<script>` element. The tree itself is left untouched.
  pub fn extract<F: ResourceFilter>(&self, filter: &F) -> Extraction {
    let mut extraction = Extraction::default();
    visit(self.root(), filter, &mut extraction);
    extraction
  }
}

fn visit<F: ResourceFilter>(node: &Handle, filter: &F, extraction: &mut Extraction) {
  if let Some((kind, origin, media)) = classify(node)
    && is_selected(&origin, filter)
  {
    extraction.resources.push(Resource {
      kind,
      identity: identity(&origin),
      origin,
      media,
      locator: node_path(node),
    });
    extraction.removals.push(node.clone());
    return;
  }

  for child in node.children.borrow().iter() {
    visit(child, filter, extraction);
  }
}

fn is_selected<F: ResourceFilter>(origin: &ResourceOrigin, filter: &F) -> bool {
  match origin {
    ResourceOrigin::External { url } => filter.is_included(url),
    ResourceOrigin::Inline { .. } => true,
  }
}

fn classify(node: &Handle) -> Option<(ResourceKind, ResourceOrigin, Option<String>)> {
  match html_element_name(node)? {
    "link" => {
      if attribute(node, "rel")? != "stylesheet" {
        return None;
      }
      let url = attribute(node, "href")?;
      Some((
        ResourceKind::Css,
        ResourceOrigin::External { url },
        Some(media_of(node)),
      ))
    }
    "style" => Some((
      ResourceKind::Css,
      ResourceOrigin::Inline {
        content: text_content(node).trim().to_string(),
      },
      Some(media_of(node)),
    )),
    "script" => {
      let script_type = attribute(node, "type").unwrap_or_else(|| DEFAULT_SCRIPT_TYPE.into());
      if !script_type.contains("javascript") {
        return None;
      }
      let origin = match attribute(node, "src") {
        Some(url) => ResourceOrigin::External { url },
        None => ResourceOrigin::Inline {
          content: text_content(node).trim().to_string(),
        },
      };
      Some((ResourceKind::Js, origin, None))
    }
    _ => None,
  }
}

fn media_of(node: &Handle) -> String {
  attribute(node, "media").unwrap_or_else(|| "all".into())
}
