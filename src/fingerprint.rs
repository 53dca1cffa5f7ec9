//! Content addressing for resources and bundles using blake3.
//!
//! Digests are truncated to 128 bits and hex encoded, which keeps cache file names short while
//! staying far from accidental collisions.

use crate::models::{BundleKey, Resource, ResourceKind, ResourceOrigin};

const DIGEST_BYTES: usize = 16;

fn digest(bytes: &[u8]) -> String {
  let hash = blake3::hash(bytes);
  hex::encode(&hash.as_bytes()[..DIGEST_BYTES])
}

/// Fingerprint of a single resource.
///
/// Depends only on the URL of an external resource or the trimmed text of an inline one; media
/// and locator never take part.
pub fn identity(origin: &ResourceOrigin) -> String {
  match origin {
    ResourceOrigin::External { url } => digest(url.as_bytes()),
    ResourceOrigin::Inline { content } => digest(content.trim().as_bytes()),
  }
}

/// Key of the bundle holding every resource of `kind`, in document order.
///
/// Resources of other kinds are ignored. Duplicates are kept, and the key is order sensitive.
pub fn bundle_key(kind: ResourceKind, resources: &[Resource]) -> BundleKey {
  let mut hasher = blake3::Hasher::new();
  for resource in resources.iter().filter(|resource| resource.kind == kind) {
    hasher.update(resource.identity.as_bytes());
  }
  BundleKey {
    kind,
    digest: hex::encode(&hasher.finalize().as_bytes()[..DIGEST_BYTES]),
  }
}
