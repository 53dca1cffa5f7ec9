//! HTML tree handling: permissive parsing, resource extraction, and bundle tag injection.
//!
//! Extraction and removal are separate passes. [`Document::extract`] only reads
//! the tree and returns the matched nodes; [`Document::detach_all`] mutates it afterwards.

mod extract;
mod inject;
mod tree;

pub use extract::Extraction;
pub use tree::Document;
