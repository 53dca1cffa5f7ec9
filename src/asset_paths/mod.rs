//! Helpers for relocating relative `url(...)` references when stylesheets move into a bundle.
//!
//! The responsibilities are split into focused submodules so that reference filtering, POSIX
//! segment resolution, and the stylesheet rewrite itself can be tested independently.

mod filters;
mod resolve;
mod rewrite;

pub use filters::{is_passthrough_reference, needs_quoting};
pub use resolve::{directory_of, resolve_segments};
pub use rewrite::rewrite_css_urls;
