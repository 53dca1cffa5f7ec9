#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod bundle;
pub mod config;
pub mod document;
pub mod error;
pub mod fingerprint;
pub mod minify;
pub mod models;
pub mod selection;

pub use builder::{BuildResult, ConcatBuilder};
pub use bundle::fetch::{HttpFetcher, ResourceFetcher};
pub use bundle::store::{CacheStore, FsCacheStore};
pub use config::BundlerConfig;
pub use error::BundleError;
pub use minify::{HtmlMinifier, Minify, Passthrough};
pub use models::{BundleKey, BundlePlan, Resource, ResourceKind, ResourceOrigin};
pub use selection::{BundleSelection, ResourceFilter};
