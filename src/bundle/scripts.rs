//! Script assembly for the JS bundle.

use super::provenance_comment;
use crate::models::Resource;

/// Render one script as a provenance-annotated unit guarded by `try`/`catch`.
///
/// An exception thrown by one unit is logged to the console and does not prevent the units
/// after it from running.
pub fn render_js_unit(resource: &Resource, content: &str) -> String {
  format!(
    "try {{\n{}{}\n}} catch(err) {{ console.log(err); }};\n\n",
    provenance_comment(resource),
    content
  )
}

/// Concatenate rendered units; each unit already ends with a blank line.
pub fn join_js_units(units: Vec<String>) -> String {
  units.concat()
}
