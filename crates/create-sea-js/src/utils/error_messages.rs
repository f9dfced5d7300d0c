//! Common error messages used across the codebase.
//! Centralizes error message strings to ensure consistency and simplify maintenance.

use std::fmt::Display;

// Resolver errors
pub(crate) const NPM_NOT_FOUND: &str =
  "npm executable not found in PATH. Install Node.js or set `resolver = \"registry\"`";
pub(crate) const EMPTY_VERSION: &str = "lookup returned an empty version";

pub(crate) fn npm_non_zero_exit(status: impl Display, stderr: impl Display) -> String {
  format!("npm show exited with {status}: {stderr}")
}

pub(crate) fn registry_http_error(status: impl Display, url: impl Display) -> String {
  format!("HTTP {status}: {url}")
}

pub(crate) fn version_fetch_failed(package: impl Display, reason: impl Display) -> String {
  format!("Error fetching version for {package}: {reason}")
}

// Generator errors
pub(crate) fn directory_exists(name: impl Display) -> String {
  format!("Directory {name} already exists.")
}

pub(crate) fn invalid_project_name(name: impl Display) -> String {
  format!("Invalid project name '{name}'. Use a single directory name without path separators")
}

pub(crate) fn template_dir_missing(path: impl Display) -> String {
  format!("Template directory {path} does not exist")
}

pub(crate) fn target_inside_template(target: impl Display, template: impl Display) -> String {
  format!("Cannot create {target} inside the template directory {template}")
}
