use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

pub const UI_CORE_PACKAGE: &str = "sea-js-ui-core";
pub const VITE_PACKAGE: &str = "vite";

/// Packages every generated project depends on, in lookup order.
pub const DEPENDENCIES: [&str; 2] = [UI_CORE_PACKAGE, VITE_PACKAGE];

pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Caret constraint for a resolved version.
#[must_use]
pub fn caret(version: &str) -> String {
  format!("^{version}")
}

/// The `scripts` table. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scripts {
  pub test: String,
  pub start: String,
  pub build: String,
  pub serve: String,
}

impl Default for Scripts {
  fn default() -> Self {
    Self {
      test: "echo \"Error: no test specified\" && exit 1".to_string(),
      start: "vite".to_string(),
      build: "vite build".to_string(),
      serve: "vite preview".to_string(),
    }
  }
}

/// Contents of the generated `package.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectManifest {
  pub name: String,
  pub version: String,
  pub main: String,
  pub scripts: Scripts,
  pub keywords: Vec<String>,
  pub author: String,
  pub license: String,
  pub description: String,
  /// Package name -> version constraint.
  pub dependencies: BTreeMap<String, String>,
}

impl ProjectManifest {
  pub fn new(name: impl Into<String>, dependencies: BTreeMap<String, String>) -> Self {
    Self {
      name: name.into(),
      version: "1.0.0".to_string(),
      main: "index.js".to_string(),
      scripts: Scripts::default(),
      keywords: Vec::new(),
      author: String::new(),
      license: "ISC".to_string(),
      description: String::new(),
      dependencies,
    }
  }

  /// Pretty JSON with two-space indentation and a trailing newline.
  ///
  /// # Errors
  /// Returns an error if serialization fails.
  pub fn to_json_pretty(&self) -> Result<String> {
    let mut out = serde_json::to_string_pretty(self).context("failed to serialize package.json")?;
    out.push('\n');
    Ok(out)
  }
}
