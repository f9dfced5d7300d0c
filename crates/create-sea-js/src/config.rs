use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use owo_colors::OwoColorize as _;
use serde::Deserialize;
use toml::Value as TomlValue;
use toml::value::Table as TomlTable;

/// Directory name used under the XDG config home.
const APP_PREFIX: &str = "create-sea-js";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Known top-level config keys.
const KNOWN_KEYS: &[&str] = &[
  "resolver",
  "registry",
  "timeout_secs",
  "on_lookup_failure",
  "fallback_constraint",
  "template_dir",
];

/// Environment variables that override a config key, applied last.
const ENV_OVERRIDES: &[(&str, &str)] = &[
  ("SEA_JS_RESOLVER", "resolver"),
  ("SEA_JS_REGISTRY", "registry"),
  ("SEA_JS_TEMPLATE_DIR", "template_dir"),
];

// Embed repository defaults
const DEFAULT_TOML: &str =
  include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/defaults/config.toml"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
  /// Shell out to `npm show <package> version`.
  Npm,
  /// Query the registry JSON API over HTTP.
  Registry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupFailurePolicy {
  /// Report the error and write the fallback constraint.
  Fallback,
  /// Report the error and undo the generation.
  Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeaConfig {
  pub resolver: ResolverKind,
  pub registry: String,
  pub timeout_secs: u64,
  pub on_lookup_failure: LookupFailurePolicy,
  /// Constraint written when a version lookup fails under the fallback policy.
  pub fallback_constraint: String,
  /// Template tree on disk. The embedded tree is used when unset.
  #[serde(default)]
  pub template_dir: Option<PathBuf>,
}

impl Default for SeaConfig {
  fn default() -> Self {
    Self {
      resolver: ResolverKind::Npm,
      registry: "https://registry.npmjs.org".to_string(),
      timeout_secs: 30,
      on_lookup_failure: LookupFailurePolicy::Fallback,
      fallback_constraint: "latest".to_string(),
      template_dir: None,
    }
  }
}

impl SeaConfig {
  #[must_use]
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

/// Working directory and configuration handed to every command.
#[derive(Debug, Clone)]
pub struct AppContext {
  pub cwd: PathBuf,
  pub config: SeaConfig,
}

impl AppContext {
  pub fn new(cwd: impl Into<PathBuf>, config: SeaConfig) -> Self {
    Self {
      cwd: cwd.into(),
      config,
    }
  }

  /// Directory a project called `name` is generated into.
  #[must_use]
  pub fn target_dir(&self, name: &str) -> PathBuf {
    self.cwd.join(name)
  }
}

fn merge_values(base: &mut TomlValue, overlay: TomlValue) {
  match (base, overlay) {
    (TomlValue::Table(base_tbl), TomlValue::Table(overlay_tbl)) => {
      for (k, v) in overlay_tbl {
        match base_tbl.get_mut(&k) {
          Some(existing) => merge_values(existing, v),
          None => {
            base_tbl.insert(k, v);
          }
        }
      }
    }
    // Arrays and scalars: replace last-wins
    (base_slot, new_v) => *base_slot = new_v,
  }
}

/// Warn about unknown keys in a parsed TOML config file.
fn warn_unknown_keys(val: &TomlValue, file_path: &Path) {
  let TomlValue::Table(table) = val else {
    return;
  };

  for key in table.keys() {
    if !KNOWN_KEYS.contains(&key.as_str()) {
      anstream::eprintln!(
        "{}: unknown config key '{}' in {} (did you mean one of: {}?)",
        "warning".yellow(),
        key,
        file_path.display(),
        KNOWN_KEYS.join(", ")
      );
    }
  }
}

fn env_overlay() -> TomlValue {
  let mut table = TomlTable::new();
  for (var, key) in ENV_OVERRIDES {
    if let Ok(raw) = std::env::var(var) {
      let trimmed = raw.trim();
      if trimmed.is_empty() {
        continue;
      }
      debug!("config override {key} from {var}");
      table.insert((*key).to_string(), TomlValue::String(trimmed.to_string()));
    }
  }
  TomlValue::Table(table)
}

/// Load and merge configuration from defaults, the global file, and the environment.
///
/// # Errors
/// Returns an error if the global config file cannot be read or parsed
/// as valid TOML, or if the merged values do not form a valid config.
pub fn load_config() -> Result<SeaConfig> {
  // Start with embedded defaults
  let mut merged: TomlValue =
    toml::from_str(DEFAULT_TOML).context("invalid embedded default config")?;

  // Merge global XDG config if present
  let xdg = xdg::BaseDirectories::with_prefix(APP_PREFIX);
  if let Some(global_path) = xdg.find_config_file(CONFIG_FILE_NAME) {
    debug!("loading config {}", global_path.display());
    let data = fs::read_to_string(&global_path)
      .with_context(|| format!("failed to read {}", global_path.display()))?;
    let val: TomlValue = toml::from_str(&data)
      .with_context(|| format!("invalid TOML in {}", global_path.display()))?;
    warn_unknown_keys(&val, &global_path);
    merge_values(&mut merged, val);
  }

  merge_values(&mut merged, env_overlay());

  // Deserialize into strongly typed config
  let merged_str = toml::to_string(&merged).context("failed to serialize merged config")?;
  let cfg: SeaConfig = toml::from_str(&merged_str).context("failed to parse merged config")?;
  Ok(cfg)
}
