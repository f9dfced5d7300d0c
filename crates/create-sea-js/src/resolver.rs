use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use serde::Deserialize;

use crate::config::{ResolverKind, SeaConfig};
use crate::utils::error_messages;

#[cfg(windows)]
const NPM_PROGRAM: &str = "npm.cmd";
#[cfg(not(windows))]
const NPM_PROGRAM: &str = "npm";

/// Looks up the latest published version of a package.
pub trait VersionLookup {
  /// Returns the version string, trimmed of surrounding whitespace.
  ///
  /// # Errors
  /// Returns an error when the registry cannot be reached, does not know
  /// the package, or answers with an empty version.
  fn latest_version(&self, package: &str) -> Result<String>;
}

/// Resolves versions by running `npm show <package> version`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NpmCli;

impl VersionLookup for NpmCli {
  fn latest_version(&self, package: &str) -> Result<String> {
    let npm = find_npm().ok_or_else(|| anyhow!(error_messages::NPM_NOT_FOUND))?;
    debug!("running {} show {package} version", npm.display());
    let output = Command::new(&npm)
      .args(["show", package, "version"])
      .output()
      .with_context(|| format!("failed to run {}", npm.display()))?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      bail!(error_messages::npm_non_zero_exit(output.status, stderr.trim()));
    }
    non_empty_version(&String::from_utf8_lossy(&output.stdout))
  }
}

/// First executable `npm` found on PATH.
fn find_npm() -> Option<PathBuf> {
  let search = std::env::var_os("PATH")?;
  std::env::split_paths(&search)
    .map(|dir| dir.join(NPM_PROGRAM))
    .find(|candidate| is_runnable(candidate))
}

#[cfg(unix)]
fn is_runnable(path: &Path) -> bool {
  use std::os::unix::fs::PermissionsExt as _;
  std::fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_runnable(path: &Path) -> bool {
  path.is_file()
}

/// Resolves versions through the registry's `/<package>/latest` document.
#[derive(Debug)]
pub struct RegistryClient {
  base_url: String,
  client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct LatestDocument {
  version: String,
}

impl RegistryClient {
  /// # Errors
  /// Returns an error if the HTTP client cannot be constructed.
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    let client = reqwest::blocking::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("create-sea-js/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      client,
    })
  }

  fn latest_url(&self, package: &str) -> String {
    // Scoped names keep their '@' but the separator must be escaped
    format!("{}/{}/latest", self.base_url, package.replace('/', "%2f"))
  }
}

impl VersionLookup for RegistryClient {
  fn latest_version(&self, package: &str) -> Result<String> {
    let url = self.latest_url(package);
    debug!("GET {url}");
    let response = self
      .client
      .get(&url)
      .send()
      .with_context(|| format!("failed to GET {url}"))?;
    if !response.status().is_success() {
      bail!(error_messages::registry_http_error(response.status(), &url));
    }
    let doc: LatestDocument = response
      .json()
      .with_context(|| format!("invalid registry response from {url}"))?;
    non_empty_version(&doc.version)
  }
}

fn non_empty_version(raw: &str) -> Result<String> {
  let version = raw.trim();
  if version.is_empty() {
    bail!(error_messages::EMPTY_VERSION);
  }
  Ok(version.to_string())
}

/// Build the resolver selected by `cfg.resolver`.
///
/// # Errors
/// Returns an error if the HTTP client for the registry resolver cannot be built.
pub fn lookup_from_config(cfg: &SeaConfig) -> Result<Box<dyn VersionLookup>> {
  match cfg.resolver {
    ResolverKind::Npm => Ok(Box::new(NpmCli)),
    ResolverKind::Registry => Ok(Box::new(RegistryClient::new(
      &cfg.registry,
      cfg.timeout(),
    )?)),
  }
}
