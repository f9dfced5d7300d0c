use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use include_dir::{Dir, include_dir};
use log::debug;
use walkdir::WalkDir;

use crate::config::SeaConfig;
use crate::utils::error_messages;

/// Starter files compiled into the binary.
static EMBEDDED_TEMPLATE: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Where the template tree is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
  Embedded,
  Directory(PathBuf),
}

impl TemplateSource {
  #[must_use]
  pub fn from_config(cfg: &SeaConfig) -> Self {
    match &cfg.template_dir {
      Some(dir) => Self::Directory(dir.clone()),
      None => Self::Embedded,
    }
  }

  /// Check that the source can be read into `target` before anything is written.
  ///
  /// # Errors
  /// Returns an error if a template directory is configured but missing,
  /// or if `target` would land inside it.
  pub fn validate(&self, target: &Path) -> Result<()> {
    let Self::Directory(dir) = self else {
      return Ok(());
    };
    if !dir.is_dir() {
      bail!(error_messages::template_dir_missing(dir.display()));
    }
    let root = dir
      .canonicalize()
      .with_context(|| format!("failed to resolve {}", dir.display()))?;
    if resolve_target(target)?.starts_with(&root) {
      bail!(error_messages::target_inside_template(
        target.display(),
        dir.display()
      ));
    }
    Ok(())
  }

  /// Copy every file of the tree into `dest`, byte for byte.
  ///
  /// Returns the copied files relative to the template root.
  ///
  /// # Errors
  /// Returns an error on the first file that cannot be read or written.
  pub fn copy_into(&self, dest: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    match self {
      Self::Embedded => copy_embedded(&EMBEDDED_TEMPLATE, dest, &mut copied)?,
      Self::Directory(src) => copy_directory(src, dest, &mut copied)?,
    }
    Ok(copied)
  }
}

/// Canonical form of a target that may not exist yet.
fn resolve_target(target: &Path) -> Result<PathBuf> {
  match (target.parent(), target.file_name()) {
    (Some(parent), Some(leaf)) if !parent.as_os_str().is_empty() => {
      let parent = parent
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", parent.display()))?;
      Ok(parent.join(leaf))
    }
    _ => Ok(target.to_path_buf()),
  }
}

fn copy_embedded(dir: &Dir<'_>, dest: &Path, copied: &mut Vec<PathBuf>) -> Result<()> {
  for file in dir.files() {
    let target = dest.join(file.path());
    fs::write(&target, file.contents())
      .with_context(|| format!("failed to write {}", target.display()))?;
    debug!("copied {}", file.path().display());
    copied.push(file.path().to_path_buf());
  }
  for sub in dir.dirs() {
    let target = dest.join(sub.path());
    fs::create_dir_all(&target)
      .with_context(|| format!("failed to create {}", target.display()))?;
    copy_embedded(sub, dest, copied)?;
  }
  Ok(())
}

fn copy_directory(src: &Path, dest: &Path, copied: &mut Vec<PathBuf>) -> Result<()> {
  for entry in WalkDir::new(src)
    .min_depth(1)
    .follow_links(true)
    .sort_by_file_name()
  {
    let entry = entry.with_context(|| format!("failed to read template {}", src.display()))?;
    let rel = entry
      .path()
      .strip_prefix(src)
      .with_context(|| format!("{} is outside {}", entry.path().display(), src.display()))?;
    let target = dest.join(rel);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&target)
        .with_context(|| format!("failed to create {}", target.display()))?;
    } else {
      fs::copy(entry.path(), &target).with_context(|| {
        format!(
          "failed to copy {} -> {}",
          entry.path().display(),
          target.display()
        )
      })?;
      debug!("copied {}", rel.display());
      copied.push(rel.to_path_buf());
    }
  }
  Ok(())
}
