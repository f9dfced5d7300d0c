use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use log::debug;
use regex::Regex;

use crate::config::{AppContext, LookupFailurePolicy};
use crate::manifest::{self, DEPENDENCIES, MANIFEST_FILE_NAME, ProjectManifest};
use crate::resolver::{self, VersionLookup};
use crate::template::TemplateSource;
use crate::texts;
use crate::utils::error_messages;
use crate::utils::log::t;
use crate::{log_error, log_info, log_success, log_warn};

static NPM_NAME_RE: OnceLock<Regex> = OnceLock::new();

/// npm rejects package names longer than this.
const NPM_NAME_MAX_LEN: usize = 214;

pub fn run(ctx: &AppContext, name: &str) -> Result<()> {
  let lookup = resolver::lookup_from_config(&ctx.config)?;
  generate_project(ctx, lookup.as_ref(), name)?;
  Ok(())
}

/// Create `<cwd>/<name>`, fill it from the template and write `package.json`.
///
/// Nothing is written when the target already exists. When a later step
/// fails, the directory created here is removed again before the error is
/// returned.
///
/// # Errors
/// Returns an error for an invalid or taken name, a missing template
/// directory, a file-system failure, or a failed lookup under the abort policy.
pub fn generate_project(
  ctx: &AppContext,
  lookup: &dyn VersionLookup,
  name: &str,
) -> Result<PathBuf> {
  validate_name(name)?;
  let target = ctx.target_dir(name);
  if target.exists() || target.is_symlink() {
    bail!(error_messages::directory_exists(name));
  }
  let template = TemplateSource::from_config(&ctx.config);
  template.validate(&target)?;

  fs::create_dir(&target).with_context(|| format!("failed to create {}", target.display()))?;
  debug!("created {}", target.display());

  if let Err(err) = populate(ctx, lookup, &template, &target, name) {
    match fs::remove_dir_all(&target) {
      Ok(()) => log_warn!("Removed incomplete project {}", target.display()),
      Err(cleanup) => log_warn!(
        "Could not remove incomplete project {}: {cleanup}",
        target.display()
      ),
    }
    return Err(err);
  }

  log_success!("{}", texts::create::created_line(name));
  for line in texts::create::next_steps_lines(name) {
    log_info!("{line}");
  }
  log_info!("{}", texts::create::thank_you_line());
  Ok(target)
}

fn populate(
  ctx: &AppContext,
  lookup: &dyn VersionLookup,
  template: &TemplateSource,
  target: &Path,
  name: &str,
) -> Result<()> {
  let copied = template.copy_into(target)?;
  debug!("copied {} template files", copied.len());

  let dependencies = resolve_dependencies(ctx, lookup)?;
  let manifest = ProjectManifest::new(name, dependencies);
  let manifest_path = target.join(MANIFEST_FILE_NAME);
  fs::write(&manifest_path, manifest.to_json_pretty()?)
    .with_context(|| format!("failed to write {}", manifest_path.display()))?;
  Ok(())
}

/// Look up every dependency and map it to the constraint that goes into the manifest.
fn resolve_dependencies(
  ctx: &AppContext,
  lookup: &dyn VersionLookup,
) -> Result<BTreeMap<String, String>> {
  let mut dependencies = BTreeMap::new();
  for package in DEPENDENCIES {
    let constraint = match lookup.latest_version(package) {
      Ok(version) => {
        debug!("{package} resolved to {version}");
        manifest::caret(&version)
      }
      Err(err) => match ctx.config.on_lookup_failure {
        LookupFailurePolicy::Fallback => {
          log_error!(
            "{}",
            error_messages::version_fetch_failed(package, format!("{err:#}"))
          );
          let fallback = ctx.config.fallback_constraint.clone();
          log_warn!("Using \"{fallback}\" as the version of {package}");
          fallback
        }
        LookupFailurePolicy::Abort => {
          return Err(err.context(format!("failed to fetch version for {package}")));
        }
      },
    };
    log_info!("{} {}", t::package(package), t::version(&constraint));
    dependencies.insert(package.to_string(), constraint);
  }
  Ok(dependencies)
}

/// The name becomes a directory under cwd, so it must be exactly one plain component.
fn validate_name(name: &str) -> Result<()> {
  let mut components = Path::new(name).components();
  let single_component = matches!(
    (components.next(), components.next()),
    (Some(Component::Normal(part)), None) if part == name
  );
  if !single_component {
    bail!(error_messages::invalid_project_name(name));
  }
  if !is_valid_npm_name(name) {
    log_warn!("{name} is not a valid npm package name. npm may refuse to install the project");
  }
  Ok(())
}

fn is_valid_npm_name(name: &str) -> bool {
  let re = NPM_NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9\-~][a-z0-9\-._~]*$").expect("valid regex"));
  name.len() <= NPM_NAME_MAX_LEN && re.is_match(name)
}
