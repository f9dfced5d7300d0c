use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use temp_env::with_vars;
use tempfile::{Builder, TempDir};

/// Versions the default fake `npm` knows about.
pub const FAKE_VERSIONS: &[(&str, &str)] = &[("sea-js-ui-core", "0.3.1"), ("vite", "5.4.2")];

#[derive(Debug)]
pub struct TestEnv {
  temp: TempDir,
  xdg_home: TempDir,
}

impl TestEnv {
  /// Run `f` with an isolated config home, no `SEA_JS_*` overrides and a
  /// private bin dir first on PATH.
  pub fn run<F, R>(f: F) -> R
  where
    F: FnOnce(&TestEnv) -> R,
  {
    let env = TestEnv::new();
    let bin_dir = env.bin_dir();
    let path_value = match std::env::var("PATH") {
      Ok(existing) if !existing.is_empty() => format!("{}:{existing}", bin_dir.display()),
      _ => bin_dir.display().to_string(),
    };
    with_vars(
      [
        (
          "XDG_CONFIG_HOME",
          Some(env.xdg_home_dir().display().to_string()),
        ),
        ("PATH", Some(path_value)),
        ("SEA_JS_RESOLVER", None),
        ("SEA_JS_REGISTRY", None),
        ("SEA_JS_TEMPLATE_DIR", None),
        ("NO_COLOR", Some("1".to_string())),
      ],
      || f(&env),
    )
  }

  pub fn new() -> Self {
    let temp = Builder::new()
      .prefix("create-sea-js-test-")
      .tempdir_in(tmp_root())
      .expect("temp dir");
    let xdg_home = Builder::new()
      .prefix("xdg-")
      .tempdir_in(tmp_root())
      .expect("xdg temp dir");
    let _ = std::fs::create_dir_all(xdg_home.path().join("bin"));
    Self { temp, xdg_home }
  }

  pub fn with_env_vars<F, R>(&self, vars: &[(&str, Option<String>)], f: F) -> R
  where
    F: FnOnce(&TestEnv) -> R,
  {
    with_vars(vars, || f(self))
  }

  /// The working directory projects are generated into.
  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  pub fn project_dir(&self, name: &str) -> PathBuf {
    self.path().join(name)
  }

  pub fn xdg_home_dir(&self) -> &Path {
    self.xdg_home.path()
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.xdg_home_dir().join("bin")
  }

  pub fn bin(&self) -> Result<Command> {
    let mut cmd = Command::cargo_bin("create-sea-js")?;
    cmd.current_dir(self.path());
    Ok(cmd)
  }

  /// Install a fake `npm` that answers `npm show <pkg> version` from `versions`
  /// and fails like the registry does for anything else.
  pub fn fake_npm(&self, versions: &[(&str, &str)]) -> Result<PathBuf> {
    let mut body = String::from("#!/bin/sh\ncase \"$2\" in\n");
    for (package, version) in versions {
      body.push_str(&format!("  {package}) echo \"{version}\" ;;\n"));
    }
    body.push_str("  *) echo \"npm ERR! 404 '$2' is not in this registry.\" >&2; exit 1 ;;\nesac\n");
    let path = self.bin_dir().join("npm");
    self.write_executable_script(&path, &body)?;
    Ok(path)
  }

  pub fn write_executable_script(&self, path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|err| {
        anyhow::anyhow!("create parent dir for script {}: {err}", path.display())
      })?;
    }
    std::fs::write(path, body)
      .map_err(|err| anyhow::anyhow!("write script body at {}: {err}", path.display()))?;
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt as _;
      let mut perms = std::fs::metadata(path)?.permissions();
      perms.set_mode(0o755);
      std::fs::set_permissions(path, perms)
        .map_err(|err| anyhow::anyhow!("set script executable at {}: {err}", path.display()))?;
    }
    Ok(())
  }

  pub fn write_file(&self, relative: &str, body: &str) -> Result<PathBuf> {
    let path = self.path().join(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, body)
      .map_err(|err| anyhow::anyhow!("write file at {}: {err}", path.display()))?;
    Ok(path)
  }

  pub fn write_xdg_config(&self, body: &str) -> Result<PathBuf> {
    let path = self
      .xdg_home_dir()
      .join("create-sea-js")
      .join("config.toml");
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, body)
      .map_err(|err| anyhow::anyhow!("write XDG config at {}: {err}", path.display()))?;
    Ok(path)
  }

  /// Every path below the working directory, sorted.
  pub fn snapshot(&self) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = walkdir::WalkDir::new(self.path())
      .into_iter()
      .filter_map(Result::ok)
      .map(|entry| entry.path().to_path_buf())
      .collect();
    out.sort();
    out
  }

  pub fn read_manifest(&self, name: &str) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(self.project_dir(name).join("package.json"))?;
    Ok(serde_json::from_str(&raw)?)
  }
}

/// Returns a workspace-local temp root for tests under `./target/test-tmp` at the workspace root.
pub fn tmp_root() -> PathBuf {
  let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  // Walk two parents up: crates/create-sea-js -> crates -> workspace root
  let workspace_root = manifest_dir
    .parent()
    .and_then(|parent| parent.parent())
    .unwrap_or(&manifest_dir)
    .to_path_buf();
  let root = workspace_root.join("target").join("test-tmp");
  let _ = std::fs::create_dir_all(&root);
  root
}
