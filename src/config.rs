//! Configuration loading and lookup.
//!
//! Three YAML files under `configs/` drive the whole harness:
//! `repos.yaml` (upstream repositories), `cva6_configs.yaml` (FPGA
//! bitstream configurations) and `software_targets.yaml` (software
//! stacks). Everything is loaded once and read-only afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::{FpgaConfig, RepoSpec, TargetSpec};
use crate::workspace::Workspace;

pub const REPOS_FILE: &str = "repos.yaml";
pub const CVA6_CONFIGS_FILE: &str = "cva6_configs.yaml";
pub const SOFTWARE_TARGETS_FILE: &str = "software_targets.yaml";

#[derive(Debug, Deserialize)]
struct RepoFile {
    repos: BTreeMap<String, RepoSpec>,
}

#[derive(Debug, Deserialize)]
struct Cva6File {
    default: String,
    configs: BTreeMap<String, FpgaConfig>,
}

#[derive(Debug, Deserialize)]
struct TargetFile {
    default: String,
    targets: BTreeMap<String, TargetSpec>,
}

/// All declarative configuration of one harness checkout.
#[derive(Debug)]
pub struct Config {
    repos: BTreeMap<String, RepoSpec>,
    fpga_default: String,
    fpga_configs: BTreeMap<String, FpgaConfig>,
    target_default: String,
    targets: BTreeMap<String, TargetSpec>,
}

impl Config {
    /// Load and validate all three configuration files.
    pub fn load(workspace: &Workspace) -> Result<Self, ConfigError> {
        let dir = workspace.config_dir();

        let repo_file: RepoFile = read_yaml(&dir.join(REPOS_FILE))?;
        let cva6_file: Cva6File = read_yaml(&dir.join(CVA6_CONFIGS_FILE))?;
        let target_file: TargetFile = read_yaml(&dir.join(SOFTWARE_TARGETS_FILE))?;

        if !cva6_file.configs.contains_key(&cva6_file.default) {
            return Err(ConfigError::MissingDefault {
                file: CVA6_CONFIGS_FILE.to_string(),
                name: cva6_file.default,
            });
        }
        if !target_file.targets.contains_key(&target_file.default) {
            return Err(ConfigError::MissingDefault {
                file: SOFTWARE_TARGETS_FILE.to_string(),
                name: target_file.default,
            });
        }

        Ok(Config {
            repos: repo_file.repos,
            fpga_default: cva6_file.default,
            fpga_configs: cva6_file.configs,
            target_default: target_file.default,
            targets: target_file.targets,
        })
    }

    /// Configured repositories, keyed by checkout name.
    pub fn repos(&self) -> &BTreeMap<String, RepoSpec> {
        &self.repos
    }

    pub fn fpga_default(&self) -> &str {
        &self.fpga_default
    }

    pub fn fpga_configs(&self) -> &BTreeMap<String, FpgaConfig> {
        &self.fpga_configs
    }

    /// Resolve an FPGA config by name; `None` selects the default entry.
    pub fn fpga_config(&self, name: Option<&str>) -> Result<(&str, &FpgaConfig), ConfigError> {
        let name = name.unwrap_or(&self.fpga_default);
        self.fpga_configs
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownFpgaConfig(name.to_string()))
    }

    pub fn target_default(&self) -> &str {
        &self.target_default
    }

    pub fn targets(&self) -> &BTreeMap<String, TargetSpec> {
        &self.targets
    }

    /// Resolve a software target by name; `None` selects the default
    /// entry.
    pub fn target(&self, name: Option<&str>) -> Result<(&str, &TargetSpec), ConfigError> {
        let name = name.unwrap_or(&self.target_default);
        self.targets
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownTarget(name.to_string()))
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.display().to_string())
        } else {
            ConfigError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::InvalidYaml {
        file: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const REPOS: &str = "\
repos:
  opensbi:
    url: https://example.org/opensbi.git
  uboot:
    url: https://example.org/u-boot.git
    branch: v2024.01
";

    const CVA6: &str = "\
default: cheri
configs:
  cheri:
    description: CHERI-enabled core
  vanilla:
    description: plain core
    target: cv64a6_imafdc_sv39
";

    const TARGETS: &str = "\
default: demo
targets:
  demo:
    kind: baremetal
    app_repo: baremetal-demo
    app_elf: build/baremetal.elf
    opensbi_platform: fpga/ariane
    bundle_output: boot-artifacts/demo.bin
";

    fn write_configs(repos: &str, cva6: &str, targets: &str) -> (tempfile::TempDir, Workspace) {
        let temp = tempdir().expect("failed to create temp dir");
        let dir = temp.path().join("configs");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(REPOS_FILE), repos).unwrap();
        fs::write(dir.join(CVA6_CONFIGS_FILE), cva6).unwrap();
        fs::write(dir.join(SOFTWARE_TARGETS_FILE), targets).unwrap();
        let ws = Workspace::at_root(temp.path());
        (temp, ws)
    }

    #[test]
    fn test_load_and_lookup() {
        let (_temp, ws) = write_configs(REPOS, CVA6, TARGETS);
        let config = Config::load(&ws).expect("load failed");

        assert_eq!(config.repos().len(), 2);
        assert_eq!(
            config.repos()["uboot"].branch.as_deref(),
            Some("v2024.01")
        );

        let (name, cfg) = config.fpga_config(None).unwrap();
        assert_eq!(name, "cheri");
        assert_eq!(cfg.board, "genesys2");

        let (name, cfg) = config.fpga_config(Some("vanilla")).unwrap();
        assert_eq!(name, "vanilla");
        assert_eq!(cfg.target, "cv64a6_imafdc_sv39");

        let (name, spec) = config.target(None).unwrap();
        assert_eq!(name, "demo");
        assert_eq!(spec.kind(), "baremetal");
    }

    #[test]
    fn test_unknown_names_error() {
        let (_temp, ws) = write_configs(REPOS, CVA6, TARGETS);
        let config = Config::load(&ws).unwrap();

        assert!(matches!(
            config.fpga_config(Some("missing")),
            Err(ConfigError::UnknownFpgaConfig(name)) if name == "missing"
        ));
        assert!(matches!(
            config.target(Some("missing")),
            Err(ConfigError::UnknownTarget(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_default_must_exist() {
        let bad_cva6 = "default: nonexistent\nconfigs:\n  cheri:\n    description: x\n";
        let (_temp, ws) = write_configs(REPOS, bad_cva6, TARGETS);
        assert!(matches!(
            Config::load(&ws),
            Err(ConfigError::MissingDefault { .. })
        ));
    }

    #[test]
    fn test_missing_file_reported_by_path() {
        let temp = tempdir().expect("failed to create temp dir");
        let ws = Workspace::at_root(temp.path());
        match Config::load(&ws) {
            Err(ConfigError::FileNotFound(path)) => assert!(path.contains(REPOS_FILE)),
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_reported_with_file() {
        let (_temp, ws) = write_configs("repos: [not, a, map]", CVA6, TARGETS);
        match Config::load(&ws) {
            Err(ConfigError::InvalidYaml { file, .. }) => assert!(file.contains(REPOS_FILE)),
            other => panic!("expected InvalidYaml, got {:?}", other),
        }
    }
}
