//! Daemon configuration loaded from the environment.
//!
//! Everything is optional: without a workspace the client picks one with
//! `workspace.select`, and logging falls back to `RUST_LOG` and then `info`.

use std::env;
use std::path::PathBuf;

use anyhow::bail;

pub const WORKSPACE_VAR: &str = "SCHOOLD_WORKSPACE";
pub const LOG_VAR: &str = "SCHOOLD_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Workspace directory opened before the first request is read.
    pub workspace: Option<PathBuf>,
    /// `EnvFilter` directive string.
    pub log_filter: String,
}

impl DaemonConfig {
    /// Reads `SCHOOLD_WORKSPACE` and `SCHOOLD_LOG` (falling back to `RUST_LOG`).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let workspace = match lookup(WORKSPACE_VAR) {
            Some(raw) if raw.trim().is_empty() => {
                bail!("{WORKSPACE_VAR} is set but empty")
            }
            Some(raw) => Some(PathBuf::from(raw.trim())),
            None => None,
        };
        if let Some(path) = &workspace {
            if path.exists() && !path.is_dir() {
                bail!("{WORKSPACE_VAR} {} is not a directory", path.display());
            }
        }

        let log_filter = lookup(LOG_VAR)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        Ok(Self {
            workspace,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<DaemonConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let cfg = load(&[]).expect("config");
        assert_eq!(cfg.workspace, None);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn schoold_log_wins_over_rust_log() {
        let cfg = load(&[("RUST_LOG", "warn"), (LOG_VAR, "schoold=debug")]).expect("config");
        assert_eq!(cfg.log_filter, "schoold=debug");
        let cfg = load(&[("RUST_LOG", "warn")]).expect("config");
        assert_eq!(cfg.log_filter, "warn");
    }

    #[test]
    fn blank_workspace_is_rejected() {
        assert!(load(&[(WORKSPACE_VAR, "  ")]).is_err());
        let cfg = load(&[(WORKSPACE_VAR, "/tmp/school-ws")]).expect("config");
        assert_eq!(cfg.workspace, Some(PathBuf::from("/tmp/school-ws")));
    }
}
