use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use pslv_domain::SNAPSHOT_FILE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub network: NetworkConfig,
    pub paths: PathsConfig,
    pub lists: ListNames,
    pub user: UserIdentity,
}

impl Config {
    /// Builds a configuration snapshot from the current process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        let home = match snapshot.var("PSLV_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs_next::home_dir()
                .ok_or_else(|| anyhow!("home directory not found"))?
                .join(".pslv"),
        };
        let apps_dir = match snapshot.var("PSLV_APPS_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => home.join("apps"),
        };

        Ok(Self {
            network: NetworkConfig {
                online: match snapshot.var("PSLV_ONLINE") {
                    Some(value) => {
                        let lowered = value.to_ascii_lowercase();
                        !matches!(lowered.as_str(), "0" | "false" | "no" | "off" | "")
                    }
                    None => true,
                },
            },
            paths: PathsConfig { home, apps_dir },
            lists: ListNames {
                catalog: named_list(snapshot, "PSLV_CATALOG_LIST", "solution-catalog"),
                admins: named_list(snapshot, "PSLV_ADMIN_LIST", "launcher-admins"),
                userbase: named_list(snapshot, "PSLV_USERBASE_LIST", "userbase"),
                action_history: named_list(snapshot, "PSLV_ACTIONS_LIST", "action-history"),
            },
            user: UserIdentity::from_snapshot(snapshot),
        })
    }
}

fn named_list(snapshot: &EnvSnapshot, key: &str, default: &str) -> String {
    match snapshot.var(key) {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => default.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NetworkConfig {
    pub online: bool,
}

#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub home: PathBuf,
    pub apps_dir: PathBuf,
}

impl PathsConfig {
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.home.join(SNAPSHOT_FILE)
    }
}

#[derive(Debug, Clone)]
pub struct ListNames {
    pub catalog: String,
    pub admins: String,
    pub userbase: String,
    pub action_history: String,
}

/// Who is running the launcher. Captured once at startup and passed along
/// explicitly; nothing downstream asks the OS again.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub sid: String,
}

impl UserIdentity {
    fn from_snapshot(snapshot: &EnvSnapshot) -> Self {
        let sid = snapshot
            .var("PSLV_USER")
            .or_else(|| snapshot.var("USER"))
            .or_else(|| snapshot.var("USERNAME"))
            .unwrap_or("unknown")
            .trim()
            .to_lowercase();
        Self { sid }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_defaults_to_true_and_honors_falsey_values() {
        let config =
            Config::from_snapshot(&EnvSnapshot::testing(&[("PSLV_HOME", "/tmp/pslv")])).unwrap();
        assert!(config.network.online);

        for falsey in ["0", "false", "no", "off", ""] {
            let config = Config::from_snapshot(&EnvSnapshot::testing(&[
                ("PSLV_HOME", "/tmp/pslv"),
                ("PSLV_ONLINE", falsey),
            ]))
            .unwrap();
            assert!(!config.network.online, "PSLV_ONLINE={falsey:?}");
        }
    }

    #[test]
    fn paths_derive_from_home_unless_overridden() {
        let config = Config::from_snapshot(&EnvSnapshot::testing(&[
            ("PSLV_HOME", "/tmp/pslv"),
            ("PSLV_USER", "U123"),
        ]))
        .unwrap();
        assert_eq!(config.paths.apps_dir, PathBuf::from("/tmp/pslv/apps"));
        assert_eq!(
            config.paths.snapshot_path(),
            PathBuf::from("/tmp/pslv").join(SNAPSHOT_FILE)
        );

        let config = Config::from_snapshot(&EnvSnapshot::testing(&[
            ("PSLV_HOME", "/tmp/pslv"),
            ("PSLV_APPS_DIR", "/opt/apps"),
        ]))
        .unwrap();
        assert_eq!(config.paths.apps_dir, PathBuf::from("/opt/apps"));
    }

    #[test]
    fn user_identity_is_lowercased() {
        let config = Config::from_snapshot(&EnvSnapshot::testing(&[
            ("PSLV_HOME", "/tmp/pslv"),
            ("PSLV_USER", "U123"),
        ]))
        .unwrap();
        assert_eq!(config.user.sid, "u123");
    }

    #[test]
    fn list_names_default_and_override() {
        let config = Config::from_snapshot(&EnvSnapshot::testing(&[
            ("PSLV_HOME", "/tmp/pslv"),
            ("PSLV_CATALOG_LIST", "uat-catalog"),
        ]))
        .unwrap();
        assert_eq!(config.lists.catalog, "uat-catalog");
        assert_eq!(config.lists.admins, "launcher-admins");
        assert_eq!(config.lists.userbase, "userbase");
        assert_eq!(config.lists.action_history, "action-history");
    }
}
