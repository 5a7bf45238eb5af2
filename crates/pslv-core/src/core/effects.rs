//! Effect seams for everything the commands touch outside the process:
//! the remote list service and the operating system's program launcher.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use anyhow::{Context, Result};
use pslv_domain::RawRow;

use crate::core::list::HttpListService;

/// The remote list-storage collaborator. Rows are ordered column maps; the
/// only query shape the launcher relies on is a per-column `contains`.
pub trait ListService: Send + Sync {
    fn fetch_all(&self, list: &str) -> Result<Vec<RawRow>>;
    fn fetch_contains(&self, list: &str, column: &str, needle: &str) -> Result<Vec<RawRow>>;
    fn append(&self, list: &str, row: &RawRow) -> Result<()>;
    fn update(&self, list: &str, key_column: &str, key: &str, row: &RawRow) -> Result<()>;
}

/// Hands a confirmed-present executable to the operating system.
pub trait Launcher: Send + Sync {
    fn start(&self, executable: &Path) -> Result<()>;
}

pub trait Effects: Send + Sync {
    fn list(&self) -> &dyn ListService;
    fn launcher(&self) -> &dyn Launcher;
}

pub struct SystemEffects {
    list: Arc<SystemListService>,
    launcher: Arc<SystemLauncher>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: Arc::new(SystemListService),
            launcher: Arc::new(SystemLauncher),
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn list(&self) -> &dyn ListService {
        self.list.as_ref()
    }

    fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }
}

struct SystemListService;

impl SystemListService {
    fn client(&self) -> Result<HttpListService> {
        HttpListService::from_env()
    }
}

impl ListService for SystemListService {
    fn fetch_all(&self, list: &str) -> Result<Vec<RawRow>> {
        self.client()?.fetch_all(list)
    }

    fn fetch_contains(&self, list: &str, column: &str, needle: &str) -> Result<Vec<RawRow>> {
        self.client()?.fetch_contains(list, column, needle)
    }

    fn append(&self, list: &str, row: &RawRow) -> Result<()> {
        self.client()?.append(list, row)
    }

    fn update(&self, list: &str, key_column: &str, key: &str, row: &RawRow) -> Result<()> {
        self.client()?.update(list, key_column, key, row)
    }
}

struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn start(&self, executable: &Path) -> Result<()> {
        Command::new(executable)
            .spawn()
            .map(|_| ())
            .with_context(|| format!("starting {}", executable.display()))
    }
}

pub type SharedEffects = Arc<dyn Effects>;
