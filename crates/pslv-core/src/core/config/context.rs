use std::path::PathBuf;

use anyhow::Result;
use time::{Date, OffsetDateTime};

use crate::core::config::{Config, GlobalOptions};
use crate::core::effects::{Effects, Launcher, ListService, SharedEffects};
use crate::core::tooling::response::CommandGroup;

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    effects: SharedEffects,
}

impl<'a> CommandContext<'a> {
    /// Creates a new command context with the provided global options.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be prepared.
    pub fn new(global: &'a GlobalOptions, effects: SharedEffects) -> Result<Self> {
        let config = Config::from_env()?;
        Ok(Self {
            global,
            config,
            effects,
        })
    }

    pub fn effects(&self) -> &dyn Effects {
        self.effects.as_ref()
    }

    pub fn list_service(&self) -> &dyn ListService {
        self.effects.list()
    }

    pub fn launcher(&self) -> &dyn Launcher {
        self.effects.launcher()
    }

    pub fn shared_effects(&self) -> SharedEffects {
        self.effects.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_online(&self) -> bool {
        self.config.network.online
    }

    pub fn user(&self) -> &str {
        &self.config.user.sid
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.config.paths.apps_dir.clone()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.config.paths.snapshot_path()
    }

    /// Today's date, the `now` every lifecycle rule is evaluated against.
    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}
