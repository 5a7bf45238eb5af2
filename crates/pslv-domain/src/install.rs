//! Local install records: one directory per solution with a version marker.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Marker file recording the installed version inside an install directory.
pub const VERSION_MARKER: &str = "version.txt";

/// Where a solution lives on the local machine and what version is recorded
/// there. Owned exclusively by the local user profile; the catalog never
/// writes it.
#[derive(Clone, Debug)]
pub struct InstallRecord {
    install_dir: PathBuf,
    executable: PathBuf,
}

impl InstallRecord {
    /// Resolves the install location for an entry under the apps root. The
    /// executable keeps the file name it has at the shared location.
    pub fn locate(apps_dir: &Path, name: &str, executable_location: &str) -> Self {
        let install_dir = apps_dir.join(name);
        let file_name = Path::new(executable_location)
            .file_name()
            .map_or_else(|| format!("{name}.exe"), |n| n.to_string_lossy().to_string());
        let executable = install_dir.join(file_name);
        Self {
            install_dir,
            executable,
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn is_installed(&self) -> bool {
        self.executable.exists()
    }

    fn marker_path(&self) -> PathBuf {
        self.install_dir.join(VERSION_MARKER)
    }

    /// The version recorded at install time; None when the marker is missing
    /// or unreadable as a number.
    pub fn installed_version(&self) -> Option<f64> {
        let contents = fs::read_to_string(self.marker_path()).ok()?;
        match contents.trim().parse::<f64>() {
            Ok(version) => Some(version),
            Err(_) => {
                tracing::warn!(path = %self.marker_path().display(), "unreadable version marker");
                None
            }
        }
    }

    pub fn write_version(&self, version: &str) -> Result<()> {
        fs::create_dir_all(&self.install_dir)
            .with_context(|| format!("creating {}", self.install_dir.display()))?;
        fs::write(self.marker_path(), format!("{version}\n"))
            .with_context(|| format!("writing {}", self.marker_path().display()))
    }

    /// Removes the install directory and everything in it.
    pub fn remove(&self) -> Result<()> {
        fs::remove_dir_all(&self.install_dir)
            .with_context(|| format!("removing {}", self.install_dir.display()))
    }
}
