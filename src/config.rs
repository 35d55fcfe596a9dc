// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Startup configuration
//!
//! Everything the installer reads from the process environment is resolved
//! here once and then passed down by reference.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::platform::{DownloadHosts, INSTALL_DIR, KUBE_CONFIG, Platform};

/// Environment variable holding an optional GitHub access token
pub const TOKEN_ENV: &str = "GH_TOKEN";

#[derive(Debug, Clone)]
pub struct Config {
    pub home: PathBuf,
    pub install_dir: PathBuf,
    pub github_token: Option<String>,
    /// Value of `PATH` used for every "already installed" lookup
    pub search_path: Option<OsString>,
    pub platform: Platform,
    pub download_hosts: DownloadHosts,
}

impl Config {
    /// Configuration rooted at `home` for the detected platform, with an
    /// empty search path and no token
    #[must_use]
    pub fn new(home: impl Into<PathBuf>) -> Config {
        let home = home.into();
        Config {
            install_dir: home.join(INSTALL_DIR),
            home,
            github_token: None,
            search_path: None,
            platform: Platform::detect(),
            download_hosts: DownloadHosts::default(),
        }
    }

    /// Resolve the configuration from the process environment
    ///
    /// # Errors
    /// Returns `ConfigError::NoHome` if the home directory cannot be determined
    pub fn from_env() -> Result<Config, ConfigError> {
        let home = home::home_dir()
            .filter(|h| !h.as_os_str().is_empty())
            .ok_or(ConfigError::NoHome {
                os: std::env::consts::OS,
            })?;
        let token = std::env::var(TOKEN_ENV).ok();

        Ok(Config::new(home)
            .with_token(token)
            .with_search_path(std::env::var_os("PATH")))
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Config {
        self.github_token = token.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Config {
        self.search_path = search_path;
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Config {
        self.platform = platform;
        self
    }

    /// Fetch binaries from `hosts` instead of the public release hosts
    #[must_use]
    pub fn with_download_hosts(mut self, hosts: DownloadHosts) -> Config {
        self.download_hosts = hosts;
        self
    }

    #[must_use]
    pub fn kube_config_path(&self) -> PathBuf {
        self.home.join(KUBE_CONFIG)
    }

    /// Path the named binary is installed under in the install directory
    #[must_use]
    pub fn install_path(&self, name: &str) -> PathBuf {
        self.install_dir.join(self.platform.binary_name(name))
    }

    /// Look up an executable on the configured search path
    #[must_use]
    pub fn find_on_path(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        which::which_in(name, Some(search_path), &self.home).ok()
    }

    /// Check whether the install directory is one of the search path entries
    #[must_use]
    pub fn install_dir_on_path(&self) -> bool {
        let Some(search_path) = &self.search_path else {
            return false;
        };
        let wanted = canonical(&self.install_dir);
        std::env::split_paths(search_path)
            .filter(|p| !p.as_os_str().is_empty())
            .any(|p| canonical(&p) == wanted)
    }
}

// Fall back to the path itself when it does not exist yet
fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
