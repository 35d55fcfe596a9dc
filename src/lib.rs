// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! fabric8 local environment setup library
//!
//! Detects the host platform, looks up the latest releases of minikube or
//! minishift and kubectl, downloads them into a per-user binary directory,
//! and unpacks the OpenShift client when running minishift.

pub mod archive;
pub mod check;
pub mod config;
pub mod driver;
pub mod error;
pub mod fetch;
pub mod install;
pub mod platform;
pub mod release;

// Re-export commonly used items at the crate root for convenience
pub use check::is_installed;
pub use config::Config;
pub use error::{ArchiveError, ConfigError, FetchError, InstallError, ReleaseError};
pub use fetch::Fetcher;
pub use install::{InstallReport, Installer, Step, StepOutcome};
pub use platform::{Arch, Distro, DownloadHosts, DownloadSpec, Os, Platform};
pub use release::{ReleaseClient, parse_tag_version};
