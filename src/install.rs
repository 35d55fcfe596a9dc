// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Installation of the local cluster dependencies
//!
//! The installer runs a fixed sequence of steps. Each step either installs
//! something, finds it already present, is skipped, or fails; a failure is
//! recorded and the next step still runs. Only failing to create the
//! install directory ends the run early.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::archive::{untar_gz, unzip};
use crate::config::Config;
use crate::driver::{DriverStatus, XHYVE_DRIVER, install_driver};
use crate::error::InstallError;
use crate::fetch::Fetcher;
use crate::platform::{
    ArchiveKind, Distro, DownloadSpec, KUBECTL, KUBERNETES, OC, OC_BUILD_SHA, OC_VERSION,
};
use crate::release::ReleaseClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    InstallDir,
    Driver,
    Distro,
    KubeClient,
    OpenShiftClient,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::InstallDir => "install directory",
            Step::Driver => "VM driver",
            Step::Distro => "kubernetes distro",
            Step::KubeClient => "kubectl client",
            Step::OpenShiftClient => "openshift client",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum StepOutcome {
    /// Downloaded, unpacked or created; holds the resulting path (or the
    /// package name when no path is known)
    Installed(PathBuf),
    AlreadyPresent(PathBuf),
    Skipped(String),
    Failed(InstallError),
}

impl StepOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Installed(path) => write!(f, "installed {}", path.display()),
            StepOutcome::AlreadyPresent(path) => write!(f, "already available ({})", path.display()),
            StepOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
            StepOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Ordered outcome of every step of one run
#[derive(Debug, Default)]
pub struct InstallReport {
    steps: Vec<(Step, StepOutcome)>,
}

impl InstallReport {
    #[must_use]
    pub fn steps(&self) -> &[(Step, StepOutcome)] {
        &self.steps
    }

    #[must_use]
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| outcome)
    }

    /// Number of binaries fetched from the network
    #[must_use]
    pub fn downloads(&self) -> usize {
        self.steps
            .iter()
            .filter(|(step, outcome)| {
                matches!(step, Step::Distro | Step::KubeClient | Step::OpenShiftClient)
                    && matches!(outcome, StepOutcome::Installed(_))
            })
            .count()
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|(_, o)| o.is_failure()).count()
    }

    /// Whether the run was cut short by a failure nothing else can recover from
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        matches!(self.outcome(Step::InstallDir), Some(StepOutcome::Failed(_)))
    }

    fn record(&mut self, step: Step, outcome: StepOutcome) {
        match (&step, &outcome) {
            (Step::InstallDir, StepOutcome::Failed(err)) => error!("{err}"),
            (Step::Driver, StepOutcome::Failed(err)) => warn!("Unable to download driver: {err}"),
            (Step::Distro, StepOutcome::Failed(err)) => {
                warn!("Unable to download kubernetes distro: {err}");
            }
            (_, StepOutcome::Failed(err)) => warn!("Unable to download client: {err}"),
            (_, StepOutcome::Skipped(reason)) => debug!("Skipping {step}: {reason}"),
            _ => {}
        }
        self.steps.push((step, outcome));
    }
}

fn settle(result: Result<StepOutcome, InstallError>) -> StepOutcome {
    result.unwrap_or_else(StepOutcome::Failed)
}

pub struct Installer<'a> {
    config: &'a Config,
    releases: &'a ReleaseClient,
    fetcher: Fetcher,
}

impl<'a> Installer<'a> {
    #[must_use]
    pub fn new(config: &'a Config, releases: &'a ReleaseClient) -> Installer<'a> {
        Installer {
            config,
            releases,
            fetcher: Fetcher::new(),
        }
    }

    /// Install everything `distro` needs and report each step
    pub fn run(&self, distro: Distro) -> InstallReport {
        let mut report = InstallReport::default();
        let spec = DownloadSpec::with_hosts(distro, &self.config.download_hosts);

        report.record(Step::InstallDir, settle(self.ensure_install_dir()));
        if report.has_fatal() {
            for step in [Step::Driver, Step::Distro, Step::KubeClient, Step::OpenShiftClient] {
                report.record(step, StepOutcome::Skipped("install directory unavailable".into()));
            }
            return report;
        }

        report.record(Step::Driver, settle(self.install_driver()));
        report.record(Step::Distro, settle(self.install_distro(&spec)));
        report.record(Step::KubeClient, settle(self.install_kubectl()));

        let openshift = if spec.is_minishift() {
            settle(self.install_openshift_client())
        } else {
            StepOutcome::Skipped(format!("not needed for {distro}"))
        };
        report.record(Step::OpenShiftClient, openshift);

        if report.downloads() > 0 && !self.config.install_dir_on_path() {
            warn!(
                "{} is not in your PATH; add it to use the downloaded binaries",
                self.config.install_dir.display()
            );
        }

        report
    }

    fn ensure_install_dir(&self) -> Result<StepOutcome, InstallError> {
        let dir = &self.config.install_dir;
        if dir.is_dir() {
            return Ok(StepOutcome::AlreadyPresent(dir.clone()));
        }
        create_private_dir(dir).map_err(|source| InstallError::InstallDir {
            path: dir.clone(),
            source,
        })?;
        debug!("Created {}", dir.display());
        Ok(StepOutcome::Installed(dir.clone()))
    }

    fn install_driver(&self) -> Result<StepOutcome, InstallError> {
        let os = self.config.platform.os;
        let outcome = match install_driver(os)? {
            DriverStatus::Installed => {
                info!("xhyve driver installed");
                StepOutcome::Installed(PathBuf::from(XHYVE_DRIVER))
            }
            DriverStatus::AlreadyInstalled => {
                info!("xhyve driver already installed");
                StepOutcome::AlreadyPresent(PathBuf::from(XHYVE_DRIVER))
            }
            DriverStatus::NotRequired => StepOutcome::Skipped(format!("no driver needed on {os}")),
        };
        Ok(outcome)
    }

    fn install_distro(&self, spec: &DownloadSpec) -> Result<StepOutcome, InstallError> {
        if let Some(path) = self.already_available(spec.local_binary) {
            return Ok(StepOutcome::AlreadyPresent(path));
        }

        let version = self.latest_version(spec.distro_owner, spec.distro_repo)?;
        let url = spec.distro_url(&version, &self.config.platform);
        let dest = self.config.install_path(spec.local_binary);
        self.download(&dest, &url)?;

        info!("Downloaded {}", spec.local_binary);
        Ok(StepOutcome::Installed(dest))
    }

    fn install_kubectl(&self) -> Result<StepOutcome, InstallError> {
        if let Some(path) = self.already_available(KUBECTL) {
            return Ok(StepOutcome::AlreadyPresent(path));
        }

        let version = self.latest_version(KUBERNETES, KUBERNETES)?;
        let url = self
            .config
            .platform
            .kubectl_url(&self.config.download_hosts, &version);
        let dest = self.config.install_path(KUBECTL);
        self.download(&dest, &url)?;

        info!("Downloaded {KUBECTL}");
        Ok(StepOutcome::Installed(dest))
    }

    fn install_openshift_client(&self) -> Result<StepOutcome, InstallError> {
        if let Some(path) = self.already_available(OC) {
            return Ok(StepOutcome::AlreadyPresent(path));
        }

        let platform = self.config.platform;
        let install_dir = &self.config.install_dir;
        let kind = platform.openshift_archive();
        debug!("Using pinned OpenShift client v{OC_VERSION} ({OC_BUILD_SHA})");

        let archive = install_dir.join(format!("{OC}.{}", kind.extension()));
        let url = platform.openshift_client_url(&self.config.download_hosts);
        self.download(&archive, &url)?;

        // Unpack away from the other binaries; only the client is kept
        let staging = install_dir.join(format!("{OC}-unpack"));
        let _ = fs::remove_dir_all(&staging);
        let files = match kind {
            ArchiveKind::Zip => unzip(&archive, &staging)?,
            ArchiveKind::TarGz => untar_gz(&archive, &staging)?,
        };

        let binary = platform.binary_name(OC);
        let extracted = files
            .into_iter()
            .find(|path| path.file_name().is_some_and(|name| name == binary.as_str()))
            .ok_or_else(|| InstallError::MissingBinary {
                name: binary.clone(),
                archive: archive.clone(),
            })?;

        let dest = install_dir.join(&binary);
        fs::rename(&extracted, &dest).map_err(|source| InstallError::Move {
            from: extracted.clone(),
            to: dest.clone(),
            source,
        })?;

        if let Err(err) = fs::remove_dir_all(&staging) {
            debug!("Could not remove {}: {err}", staging.display());
        }
        if let Err(err) = fs::remove_file(&archive) {
            debug!("Could not remove {}: {err}", archive.display());
        }

        info!("Downloaded {OC}");
        Ok(StepOutcome::Installed(dest))
    }

    fn already_available(&self, name: &str) -> Option<PathBuf> {
        let path = self.config.find_on_path(name)?;
        info!("{name} is already available on your PATH");
        Some(path)
    }

    fn latest_version(&self, owner: &str, repo: &str) -> Result<semver::Version, InstallError> {
        self.releases
            .latest_version(owner, repo)
            .map_err(|source| InstallError::Release {
                owner: owner.to_string(),
                repo: repo.to_string(),
                source,
            })
    }

    fn download(&self, dest: &Path, url: &str) -> Result<(), InstallError> {
        info!("Downloading {url}...");
        self.fetcher.download_file(dest, url)?;
        Ok(())
    }
}

/// Create a directory readable only by its owner
#[cfg(unix)]
fn create_private_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
