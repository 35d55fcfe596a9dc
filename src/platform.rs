// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Platform detection and download URL building
//!
//! This module maps the host OS/architecture and the chosen local cluster
//! flavor onto the download locations of every binary the installer fetches.

use std::fmt;

use semver::Version;

/// Directory receiving downloaded binaries, relative to the user's home directory
pub const INSTALL_DIR: &str = ".fabric8/bin";

/// Kubernetes client configuration, relative to the user's home directory
pub const KUBE_CONFIG: &str = ".kube/config";

/// Generic release storage host used by minikube and kubectl
pub const KUBE_DOWNLOAD_URL: &str = "https://storage.googleapis.com/";

/// Release host of the minishift maintainer
pub const MINISHIFT_DOWNLOAD_URL: &str = "https://github.com/jimmidyson/";

pub const MINISHIFT_OWNER: &str = "jimmidyson";
pub const MINISHIFT: &str = "minishift";
pub const MINIKUBE: &str = "minikube";
pub const KUBERNETES: &str = "kubernetes";
pub const KUBECTL: &str = "kubectl";
pub const OC: &str = "oc";

/// OpenShift client release pinned for downloads.
///
/// The build SHA is part of the asset name and cannot be derived from the
/// release API, so both are fixed here.
pub const OC_VERSION: &str = "1.2.2";
pub const OC_BUILD_SHA: &str = "565691c";

/// Release host of the OpenShift client tools
pub const OC_RELEASE_URL: &str = "https://github.com/openshift/origin/releases/download/";
const OC_TOOLS: &str = "openshift-origin-client-tools";

/// Base URLs binaries are downloaded from
///
/// Each value is joined directly with a relative asset path, so it must end
/// with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadHosts {
    /// Host of minikube and kubectl releases
    pub kube: String,
    /// Host of minishift releases
    pub minishift: String,
    /// Host of the OpenShift client archives
    pub openshift: String,
}

impl DownloadHosts {
    /// Serve every download from a single base URL
    #[must_use]
    pub fn single(base: &str) -> DownloadHosts {
        let base = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
        DownloadHosts {
            kube: base.clone(),
            minishift: base.clone(),
            openshift: base,
        }
    }
}

impl Default for DownloadHosts {
    fn default() -> Self {
        DownloadHosts {
            kube: KUBE_DOWNLOAD_URL.to_string(),
            minishift: MINISHIFT_DOWNLOAD_URL.to_string(),
            openshift: OC_RELEASE_URL.to_string(),
        }
    }
}

/// Operating system family, named the way release assets name them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    MacOs,
    Windows,
    Other(&'static str),
}

impl Os {
    #[must_use]
    pub fn detect() -> Os {
        match std::env::consts::OS {
            "linux" => Os::Linux,
            "macos" => Os::MacOs,
            "windows" => Os::Windows,
            other => Os::Other(other),
        }
    }

    /// Name used in download URLs
    #[must_use]
    pub fn url_name(self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::MacOs => "darwin",
            Os::Windows => "windows",
            Os::Other(name) => name,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_name())
    }
}

/// CPU architecture, named the way release assets name them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
    X86,
    Arm,
    Other(&'static str),
}

impl Arch {
    #[must_use]
    pub fn detect() -> Arch {
        match std::env::consts::ARCH {
            "x86_64" => Arch::Amd64,
            "aarch64" => Arch::Arm64,
            "x86" => Arch::X86,
            "arm" => Arch::Arm,
            other => Arch::Other(other),
        }
    }

    #[must_use]
    pub fn url_name(self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::X86 => "386",
            Arch::Arm => "arm",
            Arch::Other(name) => name,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_name())
    }
}

/// Archive format the OpenShift client is published in for a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarGz => "tar.gz",
        }
    }
}

/// Target platform for downloaded binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    #[must_use]
    pub fn new(os: Os, arch: Arch) -> Platform {
        Platform { os, arch }
    }

    /// Automatically detect the current platform based on OS and architecture
    #[must_use]
    pub fn detect() -> Platform {
        Platform::new(Os::detect(), Arch::detect())
    }

    #[must_use]
    pub fn exe_suffix(&self) -> &'static str {
        if self.os == Os::Windows { ".exe" } else { "" }
    }

    /// File name of an executable on this platform
    #[must_use]
    pub fn binary_name(&self, name: &str) -> String {
        format!("{name}{}", self.exe_suffix())
    }

    /// Build the kubectl download URL for a Kubernetes release
    #[must_use]
    pub fn kubectl_url(&self, hosts: &DownloadHosts, version: &Version) -> String {
        format!(
            "{}kubernetes-release/release/v{version}/bin/{}/{}/{KUBECTL}{}",
            hosts.kube,
            self.os,
            self.arch,
            self.exe_suffix()
        )
    }

    #[must_use]
    pub fn openshift_archive(&self) -> ArchiveKind {
        match self.os {
            Os::Windows | Os::MacOs => ArchiveKind::Zip,
            Os::Linux | Os::Other(_) => ArchiveKind::TarGz,
        }
    }

    /// Build the download URL of the pinned OpenShift client archive
    #[must_use]
    pub fn openshift_client_url(&self, hosts: &DownloadHosts) -> String {
        let base = format!(
            "{}v{OC_VERSION}/{OC_TOOLS}-v{OC_VERSION}-{OC_BUILD_SHA}",
            hosts.openshift
        );
        match self.os {
            Os::Windows => format!("{base}-windows.zip"),
            Os::MacOs => format!("{base}-mac.zip"),
            Os::Linux | Os::Other(_) => format!("{base}-{}-{}.tar.gz", self.os, self.arch),
        }
    }
}

/// Local Kubernetes distribution to install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distro {
    #[default]
    Minikube,
    Minishift,
}

impl Distro {
    #[must_use]
    pub fn from_minishift_flag(minishift: bool) -> Distro {
        if minishift { Distro::Minishift } else { Distro::Minikube }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distro::Minikube => f.write_str(MINIKUBE),
            Distro::Minishift => f.write_str(MINISHIFT),
        }
    }
}

/// Where and under which names a distribution is downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSpec {
    /// Distribution this spec was resolved for
    pub distro: Distro,
    /// CLI client used to talk to the cluster
    pub client_binary: &'static str,
    /// GitHub account publishing the distribution's releases
    pub distro_owner: &'static str,
    /// GitHub repository of the distribution, also the asset name prefix
    pub distro_repo: &'static str,
    /// Binary name of the distribution itself
    pub local_binary: &'static str,
    /// Path segment between "releases/" and the version tag
    pub extra_path: &'static str,
    /// Base URL the distribution binary is downloaded from, ending in `/`
    pub download_url: String,
}

impl DownloadSpec {
    /// Resolve a distribution against the public release hosts
    #[must_use]
    pub fn for_distro(distro: Distro) -> DownloadSpec {
        DownloadSpec::with_hosts(distro, &DownloadHosts::default())
    }

    #[must_use]
    pub fn with_hosts(distro: Distro, hosts: &DownloadHosts) -> DownloadSpec {
        match distro {
            Distro::Minikube => DownloadSpec {
                distro,
                client_binary: KUBECTL,
                distro_owner: KUBERNETES,
                distro_repo: MINIKUBE,
                local_binary: MINIKUBE,
                extra_path: "",
                download_url: hosts.kube.clone(),
            },
            Distro::Minishift => DownloadSpec {
                distro,
                client_binary: OC,
                distro_owner: MINISHIFT_OWNER,
                distro_repo: MINISHIFT,
                local_binary: MINISHIFT,
                extra_path: "download/",
                download_url: hosts.minishift.clone(),
            },
        }
    }

    #[must_use]
    pub fn is_minishift(&self) -> bool {
        self.distro == Distro::Minishift
    }

    /// Build the distribution download URL for a release on a platform
    ///
    /// # Examples
    /// ```
    /// use fabric8_setup::platform::{Arch, Distro, DownloadSpec, Os, Platform};
    ///
    /// let spec = DownloadSpec::for_distro(Distro::Minikube);
    /// let version = semver::Version::new(0, 7, 1);
    /// assert_eq!(
    ///     spec.distro_url(&version, &Platform::new(Os::Linux, Arch::Amd64)),
    ///     "https://storage.googleapis.com/minikube/releases/v0.7.1/minikube-linux-amd64"
    /// );
    /// ```
    #[must_use]
    pub fn distro_url(&self, version: &Version, platform: &Platform) -> String {
        format!(
            "{}{repo}/releases/{}v{version}/{repo}-{}-{}{}",
            self.download_url,
            self.extra_path,
            platform.os,
            platform.arch,
            platform.exe_suffix(),
            repo = self.distro_repo,
        )
    }
}
