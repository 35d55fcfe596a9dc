// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Read-only check of whether a local cluster environment is ready

use log::debug;

use crate::config::Config;
use crate::platform::{Distro, DownloadSpec, KUBECTL};

/// Check that the kube config file exists and every binary the distribution
/// needs is on the search path
///
/// Nothing is installed or modified.
#[must_use]
pub fn is_installed(config: &Config, distro: Distro) -> bool {
    let kube_config = config.kube_config_path();
    if !kube_config.exists() {
        debug!("No kube config found at {}", kube_config.display());
        return false;
    }

    let spec = DownloadSpec::for_distro(distro);
    let mut required = vec![KUBECTL, spec.local_binary];
    if spec.is_minishift() {
        required.push(spec.client_binary);
    }

    required.into_iter().all(|name| {
        let found = config.find_on_path(name);
        if found.is_none() {
            debug!("{name} not found on PATH");
        }
        found.is_some()
    })
}
