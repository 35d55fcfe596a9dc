// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! VM driver installation
//!
//! On macOS the xhyve driver is installed through Homebrew and made setuid
//! root so the cluster can create VMs without repeated password prompts.

use std::process::Command;

use log::info;

use crate::error::InstallError;
use crate::platform::Os;

pub const XHYVE_DRIVER: &str = "docker-machine-driver-xhyve";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Installed,
    AlreadyInstalled,
    /// No driver step exists for this OS
    NotRequired,
}

/// Install the VM driver for `os` if it is missing
///
/// # Errors
/// Returns `InstallError::UnsupportedDriver` on Linux, or the failure of any
/// package manager or privilege command on macOS
pub fn install_driver(os: Os) -> Result<DriverStatus, InstallError> {
    match os {
        Os::MacOs => install_xhyve(),
        Os::Linux => Err(InstallError::UnsupportedDriver(os.to_string())),
        Os::Windows | Os::Other(_) => Ok(DriverStatus::NotRequired),
    }
}

fn install_xhyve() -> Result<DriverStatus, InstallError> {
    info!("fabric8 recommends OSX users use the xhyve driver");

    let installed = Command::new("brew")
        .args(["info", XHYVE_DRIVER])
        .output()
        .is_ok_and(|out| {
            out.status.success() && !String::from_utf8_lossy(&out.stdout).contains("Not installed")
        });
    if installed {
        return Ok(DriverStatus::AlreadyInstalled);
    }

    run(Command::new("brew").args(["install", XHYVE_DRIVER]))?;

    let prefix = capture(Command::new("brew").arg("--prefix"))?;
    let driver = format!("{prefix}/opt/{XHYVE_DRIVER}/bin/{XHYVE_DRIVER}");

    run(Command::new("sudo").args(["chown", "root:wheel", driver.as_str()]))?;
    run(Command::new("sudo").args(["chmod", "u+s", driver.as_str()]))?;

    Ok(DriverStatus::Installed)
}

/// Run a command with inherited stdio and fail on a non-zero exit
fn run(cmd: &mut Command) -> Result<(), InstallError> {
    let status = cmd.status().map_err(|source| InstallError::Spawn {
        program: program_name(cmd),
        source,
    })?;
    if !status.success() {
        return Err(InstallError::CommandStatus {
            command: format!("{cmd:?}"),
            status: status.to_string(),
        });
    }
    Ok(())
}

/// Run a command and return its trimmed stdout
fn capture(cmd: &mut Command) -> Result<String, InstallError> {
    let output = cmd.output().map_err(|source| InstallError::Spawn {
        program: program_name(cmd),
        source,
    })?;
    if !output.status.success() {
        return Err(InstallError::CommandStatus {
            command: format!("{cmd:?}"),
            status: output.status.to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}
