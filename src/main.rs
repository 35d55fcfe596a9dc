// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! fabric8-setup - Main Application
//!
//! Entry point of the CLI that installs the VM driver, the local Kubernetes
//! distribution and the cluster clients needed to run fabric8 locally.

use std::error::Error;
use std::process::exit;

use clap::Parser;
use log::{LevelFilter, info};

use fabric8_setup::{Config, Distro, Installer, ReleaseClient, is_installed};

mod cli;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Install { minishift } => cmd_install(Distro::from_minishift_flag(minishift)),
        Commands::Status { minishift } => cmd_status(Distro::from_minishift_flag(minishift)),
    };

    match result {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(e) => {
            log::error!("{e}");
            exit(1);
        }
    }
}

/// Install the dependencies for `distro` and print a summary of every step
///
/// Returns `false` when the run could not get past creating the install
/// directory; any other failure is only a warning.
fn cmd_install(distro: Distro) -> Result<bool, Box<dyn Error>> {
    let config = Config::from_env()?;
    let releases = ReleaseClient::new(config.github_token.clone());
    if !releases.is_authenticated() {
        log::debug!("GH_TOKEN not set, using unauthenticated GitHub API requests");
    }

    info!("Installing {distro} dependencies into {}", config.install_dir.display());
    let report = Installer::new(&config, &releases).run(distro);

    for (step, outcome) in report.steps() {
        println!("{:<20} {outcome}", step.to_string());
    }

    Ok(!report.has_fatal())
}

/// Report whether everything `distro` needs is already in place
fn cmd_status(distro: Distro) -> Result<bool, Box<dyn Error>> {
    let config = Config::from_env()?;
    let installed = is_installed(&config, distro);

    if installed {
        println!("{distro} environment is installed");
    } else {
        println!("{distro} environment is not installed");
    }
    Ok(installed)
}
