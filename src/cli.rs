// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
// CLI argument definitions for fabric8-setup
//
// Separated from main.rs so that build.rs can include this file
// to generate the man page via clap_mangen.

use clap::{Parser, Subcommand};

/// CLI argument parser
#[derive(Parser)]
#[command(
    name = "fabric8-setup",
    version,
    about = "Installs the binaries needed to run fabric8 on a local Kubernetes cluster"
)]
pub struct Cli {
    /// Make the operation more talkative
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Installs the dependencies to locally run the fabric8 microservices platform
    Install {
        /// Install minishift rather than minikube
        #[arg(long)]
        minishift: bool,
    },

    /// Checks whether the dependencies and a kube config are already present
    Status {
        /// Check for minishift rather than minikube
        #[arg(long)]
        minishift: bool,
    },
}
