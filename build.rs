// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)

use std::fs;
use std::path::Path;

use clap::CommandFactory;

include!("src/cli.rs");

fn render(cmd: clap::Command) -> Vec<u8> {
    let mut buffer: Vec<u8> = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut buffer)
        .expect("failed to render man page");
    buffer
}

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let cmd = Cli::command();
    let name = cmd.get_name().to_string();

    // One page for the tool and one per subcommand (fabric8-setup-install.1, ...)
    let mut pages = vec![(format!("{name}.1"), render(cmd.clone()))];
    for sub in cmd.get_subcommands() {
        pages.push((format!("{name}-{}.1", sub.get_name()), render(sub.clone())));
    }

    // Write to the source tree so the pages are available for git commits.
    // Silently skip if the filesystem is read-only (e.g. container linters).
    let man_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("man");
    if fs::create_dir_all(&man_dir).is_ok() {
        for (file, page) in pages {
            let _ = fs::write(man_dir.join(file), page);
        }
    }
}
