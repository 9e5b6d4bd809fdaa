//! CLI argument definitions for the fetcher.
//!
//! This module defines the command-line interface using clap. It is
//! separated from the main entrypoint to keep the binary small and focused
//! on orchestration.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Fetch statically linked release archives for the muslbox toolbox.
#[derive(Parser, Debug)]
#[command(name = "muslbox-fetch")]
#[command(version, about)]
#[command(long_about = concat!(
    "Fetch statically linked release archives for the muslbox toolbox.\n\n",
    "Given an owner/repo source, muslbox-fetch looks for a musl-libc tar ",
    "archive (.tar.gz or .tar.xz) matching the target architecture among the ",
    "latest release assets, downloads it, and extracts it into the ",
    "destination directory. Extracted ELF binaries and shebang scripts get ",
    "the executable bit set.\n\n",
    "When no release asset matches, the source is retried as a package name ",
    "against the soar package repository, and finally as a generic ",
    "linux-tagged release asset without the musl requirement.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Fetch one tool into a directory:\n",
    "    $ muslbox-fetch Gaurav-Gosain/tuios --dest ./bin\n\n",
    "  Cross-fetch for the other architecture:\n",
    "    $ muslbox-fetch owner/repo --dest ./bin --arch arm64\n\n",
    "  Fetch a whole package list for an image build:\n",
    "    $ muslbox-fetch batch packages.json --target-arch arm64 --output-dir /build/output\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Fetch arguments (used when no subcommand is given).
    #[command(flatten)]
    pub fetch: FetchArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch a single package (default when no subcommand given).
    Fetch(FetchArgs),

    /// Fetch a package list and organize the binaries into an output tree.
    Batch(BatchArgs),
}

/// Arguments for the fetch command.
#[derive(Parser, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Source to fetch, in owner/repo form.
    #[arg(value_name = "OWNER/REPO")]
    pub source: Option<String>,

    /// Destination directory for extracted files [default: platform data dir].
    #[arg(long, value_name = "DIR")]
    pub dest: Option<Utf8PathBuf>,

    /// Target architecture (x86_64 or arm64; auto-detected if omitted).
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the batch command.
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// Packages: an inline space-separated list, a text file (one per
    /// line), or a JSON file with a packages array.
    #[arg(value_name = "PACKAGES")]
    pub packages: String,

    /// Docker-style TARGETARCH value (arm64 selects arm64, anything else
    /// x86_64).
    #[arg(long, value_name = "ARCH", default_value = "x86_64")]
    pub target_arch: String,

    /// Output directory; binaries are organized into `<dir>/bin`.
    #[arg(long, value_name = "DIR", default_value = "/build/output")]
    pub output_dir: Utf8PathBuf,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Returns the effective fetch arguments.
    ///
    /// If a `Fetch` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened fetch arguments for backwards
    /// compatibility. Callers handling `Batch` should check `self.command`
    /// first.
    #[must_use]
    pub fn fetch_args(&self) -> &FetchArgs {
        match &self.command {
            Some(Command::Fetch(args)) => args,
            Some(Command::Batch(_)) | None => &self.fetch,
        }
    }
}

/// Resolves the default destination directory from the platform data dir.
#[must_use]
pub fn default_destination() -> Option<Utf8PathBuf> {
    let dirs = directories_next::ProjectDirs::from("", "", "muslbox")?;
    Utf8PathBuf::from_path_buf(dirs.data_local_dir().join("bin")).ok()
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
