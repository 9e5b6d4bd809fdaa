//! CLI argument definitions for the verifier.
//!
//! This module defines the command-line interface using clap. It is
//! separated from the main entrypoint to keep the binary small and focused
//! on orchestration.

use camino::Utf8PathBuf;
use clap::Parser;

/// Verify an installed muslbox toolbox against its declared tool set.
#[derive(Parser, Debug, Clone)]
#[command(name = "muslbox-verify")]
#[command(version, about)]
#[command(long_about = concat!(
    "Verify an installed muslbox toolbox against its declared tool set.\n\n",
    "Every expected binary must be present and executable, report a sane ",
    "identity string, and be statically linked unless a documented exception ",
    "says otherwise. The shell must always be present; the editor may live ",
    "in its own subtree and may be documented as absent.\n\n",
    "Exceptions are read from a flat manifest with one ",
    "<binary>:<version>:<tag> entry per line, where the tag is NOT_STATIC ",
    "(known dynamically linked) or MISSING_STATIC (permitted absent).",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Verify the default tool set:\n",
    "    $ muslbox-verify --install-dir ~/.local/share/muslbox\n\n",
    "  Verify specific tools with an exceptions manifest:\n",
    "    $ muslbox-verify --install-dir /opt/toolbox -t jq -t yq \\\n",
    "        --exceptions /opt/toolbox/static_exceptions.txt\n\n",
    "  Machine-readable report:\n",
    "    $ muslbox-verify --install-dir /opt/toolbox --json\n\n",
    "EXIT STATUS:\n",
    "  0  every check passed (degraded-mode warnings included)\n",
    "  1  at least one binary was missing or dynamically linked unexempted\n",
))]
pub struct Cli {
    /// Root of the installed toolbox [default: platform data dir].
    #[arg(long, value_name = "DIR")]
    pub install_dir: Option<Utf8PathBuf>,

    /// Verify a specific tool by name (can be repeated).
    #[arg(short, long = "tool", value_name = "NAME")]
    pub tool: Vec<String>,

    /// Path to the exceptions manifest [default: <install-dir>/static_exceptions.txt].
    #[arg(long, value_name = "FILE")]
    pub exceptions: Option<Utf8PathBuf>,

    /// Include an extra binary in the static-linkage check (can be repeated).
    #[arg(long = "check-linkage", value_name = "NAME")]
    pub linkage_extras: Vec<String>,

    /// Output the report as JSON for scripting.
    #[arg(long)]
    pub json: bool,

    /// Suppress per-binary progress output (the report is still printed).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Resolves the default install directory from the platform data dir.
#[must_use]
pub fn default_install_dir() -> Option<Utf8PathBuf> {
    let dirs = directories_next::ProjectDirs::from("", "", "muslbox")?;
    Utf8PathBuf::from_path_buf(dirs.data_local_dir().to_path_buf()).ok()
}

/// Default basename of the exceptions manifest below the install dir.
pub const EXCEPTIONS_MANIFEST: &str = "static_exceptions.txt";
