//! The declared tool set of an installed toolbox.
//!
//! The shell and the editor are not part of the generic tool list: each
//! has dedicated required-presence logic in the verifier. Everything else
//! is probed by the generic loop, in a fixed order so diagnostic output is
//! deterministic.

/// The login shell; must be present and executable, no exceptions.
pub const SHELL_BINARY: &str = "zsh";

/// The editor; searched in the primary bin directory and its own subtree.
pub const EDITOR_BINARY: &str = "vim";

/// The editor's private subtree below the install directory.
pub const EDITOR_SUBTREE: &str = "vim/bin";

/// Static list of tools the generic verification loop inspects.
pub const DEFAULT_TOOLS: &[&str] = &[
    "busybox",
    "fzf",
    "jq",
    "rg",
    "tmux",
    "yq",
    "zoxide",
];

/// Binaries historically most likely to be dynamically linked by an
/// upstream build; the static-linkage check always covers these.
pub const LINKAGE_CANDIDATES: &[&str] = &["fzf", "tmux", "vim", "zsh"];

/// Builds the generic-loop tool list from CLI options.
///
/// With no specific tools requested the default set is used. Requested
/// names keep their input order, duplicates collapse to the first
/// occurrence, and the shell and editor are filtered out because the
/// dedicated checks always cover them.
#[must_use]
pub fn resolve_tools(specific: &[String]) -> Vec<String> {
    let requested: Vec<String> = if specific.is_empty() {
        DEFAULT_TOOLS.iter().map(|&t| t.to_owned()).collect()
    } else {
        specific.to_vec()
    };

    let mut seen = std::collections::BTreeSet::new();
    requested
        .into_iter()
        .filter(|name| name != SHELL_BINARY && name != EDITOR_BINARY)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Reports whether a binary is subject to the static-linkage check.
#[must_use]
pub fn is_linkage_candidate(name: &str, extras: &[String]) -> bool {
    LINKAGE_CANDIDATES.contains(&name) || extras.iter().any(|extra| extra == name)
}
