//! Environment snapshot diffing.
//!
//! Importing settings from a foreign-shell script works by capturing the
//! process environment before and after the script runs and keeping only the
//! difference. The diff itself is a pure function over two immutable
//! snapshots; mutating the live process environment is left to the caller.

use std::collections::{BTreeMap, BTreeSet};

/// Computes the entries added or changed between two environment snapshots.
///
/// Keys listed in `excluded` are never part of the result, regardless of
/// whether they changed. Keys removed between the snapshots are ignored:
/// the delta describes what to import, not what to unset.
///
/// # Examples
///
/// ```
/// use std::collections::{BTreeMap, BTreeSet};
/// use muslbox_common::env_delta::compute_environment_delta;
///
/// let before = BTreeMap::from([("PATH".to_owned(), "/bin".to_owned())]);
/// let after = BTreeMap::from([
///     ("PATH".to_owned(), "/opt/toolbox/bin:/bin".to_owned()),
///     ("TOOLBOX_HOME".to_owned(), "/opt/toolbox".to_owned()),
/// ]);
/// let excluded = BTreeSet::new();
///
/// let delta = compute_environment_delta(&before, &after, &excluded);
/// assert_eq!(delta.len(), 2);
/// assert_eq!(delta["TOOLBOX_HOME"], "/opt/toolbox");
/// ```
#[must_use]
pub fn compute_environment_delta(
    before: &BTreeMap<String, String>,
    after: &BTreeMap<String, String>,
    excluded: &BTreeSet<String>,
) -> BTreeMap<String, String> {
    after
        .iter()
        .filter(|(key, _)| !excluded.contains(*key))
        .filter(|(key, value)| before.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn before() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("HOME".to_owned(), "/home/user".to_owned()),
            ("PATH".to_owned(), "/usr/bin".to_owned()),
            ("SHLVL".to_owned(), "1".to_owned()),
        ])
    }

    #[rstest]
    fn unchanged_snapshot_yields_empty_delta(before: BTreeMap<String, String>) {
        let delta = compute_environment_delta(&before, &before.clone(), &BTreeSet::new());
        assert!(delta.is_empty());
    }

    #[rstest]
    fn added_keys_appear_in_delta(before: BTreeMap<String, String>) {
        let mut after = before.clone();
        after.insert("TOOLBOX_HOME".to_owned(), "/opt/toolbox".to_owned());

        let delta = compute_environment_delta(&before, &after, &BTreeSet::new());
        assert_eq!(
            delta,
            BTreeMap::from([("TOOLBOX_HOME".to_owned(), "/opt/toolbox".to_owned())])
        );
    }

    #[rstest]
    fn changed_values_appear_in_delta(before: BTreeMap<String, String>) {
        let mut after = before.clone();
        after.insert("PATH".to_owned(), "/opt/toolbox/bin:/usr/bin".to_owned());

        let delta = compute_environment_delta(&before, &after, &BTreeSet::new());
        assert_eq!(delta.len(), 1);
        assert_eq!(delta["PATH"], "/opt/toolbox/bin:/usr/bin");
    }

    #[rstest]
    fn excluded_keys_never_appear(before: BTreeMap<String, String>) {
        let mut after = before.clone();
        after.insert("SHLVL".to_owned(), "2".to_owned());
        after.insert("EDITOR".to_owned(), "vim".to_owned());

        let excluded = BTreeSet::from(["SHLVL".to_owned()]);
        let delta = compute_environment_delta(&before, &after, &excluded);
        assert_eq!(
            delta,
            BTreeMap::from([("EDITOR".to_owned(), "vim".to_owned())])
        );
    }

    #[rstest]
    fn removed_keys_are_ignored(before: BTreeMap<String, String>) {
        let mut after = before.clone();
        after.remove("SHLVL");

        let delta = compute_environment_delta(&before, &after, &BTreeSet::new());
        assert!(delta.is_empty());
    }
}
