//! Static-linkage inspection.
//!
//! Linkage is determined in two steps: the file-format metadata reported
//! by `file` (a "statically linked" marker passes immediately), then the
//! dynamic-dependency listing from `ldd` ("not a dynamic executable"
//! passes, resolved dependencies fail). When no definitive answer can be
//! reached the check degrades to a warned pass rather than failing the
//! run or silently succeeding.

use camino::Utf8Path;
use muslbox_common::exec::{CommandExecutor, combined_output};

/// What linkage inspection concluded about a binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkageStatus {
    /// The binary is statically linked.
    Static,
    /// The binary resolves shared-library dependencies at runtime.
    Dynamic {
        /// The first resolved dependency line, for diagnostics.
        detail: String,
    },
    /// Inspection could not reach a definitive answer.
    Unknown {
        /// Why the check could not be performed.
        reason: String,
    },
}

/// Inspects a binary's linkage with `file` and `ldd`.
#[must_use]
pub fn inspect_linkage(executor: &dyn CommandExecutor, binary_path: &Utf8Path) -> LinkageStatus {
    let file_result = executor.run("file", &["-L", binary_path.as_str()], None);
    let file_ran = match &file_result {
        Ok(output) => {
            if combined_output(output).contains("statically linked") {
                return LinkageStatus::Static;
            }
            true
        }
        Err(_) => false,
    };

    let ldd_result = executor.run("ldd", &[binary_path.as_str()], None);
    match ldd_result {
        Ok(output) => {
            let text = combined_output(&output);
            if text.contains("not a dynamic executable") || text.contains("statically linked") {
                return LinkageStatus::Static;
            }
            if let Some(line) = text.lines().find(|line| line.contains("=>")) {
                return LinkageStatus::Dynamic {
                    detail: line.trim().to_owned(),
                };
            }
            LinkageStatus::Unknown {
                reason: "ldd output was inconclusive".to_owned(),
            }
        }
        Err(_) if file_ran => LinkageStatus::Unknown {
            reason: "ldd is unavailable and file reported no static marker".to_owned(),
        },
        Err(_) => LinkageStatus::Unknown {
            reason: "neither file nor ldd is available on this host".to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use muslbox_common::test_support::{QueuedExecutor, StubResponse};

    fn inspect_with(responses: Vec<StubResponse>) -> LinkageStatus {
        let executor = QueuedExecutor::new(responses);
        let path = Utf8PathBuf::from("/opt/toolbox/bin/jq");
        inspect_linkage(&executor, &path)
    }

    #[test]
    fn file_static_marker_passes_without_ldd() {
        let status = inspect_with(vec![StubResponse::ok(
            "/opt/toolbox/bin/jq: ELF 64-bit LSB executable, statically linked, stripped\n",
        )]);
        assert_eq!(status, LinkageStatus::Static);
    }

    #[test]
    fn ldd_not_a_dynamic_executable_passes() {
        let status = inspect_with(vec![
            StubResponse::ok("/opt/toolbox/bin/jq: ELF 64-bit LSB executable\n"),
            StubResponse::err(1, "\tnot a dynamic executable\n"),
        ]);
        assert_eq!(status, LinkageStatus::Static);
    }

    #[test]
    fn resolved_dependencies_are_dynamic() {
        let status = inspect_with(vec![
            StubResponse::ok("/opt/toolbox/bin/jq: ELF 64-bit LSB executable, dynamically linked\n"),
            StubResponse::ok(concat!(
                "\tlinux-vdso.so.1 (0x00007fff0000000)\n",
                "\tlibc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f0000000000)\n",
            )),
        ]);
        assert!(matches!(
            status,
            LinkageStatus::Dynamic { ref detail } if detail.contains("libc.so.6")
        ));
    }

    #[test]
    fn missing_tools_degrade_to_unknown() {
        let status = inspect_with(Vec::new());
        assert!(matches!(
            status,
            LinkageStatus::Unknown { ref reason } if reason.contains("neither")
        ));
    }

    #[test]
    fn missing_ldd_after_inconclusive_file_is_unknown() {
        let status = inspect_with(vec![StubResponse::ok(
            "/opt/toolbox/bin/jq: ELF 64-bit LSB executable\n",
        )]);
        assert!(matches!(
            status,
            LinkageStatus::Unknown { ref reason } if reason.contains("ldd is unavailable")
        ));
    }
}
