//! Helpers shared across tool implementations.

use std::path::{Path, PathBuf};

use hearth_catalog::Guardrails;
use hearth_workspace::{PathCheck, WorkspaceBoundary};

use crate::error::ToolFailure;

/// Confine `path` to the workspace root or `extra_roots`, mapping a failed
/// check to `path_not_allowed`.
pub(crate) fn confine(
    workspace: &WorkspaceBoundary,
    path: &Path,
    extra_roots: &[PathBuf],
) -> Result<(), ToolFailure> {
    match workspace.check(path, extra_roots) {
        PathCheck::Allowed => Ok(()),
        PathCheck::NotAllowed => Err(ToolFailure::path_not_allowed(path.display())),
    }
}

/// The roots `files.*` tools may touch: `allowedWriteRoots` plus
/// `allowedExecRoots`, since a file tool may legitimately need to read
/// something an exec tool was granted access to.
pub(crate) fn file_extra_roots(guardrails: &Guardrails) -> Vec<PathBuf> {
    let mut roots = guardrails.allowed_write_roots.clone();
    roots.extend(guardrails.allowed_exec_roots.iter().cloned());
    roots
}

/// `true` if `command` (optionally joined with `args`) matches any of
/// `denied_prefixes`, checked against both the command's basename and the
/// full command string.
pub(crate) fn is_command_denied(command: &str, args: &[String], denied_prefixes: &[String]) -> bool {
    let basename = Path::new(command)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(command);
    let full = if args.is_empty() {
        command.to_string()
    } else {
        format!("{command} {}", args.join(" "))
    };
    denied_prefixes
        .iter()
        .any(|prefix| basename.starts_with(prefix.as_str()) || full.starts_with(prefix.as_str()))
}

/// Truncate a byte buffer to `max_bytes` and lossily decode it to UTF-8.
pub(crate) fn truncate_and_decode(bytes: &[u8], max_bytes: u64) -> String {
    let max = usize::try_from(max_bytes).unwrap_or(usize::MAX).min(bytes.len());
    String::from_utf8_lossy(&bytes[..max]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_prefix_matches_basename() {
        let denied = vec!["mkfs".to_string()];
        assert!(is_command_denied("/sbin/mkfs.ext4", &[], &denied));
    }

    #[test]
    fn denied_prefix_matches_full_command() {
        let denied = vec!["rm -rf /".to_string()];
        assert!(is_command_denied("rm", &["-rf".to_string(), "/".to_string()], &denied));
    }

    #[test]
    fn allowed_command_is_not_denied() {
        let denied = vec!["mkfs".to_string(), "rm -rf /".to_string()];
        assert!(!is_command_denied("ls", &["-la".to_string()], &denied));
    }

    #[test]
    fn truncate_and_decode_respects_limit() {
        let bytes = b"hello world";
        assert_eq!(truncate_and_decode(bytes, 5), "hello");
        assert_eq!(truncate_and_decode(bytes, 100), "hello world");
    }
}
