//! Path confinement for filesystem and process tools.
//!
//! The policy here is deliberately flatter than a full workspace-mode /
//! escape-policy / glob-auto-allow system: a candidate path is allowed if it
//! resolves to the workspace root, a descendant of it, or a descendant of one
//! of the extra roots the caller supplies (the guardrail's
//! `allowedWriteRoots` / `allowedExecRoots`). Anything else is rejected.

use std::path::{Path, PathBuf};

/// Outcome of checking a path against the workspace boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCheck {
    /// The path falls under the workspace root or an extra root.
    Allowed,
    /// The path escapes every configured root.
    NotAllowed,
}

impl PathCheck {
    /// `true` if the path may be used.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Confines filesystem and process operations to a workspace root plus an
/// explicit allowlist of extra roots.
#[derive(Debug, Clone)]
pub struct WorkspaceBoundary {
    root: PathBuf,
}

impl WorkspaceBoundary {
    /// Create a boundary rooted at `root`. `root` is not required to exist yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The current workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace the workspace root at runtime (`updateWorkspaceRootURL`).
    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    /// Resolve `path` to its canonical form, falling back to a manual join
    /// against the workspace root when the path does not yet exist.
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if let Ok(canonical) = path.canonicalize() {
            return canonical;
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// `true` if `candidate` equals, or is a descendant of, `root`.
    fn is_under(candidate: &Path, root: &Path) -> bool {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        candidate == root || candidate.starts_with(&root)
    }

    /// Check `path` against the workspace root and `extra_roots` (the
    /// guardrail's `allowedWriteRoots` / `allowedExecRoots`, as applicable).
    #[must_use]
    pub fn check(&self, path: &Path, extra_roots: &[PathBuf]) -> PathCheck {
        let resolved = self.resolve_path(path);

        if Self::is_under(&resolved, &self.root) {
            return PathCheck::Allowed;
        }

        for root in extra_roots {
            if Self::is_under(&resolved, root) {
                return PathCheck::Allowed;
            }
        }

        PathCheck::NotAllowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_inside_root_is_allowed() {
        let dir = TempDir::new().unwrap();
        let boundary = WorkspaceBoundary::new(dir.path());
        let candidate = dir.path().join("src/main.rs");
        assert_eq!(boundary.check(&candidate, &[]), PathCheck::Allowed);
    }

    #[test]
    fn path_outside_root_and_extras_is_not_allowed() {
        let dir = TempDir::new().unwrap();
        let boundary = WorkspaceBoundary::new(dir.path());
        assert_eq!(
            boundary.check(Path::new("/etc/passwd"), &[]),
            PathCheck::NotAllowed
        );
    }

    #[test]
    fn path_under_extra_root_is_allowed() {
        let dir = TempDir::new().unwrap();
        let extra = TempDir::new().unwrap();
        let boundary = WorkspaceBoundary::new(dir.path());
        let candidate = extra.path().join("readme.txt");
        assert_eq!(
            boundary.check(&candidate, &[extra.path().to_path_buf()]),
            PathCheck::Allowed
        );
    }

    #[test]
    fn empty_allowed_write_roots_blocks_escape() {
        let dir = TempDir::new().unwrap();
        let boundary = WorkspaceBoundary::new(dir.path());
        assert_eq!(
            boundary.check(Path::new("/etc/passwd"), &[]),
            PathCheck::NotAllowed
        );
    }

    #[test]
    fn set_root_updates_future_checks() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let mut boundary = WorkspaceBoundary::new(first.path());
        boundary.set_root(second.path());
        assert_eq!(boundary.root(), second.path());
        let candidate = second.path().join("a.txt");
        assert_eq!(boundary.check(&candidate, &[]), PathCheck::Allowed);
    }
}
