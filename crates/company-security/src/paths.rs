use company_core::{CompanyError, CompanyResult};
use std::path::{Component, Path, PathBuf};

/// A directory that user-supplied paths must stay inside.
///
/// Resolution is lexical first (so targets that do not exist yet can be
/// checked), then the deepest existing ancestor is canonicalized to catch
/// symlinks that point out of the root.
#[derive(Debug, Clone)]
pub struct ConfinedRoot {
    root: PathBuf,
}

impl ConfinedRoot {
    /// Confine paths to `root`. The root need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let absolute = std::path::absolute(&root).unwrap_or(root);
        Self {
            root: normalize(&absolute),
        }
    }

    /// The confining root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `requested` against the root, rejecting anything that escapes it.
    pub fn resolve(&self, requested: &str) -> CompanyResult<PathBuf> {
        let trimmed = requested.trim();
        if trimmed.is_empty() {
            return Err(CompanyError::Validation("path cannot be empty".to_string()));
        }

        let target = normalize(&self.root.join(trimmed));
        if !target.starts_with(&self.root) || target == self.root {
            return Err(CompanyError::PathTraversal(requested.to_string()));
        }
        if self.escapes_via_symlink(&target) {
            return Err(CompanyError::PathTraversal(requested.to_string()));
        }
        Ok(target)
    }

    fn escapes_via_symlink(&self, target: &Path) -> bool {
        let Ok(canonical_root) = std::fs::canonicalize(&self.root) else {
            // Root not created yet: nothing below it can be a symlink.
            return false;
        };
        let mut probe = target;
        while !probe.exists() {
            match probe.parent() {
                Some(parent) => probe = parent,
                None => return false,
            }
        }
        match std::fs::canonicalize(probe) {
            Ok(real) => !real.starts_with(&canonical_root),
            Err(_) => true,
        }
    }
}

/// Lexically collapse `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_nested_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = ConfinedRoot::new(dir.path());
        let resolved = root.resolve("finance/cost_estimate.md").unwrap();
        assert!(resolved.starts_with(root.root()));
        assert!(resolved.ends_with("finance/cost_estimate.md"));
    }

    #[test]
    fn test_dot_dot_inside_root_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let root = ConfinedRoot::new(dir.path());
        let resolved = root.resolve("tech/../reports/summary.md").unwrap();
        assert!(resolved.ends_with("reports/summary.md"));
    }

    #[test]
    fn test_escape_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = ConfinedRoot::new(dir.path().join("artifacts"));
        let err = root.resolve("../../outside.txt").unwrap_err();
        assert!(matches!(err, CompanyError::PathTraversal(_)));
    }

    #[test]
    fn test_absolute_path_outside_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = ConfinedRoot::new(dir.path());
        assert!(matches!(
            root.resolve("/etc/passwd"),
            Err(CompanyError::PathTraversal(_))
        ));
    }

    #[test]
    fn test_root_itself_is_not_a_file_target() {
        let dir = tempfile::tempdir().unwrap();
        let root = ConfinedRoot::new(dir.path());
        assert!(root.resolve(".").is_err());
    }

    #[test]
    fn test_empty_path_is_validation_error() {
        let root = ConfinedRoot::new("/srv/artifacts");
        assert!(matches!(root.resolve("  "), Err(CompanyError::Validation(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        let root = ConfinedRoot::new(dir.path());
        assert!(matches!(
            root.resolve("link/secret.txt"),
            Err(CompanyError::PathTraversal(_))
        ));
    }
}
