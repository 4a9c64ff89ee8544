//! Root-directory confinement for filesystem tools.

use std::path::{Component, Path, PathBuf};
use triad_domain::ToolError;

/// The configured root directory all tool paths are confined to.
#[derive(Debug, Clone)]
pub struct SandboxRoot {
    root: PathBuf,
}

impl SandboxRoot {
    /// Create a sandbox rooted at `root`. The directory must exist.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into().canonicalize()?;
        if !root.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a tool-supplied path against the root.
    ///
    /// Relative paths are joined to the root; absolute paths are accepted
    /// only when they stay inside it. Resolution is lexical (the target may
    /// not exist yet), so `..` components are normalized away before the
    /// containment check.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, ToolError> {
        let candidate = if Path::new(raw).is_absolute() {
            PathBuf::from(raw)
        } else {
            self.root.join(raw)
        };

        let normalized = normalize(&candidate);
        if !normalized.starts_with(&self.root) {
            return Err(ToolError::out_of_sandbox(raw));
        }
        Ok(normalized)
    }
}

/// Lexically normalize a path: drop `.`, pop on `..`.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use triad_domain::tool::value_objects::codes;

    fn sandbox() -> (tempfile::TempDir, SandboxRoot) {
        let dir = tempfile::tempdir().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_relative_path_resolves_inside() {
        let (_dir, root) = sandbox();
        let resolved = root.resolve("src/main.py").unwrap();
        assert!(resolved.starts_with(root.root()));
        assert!(resolved.ends_with("src/main.py"));
    }

    #[test]
    fn test_parent_escape_rejected() {
        let (_dir, root) = sandbox();
        let err = root.resolve("../../etc/passwd").unwrap_err();
        assert_eq!(err.code, codes::OUT_OF_SANDBOX);
    }

    #[test]
    fn test_sneaky_escape_rejected() {
        let (_dir, root) = sandbox();
        let err = root.resolve("src/../../outside.txt").unwrap_err();
        assert_eq!(err.code, codes::OUT_OF_SANDBOX);
    }

    #[test]
    fn test_absolute_path_inside_accepted() {
        let (_dir, root) = sandbox();
        let inside = root.root().join("notes.txt");
        let resolved = root.resolve(inside.to_str().unwrap()).unwrap();
        assert_eq!(resolved, inside);
    }

    #[test]
    fn test_absolute_path_outside_rejected() {
        let (_dir, root) = sandbox();
        let err = root.resolve("/etc/passwd").unwrap_err();
        assert_eq!(err.code, codes::OUT_OF_SANDBOX);
    }

    #[test]
    fn test_dot_components_normalized() {
        let (_dir, root) = sandbox();
        let resolved = root.resolve("./a/./b.txt").unwrap();
        assert!(resolved.ends_with("a/b.txt"));
    }

    #[test]
    fn test_missing_root_is_setup_error() {
        assert!(SandboxRoot::new("/nonexistent/sandbox/root").is_err());
    }
}
