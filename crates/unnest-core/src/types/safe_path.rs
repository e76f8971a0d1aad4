//! Validated entry path type.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;

use super::StagingArea;

/// A relative entry path that has been validated to stay inside a staging
/// area.
///
/// `SafePath` can only be obtained through [`SafePath::validate`]. It never
/// contains `..`, a root or a prefix, and `.` components are removed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use unnest_core::ExtractConfig;
/// use unnest_core::types::SafePath;
/// use unnest_core::types::StagingArea;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let staging = StagingArea::new(None)?;
/// let config = ExtractConfig::default();
///
/// let safe = SafePath::validate(Path::new("./docs/a.txt"), &staging, &config)?
///     .ok_or("path normalized to nothing")?;
/// assert_eq!(safe.as_path(), Path::new("docs/a.txt"));
///
/// assert!(SafePath::validate(Path::new("../etc/passwd"), &staging, &config).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates an entry path against a staging area.
    ///
    /// Returns `Ok(None)` for paths that normalize to nothing (`.`, `./`),
    /// which name the staging root itself and carry no content.
    ///
    /// # Validation Steps
    ///
    /// 1. Reject NUL bytes
    /// 2. Reject roots, prefixes and `..` components
    /// 3. Drop `.` components
    /// 4. Enforce `max_path_depth`
    /// 5. Verify that the existing part of the resolved parent does not lead
    ///    outside the staging area through a previously created symlink
    ///
    /// # Errors
    ///
    /// - `ExtractionError::PathTraversal` for `..`, absolute paths or
    ///   symlinked parents leading outside the staging area
    /// - `ExtractionError::SecurityViolation` for NUL bytes or excessive depth
    pub fn validate(
        path: &Path,
        staging: &StagingArea,
        config: &ExtractConfig,
    ) -> Result<Option<Self>> {
        if has_null_bytes(path) {
            return Err(ExtractionError::SecurityViolation {
                reason: format!("path contains null bytes: {}", path.display()),
            });
        }

        let mut normalized = PathBuf::new();
        let mut depth = 0;

        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    depth += 1;
                    normalized.push(part);
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ExtractionError::PathTraversal {
                        path: path.to_path_buf(),
                    });
                }
            }
        }

        if depth == 0 {
            return Ok(None);
        }

        if depth > config.max_path_depth {
            return Err(ExtractionError::SecurityViolation {
                reason: format!(
                    "path depth {} exceeds maximum {}",
                    depth, config.max_path_depth
                ),
            });
        }

        let resolved = staging.path().join(&normalized);
        if let Some(parent) = resolved.parent() {
            verify_within(parent, staging, path)?;
        }

        Ok(Some(Self(normalized)))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Canonicalizes the deepest existing ancestor of `dir` and checks that it
/// lies inside the staging area.
fn verify_within(dir: &Path, staging: &StagingArea, original: &Path) -> Result<()> {
    let mut probe = dir;
    loop {
        match probe.canonicalize() {
            Ok(canonical) => {
                if canonical.starts_with(staging.path()) {
                    return Ok(());
                }
                return Err(ExtractionError::PathTraversal {
                    path: original.to_path_buf(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => match probe.parent() {
                Some(parent) if probe != staging.path() => probe = parent,
                _ => return Ok(()),
            },
            Err(e) => {
                return Err(ExtractionError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to canonicalize {}: {e}", probe.display()),
                )));
            }
        }
    }
}

/// Checks if a path contains null bytes.
#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

/// Checks if a path contains null bytes.
#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn validate(path: &str) -> Result<Option<SafePath>> {
        let staging = StagingArea::new(None).expect("failed to create staging area");
        SafePath::validate(Path::new(path), &staging, &ExtractConfig::default())
    }

    #[test]
    fn test_valid_relative_path() {
        let safe = validate("foo/bar/baz.txt").unwrap().unwrap();
        assert_eq!(safe.as_path(), Path::new("foo/bar/baz.txt"));
    }

    #[test]
    fn test_current_dir_is_normalized() {
        let safe = validate("./foo/./bar.txt").unwrap().unwrap();
        assert_eq!(safe.into_path_buf(), PathBuf::from("foo/bar.txt"));
    }

    #[test]
    fn test_empty_and_dot_paths_are_skipped() {
        assert!(validate("").unwrap().is_none());
        assert!(validate(".").unwrap().is_none());
        assert!(validate("./").unwrap().is_none());
    }

    #[test]
    fn test_parent_traversal_rejected() {
        for path in ["../etc/passwd", "foo/../../etc/passwd", "a/b/../c"] {
            assert!(
                matches!(validate(path), Err(ExtractionError::PathTraversal { .. })),
                "{path} should be rejected"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_path_rejected() {
        assert!(matches!(
            validate("/etc/passwd"),
            Err(ExtractionError::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let staging = StagingArea::new(None).unwrap();
        let config = ExtractConfig {
            max_path_depth: 2,
            ..Default::default()
        };
        assert!(SafePath::validate(Path::new("a/b"), &staging, &config).is_ok());
        assert!(matches!(
            SafePath::validate(Path::new("a/b/c"), &staging, &config),
            Err(ExtractionError::SecurityViolation { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_null_byte_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let staging = StagingArea::new(None).unwrap();
        let path = Path::new(OsStr::from_bytes(b"bad\0name"));
        assert!(matches!(
            SafePath::validate(path, &staging, &ExtractConfig::default()),
            Err(ExtractionError::SecurityViolation { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_parent_outside_rejected() {
        let outside = tempfile::TempDir::new().unwrap();
        let staging = StagingArea::new(None).unwrap();
        std::os::unix::fs::symlink(outside.path(), staging.path().join("escape")).unwrap();

        let result = SafePath::validate(
            Path::new("escape/payload.txt"),
            &staging,
            &ExtractConfig::default(),
        );
        assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_parent_inside_allowed() {
        let staging = StagingArea::new(None).unwrap();
        std::fs::create_dir(staging.path().join("real")).unwrap();
        std::os::unix::fs::symlink("real", staging.path().join("alias")).unwrap();

        let result = SafePath::validate(
            Path::new("alias/file.txt"),
            &staging,
            &ExtractConfig::default(),
        );
        assert!(result.unwrap().is_some());
    }
}
