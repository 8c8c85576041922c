use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{
    EnumMirrorDirectoryConflictStrategy, EnumMirrorFileConflictStrategy, EnumMirrorPatternMode,
    MirrorError, SpecDenylist,
};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeDenylistMatcher {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypeDenylistMatcher {
    pub(crate) fn from_spec(spec_denylist: &SpecDenylist) -> Result<Self, MirrorError> {
        if spec_denylist.is_empty() {
            return Ok(Self::Literal(Vec::new()));
        }
        match spec_denylist.rule_pattern {
            EnumMirrorPatternMode::Literal => Ok(Self::Literal(spec_denylist.names.clone())),
            EnumMirrorPatternMode::Glob => {
                let mut l_glob = Vec::with_capacity(spec_denylist.names.len());
                for pattern in &spec_denylist.names {
                    let matcher = Glob::new(pattern)
                        .map_err(|e| MirrorError::InvalidPattern(e.to_string()))?
                        .compile_matcher();
                    l_glob.push(matcher);
                }
                Ok(Self::Glob(l_glob))
            }
            EnumMirrorPatternMode::Regex => {
                let mut l_regex = Vec::with_capacity(spec_denylist.names.len());
                for pattern in &spec_denylist.names {
                    let regex =
                        Regex::new(pattern).map_err(|e| MirrorError::InvalidPattern(e.to_string()))?;
                    l_regex.push(regex);
                }
                Ok(Self::Regex(l_regex))
            }
        }
    }

    /// Whether a top-level entry name is denied. Literal mode is exact and
    /// case-sensitive.
    pub(crate) fn is_denied(&self, name_entry: &str) -> bool {
        match self {
            Self::Literal(v) => v.iter().any(|p| p == name_entry),
            Self::Glob(v) => v.iter().any(|p| p.is_match(name_entry)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(name_entry)),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// `true` when `path_inner` equals or lies below `path_outer`, after
/// normalization.
pub(crate) fn is_within(path_inner: &Path, path_outer: &Path) -> bool {
    normalize_path(path_inner).starts_with(normalize_path(path_outer))
}

/// Refuse to write through an existing symlink at the destination.
pub(crate) fn validate_destination_not_symlink(path_dst_item: &Path) -> Result<(), String> {
    match fs::symlink_metadata(path_dst_item) {
        Ok(meta_dst_item) if meta_dst_item.file_type().is_symlink() => Err(format!(
            "Unsafe destination path is an existing symlink: {}",
            path_dst_item.display()
        )),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!(
            "Failed to inspect destination path {} ({e})",
            path_dst_item.display()
        )),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Conflicts

/// Outcome of checking a destination path before writing to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EnumConflictOutcome {
    /// Nothing in the way, or the strategy allows writing over it.
    Proceed,
    /// The strategy keeps the existing destination.
    Skip,
    /// Writing is refused, with a user-facing message.
    Fail(String),
}

pub(crate) fn check_dir_conflict(
    path_dst: &Path,
    rule_conflict: EnumMirrorDirectoryConflictStrategy,
) -> EnumConflictOutcome {
    if let Err(message) = validate_destination_not_symlink(path_dst) {
        return EnumConflictOutcome::Fail(message);
    }
    if !path_dst.exists() {
        return EnumConflictOutcome::Proceed;
    }
    if !path_dst.is_dir() {
        return EnumConflictOutcome::Fail(format!(
            "Destination is a file, expected directory: {}",
            path_dst.display()
        ));
    }

    match rule_conflict {
        EnumMirrorDirectoryConflictStrategy::Merge => EnumConflictOutcome::Proceed,
        EnumMirrorDirectoryConflictStrategy::Skip => EnumConflictOutcome::Skip,
        EnumMirrorDirectoryConflictStrategy::Error => {
            EnumConflictOutcome::Fail(format!("Destination exists: {}", path_dst.display()))
        }
    }
}

pub(crate) fn check_file_conflict(
    path_dst: &Path,
    rule_conflict: EnumMirrorFileConflictStrategy,
) -> EnumConflictOutcome {
    if let Err(message) = validate_destination_not_symlink(path_dst) {
        return EnumConflictOutcome::Fail(message);
    }
    if !path_dst.exists() {
        return EnumConflictOutcome::Proceed;
    }
    if path_dst.is_dir() {
        return EnumConflictOutcome::Fail(format!(
            "Destination is a directory: {}",
            path_dst.display()
        ));
    }

    match rule_conflict {
        EnumMirrorFileConflictStrategy::Overwrite => EnumConflictOutcome::Proceed,
        EnumMirrorFileConflictStrategy::Skip => EnumConflictOutcome::Skip,
        EnumMirrorFileConflictStrategy::Error => {
            EnumConflictOutcome::Fail(format!("Destination exists: {}", path_dst.display()))
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{EnumConflictOutcome, TypeDenylistMatcher, check_file_conflict, is_within};
    use crate::spec::{
        EnumMirrorFileConflictStrategy, EnumMirrorPatternMode, MirrorError, SpecDenylist,
    };

    #[test]
    fn literal_denylist_is_exact_and_case_sensitive() {
        let matcher =
            TypeDenylistMatcher::from_spec(&SpecDenylist::from_names(["public", ".git"]))
                .expect("compile");
        assert!(matcher.is_denied("public"));
        assert!(matcher.is_denied(".git"));
        assert!(!matcher.is_denied("Public"));
        assert!(!matcher.is_denied("public_html"));
        assert!(!matcher.is_denied(".gitignore"));
    }

    #[test]
    fn glob_and_regex_denylists_match_names() {
        let matcher = TypeDenylistMatcher::from_spec(&SpecDenylist {
            names: vec!["*.log".to_string()],
            rule_pattern: EnumMirrorPatternMode::Glob,
        })
        .expect("compile glob");
        assert!(matcher.is_denied("build.log"));
        assert!(!matcher.is_denied("build.txt"));

        let matcher = TypeDenylistMatcher::from_spec(&SpecDenylist {
            names: vec![r"^tmp_\d+$".to_string()],
            rule_pattern: EnumMirrorPatternMode::Regex,
        })
        .expect("compile regex");
        assert!(matcher.is_denied("tmp_42"));
        assert!(!matcher.is_denied("tmp_x"));
    }

    #[test]
    fn empty_denylist_skips_pattern_compilation_and_denies_nothing() {
        let matcher = TypeDenylistMatcher::from_spec(&SpecDenylist {
            names: Vec::new(),
            rule_pattern: EnumMirrorPatternMode::Regex,
        })
        .expect("empty denylist");
        assert!(matches!(&matcher, TypeDenylistMatcher::Literal(v) if v.is_empty()));
        assert!(!matcher.is_denied("public"));
        assert!(!matcher.is_denied(""));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        let err = TypeDenylistMatcher::from_spec(&SpecDenylist {
            names: vec!["(".to_string()],
            rule_pattern: EnumMirrorPatternMode::Regex,
        })
        .expect_err("invalid regex");
        assert!(matches!(err, MirrorError::InvalidPattern(_)));

        let err = TypeDenylistMatcher::from_spec(&SpecDenylist {
            names: vec!["[".to_string()],
            rule_pattern: EnumMirrorPatternMode::Glob,
        })
        .expect_err("invalid glob");
        assert!(matches!(err, MirrorError::InvalidPattern(_)));
    }

    #[test]
    fn is_within_handles_nested_and_sibling_paths() {
        let tmp = TempDir::new().expect("tempdir");
        let outer = tmp.path().join("a");
        let inner = outer.join("b");
        let sibling = tmp.path().join("ab");
        std::fs::create_dir_all(&inner).expect("mkdir");
        std::fs::create_dir_all(&sibling).expect("mkdir");

        assert!(is_within(&inner, &outer));
        assert!(is_within(&outer, &outer));
        assert!(!is_within(&outer, &inner));
        assert!(!is_within(&sibling, &outer));
    }

    #[test]
    fn file_conflict_respects_strategy() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("a.txt");
        std::fs::write(&path_file, "a").expect("write");

        assert_eq!(
            check_file_conflict(&path_file, EnumMirrorFileConflictStrategy::Overwrite),
            EnumConflictOutcome::Proceed
        );
        assert_eq!(
            check_file_conflict(&path_file, EnumMirrorFileConflictStrategy::Skip),
            EnumConflictOutcome::Skip
        );
        assert!(matches!(
            check_file_conflict(&path_file, EnumMirrorFileConflictStrategy::Error),
            EnumConflictOutcome::Fail(_)
        ));
        assert!(matches!(
            check_file_conflict(tmp.path(), EnumMirrorFileConflictStrategy::Overwrite),
            EnumConflictOutcome::Fail(_)
        ));
    }
}
