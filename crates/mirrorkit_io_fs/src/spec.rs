//! Mirror specification models and top-level error types.

use std::path::PathBuf;

use thiserror::Error;

/// Output directory name used by the build command.
pub const C_DIR_NAME_OUTPUT: &str = "public";

/// Top-level names the build command never copies, besides the output
/// directory and the tool itself.
pub const L_NAMES_DENIED_DEFAULT: &[&str] = &["node_modules", ".git"];

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Existing destination file conflict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMirrorFileConflictStrategy {
    /// Keep destination file and skip current source file.
    Skip,
    /// Replace destination file with source file.
    Overwrite,
    /// Record an error for this file.
    Error,
}

/// Existing destination directory conflict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMirrorDirectoryConflictStrategy {
    /// Do not descend into an already existing destination directory.
    Skip,
    /// Reuse destination directory and copy children into it.
    Merge,
    /// Record an error when destination directory already exists.
    Error,
}

/// Matching mode for denylist names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMirrorPatternMode {
    /// Exact, case-sensitive name equality.
    Literal,
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Names of top-level source entries that are never copied.
///
/// Matching applies to the entry name only, never to its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDenylist {
    /// Names or patterns, interpreted according to `rule_pattern`.
    pub names: Vec<String>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumMirrorPatternMode,
}

impl SpecDenylist {
    /// Literal denylist from plain names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            rule_pattern: EnumMirrorPatternMode::Literal,
        }
    }

    /// Denylist of the build command: output directory, `node_modules`,
    /// `.git` and the tool's own name.
    ///
    /// The platform executable suffix variant of `name_tool` is added when the
    /// platform has one (`.exe` on Windows).
    pub fn for_build(name_dir_output: &str, name_tool: &str) -> Self {
        let mut l_names = vec![C_DIR_NAME_OUTPUT.to_string()];
        if name_dir_output != C_DIR_NAME_OUTPUT {
            l_names.push(name_dir_output.to_string());
        }
        l_names.extend(L_NAMES_DENIED_DEFAULT.iter().map(|c| c.to_string()));
        l_names.push(name_tool.to_string());

        let c_suffix_exe = std::env::consts::EXE_SUFFIX;
        if !c_suffix_exe.is_empty() {
            l_names.push(format!("{name_tool}{c_suffix_exe}"));
        }
        Self::from_names(l_names)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SpecDenylist {
    fn default() -> Self {
        Self::from_names(Vec::<String>::new())
    }
}

/// Input options for `mirror`.
#[derive(Debug, Clone)]
pub struct SpecMirrorOptions {
    /// Top-level names excluded from copying.
    pub denylist: SpecDenylist,
    /// Conflict behavior for destination files.
    pub rule_conflict_file: EnumMirrorFileConflictStrategy,
    /// Conflict behavior for destination directories.
    pub rule_conflict_dir: EnumMirrorDirectoryConflictStrategy,
    /// Record top-level file copy failures in the report instead of aborting.
    pub if_isolate_file_errors: bool,
}

impl SpecMirrorOptions {
    /// Options of the build command: fixed denylist, overwrite files, merge
    /// directories, top-level file failures abort the run.
    pub fn for_build(name_dir_output: &str, name_tool: &str) -> Self {
        Self {
            denylist: SpecDenylist::for_build(name_dir_output, name_tool),
            ..Self::default()
        }
    }
}

impl Default for SpecMirrorOptions {
    fn default() -> Self {
        Self {
            denylist: SpecDenylist::default(),
            rule_conflict_file: EnumMirrorFileConflictStrategy::Overwrite,
            rule_conflict_dir: EnumMirrorDirectoryConflictStrategy::Merge,
            if_isolate_file_errors: false,
        }
    }
}

/// One copy failure item, scoped to the top-level entry it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMirrorError {
    /// Name of the top-level source entry.
    pub name_entry: String,
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// Fatal errors that abort a `mirror` run.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Invalid denylist pattern.
    #[error("Invalid pattern in denylist: {0}")]
    InvalidPattern(String),

    /// Source path is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    /// Source lies inside the destination, copying would recurse forever.
    #[error(
        "Source directory lies inside destination: {} -> {}",
        source_dir.display(),
        destination.display()
    )]
    SourceInsideDestination {
        /// Normalized source directory.
        source_dir: PathBuf,
        /// Normalized destination directory.
        destination: PathBuf,
    },

    /// Destination directory initialization failed.
    #[error("Failed to initialize destination {}: {message}", path.display())]
    DestinationInitFailed {
        /// Destination path that failed initialization.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },

    /// Source root could not be listed.
    #[error("Failed to read source directory {}: {message}", path.display())]
    SourceReadFailed {
        /// Source root.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },

    /// A top-level file could not be copied.
    #[error("Failed to copy {}: {message}", path.display())]
    FileCopyFailed {
        /// Source file path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{
        EnumMirrorDirectoryConflictStrategy, EnumMirrorFileConflictStrategy, EnumMirrorPatternMode,
        SpecDenylist, SpecMirrorOptions,
    };

    #[test]
    fn denylist_for_build_contains_fixed_names() {
        let denylist = SpecDenylist::for_build("public", "mirrorkit-build");
        assert_eq!(denylist.rule_pattern, EnumMirrorPatternMode::Literal);
        for c_name in ["public", "node_modules", ".git", "mirrorkit-build"] {
            assert!(denylist.names.iter().any(|n| n == c_name), "{c_name}");
        }
        assert_eq!(denylist.names.iter().filter(|n| *n == "public").count(), 1);
    }

    #[test]
    fn denylist_for_build_adds_custom_output_name() {
        let denylist = SpecDenylist::for_build("site", "tool");
        assert!(denylist.names.iter().any(|n| n == "site"));
        assert!(denylist.names.iter().any(|n| n == "public"));
    }

    #[test]
    fn options_default_is_overwrite_merge_and_fatal_file_errors() {
        let spec_options = SpecMirrorOptions::default();
        assert!(spec_options.denylist.is_empty());
        assert_eq!(
            spec_options.rule_conflict_file,
            EnumMirrorFileConflictStrategy::Overwrite
        );
        assert_eq!(
            spec_options.rule_conflict_dir,
            EnumMirrorDirectoryConflictStrategy::Merge
        );
        assert!(!spec_options.if_isolate_file_errors);
    }
}
