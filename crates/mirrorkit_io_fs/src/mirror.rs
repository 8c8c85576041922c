//! Top-level mirror orchestration and native subtree copy.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::backend::{MirrorBackend, NativeMirrorBackend};
use crate::report::{ReportMirror, ReportMirrorBuilder};
use crate::spec::{MirrorError, SpecMirrorOptions};
use crate::util::{
    EnumConflictOutcome, TypeDenylistMatcher, check_dir_conflict, check_file_conflict, is_within,
    normalize_path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumEntryKind {
    File,
    Directory,
    Special,
}

#[derive(Debug, Clone)]
struct SpecSourceEntry {
    path_entry_src: PathBuf,
    name_entry_os: OsString,
}

/// Failures recorded while copying one top-level entry.
type TypeEntryErrors = Vec<(PathBuf, String)>;

struct SpecMirrorContext<'a> {
    path_dir_dst: PathBuf,
    path_dir_dst_norm: PathBuf,
    spec_mirror_options: SpecMirrorOptions,
    backend: &'a dyn MirrorBackend,
    builder_report: ReportMirrorBuilder,
    set_dirs_ancestor: HashSet<(u64, u64)>,
}

impl SpecMirrorContext<'_> {
    fn add_warning(&mut self, warning: String) {
        warn!("{warning}");
        self.builder_report.add_warning(warning);
    }
}

/// Mirror the top-level entries of `dir_source` into `dir_destination`.
///
/// Uses [`NativeMirrorBackend`]. See [`mirror_with_backend`].
pub fn mirror<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_mirror_options: SpecMirrorOptions,
) -> Result<ReportMirror, MirrorError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    mirror_with_backend(
        dir_source,
        dir_destination,
        spec_mirror_options,
        &NativeMirrorBackend,
    )
}

/// Mirror the top-level entries of `dir_source` into `dir_destination`,
/// writing through `backend`.
///
/// The destination is created with missing parents if absent and reused
/// otherwise; nothing in it is ever deleted. Top-level entries are visited in
/// lexicographic name order. Entries whose name matches the denylist are
/// skipped. Files are copied directly, directories recursively, merging into
/// existing destination subtrees per [`SpecMirrorOptions`].
///
/// A failure anywhere inside a directory entry is logged once for that entry,
/// recorded in the report, and the run moves on to the next entry. A failing
/// top-level file aborts the run unless
/// [`SpecMirrorOptions::if_isolate_file_errors`] is set.
///
/// Returns [`ReportMirror`] when the run completes, possibly with per-entry
/// errors. Returns [`MirrorError`] for validation and setup failures and for
/// non-isolated file failures.
pub fn mirror_with_backend<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_mirror_options: SpecMirrorOptions,
    backend: &dyn MirrorBackend,
) -> Result<ReportMirror, MirrorError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    if !path_dir_src.is_dir() {
        return Err(MirrorError::SourceNotDirectory(path_dir_src));
    }
    if path_dir_dst.exists() && is_within(&path_dir_src, &path_dir_dst) {
        return Err(MirrorError::SourceInsideDestination {
            source_dir: normalize_path(&path_dir_src),
            destination: normalize_path(&path_dir_dst),
        });
    }
    let matcher_denylist = TypeDenylistMatcher::from_spec(&spec_mirror_options.denylist)?;

    backend
        .create_dir_all(&path_dir_dst)
        .map_err(|e| MirrorError::DestinationInitFailed {
            path: path_dir_dst.clone(),
            message: e.to_string(),
        })?;
    if !path_dir_dst.is_dir() {
        return Err(MirrorError::DestinationInitFailed {
            path: path_dir_dst,
            message: "Destination exists and is not a directory.".to_string(),
        });
    }

    let mut spec_mirror_ctx = SpecMirrorContext {
        path_dir_dst_norm: normalize_path(&path_dir_dst),
        path_dir_dst,
        spec_mirror_options,
        backend,
        builder_report: ReportMirrorBuilder::default(),
        set_dirs_ancestor: HashSet::new(),
    };
    if let Some(tuple_dir_id) = identify_dir(&path_dir_src) {
        spec_mirror_ctx.set_dirs_ancestor.insert(tuple_dir_id);
    }

    let l_entries = list_source_entries(&path_dir_src, &mut spec_mirror_ctx)?;
    for spec_entry in l_entries {
        handle_top_level_entry(spec_entry, &matcher_denylist, &mut spec_mirror_ctx)?;
    }

    let report = spec_mirror_ctx.builder_report.build();
    info!("{report}");
    Ok(report)
}

fn list_source_entries(
    path_dir_src: &Path,
    spec_mirror_ctx: &mut SpecMirrorContext<'_>,
) -> Result<Vec<SpecSourceEntry>, MirrorError> {
    let iter_entries = fs::read_dir(path_dir_src).map_err(|e| MirrorError::SourceReadFailed {
        path: path_dir_src.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut l_entries = Vec::new();
    for _entry_res in iter_entries {
        match _entry_res {
            Ok(entry) => l_entries.push(SpecSourceEntry {
                path_entry_src: entry.path(),
                name_entry_os: entry.file_name(),
            }),
            Err(e) => spec_mirror_ctx.add_warning(format!(
                "Failed to read directory entry under {} ({e})",
                path_dir_src.display()
            )),
        }
    }
    l_entries.sort_by(|a, b| a.name_entry_os.cmp(&b.name_entry_os));
    Ok(l_entries)
}

/// Resolve the kind of an entry, following symlinks.
fn resolve_entry_kind(path_entry: &Path) -> Result<EnumEntryKind, String> {
    let meta_entry = match fs::metadata(path_entry) {
        Ok(v) => v,
        Err(e) => {
            let b_is_symlink = fs::symlink_metadata(path_entry)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            if b_is_symlink {
                return Err(format!("Broken symlink: {}", path_entry.display()));
            }
            return Err(e.to_string());
        }
    };

    if meta_entry.is_dir() {
        Ok(EnumEntryKind::Directory)
    } else if meta_entry.is_file() {
        Ok(EnumEntryKind::File)
    } else {
        Ok(EnumEntryKind::Special)
    }
}

fn handle_top_level_entry(
    spec_entry: SpecSourceEntry,
    matcher_denylist: &TypeDenylistMatcher,
    spec_mirror_ctx: &mut SpecMirrorContext<'_>,
) -> Result<(), MirrorError> {
    spec_mirror_ctx.builder_report.add_scanned();

    // Lossy name for matching and logs only; paths keep the raw OS name.
    let name_entry = spec_entry.name_entry_os.to_string_lossy().to_string();
    if matcher_denylist.is_denied(&name_entry) {
        spec_mirror_ctx.builder_report.add_denied();
        debug!(entry = %name_entry, "denied entry skipped");
        return Ok(());
    }

    let path_entry_src = spec_entry.path_entry_src;
    let path_entry_dst = spec_mirror_ctx.path_dir_dst.join(&spec_entry.name_entry_os);
    let mut l_errors = TypeEntryErrors::new();
    let mut b_skipped = false;

    match resolve_entry_kind(&path_entry_src) {
        Err(message) => l_errors.push((path_entry_src, message)),
        Ok(EnumEntryKind::File) => {
            match copy_one_file(&path_entry_src, &path_entry_dst, spec_mirror_ctx) {
                Ok(b_written) => b_skipped = !b_written,
                Err(message) if !spec_mirror_ctx.spec_mirror_options.if_isolate_file_errors => {
                    return Err(MirrorError::FileCopyFailed {
                        path: path_entry_src,
                        message,
                    });
                }
                Err(message) => l_errors.push((path_entry_dst, message)),
            }
        }
        Ok(EnumEntryKind::Directory) => {
            if is_within(&spec_mirror_ctx.path_dir_dst_norm, &path_entry_src) {
                l_errors.push((
                    path_entry_src,
                    format!(
                        "Destination {} lies inside this entry",
                        spec_mirror_ctx.path_dir_dst.display()
                    ),
                ));
            } else {
                b_skipped = !copy_directory(
                    &path_entry_src,
                    &path_entry_dst,
                    spec_mirror_ctx,
                    &mut l_errors,
                );
            }
        }
        Ok(EnumEntryKind::Special) => {
            spec_mirror_ctx.add_warning(format!(
                "Special file skipped: {}",
                path_entry_src.display()
            ));
            spec_mirror_ctx.builder_report.add_skipped();
            return Ok(());
        }
    }

    finish_entry(&name_entry, l_errors, b_skipped, spec_mirror_ctx);
    Ok(())
}

fn finish_entry(
    name_entry: &str,
    l_errors: TypeEntryErrors,
    b_skipped: bool,
    spec_mirror_ctx: &mut SpecMirrorContext<'_>,
) {
    let Some((_, exception_first)) = l_errors.first() else {
        if !b_skipped {
            spec_mirror_ctx.builder_report.add_copied();
        }
        return;
    };

    let n_more = l_errors.len() - 1;
    if n_more == 0 {
        error!(entry = %name_entry, "Error copying {name_entry}: {exception_first}");
    } else {
        error!(
            entry = %name_entry,
            "Error copying {name_entry}: {exception_first} (and {n_more} more)"
        );
    }

    spec_mirror_ctx.builder_report.add_failed();
    for (path, exception) in l_errors {
        debug!(entry = %name_entry, path = %path.display(), "{exception}");
        spec_mirror_ctx
            .builder_report
            .add_error(name_entry, path, exception);
    }
}

/// Copy one file, honoring the file conflict strategy.
///
/// `Ok(false)` means the destination was kept by the strategy.
fn copy_one_file(
    path_file_src: &Path,
    path_file_dst: &Path,
    spec_mirror_ctx: &mut SpecMirrorContext<'_>,
) -> Result<bool, String> {
    let enum_rule_conflict_file = spec_mirror_ctx.spec_mirror_options.rule_conflict_file;
    match check_file_conflict(path_file_dst, enum_rule_conflict_file) {
        EnumConflictOutcome::Proceed => {}
        EnumConflictOutcome::Skip => {
            spec_mirror_ctx.builder_report.add_skipped();
            return Ok(false);
        }
        EnumConflictOutcome::Fail(message) => return Err(message),
    }

    spec_mirror_ctx
        .backend
        .copy_file(path_file_src, path_file_dst)
        .map_err(|e| e.to_string())?;
    spec_mirror_ctx.builder_report.add_file();
    Ok(true)
}

#[cfg(unix)]
fn identify_dir(path_dir: &Path) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(path_dir).ok().map(|m| (m.dev(), m.ino()))
}

#[cfg(not(unix))]
fn identify_dir(_path_dir: &Path) -> Option<(u64, u64)> {
    None
}

/// Copy a directory subtree into `path_dir_dst`, recording every failing path
/// in `l_errors` and carrying on with the siblings.
///
/// Returns `false` when the directory conflict strategy kept the existing
/// destination untouched.
fn copy_directory(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_mirror_ctx: &mut SpecMirrorContext<'_>,
    l_errors: &mut TypeEntryErrors,
) -> bool {
    let tuple_dir_id = identify_dir(path_dir_src);
    if let Some(tuple_dir_id) = tuple_dir_id
        && !spec_mirror_ctx.set_dirs_ancestor.insert(tuple_dir_id)
    {
        spec_mirror_ctx.add_warning(format!(
            "Symlink loop detected: {}",
            path_dir_src.display()
        ));
        return true;
    }

    let b_written = copy_directory_contents(path_dir_src, path_dir_dst, spec_mirror_ctx, l_errors);

    if let Some(tuple_dir_id) = tuple_dir_id {
        spec_mirror_ctx.set_dirs_ancestor.remove(&tuple_dir_id);
    }
    b_written
}

fn copy_directory_contents(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_mirror_ctx: &mut SpecMirrorContext<'_>,
    l_errors: &mut TypeEntryErrors,
) -> bool {
    let enum_rule_conflict_dir = spec_mirror_ctx.spec_mirror_options.rule_conflict_dir;
    match check_dir_conflict(path_dir_dst, enum_rule_conflict_dir) {
        EnumConflictOutcome::Proceed => {}
        EnumConflictOutcome::Skip => {
            spec_mirror_ctx.builder_report.add_skipped();
            return false;
        }
        EnumConflictOutcome::Fail(message) => {
            l_errors.push((path_dir_dst.to_path_buf(), message));
            return true;
        }
    }

    if let Err(e) = spec_mirror_ctx.backend.create_dir_all(path_dir_dst) {
        l_errors.push((path_dir_dst.to_path_buf(), e.to_string()));
        return true;
    }
    spec_mirror_ctx.builder_report.add_dir();

    let iter_entries = match fs::read_dir(path_dir_src) {
        Ok(iter) => iter,
        Err(e) => {
            l_errors.push((
                path_dir_src.to_path_buf(),
                format!("Failed to read directory {} ({e})", path_dir_src.display()),
            ));
            return true;
        }
    };

    let mut l_children: Vec<(OsString, PathBuf)> = Vec::new();
    for _entry_res in iter_entries {
        match _entry_res {
            Ok(entry) => l_children.push((entry.file_name(), entry.path())),
            Err(e) => l_errors.push((
                path_dir_src.to_path_buf(),
                format!(
                    "Failed to read directory entry under {} ({e})",
                    path_dir_src.display()
                ),
            )),
        }
    }
    l_children.sort_by(|a, b| a.0.cmp(&b.0));

    for (name_child, path_child_src) in l_children {
        let path_child_dst = path_dir_dst.join(&name_child);
        match resolve_entry_kind(&path_child_src) {
            Err(message) => l_errors.push((path_child_src, message)),
            Ok(EnumEntryKind::Directory) => {
                if is_within(&path_child_src, &spec_mirror_ctx.path_dir_dst_norm) {
                    spec_mirror_ctx.add_warning(format!(
                        "Destination reached through source tree, skipped: {}",
                        path_child_src.display()
                    ));
                    continue;
                }
                copy_directory(&path_child_src, &path_child_dst, spec_mirror_ctx, l_errors);
            }
            Ok(EnumEntryKind::File) => {
                if let Err(message) =
                    copy_one_file(&path_child_src, &path_child_dst, spec_mirror_ctx)
                {
                    l_errors.push((path_child_dst, message));
                }
            }
            Ok(EnumEntryKind::Special) => {
                spec_mirror_ctx.add_warning(format!(
                    "Special file skipped: {}",
                    path_child_src.display()
                ));
                spec_mirror_ctx.builder_report.add_skipped();
            }
        }
    }

    true
}
