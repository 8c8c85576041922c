//! Mirror report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecMirrorError;

/// Aggregate counters and diagnostics for one `mirror` run.
#[derive(Debug, Default, Clone)]
pub struct ReportMirror {
    /// Top-level source entries enumerated.
    pub cnt_scanned: u64,
    /// Top-level entries excluded by the denylist.
    pub cnt_denied: u64,
    /// Top-level entries copied without any error.
    pub cnt_copied: u64,
    /// Entries left untouched by a conflict strategy.
    pub cnt_skipped: u64,
    /// Top-level entries with at least one recorded error.
    pub cnt_failed: u64,
    /// Files written under the destination.
    pub cnt_files: u64,
    /// Directories created or reused under the destination.
    pub cnt_dirs: u64,
    /// Non-fatal warnings collected during the run.
    pub warnings: Vec<String>,
    /// Per-entry failures.
    pub errors: Vec<SpecMirrorError>,
}

impl ReportMirror {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Names of top-level entries that failed, in run order, deduplicated.
    pub fn failed_entries(&self) -> Vec<&str> {
        let mut l_names: Vec<&str> = Vec::new();
        for spec_error in &self.errors {
            if !l_names.contains(&spec_error.name_entry.as_str()) {
                l_names.push(&spec_error.name_entry);
            }
        }
        l_names
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_denied".to_string(), self.cnt_denied);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_failed".to_string(), self.cnt_failed);
        dict_counts.insert("cnt_files".to_string(), self.cnt_files);
        dict_counts.insert("cnt_dirs".to_string(), self.cnt_dirs);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} denied={} copied={} skipped={} failed={} files={} dirs={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_denied,
            self.cnt_copied,
            self.cnt_skipped,
            self.cnt_failed,
            self.cnt_files,
            self.cnt_dirs,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MIRROR]"))
    }
}

/// Mutable accumulator for mirror statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportMirrorBuilder {
    report: ReportMirror,
}

impl ReportMirrorBuilder {
    pub fn add_scanned(&mut self) {
        self.report.cnt_scanned += 1;
    }

    pub fn add_denied(&mut self) {
        self.report.cnt_denied += 1;
    }

    pub fn add_copied(&mut self) {
        self.report.cnt_copied += 1;
    }

    pub fn add_skipped(&mut self) {
        self.report.cnt_skipped += 1;
    }

    pub fn add_failed(&mut self) {
        self.report.cnt_failed += 1;
    }

    pub fn add_file(&mut self) {
        self.report.cnt_files += 1;
    }

    pub fn add_dir(&mut self) {
        self.report.cnt_dirs += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.report.warnings.push(warning);
    }

    /// Add one path-scoped error under a top-level entry.
    pub fn add_error(&mut self, name_entry: &str, path: PathBuf, exception: String) {
        self.report.errors.push(SpecMirrorError {
            name_entry: name_entry.to_string(),
            path,
            exception,
        });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportMirror {
        self.report
    }
}
