//! `mirrorkit_io_fs` v1:
//! denylist-aware directory mirroring engine.
//!
//! - `mirror`  : top-level orchestration and native subtree copy
//! - `backend` : write-side filesystem capability
//! - `spec`    : enums/options/denylist/errors
//! - `report`  : run-time report model
//! - `util`    : shared helper functions

pub mod backend;
pub mod mirror;
pub mod report;
pub mod spec;
mod util;

pub use backend::{MirrorBackend, NativeMirrorBackend};
pub use mirror::{mirror, mirror_with_backend};
pub use report::{ReportMirror, ReportMirrorBuilder};
pub use spec::{
    C_DIR_NAME_OUTPUT, EnumMirrorDirectoryConflictStrategy, EnumMirrorFileConflictStrategy,
    EnumMirrorPatternMode, L_NAMES_DENIED_DEFAULT, MirrorError, SpecDenylist, SpecMirrorError,
    SpecMirrorOptions,
};
