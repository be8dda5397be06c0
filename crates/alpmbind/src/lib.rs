//! # alpmbind
//!
//! Safe views over libalpm, the library behind pacman.
//!
//! This crate provides:
//! - [`Handle`] lifecycle and configuration
//! - Database and package views that marshal one field per call
//! - Lazily walked native lists ([`AlpmList`])
//! - Checked narrowing of native questions ([`QuestionAny`])
//! - Process-wide log and question callbacks
//!
//! Views never own native memory. They borrow the [`Handle`] they came
//! from, so the compiler rejects any use after the handle is released.
//! Question views are tied to the callback invocation that produced them.
//!
//! ```no_run
//! use alpmbind::{Handle, SigLevel};
//!
//! let handle = Handle::new("/", "/var/lib/pacman")?;
//! let core = handle.register_sync_db("core", SigLevel::USE_DEFAULT)?;
//! for pkg in &core.search(["linux"])?.sort_by_size() {
//!     println!("{} {} {}", pkg.name(), pkg.version(), pkg.isize());
//! }
//! # Ok::<(), alpmbind::Error>(())
//! ```
//!
//! The default `emulated` feature builds against an in-process stand-in
//! for libalpm; enable `system` to link the real library.

#![warn(missing_docs)]

mod callbacks;
mod config;
mod db;
mod error;
mod handle;
mod list;
mod marshal;
mod package;
mod question;
mod types;

pub use callbacks::{
    clear_log_callback, clear_question_callback, default_log_callback, default_log_level,
    reset_default_log_target, set_default_log_level, set_default_log_target,
};
pub use config::{HandleConfig, SyncDbConfig};
pub use db::Db;
pub use error::{Error, ErrorCode, Result};
pub use handle::{version, Handle};
pub use list::{AlpmList, BackupList, DbList, DependList, Iter, ListItem, PackageList, StringList};
pub use package::Package;
pub use question::{QuestionAny, QuestionInstallIgnorePkg, QuestionReplace, QuestionSelectProvider};
pub use types::{
    BackupFile, DepMod, Dependency, File, LogLevel, PkgFrom, PkgReason, QuestionType, SigLevel, Usage,
    Validation,
};

/// Raw bindings, for callers that need to reach past the safe layer.
pub use alpmbind_sys as sys;
