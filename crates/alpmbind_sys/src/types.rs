//! C layouts of the libalpm structures crossed by the binding.
//!
//! Every struct here mirrors `alpm.h` (ABI 12) field for field. A change
//! in the native layout silently breaks every reader of these types.

use std::ffi::{c_char, c_int, c_ulong, c_void};

/// An opaque library handle.
///
/// Never dereference or modify directly.
#[repr(C)]
pub struct alpm_handle_t {
    _private: [u8; 0],
}

/// An opaque database record.
#[repr(C)]
pub struct alpm_db_t {
    _private: [u8; 0],
}

/// An opaque package record.
#[repr(C)]
pub struct alpm_pkg_t {
    _private: [u8; 0],
}

/// An opaque conflict record.
#[repr(C)]
pub struct alpm_conflict_t {
    _private: [u8; 0],
}

/// An opaque PGP key record.
#[repr(C)]
pub struct alpm_pgpkey_t {
    _private: [u8; 0],
}

/// Seconds since the epoch.
pub type alpm_time_t = i64;
/// File sizes; libalpm is always built with 64-bit offsets.
pub type off_t = i64;
/// File permission bits.
pub type mode_t = u32;

/// Error code enumeration.
pub type alpm_errno_t = c_int;
/// Log level bit values.
pub type alpm_loglevel_t = c_int;
/// Question discriminant.
pub type alpm_question_type_t = c_int;
/// Install reason.
pub type alpm_pkgreason_t = c_int;
/// Package origin.
pub type alpm_pkgfrom_t = c_int;
/// Version comparison modifier.
pub type alpm_depmod_t = c_int;

/// Opaque `va_list` as received by a callback.
///
/// On x86_64 and aarch64 Linux a `va_list` parameter is passed as a
/// pointer, which is the only form the binding ever handles.
pub type va_list = *mut c_void;

/// Doubly-linked list node.
///
/// `prev` of the head points at the tail; `next` of the tail is null.
#[repr(C)]
#[derive(Debug)]
pub struct alpm_list_t {
    /// Untyped payload.
    pub data: *mut c_void,
    /// Previous node (the tail, for the head node).
    pub prev: *mut alpm_list_t,
    /// Next node, null at the tail.
    pub next: *mut alpm_list_t,
}

/// Dependency record.
#[repr(C)]
#[derive(Debug)]
pub struct alpm_depend_t {
    /// Package name.
    pub name: *mut c_char,
    /// Version constraint, may be null.
    pub version: *mut c_char,
    /// Description (optional dependencies), may be null.
    pub desc: *mut c_char,
    /// Hash of `name`.
    pub name_hash: c_ulong,
    /// Comparison modifier.
    pub mod_: alpm_depmod_t,
}

/// One entry of a package file list.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_file_t {
    /// Path relative to root.
    pub name: *mut c_char,
    /// Size in bytes.
    pub size: off_t,
    /// Permission bits.
    pub mode: mode_t,
}

/// Contiguous array of file entries.
#[repr(C)]
#[derive(Debug)]
pub struct alpm_filelist_t {
    /// Number of entries in `files`.
    pub count: usize,
    /// First entry of the array.
    pub files: *mut alpm_file_t,
}

/// Backup file record.
#[repr(C)]
#[derive(Debug)]
pub struct alpm_backup_t {
    /// Path relative to root.
    pub name: *mut c_char,
    /// MD5 of the file as installed.
    pub hash: *mut c_char,
}

/// Fields shared by every question.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_question_any_t {
    /// Discriminant.
    pub type_: alpm_question_type_t,
    /// Answer.
    pub answer: c_int,
}

/// Should a package listed in IgnorePkg be installed anyway.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_question_install_ignorepkg_t {
    /// Discriminant.
    pub type_: alpm_question_type_t,
    /// Answer.
    pub install: c_int,
    /// The ignored package.
    pub pkg: *mut alpm_pkg_t,
}

/// Should `oldpkg` be replaced by `newpkg`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_question_replace_t {
    /// Discriminant.
    pub type_: alpm_question_type_t,
    /// Answer.
    pub replace: c_int,
    /// Installed package.
    pub oldpkg: *mut alpm_pkg_t,
    /// Replacement.
    pub newpkg: *mut alpm_pkg_t,
    /// Database of the replacement.
    pub newdb: *mut alpm_db_t,
}

/// Should a conflicting package be removed.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_question_conflict_t {
    /// Discriminant.
    pub type_: alpm_question_type_t,
    /// Answer.
    pub remove: c_int,
    /// Conflict details.
    pub conflict: *mut alpm_conflict_t,
}

/// Should a corrupted package file be removed.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_question_corrupted_t {
    /// Discriminant.
    pub type_: alpm_question_type_t,
    /// Answer.
    pub remove: c_int,
    /// Path of the corrupted file.
    pub filepath: *const c_char,
    /// Why the file is considered corrupted.
    pub reason: alpm_errno_t,
}

/// Should packages with unresolvable dependencies be skipped.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_question_remove_pkgs_t {
    /// Discriminant.
    pub type_: alpm_question_type_t,
    /// Answer.
    pub skip: c_int,
    /// Affected packages.
    pub packages: *mut alpm_list_t,
}

/// Which provider satisfies a dependency.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_question_select_provider_t {
    /// Discriminant.
    pub type_: alpm_question_type_t,
    /// Index into `providers`.
    pub use_index: c_int,
    /// Candidate packages.
    pub providers: *mut alpm_list_t,
    /// The dependency being satisfied.
    pub depend: *mut alpm_depend_t,
}

/// Should a PGP key be imported.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct alpm_question_import_key_t {
    /// Discriminant.
    pub type_: alpm_question_type_t,
    /// Answer.
    pub import: c_int,
    /// The key.
    pub key: *mut alpm_pgpkey_t,
}

/// Tagged union of all questions; `type_` selects the live member.
#[repr(C)]
#[derive(Clone, Copy)]
pub union alpm_question_t {
    /// Discriminant, common prefix of every member.
    pub type_: alpm_question_type_t,
    /// Generic view.
    pub any: alpm_question_any_t,
    /// `ALPM_QUESTION_INSTALL_IGNOREPKG`.
    pub install_ignorepkg: alpm_question_install_ignorepkg_t,
    /// `ALPM_QUESTION_REPLACE_PKG`.
    pub replace: alpm_question_replace_t,
    /// `ALPM_QUESTION_CONFLICT_PKG`.
    pub conflict: alpm_question_conflict_t,
    /// `ALPM_QUESTION_CORRUPTED_PKG`.
    pub corrupted: alpm_question_corrupted_t,
    /// `ALPM_QUESTION_REMOVE_PKGS`.
    pub remove_pkgs: alpm_question_remove_pkgs_t,
    /// `ALPM_QUESTION_SELECT_PROVIDER`.
    pub select_provider: alpm_question_select_provider_t,
    /// `ALPM_QUESTION_IMPORT_KEY`.
    pub import_key: alpm_question_import_key_t,
}

/// Log callback signature.
pub type alpm_cb_log =
    Option<unsafe extern "C" fn(level: alpm_loglevel_t, fmt: *const c_char, args: va_list)>;

/// Question callback signature.
pub type alpm_cb_question = Option<unsafe extern "C" fn(question: *mut alpm_question_t)>;

/// List comparator.
pub type alpm_list_fn_cmp =
    Option<unsafe extern "C" fn(a: *const c_void, b: *const c_void) -> c_int>;

/// List element destructor.
pub type alpm_list_fn_free = Option<unsafe extern "C" fn(data: *mut c_void)>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn list_node_layout() {
        assert_eq!(offset_of!(alpm_list_t, data), 0);
        assert_eq!(offset_of!(alpm_list_t, prev), size_of::<*mut c_void>());
        assert_eq!(offset_of!(alpm_list_t, next), 2 * size_of::<*mut c_void>());
    }

    #[test]
    fn question_members_share_prefix() {
        assert_eq!(offset_of!(alpm_question_any_t, answer), 4);
        assert_eq!(offset_of!(alpm_question_replace_t, replace), 4);
        assert_eq!(offset_of!(alpm_question_install_ignorepkg_t, install), 4);
        assert_eq!(offset_of!(alpm_question_select_provider_t, use_index), 4);
        assert!(size_of::<alpm_question_t>() >= size_of::<alpm_question_replace_t>());
    }

    #[test]
    fn file_entry_layout() {
        assert_eq!(offset_of!(alpm_file_t, size), size_of::<*mut c_char>());
        assert_eq!(offset_of!(alpm_filelist_t, files), size_of::<usize>());
    }
}
