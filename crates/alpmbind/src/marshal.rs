//! Conversions between native records and host values.
//!
//! Every layout assumption of the binding lives here: field reads of
//! `alpm_depend_t`, `alpm_file_t`, `alpm_filelist_t` and `alpm_backup_t`,
//! C string copies and timestamp conversion. Callers above this module
//! only see owned host values.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use alpmbind_sys as sys;

use crate::error::Result;
use crate::types::{BackupFile, DepMod, Dependency, File};

/// Copies a native string. Null yields an empty string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn from_cstr(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Prepares a host string for the native side.
pub(crate) fn to_cstring(value: &str) -> Result<CString> {
    Ok(CString::new(value)?)
}

/// Prepares a path for the native side.
pub(crate) fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    Ok(CString::new(path.as_os_str().as_bytes())?)
}

/// Copies a dependency record field by field.
///
/// # Safety
///
/// `raw` must point to a live `alpm_depend_t`.
pub(crate) unsafe fn depend_from_raw(raw: *const sys::alpm_depend_t) -> Dependency {
    let raw = &*raw;
    Dependency {
        name: from_cstr(raw.name),
        version: from_cstr(raw.version),
        description: from_cstr(raw.desc),
        name_hash: u64::from(raw.name_hash),
        modifier: DepMod::try_from(raw.mod_).unwrap_or_default(),
    }
}

/// Copies one file entry.
///
/// # Safety
///
/// `raw` must point to a live `alpm_file_t`.
pub(crate) unsafe fn file_from_raw(raw: *const sys::alpm_file_t) -> File {
    let raw = &*raw;
    File {
        name: from_cstr(raw.name),
        size: raw.size,
        mode: raw.mode,
    }
}

/// Copies a backup record.
///
/// # Safety
///
/// `raw` must point to a live `alpm_backup_t`.
pub(crate) unsafe fn backup_from_raw(raw: *const sys::alpm_backup_t) -> BackupFile {
    let raw = &*raw;
    BackupFile {
        name: from_cstr(raw.name),
        hash: from_cstr(raw.hash),
    }
}

/// Copies a file list: `count` consecutive records, not a linked list.
///
/// # Safety
///
/// `raw` must be null or point to a live `alpm_filelist_t`.
pub(crate) unsafe fn filelist_from_raw(raw: *const sys::alpm_filelist_t) -> Vec<File> {
    if raw.is_null() {
        return Vec::new();
    }
    let raw = &*raw;
    if raw.files.is_null() || raw.count == 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(raw.files, raw.count)
        .iter()
        .map(|file| file_from_raw(file))
        .collect()
}

/// Converts seconds since the epoch.
pub(crate) fn timestamp(secs: sys::alpm_time_t) -> SystemTime {
    let offset = Duration::from_secs(secs.unsigned_abs());
    if secs >= 0 {
        UNIX_EPOCH + offset
    } else {
        UNIX_EPOCH - offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn null_string_is_empty() {
        assert_eq!(unsafe { from_cstr(ptr::null()) }, "");
        assert_eq!(unsafe { from_cstr(c"core".as_ptr()) }, "core");
    }

    #[test]
    fn timestamps() {
        assert_eq!(timestamp(0), UNIX_EPOCH);
        assert_eq!(timestamp(90), UNIX_EPOCH + Duration::from_secs(90));
        assert_eq!(timestamp(-90), UNIX_EPOCH - Duration::from_secs(90));
    }

    #[test]
    fn depend_copy_outlives_native_record() {
        let raw = unsafe { sys::alpm_dep_from_string(c"zlib>=1.3: compression".as_ptr()) };
        assert!(!raw.is_null());
        let dep = unsafe { depend_from_raw(raw) };
        unsafe { sys::alpm_dep_free(raw) };

        assert_eq!(dep.name, "zlib");
        assert_eq!(dep.version, "1.3");
        assert_eq!(dep.description, "compression");
        assert_eq!(dep.modifier, DepMod::Ge);
    }

    #[test]
    fn filelist_reads_contiguous_records() {
        let mut files = [
            sys::alpm_file_t {
                name: c"usr/bin/bash".as_ptr().cast_mut(),
                size: 1024,
                mode: 0o755,
            },
            sys::alpm_file_t {
                name: c"etc/bash.bashrc".as_ptr().cast_mut(),
                size: 12,
                mode: 0o644,
            },
        ];
        let list = sys::alpm_filelist_t {
            count: files.len(),
            files: files.as_mut_ptr(),
        };
        let out = unsafe { filelist_from_raw(&list) };
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "usr/bin/bash");
        assert_eq!(out[0].mode, 0o755);
        assert_eq!(out[1].size, 12);

        files[0].size = 0;
        assert_eq!(out[0].size, 1024);
        assert!(unsafe { filelist_from_raw(ptr::null()) }.is_empty());
    }

    #[test]
    fn backup_copy() {
        let raw = sys::alpm_backup_t {
            name: c"etc/pacman.conf".as_ptr().cast_mut(),
            hash: ptr::null_mut(),
        };
        let backup = unsafe { backup_from_raw(&raw) };
        assert_eq!(backup.name, "etc/pacman.conf");
        assert_eq!(backup.hash, "");
    }
}
