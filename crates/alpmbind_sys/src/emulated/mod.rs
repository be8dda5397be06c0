//! In-process implementation of the libalpm entry points.
//!
//! Records use the exact C layouts from [`crate::types`] and the C
//! allocator, so a caller frees them the way it frees libalpm memory.
//! Repositories come from [`seed_database`] instead of `dbpath`; there is
//! no dependency resolution, syncing, signature checking or transaction
//! support.

mod handle;
mod hooks;
mod list;
mod package;
mod seed;
mod state;

pub use handle::*;
pub use hooks::{
    ask_corrupted, ask_generic, ask_install_ignorepkg, ask_replace, ask_select_provider,
    emit_log, render_log_message,
};
pub use list::{
    alpm_list_add, alpm_list_copy, alpm_list_count, alpm_list_free, alpm_list_free_inner,
    alpm_list_msort,
};
pub use package::*;
pub use seed::{clear_seeds, seed_database, DependSeed, FileSeed, PackageSeed, LOCAL_DB_NAME};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use std::ffi::{CStr, CString};
    use std::ptr;

    fn init(dir: &tempfile::TempDir) -> *mut crate::alpm_handle_t {
        let path = CString::new(dir.path().to_str().unwrap()).unwrap();
        let mut err = -1;
        let handle = unsafe { alpm_initialize(path.as_ptr(), path.as_ptr(), &mut err) };
        assert!(!handle.is_null());
        assert_eq!(err, ALPM_ERR_OK);
        handle
    }

    #[test]
    fn initialize_rejects_missing_dir() {
        let root = CString::new("/nonexistent/alpmbind").unwrap();
        let mut err = 0;
        let handle = unsafe { alpm_initialize(root.as_ptr(), root.as_ptr(), &mut err) };
        assert!(handle.is_null());
        assert_eq!(err, ALPM_ERR_NOT_A_DIR);
    }

    #[test]
    fn register_reads_seeded_packages() {
        let dir = tempfile::tempdir().unwrap();
        seed_database(dir.path(), "core", vec![PackageSeed::new("bash", "5.2-1")]);
        let handle = init(&dir);
        let name = CString::new("core").unwrap();
        unsafe {
            let db = alpm_register_syncdb(handle, name.as_ptr(), 0);
            assert!(!db.is_null());
            assert_eq!(alpm_list_count(alpm_db_get_pkgcache(db)), 1);

            let again = alpm_register_syncdb(handle, name.as_ptr(), 0);
            assert!(again.is_null());
            assert_eq!(alpm_errno(handle), ALPM_ERR_DB_NOT_NULL);

            let bash = CString::new("bash").unwrap();
            let pkg = alpm_db_get_pkg(db, bash.as_ptr());
            assert_eq!(alpm_pkg_get_db(pkg), db);
            assert_eq!(alpm_pkg_get_handle(pkg), handle);
            assert!(alpm_pkg_get_handle(ptr::null_mut()).is_null());

            let missing = CString::new("zsh").unwrap();
            assert!(alpm_db_get_pkg(db, missing.as_ptr()).is_null());
            assert_eq!(alpm_errno(handle), ALPM_ERR_PKG_NOT_FOUND);

            assert_eq!(alpm_release(handle), 0);
        }
        clear_seeds(dir.path());
    }

    #[test]
    fn dep_string_round_trips() {
        let depstring = CString::new("glibc>=2.38: C library").unwrap();
        unsafe {
            let dep = alpm_dep_from_string(depstring.as_ptr());
            assert_eq!((*dep).mod_, ALPM_DEP_MOD_GE);
            assert_eq!(CStr::from_ptr((*dep).name).to_str().unwrap(), "glibc");
            let text = alpm_dep_compute_string(dep);
            assert_eq!(CStr::from_ptr(text).to_str().unwrap(), "glibc>=2.38: C library");
            libc::free(text.cast());
            alpm_dep_free(dep);
        }
    }

    #[test]
    fn hooks_without_callbacks_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let handle = init(&dir);
        unsafe {
            assert!(!emit_log(handle, ALPM_LOG_ERROR, "nobody listens"));
            assert!(!ask_install_ignorepkg(handle, ptr::null_mut()));
            alpm_release(handle);
        }
    }
}
