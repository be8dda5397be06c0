//! Library handle lifecycle.

use std::path::Path;
use std::ptr::NonNull;

use alpmbind_sys as sys;

use crate::config::HandleConfig;
use crate::db::Db;
use crate::error::{self, Error, ErrorCode, Result};
use crate::list::{AlpmList, DbList, StringList};
use crate::marshal;
use crate::types::SigLevel;

/// An initialized libalpm instance.
///
/// The handle owns every native allocation reachable through it. Views
/// ([`Db`], [`Package`](crate::Package), lists) borrow the handle, so they
/// cannot outlive it. The native library is not thread safe, and neither is
/// this type.
#[derive(Debug)]
pub struct Handle {
    ptr: NonNull<sys::alpm_handle_t>,
}

impl Handle {
    /// Initializes the library for `root` with its databases under `dbpath`.
    pub fn new(root: impl AsRef<Path>, dbpath: impl AsRef<Path>) -> Result<Self> {
        let root = marshal::path_to_cstring(root.as_ref())?;
        let dbpath = marshal::path_to_cstring(dbpath.as_ref())?;
        let mut errno: sys::alpm_errno_t = sys::ALPM_ERR_OK;

        // Safety: both strings outlive the call; the out-parameter is local.
        let raw = unsafe { sys::alpm_initialize(root.as_ptr(), dbpath.as_ptr(), &mut errno) };
        let Some(ptr) = NonNull::new(raw) else {
            return Err(Error::from_code(ErrorCode::from_raw(errno)));
        };
        let handle = Self { ptr };
        // Safety: the handle was just initialized.
        unsafe {
            let status = crate::callbacks::arm_log_trampoline(handle.as_ptr());
            error::check(handle.as_ptr(), status)?;
        }
        tracing::debug!(root = ?root, dbpath = ?dbpath, "handle initialized");
        Ok(handle)
    }

    /// Initializes a handle and applies `config`.
    ///
    /// Ignored packages are added first, then every configured sync
    /// database is registered with its servers and usage.
    pub fn with_config(config: &HandleConfig) -> Result<Self> {
        let handle = Self::new(&config.root, &config.dbpath)?;
        crate::callbacks::set_default_log_level(config.log_level);

        for name in &config.ignore_pkgs {
            handle.add_ignore_pkg(name)?;
        }
        for sync in &config.sync_dbs {
            let db = handle.register_sync_db(&sync.name, sync.siglevel)?;
            if !sync.servers.is_empty() {
                db.set_servers(&sync.servers)?;
            }
            if let Some(usage) = sync.usage {
                db.set_usage(usage)?;
            }
        }
        Ok(handle)
    }

    /// Releases the handle, reporting a failed release.
    ///
    /// The native errno is gone with the handle, so a failure is reported
    /// as a generic system error.
    pub fn release(self) -> Result<()> {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        // Safety: the handle is live and no longer reachable from Rust.
        unsafe { release_raw(ptr) }
    }

    pub(crate) fn handle_ref(&self) -> HandleRef {
        HandleRef(self.ptr.as_ptr())
    }

    /// Returns the native handle pointer.
    pub fn as_ptr(&self) -> *mut sys::alpm_handle_t {
        self.ptr.as_ptr()
    }

    /// Returns the install root.
    pub fn root(&self) -> String {
        // Safety: the handle is live.
        unsafe { marshal::from_cstr(sys::alpm_option_get_root(self.as_ptr())) }
    }

    /// Returns the database directory.
    pub fn dbpath(&self) -> String {
        // Safety: the handle is live.
        unsafe { marshal::from_cstr(sys::alpm_option_get_dbpath(self.as_ptr())) }
    }

    /// Returns the local database.
    pub fn local_db(&self) -> Result<Db<'_>> {
        // Safety: the handle is live.
        let raw = unsafe { sys::alpm_get_localdb(self.as_ptr()) };
        self.handle_ref().db_or_error(raw)
    }

    /// Returns the registered sync databases in registration order.
    pub fn sync_dbs(&self) -> DbList<'_> {
        // Safety: the list is owned by the handle.
        let head = unsafe { sys::alpm_get_syncdbs(self.as_ptr()) };
        AlpmList::borrowed(head, self.handle_ref())
    }

    /// Registers a sync database.
    pub fn register_sync_db(&self, name: &str, siglevel: SigLevel) -> Result<Db<'_>> {
        let cname = marshal::to_cstring(name)?;
        // Safety: the handle is live; the name is copied by the library.
        let raw = unsafe { sys::alpm_register_syncdb(self.as_ptr(), cname.as_ptr(), siglevel.bits()) };
        let db = self.handle_ref().db_or_error(raw)?;
        tracing::debug!(db = name, "sync database registered");
        Ok(db)
    }

    /// Unregisters the sync database called `name`.
    ///
    /// Takes `&mut self`, so every view of the database, its packages and
    /// its lists must be gone before the native record is freed:
    ///
    /// ```compile_fail
    /// # use alpmbind::{Handle, SigLevel};
    /// # fn run(mut handle: Handle) -> alpmbind::Result<()> {
    /// let core = handle.register_sync_db("core", SigLevel::USE_DEFAULT)?;
    /// let linux = core.pkg("linux")?;
    /// handle.unregister_sync_db("core")?;
    /// println!("{}", linux.name());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Fails with [`ErrorCode::DB_NOT_FOUND`] if no sync database has that
    /// name. The local database cannot be unregistered.
    pub fn unregister_sync_db(&mut self, name: &str) -> Result<()> {
        let raw = self
            .sync_dbs()
            .iter()
            .find(|db| db.name() == name)
            .map(|db| db.as_ptr())
            .ok_or_else(|| Error::from_code(ErrorCode::DB_NOT_FOUND))?;
        // Safety: no views exist while `self` is borrowed mutably.
        unsafe {
            let status = sys::alpm_db_unregister(raw);
            error::check(self.as_ptr(), status)?;
        }
        tracing::debug!(db = name, "sync database unregistered");
        Ok(())
    }

    /// Unregisters every sync database.
    ///
    /// Takes `&mut self` so no database view survives the call.
    pub fn unregister_all_sync_dbs(&mut self) -> Result<()> {
        // Safety: no views exist while `self` is borrowed mutably.
        unsafe {
            let status = sys::alpm_unregister_all_syncdbs(self.as_ptr());
            error::check(self.as_ptr(), status)?;
        }
        tracing::debug!("all sync databases unregistered");
        Ok(())
    }

    /// Adds a package name to the ignore list.
    pub fn add_ignore_pkg(&self, name: &str) -> Result<()> {
        let cname = marshal::to_cstring(name)?;
        // Safety: the handle is live; the name is copied by the library.
        unsafe {
            let status = sys::alpm_option_add_ignorepkg(self.as_ptr(), cname.as_ptr());
            error::check(self.as_ptr(), status)
        }
    }

    /// Returns the ignore list.
    pub fn ignore_pkgs(&self) -> StringList<'_> {
        // Safety: the list is owned by the handle.
        let head = unsafe { sys::alpm_option_get_ignorepkgs(self.as_ptr()) };
        AlpmList::borrowed(head, self.handle_ref())
    }

    /// Returns the last error recorded on the handle, if any.
    pub fn last_error(&self) -> Option<Error> {
        // Safety: the handle is live.
        let code = ErrorCode::from_raw(unsafe { sys::alpm_errno(self.as_ptr()) });
        (!code.is_ok()).then(|| Error::from_code(code))
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        // Safety: the handle is live and dropped exactly once.
        if let Err(err) = unsafe { release_raw(self.ptr.as_ptr()) } {
            tracing::warn!(error = %err, "failed to release handle");
        }
    }
}

unsafe fn release_raw(ptr: *mut sys::alpm_handle_t) -> Result<()> {
    if sys::alpm_release(ptr) == 0 {
        tracing::debug!("handle released");
        Ok(())
    } else {
        Err(Error::from_code(ErrorCode::from_raw(sys::ALPM_ERR_SYSTEM)))
    }
}

/// The raw handle a view was derived from.
///
/// Views carry it for error lookups and for handle-level calls such as
/// ignore checks. It is only valid while the handle lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleRef(*mut sys::alpm_handle_t);

impl HandleRef {
    pub(crate) fn from_raw(ptr: *mut sys::alpm_handle_t) -> Self {
        Self(ptr)
    }

    #[cfg(test)]
    pub(crate) fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub(crate) fn as_ptr(self) -> *mut sys::alpm_handle_t {
        self.0
    }

    /// Reads the handle's last error.
    pub(crate) fn last_error(self) -> Error {
        // Safety: views only exist while their handle lives.
        unsafe { error::last_error(self.0) }
    }

    pub(crate) fn db_or_error<'a>(self, raw: *mut sys::alpm_db_t) -> Result<Db<'a>> {
        if raw.is_null() {
            return Err(self.last_error());
        }
        // Safety: non-null database owned by this handle.
        Ok(unsafe { Db::from_raw(raw, self) })
    }
}

/// Returns the native library version.
pub fn version() -> String {
    // Safety: static string.
    unsafe { marshal::from_cstr(sys::alpm_version()) }
}

#[cfg(all(test, not(feature = "system")))]
mod tests {
    use super::*;
    use alpmbind_sys::emulated::{seed_database, PackageSeed};
    use tempfile::TempDir;

    fn open() -> (TempDir, Handle) {
        let dir = tempfile::tempdir().unwrap();
        let handle = Handle::new(dir.path(), dir.path()).unwrap();
        (dir, handle)
    }

    #[test]
    fn new_reports_native_errno() {
        let err = Handle::new("/nonexistent/alpmbind", "/nonexistent/alpmbind").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NOT_A_DIR));
    }

    #[test]
    fn paths_round_trip() {
        let (dir, handle) = open();
        let expected = dir.path().to_str().unwrap();
        assert!(handle.root().starts_with(expected));
        assert!(handle.dbpath().starts_with(expected));
        assert!(handle.last_error().is_none());
    }

    #[test]
    fn register_and_list_sync_dbs() {
        let (_dir, handle) = open();
        handle.register_sync_db("core", SigLevel::USE_DEFAULT).unwrap();
        handle.register_sync_db("extra", SigLevel::USE_DEFAULT).unwrap();

        let names: Vec<String> = handle.sync_dbs().iter().map(|db| db.name()).collect();
        assert_eq!(names, ["core", "extra"]);
        assert_eq!(handle.local_db().unwrap().name(), "local");
    }

    #[test]
    fn duplicate_registration_surfaces_last_error() {
        let (_dir, handle) = open();
        handle.register_sync_db("core", SigLevel::empty()).unwrap();
        let err = handle.register_sync_db("core", SigLevel::empty()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::DB_NOT_NULL));
        assert_eq!(handle.last_error().and_then(|e| e.code()), Some(ErrorCode::DB_NOT_NULL));
    }

    #[test]
    fn unregister_all_clears_sync_dbs() {
        let (_dir, mut handle) = open();
        handle.register_sync_db("core", SigLevel::empty()).unwrap();
        handle.unregister_all_sync_dbs().unwrap();
        assert!(handle.sync_dbs().is_empty());
    }

    #[test]
    fn unregister_one_sync_db() {
        let (_dir, mut handle) = open();
        handle.register_sync_db("core", SigLevel::empty()).unwrap();
        handle.register_sync_db("extra", SigLevel::empty()).unwrap();
        handle.unregister_sync_db("core").unwrap();

        let names: Vec<String> = handle.sync_dbs().iter().map(|db| db.name()).collect();
        assert_eq!(names, ["extra"]);

        let err = handle.unregister_sync_db("core").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::DB_NOT_FOUND));
        let err = handle.unregister_sync_db("local").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::DB_NOT_FOUND));
        assert_eq!(handle.local_db().unwrap().name(), "local");
    }

    #[test]
    fn ignore_list() {
        let (_dir, handle) = open();
        handle.add_ignore_pkg("linux").unwrap();
        handle.add_ignore_pkg("linux-headers").unwrap();
        assert_eq!(handle.ignore_pkgs().to_vec(), ["linux", "linux-headers"]);
        assert!(matches!(handle.add_ignore_pkg("bad\0name"), Err(Error::InteriorNul(_))));
    }

    #[test]
    fn local_db_is_loaded_from_dbpath() {
        let dir = tempfile::tempdir().unwrap();
        seed_database(dir.path(), "local", vec![PackageSeed::new("glibc", "2.39-1")]);
        let handle = Handle::new(dir.path(), dir.path()).unwrap();
        let local = handle.local_db().unwrap();
        assert_eq!(local.pkg("glibc").unwrap().version(), "2.39-1");
    }

    #[test]
    fn explicit_release() {
        let (_dir, handle) = open();
        handle.release().unwrap();
    }

    #[test]
    fn version_is_reported() {
        assert!(!version().is_empty());
    }
}
