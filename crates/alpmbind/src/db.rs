//! Database views.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use alpmbind_sys as sys;

use crate::error::{self, Result};
use crate::handle::{Handle, HandleRef};
use crate::list::{AlpmList, NativeStringList, PackageList, RawList, StringList};
use crate::marshal;
use crate::package::Package;
use crate::types::{SigLevel, Usage};

/// A non-owning view of a registered database.
///
/// Every accessor reads the native record on each call.
pub struct Db<'a> {
    ptr: NonNull<sys::alpm_db_t>,
    handle: HandleRef,
    _marker: PhantomData<&'a Handle>,
}

impl<'a> Db<'a> {
    /// # Safety
    ///
    /// `ptr` must be a non-null database of the handle behind `handle`.
    pub(crate) unsafe fn from_raw(ptr: *mut sys::alpm_db_t, handle: HandleRef) -> Self {
        Self {
            ptr: NonNull::new_unchecked(ptr),
            handle,
            _marker: PhantomData,
        }
    }

    /// Returns the native database pointer.
    pub fn as_ptr(&self) -> *mut sys::alpm_db_t {
        self.ptr.as_ptr()
    }

    /// Returns the repository name.
    pub fn name(&self) -> String {
        // Safety: the database lives as long as the borrowed handle.
        unsafe { marshal::from_cstr(sys::alpm_db_get_name(self.as_ptr())) }
    }

    /// Returns the signature checking policy.
    pub fn siglevel(&self) -> SigLevel {
        // Safety: the database is live.
        SigLevel::from_bits_retain(unsafe { sys::alpm_db_get_siglevel(self.as_ptr()) })
    }

    /// Returns the mirror URLs.
    pub fn servers(&self) -> StringList<'a> {
        // Safety: the server list is owned by the database.
        let head = unsafe { sys::alpm_db_get_servers(self.as_ptr()) };
        AlpmList::borrowed(head, self.handle)
    }

    /// Replaces the mirror URLs.
    ///
    /// The strings are copied into a native list that the library takes
    /// over; the previous list is freed by the library.
    pub fn set_servers<I, S>(&self, servers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = NativeStringList::new(servers)?;
        // Safety: ownership of the list moves to the library.
        unsafe {
            let status = sys::alpm_db_set_servers(self.as_ptr(), list.into_raw());
            error::check(self.handle.as_ptr(), status)
        }
    }

    /// Appends a mirror URL.
    pub fn add_server(&self, url: &str) -> Result<()> {
        let url = marshal::to_cstring(url)?;
        // Safety: the library copies the URL.
        unsafe {
            let status = sys::alpm_db_add_server(self.as_ptr(), url.as_ptr());
            error::check(self.handle.as_ptr(), status)
        }
    }

    /// Restricts what the database is used for.
    pub fn set_usage(&self, usage: Usage) -> Result<()> {
        // Safety: the database is live.
        unsafe {
            let status = sys::alpm_db_set_usage(self.as_ptr(), usage.bits());
            error::check(self.handle.as_ptr(), status)
        }
    }

    /// Returns what the database may be used for.
    pub fn usage(&self) -> Result<Usage> {
        let mut usage = 0;
        // Safety: the out-parameter is local.
        unsafe {
            let status = sys::alpm_db_get_usage(self.as_ptr(), &mut usage);
            error::check(self.handle.as_ptr(), status)?;
        }
        Ok(Usage::from_bits_retain(usage))
    }

    /// Looks up a package by exact name.
    pub fn pkg(&self, name: &str) -> Result<Package<'a>> {
        let name = marshal::to_cstring(name)?;
        // Safety: the name outlives the call.
        let raw = unsafe { sys::alpm_db_get_pkg(self.as_ptr(), name.as_ptr()) };
        if raw.is_null() {
            return Err(self.handle.last_error());
        }
        // Safety: non-null package owned by this database.
        Ok(unsafe { Package::from_raw(raw, self.handle) })
    }

    /// Returns every package of the database.
    pub fn pkg_cache(&self) -> PackageList<'a> {
        // Safety: the cache is owned by the database.
        let head = unsafe { sys::alpm_db_get_pkgcache(self.as_ptr()) };
        AlpmList::borrowed(head, self.handle)
    }

    /// Returns the packages matching all `targets` by name or description.
    ///
    /// The result list is freshly allocated and freed on drop; the packages
    /// themselves still belong to the database.
    pub fn search<I, S>(&self, targets: I) -> Result<PackageList<'a>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles = NativeStringList::new(targets)?;
        // Safety: the needles outlive the call and are only read.
        let head = unsafe { sys::alpm_db_search(self.as_ptr(), needles.as_ptr()) };
        tracing::trace!(db = %self.name(), "search");
        // Safety: search results are a fresh spine owned by the caller.
        Ok(AlpmList::new(unsafe { RawList::owned_spine(head) }, self.handle))
    }
}

impl fmt::Debug for Db<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db").field("name", &self.name()).finish()
    }
}
