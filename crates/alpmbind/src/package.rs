//! Package views.
//!
//! A [`Package`] is a pointer into native memory plus the handle it came
//! from. Nothing is cached: each accessor marshals its field again, since
//! the library may change the record between calls.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::time::SystemTime;

use alpmbind_sys as sys;

use crate::db::Db;
use crate::handle::{Handle, HandleRef};
use crate::list::{AlpmList, BackupList, DependList, RawList, StringList};
use crate::marshal;
use crate::types::{File, PkgFrom, PkgReason, Validation};

/// A non-owning view of a package record.
#[derive(Clone, Copy)]
pub struct Package<'a> {
    ptr: NonNull<sys::alpm_pkg_t>,
    handle: HandleRef,
    _marker: PhantomData<&'a Handle>,
}

macro_rules! string_accessors {
    ($($(#[$doc:meta])* $name:ident => $native:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> String {
                unsafe { marshal::from_cstr(sys::$native(self.as_ptr())) }
            }
        )*
    };
}

macro_rules! depend_accessors {
    ($($(#[$doc:meta])* $name:ident => $native:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> DependList<'a> {
                let head = unsafe { sys::$native(self.as_ptr()) };
                AlpmList::borrowed(head, self.handle)
            }
        )*
    };
}

impl<'a> Package<'a> {
    /// # Safety
    ///
    /// `ptr` must be a non-null package reachable from the handle behind
    /// `handle`.
    pub(crate) unsafe fn from_raw(ptr: *mut sys::alpm_pkg_t, handle: HandleRef) -> Self {
        Self {
            ptr: NonNull::new_unchecked(ptr),
            handle,
            _marker: PhantomData,
        }
    }

    /// Returns the native package pointer.
    pub fn as_ptr(&self) -> *mut sys::alpm_pkg_t {
        self.ptr.as_ptr()
    }

    string_accessors! {
        /// Package name.
        name => alpm_pkg_get_name;
        /// Full version string.
        version => alpm_pkg_get_version;
        /// Package file name.
        filename => alpm_pkg_get_filename;
        /// pkgbase.
        base => alpm_pkg_get_base;
        /// One-line description.
        description => alpm_pkg_get_desc;
        /// Upstream URL.
        url => alpm_pkg_get_url;
        /// Packager name and email.
        packager => alpm_pkg_get_packager;
        /// Target architecture.
        architecture => alpm_pkg_get_arch;
        /// MD5 of the package file.
        md5sum => alpm_pkg_get_md5sum;
        /// SHA-256 of the package file.
        sha256sum => alpm_pkg_get_sha256sum;
        /// Detached PGP signature, base64 encoded.
        base64_signature => alpm_pkg_get_base64_sig;
    }

    depend_accessors! {
        /// Runtime dependencies.
        depends => alpm_pkg_get_depends;
        /// Optional dependencies.
        optional_depends => alpm_pkg_get_optdepends;
        /// Dependencies for running the test suite.
        check_depends => alpm_pkg_get_checkdepends;
        /// Build dependencies.
        make_depends => alpm_pkg_get_makedepends;
        /// Conflicting packages.
        conflicts => alpm_pkg_get_conflicts;
        /// Virtual packages this package provides.
        provides => alpm_pkg_get_provides;
        /// Packages this package replaces.
        replaces => alpm_pkg_get_replaces;
    }

    /// Packed size in bytes.
    pub fn size(&self) -> i64 {
        unsafe { sys::alpm_pkg_get_size(self.as_ptr()) }
    }

    /// Installed size in bytes.
    pub fn isize(&self) -> i64 {
        unsafe { sys::alpm_pkg_get_isize(self.as_ptr()) }
    }

    /// Build time.
    pub fn build_date(&self) -> SystemTime {
        marshal::timestamp(unsafe { sys::alpm_pkg_get_builddate(self.as_ptr()) })
    }

    /// Install time; the epoch for packages that are not installed.
    pub fn install_date(&self) -> SystemTime {
        marshal::timestamp(unsafe { sys::alpm_pkg_get_installdate(self.as_ptr()) })
    }

    /// Install reason.
    pub fn reason(&self) -> PkgReason {
        let raw = unsafe { sys::alpm_pkg_get_reason(self.as_ptr()) };
        PkgReason::try_from(raw).unwrap_or_default()
    }

    /// Where the record was loaded from.
    pub fn origin(&self) -> Option<PkgFrom> {
        let raw = unsafe { sys::alpm_pkg_get_origin(self.as_ptr()) };
        PkgFrom::try_from(raw).ok()
    }

    /// How the package was validated.
    pub fn validation(&self) -> Validation {
        Validation::from_bits_retain(unsafe { sys::alpm_pkg_get_validation(self.as_ptr()) })
    }

    /// Licenses.
    pub fn licenses(&self) -> StringList<'a> {
        let head = unsafe { sys::alpm_pkg_get_licenses(self.as_ptr()) };
        AlpmList::borrowed(head, self.handle)
    }

    /// Groups the package belongs to.
    pub fn groups(&self) -> StringList<'a> {
        let head = unsafe { sys::alpm_pkg_get_groups(self.as_ptr()) };
        AlpmList::borrowed(head, self.handle)
    }

    /// Files the package installs, copied out of the native array.
    pub fn files(&self) -> Vec<File> {
        unsafe { marshal::filelist_from_raw(sys::alpm_pkg_get_files(self.as_ptr())) }
    }

    /// Configuration files preserved on upgrade.
    pub fn backup(&self) -> BackupList<'a> {
        let head = unsafe { sys::alpm_pkg_get_backup(self.as_ptr()) };
        AlpmList::borrowed(head, self.handle)
    }

    /// The database the record belongs to, if any.
    pub fn db(&self) -> Option<Db<'a>> {
        let raw = unsafe { sys::alpm_pkg_get_db(self.as_ptr()) };
        // Safety: a package's database belongs to the same handle.
        (!raw.is_null()).then(|| unsafe { Db::from_raw(raw, self.handle) })
    }

    /// Names of the packages that depend on this one.
    pub fn compute_required_by(&self) -> StringList<'a> {
        // Safety: the list and its strings are allocated for the caller.
        let head = unsafe { sys::alpm_pkg_compute_requiredby(self.as_ptr()) };
        AlpmList::new(unsafe { RawList::owned_deep(head) }, self.handle)
    }

    /// Names of the packages that optionally depend on this one.
    pub fn compute_optional_for(&self) -> StringList<'a> {
        // Safety: the list and its strings are allocated for the caller.
        let head = unsafe { sys::alpm_pkg_compute_optionalfor(self.as_ptr()) };
        AlpmList::new(unsafe { RawList::owned_deep(head) }, self.handle)
    }

    /// Returns true if the handle's ignore list names this package.
    pub fn should_ignore(&self) -> bool {
        unsafe { sys::alpm_pkg_should_ignore(self.handle.as_ptr(), self.as_ptr()) != 0 }
    }
}

impl PartialEq for Package<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl Eq for Package<'_> {}

impl fmt::Debug for Package<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.name())
            .field("version", &self.version())
            .finish()
    }
}
