//! Records behind the opaque handle, database and package pointers.

use std::ffi::{c_char, c_int, c_ulong, CString};
use std::path::PathBuf;
use std::ptr;

use super::list::{
    alpm_list_add, alpm_list_free, dup_opt, dup_str, free_str, free_string_list, payloads,
    string_list,
};
use super::seed::{DependSeed, PackageSeed};
use crate::consts::*;
use crate::types::*;

pub(crate) struct EmuHandle {
    pub(crate) root: CString,
    pub(crate) dbpath: CString,
    pub(crate) dbpath_buf: PathBuf,
    pub(crate) errno: alpm_errno_t,
    pub(crate) localdb: *mut EmuDb,
    pub(crate) syncdbs: *mut alpm_list_t,
    pub(crate) ignorepkgs: *mut alpm_list_t,
    pub(crate) logcb: alpm_cb_log,
    pub(crate) questioncb: alpm_cb_question,
}

impl EmuHandle {
    pub(crate) fn from_raw<'a>(handle: *mut alpm_handle_t) -> Option<&'a mut EmuHandle> {
        // Safety: every handle pointer handed out is a leaked `Box<EmuHandle>`.
        unsafe { handle.cast::<EmuHandle>().as_mut() }
    }

    pub(crate) fn fail<T>(&mut self, errno: alpm_errno_t, value: T) -> T {
        self.errno = errno;
        value
    }
}

impl Drop for EmuHandle {
    fn drop(&mut self) {
        // Safety: the handle exclusively owns its databases and lists.
        unsafe {
            for db in payloads(self.syncdbs) {
                drop(Box::from_raw(db.cast::<EmuDb>()));
            }
            alpm_list_free(self.syncdbs);
            if !self.localdb.is_null() {
                drop(Box::from_raw(self.localdb));
            }
            free_string_list(self.ignorepkgs);
        }
    }
}

pub(crate) struct EmuDb {
    pub(crate) handle: *mut EmuHandle,
    pub(crate) name: CString,
    pub(crate) siglevel: c_int,
    pub(crate) usage: c_int,
    pub(crate) servers: *mut alpm_list_t,
    pub(crate) pkgcache: *mut alpm_list_t,
}

impl EmuDb {
    /// Allocates a database and its packages; the caller owns the box.
    pub(crate) fn create(
        handle: *mut EmuHandle,
        name: &str,
        siglevel: c_int,
        seeds: Vec<PackageSeed>,
        origin: alpm_pkgfrom_t,
    ) -> *mut EmuDb {
        let db = Box::into_raw(Box::new(EmuDb {
            handle,
            name: CString::new(name).unwrap_or_default(),
            siglevel,
            usage: ALPM_DB_USAGE_ALL,
            servers: ptr::null_mut(),
            pkgcache: ptr::null_mut(),
        }));
        for seed in seeds {
            let pkg = Box::into_raw(Box::new(EmuPkg::from_seed(seed, db, origin)));
            // Safety: `db` was just leaked above and is not shared yet.
            unsafe { (*db).pkgcache = alpm_list_add((*db).pkgcache, pkg.cast()) };
        }
        db
    }

    pub(crate) fn from_raw<'a>(db: *const alpm_db_t) -> Option<&'a mut EmuDb> {
        // Safety: every database pointer handed out is a leaked `Box<EmuDb>`.
        unsafe { (db as *mut alpm_db_t).cast::<EmuDb>().as_mut() }
    }

    pub(crate) fn packages(&self) -> Vec<*mut EmuPkg> {
        // Safety: `pkgcache` is owned by this database.
        unsafe { payloads(self.pkgcache).into_iter().map(|p| p.cast()).collect() }
    }

    #[allow(clippy::mut_from_ref)]
    pub(crate) fn handle(&self) -> &mut EmuHandle {
        // Safety: databases never outlive their handle.
        unsafe { &mut *self.handle }
    }
}

impl Drop for EmuDb {
    fn drop(&mut self) {
        // Safety: the database exclusively owns its packages and servers.
        unsafe {
            for pkg in self.packages() {
                drop(Box::from_raw(pkg));
            }
            alpm_list_free(self.pkgcache);
            free_string_list(self.servers);
        }
    }
}

pub(crate) struct EmuPkg {
    pub(crate) db: *mut EmuDb,
    pub(crate) origin: alpm_pkgfrom_t,
    pub(crate) name: CString,
    pub(crate) version: CString,
    pub(crate) base: Option<CString>,
    pub(crate) filename: Option<CString>,
    pub(crate) desc: Option<CString>,
    pub(crate) url: Option<CString>,
    pub(crate) arch: Option<CString>,
    pub(crate) packager: Option<CString>,
    pub(crate) md5sum: Option<CString>,
    pub(crate) sha256sum: Option<CString>,
    pub(crate) base64_sig: Option<CString>,
    pub(crate) builddate: alpm_time_t,
    pub(crate) installdate: alpm_time_t,
    pub(crate) size: off_t,
    pub(crate) isize: off_t,
    pub(crate) reason: alpm_pkgreason_t,
    pub(crate) validation: c_int,
    pub(crate) licenses: *mut alpm_list_t,
    pub(crate) groups: *mut alpm_list_t,
    pub(crate) depends: *mut alpm_list_t,
    pub(crate) optdepends: *mut alpm_list_t,
    pub(crate) checkdepends: *mut alpm_list_t,
    pub(crate) makedepends: *mut alpm_list_t,
    pub(crate) conflicts: *mut alpm_list_t,
    pub(crate) provides: *mut alpm_list_t,
    pub(crate) replaces: *mut alpm_list_t,
    pub(crate) backup: *mut alpm_list_t,
    pub(crate) files: alpm_filelist_t,
}

fn cstring(s: &str) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}

fn opt_cstring(s: Option<String>) -> Option<CString> {
    s.map(|s| cstring(&s))
}

pub(crate) fn opt_ptr(s: &Option<CString>) -> *const c_char {
    s.as_ref().map_or(ptr::null(), |s| s.as_ptr())
}

fn depend_list(seeds: &[DependSeed]) -> *mut alpm_list_t {
    let mut list = ptr::null_mut();
    for seed in seeds {
        // Safety: `list` is null or built here.
        list = unsafe { alpm_list_add(list, parse_depend(&seed.depstring).cast()) };
    }
    list
}

unsafe fn free_depend_list(list: *mut alpm_list_t) {
    for dep in payloads(list) {
        free_depend(dep.cast());
    }
    alpm_list_free(list);
}

impl EmuPkg {
    fn from_seed(seed: PackageSeed, db: *mut EmuDb, origin: alpm_pkgfrom_t) -> Self {
        let mut backup = ptr::null_mut();
        for (name, hash) in &seed.backup {
            // Safety: calloc result is checked before use.
            unsafe {
                let entry = libc::calloc(1, std::mem::size_of::<alpm_backup_t>()).cast::<alpm_backup_t>();
                if entry.is_null() {
                    continue;
                }
                (*entry).name = dup_str(name);
                (*entry).hash = dup_str(hash);
                backup = alpm_list_add(backup, entry.cast());
            }
        }

        let files = if seed.files.is_empty() {
            alpm_filelist_t { count: 0, files: ptr::null_mut() }
        } else {
            // Safety: the array is sized for every entry written below.
            unsafe {
                let array = libc::calloc(seed.files.len(), std::mem::size_of::<alpm_file_t>())
                    .cast::<alpm_file_t>();
                if array.is_null() {
                    alpm_filelist_t { count: 0, files: ptr::null_mut() }
                } else {
                    for (i, file) in seed.files.iter().enumerate() {
                        array.add(i).write(alpm_file_t {
                            name: dup_str(&file.name),
                            size: file.size,
                            mode: file.mode,
                        });
                    }
                    alpm_filelist_t { count: seed.files.len(), files: array }
                }
            }
        };

        Self {
            db,
            origin,
            name: cstring(&seed.name),
            version: cstring(&seed.version),
            base: opt_cstring(seed.base),
            filename: opt_cstring(seed.filename),
            desc: opt_cstring(seed.desc),
            url: opt_cstring(seed.url),
            arch: opt_cstring(seed.arch),
            packager: opt_cstring(seed.packager),
            md5sum: opt_cstring(seed.md5sum),
            sha256sum: opt_cstring(seed.sha256sum),
            base64_sig: opt_cstring(seed.base64_sig),
            builddate: seed.builddate,
            installdate: seed.installdate,
            size: seed.size,
            isize: seed.isize,
            reason: seed.reason,
            validation: seed.validation,
            licenses: string_list(&seed.licenses),
            groups: string_list(&seed.groups),
            depends: depend_list(&seed.depends),
            optdepends: depend_list(&seed.optdepends),
            checkdepends: depend_list(&seed.checkdepends),
            makedepends: depend_list(&seed.makedepends),
            conflicts: depend_list(&seed.conflicts),
            provides: depend_list(&seed.provides),
            replaces: depend_list(&seed.replaces),
            backup,
            files,
        }
    }

    pub(crate) fn from_raw<'a>(pkg: *mut alpm_pkg_t) -> Option<&'a mut EmuPkg> {
        // Safety: every package pointer handed out is a leaked `Box<EmuPkg>`.
        unsafe { pkg.cast::<EmuPkg>().as_mut() }
    }

    #[allow(clippy::mut_from_ref)]
    pub(crate) fn db(&self) -> &mut EmuDb {
        // Safety: packages never outlive their database.
        unsafe { &mut *self.db }
    }
}

impl Drop for EmuPkg {
    fn drop(&mut self) {
        // Safety: the package exclusively owns these allocations.
        unsafe {
            free_string_list(self.licenses);
            free_string_list(self.groups);
            for list in [
                self.depends,
                self.optdepends,
                self.checkdepends,
                self.makedepends,
                self.conflicts,
                self.provides,
                self.replaces,
            ] {
                free_depend_list(list);
            }
            for entry in payloads(self.backup) {
                let entry = entry.cast::<alpm_backup_t>();
                free_str((*entry).name);
                free_str((*entry).hash);
                libc::free(entry.cast());
            }
            alpm_list_free(self.backup);
            for i in 0..self.files.count {
                free_str((*self.files.files.add(i)).name);
            }
            if !self.files.files.is_null() {
                libc::free(self.files.files.cast());
            }
        }
    }
}

/// sdbm string hash, as used for `name_hash`.
pub(crate) fn sdbm(s: &str) -> c_ulong {
    s.bytes().fold(0 as c_ulong, |hash, c| {
        c_ulong::from(c)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash)
    })
}

/// Parses `name[op version][: description]` into a C-allocated record.
pub(crate) fn parse_depend(depstring: &str) -> *mut alpm_depend_t {
    let (head, desc) = match depstring.split_once(": ") {
        Some((head, desc)) => (head, Some(desc)),
        None => (depstring, None),
    };

    let (name, modifier, version) = match head.find(['<', '>', '=']) {
        Some(at) => {
            let rest = &head[at..];
            let (modifier, skip) = if rest.starts_with(">=") {
                (ALPM_DEP_MOD_GE, 2)
            } else if rest.starts_with("<=") {
                (ALPM_DEP_MOD_LE, 2)
            } else if rest.starts_with('=') {
                (ALPM_DEP_MOD_EQ, 1)
            } else if rest.starts_with('<') {
                (ALPM_DEP_MOD_LT, 1)
            } else {
                (ALPM_DEP_MOD_GT, 1)
            };
            (&head[..at], modifier, Some(&rest[skip..]))
        }
        None => (head, ALPM_DEP_MOD_ANY, None),
    };

    // Safety: calloc result is checked before use.
    unsafe {
        let dep = libc::calloc(1, std::mem::size_of::<alpm_depend_t>()).cast::<alpm_depend_t>();
        if dep.is_null() {
            return dep;
        }
        (*dep).name = dup_str(name);
        (*dep).version = dup_opt(version);
        (*dep).desc = dup_opt(desc);
        (*dep).name_hash = sdbm(name);
        (*dep).mod_ = modifier;
        dep
    }
}

pub(crate) unsafe fn free_depend(dep: *mut alpm_depend_t) {
    if dep.is_null() {
        return;
    }
    free_str((*dep).name);
    free_str((*dep).version);
    free_str((*dep).desc);
    libc::free(dep.cast());
}
