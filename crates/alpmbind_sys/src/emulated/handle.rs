//! Handle, option and database entry points.

use std::ffi::{c_char, c_int, CStr};
use std::path::PathBuf;
use std::ptr;

use super::list::{alpm_list_add, alpm_list_free, dup_str, free_string_list, payloads};
use super::seed::{seeded, LOCAL_DB_NAME};
use super::state::{EmuDb, EmuHandle, EmuPkg};
use crate::consts::*;
use crate::types::*;

fn is_dir(path: &CStr) -> bool {
    path.to_str()
        .map(|p| std::path::Path::new(p).is_dir())
        .unwrap_or(false)
}

pub unsafe extern "C" fn alpm_initialize(
    root: *const c_char,
    dbpath: *const c_char,
    err: *mut alpm_errno_t,
) -> *mut alpm_handle_t {
    let report = |code: alpm_errno_t| {
        if !err.is_null() {
            *err = code;
        }
        ptr::null_mut()
    };

    if root.is_null() || dbpath.is_null() {
        return report(ALPM_ERR_WRONG_ARGS);
    }
    let (root, dbpath) = (CStr::from_ptr(root), CStr::from_ptr(dbpath));
    if !is_dir(root) || !is_dir(dbpath) {
        return report(ALPM_ERR_NOT_A_DIR);
    }

    let dbpath_buf = PathBuf::from(dbpath.to_string_lossy().into_owned());
    let handle = Box::into_raw(Box::new(EmuHandle {
        root: root.to_owned(),
        dbpath: dbpath.to_owned(),
        dbpath_buf,
        errno: ALPM_ERR_OK,
        localdb: ptr::null_mut(),
        syncdbs: ptr::null_mut(),
        ignorepkgs: ptr::null_mut(),
        logcb: None,
        questioncb: None,
    }));

    let local = seeded(&(*handle).dbpath_buf, LOCAL_DB_NAME).unwrap_or_default();
    (*handle).localdb = EmuDb::create(handle, LOCAL_DB_NAME, 0, local, ALPM_PKG_FROM_LOCALDB);

    if !err.is_null() {
        *err = ALPM_ERR_OK;
    }
    handle.cast()
}

pub unsafe extern "C" fn alpm_release(handle: *mut alpm_handle_t) -> c_int {
    if handle.is_null() {
        return -1;
    }
    drop(Box::from_raw(handle.cast::<EmuHandle>()));
    0
}

pub unsafe extern "C" fn alpm_errno(handle: *mut alpm_handle_t) -> alpm_errno_t {
    EmuHandle::from_raw(handle).map_or(ALPM_ERR_HANDLE_NULL, |h| h.errno)
}

pub unsafe extern "C" fn alpm_strerror(err: alpm_errno_t) -> *const c_char {
    let message: &'static CStr = match err {
        ALPM_ERR_OK => c"no error",
        ALPM_ERR_MEMORY => c"out of memory!",
        ALPM_ERR_SYSTEM => c"unexpected system error",
        ALPM_ERR_NOT_A_DIR => c"could not find or read directory",
        ALPM_ERR_WRONG_ARGS => c"wrong or NULL argument passed",
        ALPM_ERR_HANDLE_NULL => c"library not initialized",
        ALPM_ERR_DB_NULL => c"database is incorrect",
        ALPM_ERR_DB_NOT_NULL => c"database already registered",
        ALPM_ERR_DB_NOT_FOUND => c"could not find database",
        ALPM_ERR_SERVER_BAD_URL => c"invalid url for server",
        ALPM_ERR_PKG_NOT_FOUND => c"could not find or read package",
        ALPM_ERR_PKG_IGNORED => c"operation cancelled due to ignorepkg",
        _ => c"unexpected error",
    };
    message.as_ptr()
}

pub unsafe extern "C" fn alpm_version() -> *const c_char {
    c"12.0.2".as_ptr()
}

pub unsafe extern "C" fn alpm_option_get_root(handle: *mut alpm_handle_t) -> *const c_char {
    EmuHandle::from_raw(handle).map_or(ptr::null(), |h| h.root.as_ptr())
}

pub unsafe extern "C" fn alpm_option_get_dbpath(handle: *mut alpm_handle_t) -> *const c_char {
    EmuHandle::from_raw(handle).map_or(ptr::null(), |h| h.dbpath.as_ptr())
}

pub unsafe extern "C" fn alpm_option_set_logcb(handle: *mut alpm_handle_t, cb: alpm_cb_log) -> c_int {
    match EmuHandle::from_raw(handle) {
        Some(h) => {
            h.logcb = cb;
            0
        }
        None => -1,
    }
}

pub unsafe extern "C" fn alpm_option_set_questioncb(
    handle: *mut alpm_handle_t,
    cb: alpm_cb_question,
) -> c_int {
    match EmuHandle::from_raw(handle) {
        Some(h) => {
            h.questioncb = cb;
            0
        }
        None => -1,
    }
}

pub unsafe extern "C" fn alpm_option_get_ignorepkgs(handle: *mut alpm_handle_t) -> *mut alpm_list_t {
    EmuHandle::from_raw(handle).map_or(ptr::null_mut(), |h| h.ignorepkgs)
}

pub unsafe extern "C" fn alpm_option_add_ignorepkg(handle: *mut alpm_handle_t, pkg: *const c_char) -> c_int {
    let Some(h) = EmuHandle::from_raw(handle) else {
        return -1;
    };
    if pkg.is_null() {
        return h.fail(ALPM_ERR_WRONG_ARGS, -1);
    }
    h.ignorepkgs = alpm_list_add(h.ignorepkgs, libc::strdup(pkg).cast());
    0
}

pub unsafe extern "C" fn alpm_get_localdb(handle: *mut alpm_handle_t) -> *mut alpm_db_t {
    EmuHandle::from_raw(handle).map_or(ptr::null_mut(), |h| h.localdb.cast())
}

pub unsafe extern "C" fn alpm_get_syncdbs(handle: *mut alpm_handle_t) -> *mut alpm_list_t {
    EmuHandle::from_raw(handle).map_or(ptr::null_mut(), |h| h.syncdbs)
}

pub unsafe extern "C" fn alpm_register_syncdb(
    handle: *mut alpm_handle_t,
    treename: *const c_char,
    level: c_int,
) -> *mut alpm_db_t {
    let Some(h) = EmuHandle::from_raw(handle) else {
        return ptr::null_mut();
    };
    if treename.is_null() {
        return h.fail(ALPM_ERR_WRONG_ARGS, ptr::null_mut());
    }
    let name = CStr::from_ptr(treename).to_string_lossy().into_owned();
    if name.is_empty() || name == LOCAL_DB_NAME {
        return h.fail(ALPM_ERR_WRONG_ARGS, ptr::null_mut());
    }
    let taken = payloads(h.syncdbs)
        .into_iter()
        .filter_map(|db| EmuDb::from_raw(db.cast()))
        .any(|db| db.name.as_bytes() == name.as_bytes());
    if taken {
        return h.fail(ALPM_ERR_DB_NOT_NULL, ptr::null_mut());
    }

    let seeds = seeded(&h.dbpath_buf, &name).unwrap_or_default();
    let db = EmuDb::create(h, &name, level, seeds, ALPM_PKG_FROM_SYNCDB);
    h.syncdbs = alpm_list_add(h.syncdbs, db.cast());
    db.cast()
}

pub unsafe extern "C" fn alpm_unregister_all_syncdbs(handle: *mut alpm_handle_t) -> c_int {
    let Some(h) = EmuHandle::from_raw(handle) else {
        return -1;
    };
    for db in payloads(h.syncdbs) {
        drop(Box::from_raw(db.cast::<EmuDb>()));
    }
    alpm_list_free(h.syncdbs);
    h.syncdbs = ptr::null_mut();
    0
}

pub unsafe extern "C" fn alpm_db_unregister(db: *mut alpm_db_t) -> c_int {
    let Some(target) = EmuDb::from_raw(db) else {
        return -1;
    };
    let h = target.handle();
    if db.cast::<EmuDb>() == h.localdb {
        return h.fail(ALPM_ERR_WRONG_ARGS, -1);
    }

    let mut kept = ptr::null_mut();
    let mut found = false;
    for entry in payloads(h.syncdbs) {
        if entry == db.cast() {
            found = true;
        } else {
            kept = alpm_list_add(kept, entry);
        }
    }
    if !found {
        alpm_list_free(kept);
        return h.fail(ALPM_ERR_DB_NOT_FOUND, -1);
    }
    alpm_list_free(h.syncdbs);
    h.syncdbs = kept;
    drop(Box::from_raw(db.cast::<EmuDb>()));
    0
}

pub unsafe extern "C" fn alpm_db_get_name(db: *const alpm_db_t) -> *const c_char {
    EmuDb::from_raw(db).map_or(ptr::null(), |db| db.name.as_ptr())
}

pub unsafe extern "C" fn alpm_db_get_siglevel(db: *mut alpm_db_t) -> c_int {
    EmuDb::from_raw(db).map_or(0, |db| db.siglevel)
}

pub unsafe extern "C" fn alpm_db_get_servers(db: *const alpm_db_t) -> *mut alpm_list_t {
    EmuDb::from_raw(db).map_or(ptr::null_mut(), |db| db.servers)
}

pub unsafe extern "C" fn alpm_db_set_servers(db: *mut alpm_db_t, servers: *mut alpm_list_t) -> c_int {
    let Some(db) = EmuDb::from_raw(db) else {
        return -1;
    };
    free_string_list(db.servers);
    db.servers = servers;
    0
}

pub unsafe extern "C" fn alpm_db_add_server(db: *mut alpm_db_t, url: *const c_char) -> c_int {
    let Some(db) = EmuDb::from_raw(db) else {
        return -1;
    };
    if url.is_null() {
        return db.handle().fail(ALPM_ERR_WRONG_ARGS, -1);
    }
    let url = CStr::from_ptr(url).to_string_lossy();
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() {
        return db.handle().fail(ALPM_ERR_SERVER_BAD_URL, -1);
    }
    db.servers = alpm_list_add(db.servers, dup_str(trimmed).cast());
    0
}

pub unsafe extern "C" fn alpm_db_get_pkg(db: *mut alpm_db_t, name: *const c_char) -> *mut alpm_pkg_t {
    let Some(db) = EmuDb::from_raw(db) else {
        return ptr::null_mut();
    };
    if name.is_null() || *name == 0 {
        return db.handle().fail(ALPM_ERR_WRONG_ARGS, ptr::null_mut());
    }
    let wanted = CStr::from_ptr(name);
    let found = db
        .packages()
        .into_iter()
        .find(|&pkg| (*pkg).name.as_c_str() == wanted);
    match found {
        Some(pkg) => pkg.cast(),
        None => db.handle().fail(ALPM_ERR_PKG_NOT_FOUND, ptr::null_mut()),
    }
}

pub unsafe extern "C" fn alpm_db_get_pkgcache(db: *mut alpm_db_t) -> *mut alpm_list_t {
    EmuDb::from_raw(db).map_or(ptr::null_mut(), |db| db.pkgcache)
}

/// Matches packages whose name or description contains every needle,
/// ignoring case. The returned spine belongs to the caller.
pub unsafe extern "C" fn alpm_db_search(db: *mut alpm_db_t, needles: *const alpm_list_t) -> *mut alpm_list_t {
    let Some(db) = EmuDb::from_raw(db) else {
        return ptr::null_mut();
    };
    if needles.is_null() {
        return ptr::null_mut();
    }
    let needles: Vec<String> = payloads(needles)
        .into_iter()
        .map(|p| CStr::from_ptr(p.cast()).to_string_lossy().to_lowercase())
        .collect();

    let mut found = ptr::null_mut();
    for pkg in db.packages() {
        let name = (*pkg).name.to_string_lossy().to_lowercase();
        let desc = (*pkg)
            .desc
            .as_ref()
            .map(|d| d.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if needles.iter().all(|n| name.contains(n.as_str()) || desc.contains(n.as_str())) {
            found = alpm_list_add(found, pkg.cast());
        }
    }
    found
}

pub unsafe extern "C" fn alpm_db_set_usage(db: *mut alpm_db_t, usage: c_int) -> c_int {
    match EmuDb::from_raw(db) {
        Some(db) => {
            db.usage = usage;
            0
        }
        None => -1,
    }
}

pub unsafe extern "C" fn alpm_db_get_usage(db: *mut alpm_db_t, usage: *mut c_int) -> c_int {
    let Some(db) = EmuDb::from_raw(db) else {
        return -1;
    };
    if usage.is_null() {
        return db.handle().fail(ALPM_ERR_WRONG_ARGS, -1);
    }
    *usage = db.usage;
    0
}

pub unsafe extern "C" fn alpm_pkg_should_ignore(handle: *mut alpm_handle_t, pkg: *mut alpm_pkg_t) -> c_int {
    let (Some(h), Some(pkg)) = (EmuHandle::from_raw(handle), EmuPkg::from_raw(pkg)) else {
        return 0;
    };
    let ignored = payloads(h.ignorepkgs)
        .into_iter()
        .any(|name| CStr::from_ptr(name.cast()) == pkg.name.as_c_str());
    c_int::from(ignored)
}

