//! Entry points of the system libalpm.

use std::ffi::{c_char, c_int, c_void, CStr};

use crate::types::*;

#[link(name = "alpm")]
extern "C" {
    pub fn alpm_initialize(
        root: *const c_char,
        dbpath: *const c_char,
        err: *mut alpm_errno_t,
    ) -> *mut alpm_handle_t;
    pub fn alpm_release(handle: *mut alpm_handle_t) -> c_int;
    pub fn alpm_errno(handle: *mut alpm_handle_t) -> alpm_errno_t;
    pub fn alpm_strerror(err: alpm_errno_t) -> *const c_char;
    pub fn alpm_version() -> *const c_char;

    pub fn alpm_option_get_root(handle: *mut alpm_handle_t) -> *const c_char;
    pub fn alpm_option_get_dbpath(handle: *mut alpm_handle_t) -> *const c_char;
    pub fn alpm_option_set_logcb(handle: *mut alpm_handle_t, cb: alpm_cb_log) -> c_int;
    pub fn alpm_option_set_questioncb(handle: *mut alpm_handle_t, cb: alpm_cb_question) -> c_int;
    pub fn alpm_option_get_ignorepkgs(handle: *mut alpm_handle_t) -> *mut alpm_list_t;
    pub fn alpm_option_add_ignorepkg(handle: *mut alpm_handle_t, pkg: *const c_char) -> c_int;

    pub fn alpm_get_localdb(handle: *mut alpm_handle_t) -> *mut alpm_db_t;
    pub fn alpm_get_syncdbs(handle: *mut alpm_handle_t) -> *mut alpm_list_t;
    pub fn alpm_register_syncdb(
        handle: *mut alpm_handle_t,
        treename: *const c_char,
        level: c_int,
    ) -> *mut alpm_db_t;
    pub fn alpm_unregister_all_syncdbs(handle: *mut alpm_handle_t) -> c_int;
    pub fn alpm_db_unregister(db: *mut alpm_db_t) -> c_int;
    pub fn alpm_db_get_name(db: *const alpm_db_t) -> *const c_char;
    pub fn alpm_db_get_siglevel(db: *mut alpm_db_t) -> c_int;
    pub fn alpm_db_get_servers(db: *const alpm_db_t) -> *mut alpm_list_t;
    pub fn alpm_db_set_servers(db: *mut alpm_db_t, servers: *mut alpm_list_t) -> c_int;
    pub fn alpm_db_add_server(db: *mut alpm_db_t, url: *const c_char) -> c_int;
    pub fn alpm_db_get_pkg(db: *mut alpm_db_t, name: *const c_char) -> *mut alpm_pkg_t;
    pub fn alpm_db_get_pkgcache(db: *mut alpm_db_t) -> *mut alpm_list_t;
    pub fn alpm_db_search(db: *mut alpm_db_t, needles: *const alpm_list_t) -> *mut alpm_list_t;
    pub fn alpm_db_set_usage(db: *mut alpm_db_t, usage: c_int) -> c_int;
    pub fn alpm_db_get_usage(db: *mut alpm_db_t, usage: *mut c_int) -> c_int;

    pub fn alpm_pkg_get_filename(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_base(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_name(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_version(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_origin(pkg: *mut alpm_pkg_t) -> alpm_pkgfrom_t;
    pub fn alpm_pkg_get_desc(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_url(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_builddate(pkg: *mut alpm_pkg_t) -> alpm_time_t;
    pub fn alpm_pkg_get_installdate(pkg: *mut alpm_pkg_t) -> alpm_time_t;
    pub fn alpm_pkg_get_packager(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_md5sum(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_sha256sum(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_arch(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_size(pkg: *mut alpm_pkg_t) -> off_t;
    pub fn alpm_pkg_get_isize(pkg: *mut alpm_pkg_t) -> off_t;
    pub fn alpm_pkg_get_reason(pkg: *mut alpm_pkg_t) -> alpm_pkgreason_t;
    pub fn alpm_pkg_get_licenses(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_groups(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_depends(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_optdepends(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_checkdepends(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_makedepends(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_conflicts(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_provides(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_replaces(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_files(pkg: *mut alpm_pkg_t) -> *mut alpm_filelist_t;
    pub fn alpm_pkg_get_backup(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_get_db(pkg: *mut alpm_pkg_t) -> *mut alpm_db_t;
    pub fn alpm_pkg_get_handle(pkg: *mut alpm_pkg_t) -> *mut alpm_handle_t;
    pub fn alpm_pkg_get_base64_sig(pkg: *mut alpm_pkg_t) -> *const c_char;
    pub fn alpm_pkg_get_validation(pkg: *mut alpm_pkg_t) -> c_int;
    pub fn alpm_pkg_compute_requiredby(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_compute_optionalfor(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t;
    pub fn alpm_pkg_should_ignore(handle: *mut alpm_handle_t, pkg: *mut alpm_pkg_t) -> c_int;

    pub fn alpm_dep_from_string(depstring: *const c_char) -> *mut alpm_depend_t;
    pub fn alpm_dep_compute_string(dep: *const alpm_depend_t) -> *mut c_char;
    pub fn alpm_dep_free(dep: *mut alpm_depend_t);

    pub fn alpm_list_add(list: *mut alpm_list_t, data: *mut c_void) -> *mut alpm_list_t;
    pub fn alpm_list_copy(list: *const alpm_list_t) -> *mut alpm_list_t;
    pub fn alpm_list_count(list: *const alpm_list_t) -> usize;
    pub fn alpm_list_msort(
        list: *mut alpm_list_t,
        n: usize,
        fn_: alpm_list_fn_cmp,
    ) -> *mut alpm_list_t;
    pub fn alpm_list_free(list: *mut alpm_list_t);
    pub fn alpm_list_free_inner(list: *mut alpm_list_t, fn_: alpm_list_fn_free);
}

extern "C" {
    fn vasprintf(strp: *mut *mut c_char, fmt: *const c_char, ap: va_list) -> c_int;
}

/// Renders the printf-style arguments handed to the log callback.
///
/// # Safety
///
/// `fmt` and `args` must be the pair received by the log callback; `args`
/// is consumed and must not be used again.
pub unsafe fn render_log_message(fmt: *const c_char, args: va_list) -> String {
    if fmt.is_null() {
        return String::new();
    }
    let mut out: *mut c_char = std::ptr::null_mut();
    if vasprintf(&mut out, fmt, args) < 0 || out.is_null() {
        return CStr::from_ptr(fmt).to_string_lossy().into_owned();
    }
    let message = CStr::from_ptr(out).to_string_lossy().into_owned();
    libc::free(out.cast());
    message
}
