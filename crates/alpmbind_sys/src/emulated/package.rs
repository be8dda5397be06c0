//! Package and dependency entry points.

use std::ffi::{c_char, c_int, CStr};
use std::ptr;

use super::list::{alpm_list_add, cmp_cstr, dup_str, payloads};
use super::state::{free_depend, opt_ptr, parse_depend, EmuPkg};
use crate::consts::*;
use crate::types::*;

macro_rules! string_getter {
    ($($fn:ident => $field:ident),* $(,)?) => {
        $(
            pub unsafe extern "C" fn $fn(pkg: *mut alpm_pkg_t) -> *const c_char {
                EmuPkg::from_raw(pkg).map_or(ptr::null(), |p| opt_ptr(&p.$field))
            }
        )*
    };
}

macro_rules! list_getter {
    ($($fn:ident => $field:ident),* $(,)?) => {
        $(
            pub unsafe extern "C" fn $fn(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t {
                EmuPkg::from_raw(pkg).map_or(ptr::null_mut(), |p| p.$field)
            }
        )*
    };
}

macro_rules! value_getter {
    ($($fn:ident => $field:ident: $ty:ty),* $(,)?) => {
        $(
            pub unsafe extern "C" fn $fn(pkg: *mut alpm_pkg_t) -> $ty {
                EmuPkg::from_raw(pkg).map_or(0, |p| p.$field)
            }
        )*
    };
}

string_getter! {
    alpm_pkg_get_filename => filename,
    alpm_pkg_get_base => base,
    alpm_pkg_get_desc => desc,
    alpm_pkg_get_url => url,
    alpm_pkg_get_packager => packager,
    alpm_pkg_get_md5sum => md5sum,
    alpm_pkg_get_sha256sum => sha256sum,
    alpm_pkg_get_arch => arch,
    alpm_pkg_get_base64_sig => base64_sig,
}

list_getter! {
    alpm_pkg_get_licenses => licenses,
    alpm_pkg_get_groups => groups,
    alpm_pkg_get_depends => depends,
    alpm_pkg_get_optdepends => optdepends,
    alpm_pkg_get_checkdepends => checkdepends,
    alpm_pkg_get_makedepends => makedepends,
    alpm_pkg_get_conflicts => conflicts,
    alpm_pkg_get_provides => provides,
    alpm_pkg_get_replaces => replaces,
    alpm_pkg_get_backup => backup,
}

value_getter! {
    alpm_pkg_get_origin => origin: alpm_pkgfrom_t,
    alpm_pkg_get_builddate => builddate: alpm_time_t,
    alpm_pkg_get_installdate => installdate: alpm_time_t,
    alpm_pkg_get_size => size: off_t,
    alpm_pkg_get_isize => isize: off_t,
    alpm_pkg_get_reason => reason: alpm_pkgreason_t,
    alpm_pkg_get_validation => validation: c_int,
}

pub unsafe extern "C" fn alpm_pkg_get_name(pkg: *mut alpm_pkg_t) -> *const c_char {
    EmuPkg::from_raw(pkg).map_or(ptr::null(), |p| p.name.as_ptr())
}

pub unsafe extern "C" fn alpm_pkg_get_version(pkg: *mut alpm_pkg_t) -> *const c_char {
    EmuPkg::from_raw(pkg).map_or(ptr::null(), |p| p.version.as_ptr())
}

pub unsafe extern "C" fn alpm_pkg_get_files(pkg: *mut alpm_pkg_t) -> *mut alpm_filelist_t {
    EmuPkg::from_raw(pkg).map_or(ptr::null_mut(), |p| &mut p.files as *mut alpm_filelist_t)
}

pub unsafe extern "C" fn alpm_pkg_get_db(pkg: *mut alpm_pkg_t) -> *mut alpm_db_t {
    EmuPkg::from_raw(pkg).map_or(ptr::null_mut(), |p| p.db.cast())
}

pub unsafe extern "C" fn alpm_pkg_get_handle(pkg: *mut alpm_pkg_t) -> *mut alpm_handle_t {
    match EmuPkg::from_raw(pkg) {
        Some(p) if !p.db.is_null() => (*p.db).handle.cast(),
        _ => ptr::null_mut(),
    }
}

/// Names of the packages in the same database whose `field` lists
/// `pkg` by name or by one of its provisions, sorted by name.
unsafe fn reverse_deps(pkg: *mut alpm_pkg_t, field: fn(&EmuPkg) -> *mut alpm_list_t) -> *mut alpm_list_t {
    let Some(target) = EmuPkg::from_raw(pkg) else {
        return ptr::null_mut();
    };
    let mut satisfies: Vec<&CStr> = vec![target.name.as_c_str()];
    for provision in payloads(target.provides) {
        satisfies.push(CStr::from_ptr((*provision.cast::<alpm_depend_t>()).name));
    }

    let mut names: Vec<*const c_char> = Vec::new();
    for candidate in target.db().packages() {
        if candidate == pkg.cast() {
            continue;
        }
        let wants = payloads(field(&*candidate)).into_iter().any(|dep| {
            let name = CStr::from_ptr((*dep.cast::<alpm_depend_t>()).name);
            satisfies.contains(&name)
        });
        if wants {
            names.push((*candidate).name.as_ptr());
        }
    }
    names.sort_by(|a, b| cmp_cstr(*a, *b));

    let mut out = ptr::null_mut();
    for name in names {
        out = alpm_list_add(out, libc::strdup(name).cast());
    }
    out
}

pub unsafe extern "C" fn alpm_pkg_compute_requiredby(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t {
    reverse_deps(pkg, |p| p.depends)
}

pub unsafe extern "C" fn alpm_pkg_compute_optionalfor(pkg: *mut alpm_pkg_t) -> *mut alpm_list_t {
    reverse_deps(pkg, |p| p.optdepends)
}

pub unsafe extern "C" fn alpm_dep_from_string(depstring: *const c_char) -> *mut alpm_depend_t {
    if depstring.is_null() {
        return ptr::null_mut();
    }
    parse_depend(&CStr::from_ptr(depstring).to_string_lossy())
}

pub unsafe extern "C" fn alpm_dep_compute_string(dep: *const alpm_depend_t) -> *mut c_char {
    if dep.is_null() {
        return ptr::null_mut();
    }
    let text = |p: *const c_char| {
        if p.is_null() {
            String::new()
        } else {
            CStr::from_ptr(p).to_string_lossy().into_owned()
        }
    };
    let dep = &*dep;
    let (opr, version) = match dep.mod_ {
        ALPM_DEP_MOD_GE => (">=", text(dep.version)),
        ALPM_DEP_MOD_LE => ("<=", text(dep.version)),
        ALPM_DEP_MOD_EQ => ("=", text(dep.version)),
        ALPM_DEP_MOD_LT => ("<", text(dep.version)),
        ALPM_DEP_MOD_GT => (">", text(dep.version)),
        _ => ("", String::new()),
    };
    let mut out = format!("{}{}{}", text(dep.name), opr, version);
    if !dep.desc.is_null() {
        out.push_str(": ");
        out.push_str(&text(dep.desc));
    }
    dup_str(&out)
}

pub unsafe extern "C" fn alpm_dep_free(dep: *mut alpm_depend_t) {
    free_depend(dep);
}
