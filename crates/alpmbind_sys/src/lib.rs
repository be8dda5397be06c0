//! # alpmbind sys
//!
//! Raw libalpm ABI for the alpmbind bindings.
//!
//! This crate provides:
//! - `#[repr(C)]` layouts of every structure the bindings read or write
//! - Enumeration constants
//! - Callback and comparator signatures
//! - The entry points, either linked from the system library (`system`
//!   feature) or implemented in-process (`emulated` feature, default)
//!
//! Nothing here is safe to call without upholding the libalpm contracts;
//! the `alpmbind` crate is the safe layer.

#![warn(missing_docs)]
#![allow(clippy::missing_safety_doc)]

mod consts;
mod types;

pub use consts::*;
pub use types::*;

#[cfg(feature = "system")]
#[allow(missing_docs)]
mod system;
#[cfg(feature = "system")]
pub use system::*;

#[cfg(all(feature = "emulated", not(feature = "system")))]
#[allow(missing_docs)]
pub mod emulated;
#[cfg(all(feature = "emulated", not(feature = "system")))]
pub use emulated::{
    alpm_db_add_server, alpm_db_get_name, alpm_db_get_pkg, alpm_db_get_pkgcache,
    alpm_db_get_servers, alpm_db_get_siglevel, alpm_db_get_usage, alpm_db_search,
    alpm_db_set_servers, alpm_db_set_usage, alpm_db_unregister, alpm_dep_compute_string,
    alpm_dep_free, alpm_dep_from_string, alpm_errno, alpm_get_localdb, alpm_get_syncdbs,
    alpm_initialize, alpm_list_add, alpm_list_copy, alpm_list_count, alpm_list_free,
    alpm_list_free_inner, alpm_list_msort, alpm_option_add_ignorepkg,
    alpm_option_get_dbpath, alpm_option_get_ignorepkgs, alpm_option_get_root,
    alpm_option_set_logcb, alpm_option_set_questioncb, alpm_pkg_compute_optionalfor,
    alpm_pkg_compute_requiredby, alpm_pkg_get_arch, alpm_pkg_get_backup, alpm_pkg_get_base,
    alpm_pkg_get_base64_sig, alpm_pkg_get_builddate, alpm_pkg_get_checkdepends,
    alpm_pkg_get_conflicts, alpm_pkg_get_db, alpm_pkg_get_depends, alpm_pkg_get_desc,
    alpm_pkg_get_filename, alpm_pkg_get_files, alpm_pkg_get_groups, alpm_pkg_get_handle,
    alpm_pkg_get_installdate, alpm_pkg_get_isize, alpm_pkg_get_licenses, alpm_pkg_get_makedepends,
    alpm_pkg_get_md5sum, alpm_pkg_get_name, alpm_pkg_get_optdepends, alpm_pkg_get_origin,
    alpm_pkg_get_packager, alpm_pkg_get_provides, alpm_pkg_get_reason,
    alpm_pkg_get_replaces, alpm_pkg_get_sha256sum, alpm_pkg_get_size, alpm_pkg_get_url,
    alpm_pkg_get_validation, alpm_pkg_get_version, alpm_pkg_should_ignore,
    alpm_register_syncdb, alpm_release, alpm_strerror, alpm_unregister_all_syncdbs,
    alpm_version, render_log_message,
};

#[cfg(not(any(feature = "system", feature = "emulated")))]
compile_error!("enable either the `system` or the `emulated` feature of alpmbind_sys");
