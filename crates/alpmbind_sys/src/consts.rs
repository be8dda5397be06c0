//! Enumeration values from `alpm.h` (ABI 12).

#![allow(missing_docs)]

use std::ffi::c_int;

use crate::types::*;

pub const ALPM_ERR_OK: alpm_errno_t = 0;
pub const ALPM_ERR_MEMORY: alpm_errno_t = 1;
pub const ALPM_ERR_SYSTEM: alpm_errno_t = 2;
pub const ALPM_ERR_BADPERMS: alpm_errno_t = 3;
pub const ALPM_ERR_NOT_A_FILE: alpm_errno_t = 4;
pub const ALPM_ERR_NOT_A_DIR: alpm_errno_t = 5;
pub const ALPM_ERR_WRONG_ARGS: alpm_errno_t = 6;
pub const ALPM_ERR_DISK_SPACE: alpm_errno_t = 7;
pub const ALPM_ERR_HANDLE_NULL: alpm_errno_t = 8;
pub const ALPM_ERR_HANDLE_NOT_NULL: alpm_errno_t = 9;
pub const ALPM_ERR_HANDLE_LOCK: alpm_errno_t = 10;
pub const ALPM_ERR_DB_OPEN: alpm_errno_t = 11;
pub const ALPM_ERR_DB_CREATE: alpm_errno_t = 12;
pub const ALPM_ERR_DB_NULL: alpm_errno_t = 13;
pub const ALPM_ERR_DB_NOT_NULL: alpm_errno_t = 14;
pub const ALPM_ERR_DB_NOT_FOUND: alpm_errno_t = 15;
pub const ALPM_ERR_DB_INVALID: alpm_errno_t = 16;
pub const ALPM_ERR_DB_INVALID_SIG: alpm_errno_t = 17;
pub const ALPM_ERR_DB_VERSION: alpm_errno_t = 18;
pub const ALPM_ERR_DB_WRITE: alpm_errno_t = 19;
pub const ALPM_ERR_DB_REMOVE: alpm_errno_t = 20;
pub const ALPM_ERR_SERVER_BAD_URL: alpm_errno_t = 21;
pub const ALPM_ERR_SERVER_NONE: alpm_errno_t = 22;
pub const ALPM_ERR_TRANS_NOT_NULL: alpm_errno_t = 23;
pub const ALPM_ERR_TRANS_NULL: alpm_errno_t = 24;
pub const ALPM_ERR_TRANS_DUP_TARGET: alpm_errno_t = 25;
pub const ALPM_ERR_TRANS_NOT_INITIALIZED: alpm_errno_t = 26;
pub const ALPM_ERR_TRANS_NOT_PREPARED: alpm_errno_t = 27;
pub const ALPM_ERR_TRANS_ABORT: alpm_errno_t = 28;
pub const ALPM_ERR_TRANS_TYPE: alpm_errno_t = 29;
pub const ALPM_ERR_TRANS_NOT_LOCKED: alpm_errno_t = 30;
pub const ALPM_ERR_TRANS_HOOK_FAILED: alpm_errno_t = 31;
pub const ALPM_ERR_PKG_NOT_FOUND: alpm_errno_t = 32;
pub const ALPM_ERR_PKG_IGNORED: alpm_errno_t = 33;
pub const ALPM_ERR_PKG_INVALID: alpm_errno_t = 34;

pub const ALPM_LOG_ERROR: alpm_loglevel_t = 1;
pub const ALPM_LOG_WARNING: alpm_loglevel_t = 1 << 1;
pub const ALPM_LOG_DEBUG: alpm_loglevel_t = 1 << 2;
pub const ALPM_LOG_FUNCTION: alpm_loglevel_t = 1 << 3;

pub const ALPM_QUESTION_INSTALL_IGNOREPKG: alpm_question_type_t = 1;
pub const ALPM_QUESTION_REPLACE_PKG: alpm_question_type_t = 1 << 1;
pub const ALPM_QUESTION_CONFLICT_PKG: alpm_question_type_t = 1 << 2;
pub const ALPM_QUESTION_CORRUPTED_PKG: alpm_question_type_t = 1 << 3;
pub const ALPM_QUESTION_REMOVE_PKGS: alpm_question_type_t = 1 << 4;
pub const ALPM_QUESTION_SELECT_PROVIDER: alpm_question_type_t = 1 << 5;
pub const ALPM_QUESTION_IMPORT_KEY: alpm_question_type_t = 1 << 6;

pub const ALPM_PKG_REASON_EXPLICIT: alpm_pkgreason_t = 0;
pub const ALPM_PKG_REASON_DEPEND: alpm_pkgreason_t = 1;

pub const ALPM_PKG_FROM_FILE: alpm_pkgfrom_t = 1;
pub const ALPM_PKG_FROM_LOCALDB: alpm_pkgfrom_t = 2;
pub const ALPM_PKG_FROM_SYNCDB: alpm_pkgfrom_t = 3;

pub const ALPM_DEP_MOD_ANY: alpm_depmod_t = 1;
pub const ALPM_DEP_MOD_EQ: alpm_depmod_t = 2;
pub const ALPM_DEP_MOD_GE: alpm_depmod_t = 3;
pub const ALPM_DEP_MOD_LE: alpm_depmod_t = 4;
pub const ALPM_DEP_MOD_GT: alpm_depmod_t = 5;
pub const ALPM_DEP_MOD_LT: alpm_depmod_t = 6;

pub const ALPM_PKG_VALIDATION_UNKNOWN: c_int = 0;
pub const ALPM_PKG_VALIDATION_NONE: c_int = 1;
pub const ALPM_PKG_VALIDATION_MD5SUM: c_int = 1 << 1;
pub const ALPM_PKG_VALIDATION_SHA256SUM: c_int = 1 << 2;
pub const ALPM_PKG_VALIDATION_SIGNATURE: c_int = 1 << 3;

pub const ALPM_SIG_PACKAGE: c_int = 1;
pub const ALPM_SIG_PACKAGE_OPTIONAL: c_int = 1 << 1;
pub const ALPM_SIG_PACKAGE_MARGINAL_OK: c_int = 1 << 2;
pub const ALPM_SIG_PACKAGE_UNKNOWN_OK: c_int = 1 << 3;
pub const ALPM_SIG_DATABASE: c_int = 1 << 10;
pub const ALPM_SIG_DATABASE_OPTIONAL: c_int = 1 << 11;
pub const ALPM_SIG_DATABASE_MARGINAL_OK: c_int = 1 << 12;
pub const ALPM_SIG_DATABASE_UNKNOWN_OK: c_int = 1 << 13;
pub const ALPM_SIG_USE_DEFAULT: c_int = 1 << 30;

pub const ALPM_DB_USAGE_SYNC: c_int = 1;
pub const ALPM_DB_USAGE_SEARCH: c_int = 1 << 1;
pub const ALPM_DB_USAGE_INSTALL: c_int = 1 << 2;
pub const ALPM_DB_USAGE_UPGRADE: c_int = 1 << 3;
pub const ALPM_DB_USAGE_ALL: c_int = (1 << 4) - 1;
