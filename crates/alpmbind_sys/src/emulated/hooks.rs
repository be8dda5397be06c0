//! Native-side events: log lines and questions.
//!
//! libalpm emits these from inside long-running operations. The
//! emulation emits them on demand so callers can drive the armed
//! callbacks exactly as the system library would.

use std::ffi::{c_char, c_int, CStr, CString};

use super::state::EmuHandle;
use crate::consts::*;
use crate::types::*;

/// Renders the arguments handed to the log callback.
///
/// The emulation always logs with the format `"%s"` and passes a pointer
/// to the finished message as the argument block.
///
/// # Safety
///
/// `fmt` and `args` must be the pair received by the log callback.
pub unsafe fn render_log_message(fmt: *const c_char, args: va_list) -> String {
    if fmt.is_null() {
        return String::new();
    }
    let fmt = CStr::from_ptr(fmt).to_string_lossy();
    if args.is_null() {
        return fmt.into_owned();
    }
    let arg = CStr::from_ptr(args.cast::<c_char>()).to_string_lossy();
    fmt.replacen("%s", &arg, 1)
}

/// Sends one log line through the handle's log callback.
///
/// Returns false if no callback is armed.
///
/// # Safety
///
/// `handle` must be a live handle.
pub unsafe fn emit_log(handle: *mut alpm_handle_t, level: alpm_loglevel_t, message: &str) -> bool {
    let Some(cb) = EmuHandle::from_raw(handle).and_then(|h| h.logcb) else {
        return false;
    };
    let message = CString::new(message.replace('\0', "")).unwrap_or_default();
    cb(level, c"%s".as_ptr(), message.as_ptr().cast_mut().cast());
    true
}

unsafe fn ask(handle: *mut alpm_handle_t, question: &mut alpm_question_t) -> bool {
    let Some(cb) = EmuHandle::from_raw(handle).and_then(|h| h.questioncb) else {
        return false;
    };
    cb(question as *mut alpm_question_t);
    true
}

/// Asks a question that only carries the generic answer field.
///
/// Returns the answer left in the record; zero if no callback is armed.
///
/// # Safety
///
/// `handle` must be a live handle.
pub unsafe fn ask_generic(handle: *mut alpm_handle_t, type_: alpm_question_type_t) -> c_int {
    let mut question = alpm_question_t {
        any: alpm_question_any_t { type_, answer: 0 },
    };
    ask(handle, &mut question);
    question.any.answer
}

/// Asks whether an ignored package should be installed anyway.
///
/// # Safety
///
/// `handle` and `pkg` must be live.
pub unsafe fn ask_install_ignorepkg(handle: *mut alpm_handle_t, pkg: *mut alpm_pkg_t) -> bool {
    let mut question = alpm_question_t {
        install_ignorepkg: alpm_question_install_ignorepkg_t {
            type_: ALPM_QUESTION_INSTALL_IGNOREPKG,
            install: 0,
            pkg,
        },
    };
    ask(handle, &mut question);
    question.install_ignorepkg.install != 0
}

/// Asks whether `oldpkg` should be replaced by `newpkg` from `newdb`.
///
/// # Safety
///
/// All pointers must be live.
pub unsafe fn ask_replace(
    handle: *mut alpm_handle_t,
    oldpkg: *mut alpm_pkg_t,
    newpkg: *mut alpm_pkg_t,
    newdb: *mut alpm_db_t,
) -> bool {
    let mut question = alpm_question_t {
        replace: alpm_question_replace_t {
            type_: ALPM_QUESTION_REPLACE_PKG,
            replace: 0,
            oldpkg,
            newpkg,
            newdb,
        },
    };
    ask(handle, &mut question);
    question.replace.replace != 0
}

/// Asks which of `providers` should satisfy `depstring`.
///
/// Returns the chosen index (zero when unanswered).
///
/// # Safety
///
/// `handle` must be live; `providers` must be a live package list.
pub unsafe fn ask_select_provider(
    handle: *mut alpm_handle_t,
    providers: *mut alpm_list_t,
    depstring: &str,
) -> c_int {
    let depend = super::state::parse_depend(depstring);
    let mut question = alpm_question_t {
        select_provider: alpm_question_select_provider_t {
            type_: ALPM_QUESTION_SELECT_PROVIDER,
            use_index: 0,
            providers,
            depend,
        },
    };
    ask(handle, &mut question);
    let index = question.select_provider.use_index;
    super::state::free_depend(depend);
    index
}

/// Asks whether a corrupted package file should be removed.
///
/// # Safety
///
/// `handle` must be live.
pub unsafe fn ask_corrupted(handle: *mut alpm_handle_t, filepath: &str) -> bool {
    let filepath = CString::new(filepath.replace('\0', "")).unwrap_or_default();
    let mut question = alpm_question_t {
        corrupted: alpm_question_corrupted_t {
            type_: ALPM_QUESTION_CORRUPTED_PKG,
            remove: 0,
            filepath: filepath.as_ptr(),
            reason: ALPM_ERR_PKG_INVALID,
        },
    };
    ask(handle, &mut question);
    question.corrupted.remove != 0
}

