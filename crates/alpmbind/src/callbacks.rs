//! Callback bridge.
//!
//! libalpm 12 keeps one log callback and one question callback per handle
//! and passes no context pointer to either. The binding therefore keeps
//! the host closures in two process-wide slots and arms the handle with a
//! fixed trampoline. Registering a callback replaces whatever was in the
//! slot, for every handle in the process.
//!
//! Every handle has the log trampoline armed from the start. While the
//! log slot is empty, native lines go to [`default_log_callback`].
//!
//! The slots are locked only long enough to clone the closure out, so a
//! callback may register another callback without deadlocking. Concurrent
//! registration from several threads is a data race by contract: the
//! library itself must not be driven from more than one thread.

use std::ffi::{c_char, c_int};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use alpmbind_sys as sys;
use parking_lot::{Mutex, RwLock};

use crate::error::{self, Result};
use crate::handle::Handle;
use crate::question::QuestionAny;
use crate::types::LogLevel;

type LogCallback = dyn Fn(LogLevel, &str) + Send + Sync;
type QuestionCallback = dyn for<'q> Fn(QuestionAny<'q>) + Send + Sync;

static LOG_SLOT: RwLock<Option<Arc<LogCallback>>> = parking_lot::const_rwlock(None);
static QUESTION_SLOT: RwLock<Option<Arc<QuestionCallback>>> = parking_lot::const_rwlock(None);

/// Where [`default_log_callback`] writes; stderr when unset.
static DEFAULT_LOG_TARGET: Mutex<Option<Box<dyn Write + Send>>> = parking_lot::const_mutex(None);

static DEFAULT_LOG_LEVEL: AtomicI32 = AtomicI32::new(sys::ALPM_LOG_WARNING);

/// Returns the threshold of [`default_log_callback`].
pub fn default_log_level() -> LogLevel {
    LogLevel::try_from(DEFAULT_LOG_LEVEL.load(Ordering::Relaxed)).unwrap_or(LogLevel::Warning)
}

/// Sets the threshold of [`default_log_callback`].
///
/// The value is read without synchronization by every log line; changing
/// it while another thread is logging races by contract.
pub fn set_default_log_level(level: LogLevel) {
    DEFAULT_LOG_LEVEL.store(level.as_raw(), Ordering::Relaxed);
}

/// Sends the output of [`default_log_callback`] to `target` instead of
/// stderr.
pub fn set_default_log_target<W>(target: W)
where
    W: Write + Send + 'static,
{
    *DEFAULT_LOG_TARGET.lock() = Some(Box::new(target));
}

/// Points [`default_log_callback`] back at stderr.
pub fn reset_default_log_target() {
    *DEFAULT_LOG_TARGET.lock() = None;
}

/// Writes `message` as `alpmbind: <message>` if `level` passes the
/// default threshold.
///
/// Native messages that arrive while no log callback is registered go
/// through here as well.
pub fn default_log_callback(level: LogLevel, message: &str) {
    let mut target = DEFAULT_LOG_TARGET.lock();
    let written = match target.as_mut() {
        Some(target) => write_default_log(target, level, message),
        None => write_default_log(&mut io::stderr().lock(), level, message),
    };
    if let Err(err) = written {
        tracing::trace!(error = %err, "default log sink failed");
    }
}

fn write_default_log(out: &mut impl Write, level: LogLevel, message: &str) -> io::Result<()> {
    if level > default_log_level() {
        return Ok(());
    }
    let newline = if message.ends_with('\n') { "" } else { "\n" };
    write!(out, "alpmbind: {message}{newline}")?;
    out.flush()
}

/// Empties the log slot, so native lines go to [`default_log_callback`]
/// again.
pub fn clear_log_callback() {
    *LOG_SLOT.write() = None;
}

/// Empties the question slot. Questions then keep the library's defaults.
pub fn clear_question_callback() {
    *QUESTION_SLOT.write() = None;
}

impl Handle {
    /// Routes native log lines to `callback`.
    ///
    /// Replaces the log callback of every handle in the process.
    pub fn set_log_callback<F>(&self, callback: F) -> Result<()>
    where
        F: Fn(LogLevel, &str) + Send + Sync + 'static,
    {
        *LOG_SLOT.write() = Some(Arc::new(callback));
        tracing::debug!("log callback registered");
        // Safety: the handle is live; the trampoline has the native signature.
        unsafe {
            let status = sys::alpm_option_set_logcb(self.as_ptr(), Some(log_trampoline));
            error::check(self.as_ptr(), status)
        }
    }

    /// Routes native questions to `callback`.
    ///
    /// Replaces the question callback of every handle in the process.
    /// Views handed to the callback are valid only until it returns.
    pub fn set_question_callback<F>(&self, callback: F) -> Result<()>
    where
        F: for<'q> Fn(QuestionAny<'q>) + Send + Sync + 'static,
    {
        *QUESTION_SLOT.write() = Some(Arc::new(callback));
        tracing::debug!("question callback registered");
        // Safety: the handle is live; the trampoline has the native signature.
        unsafe {
            let status = sys::alpm_option_set_questioncb(self.as_ptr(), Some(question_trampoline));
            error::check(self.as_ptr(), status)
        }
    }
}

/// Arms the log trampoline on a fresh handle.
///
/// # Safety
///
/// `handle` must be live.
pub(crate) unsafe fn arm_log_trampoline(handle: *mut sys::alpm_handle_t) -> c_int {
    sys::alpm_option_set_logcb(handle, Some(log_trampoline))
}

unsafe extern "C" fn log_trampoline(level: sys::alpm_loglevel_t, fmt: *const c_char, args: sys::va_list) {
    let message = sys::render_log_message(fmt, args);
    let level = LogLevel::try_from(level).unwrap_or(LogLevel::Debug);
    let callback = LOG_SLOT.read().clone();
    tracing::trace!(%level, "native log line");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match callback {
        Some(callback) => callback(level, &message),
        None => default_log_callback(level, &message),
    }));
    if outcome.is_err() {
        tracing::error!("log callback panicked");
    }
}

unsafe extern "C" fn question_trampoline(question: *mut sys::alpm_question_t) {
    let Some(question) = NonNull::new(question) else {
        return;
    };
    let Some(callback) = QUESTION_SLOT.read().clone() else {
        return;
    };
    let question = QuestionAny::from_raw(question);
    tracing::trace!(kind = question.raw_type(), "native question");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(question)));
    if outcome.is_err() {
        tracing::error!("question callback panicked");
    }
}

#[cfg(test)]
pub(crate) static TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

#[cfg(test)]
pub(crate) fn clear_slots() {
    clear_log_callback();
    clear_question_callback();
}

#[cfg(all(test, not(feature = "system")))]
mod tests {
    use super::*;
    use crate::types::{QuestionType, SigLevel};
    use alpmbind_sys::emulated::{self, seed_database, PackageSeed};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn open() -> (tempfile::TempDir, Handle) {
        let dir = tempfile::tempdir().unwrap();
        seed_database(dir.path(), "core", vec![PackageSeed::new("linux", "6.8.9.arch1-1")]);
        let handle = Handle::new(dir.path(), dir.path()).unwrap();
        (dir, handle)
    }

    #[test]
    fn log_lines_reach_the_callback() {
        let _guard = TEST_LOCK.lock();
        let (_dir, handle) = open();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        handle
            .set_log_callback(move |level, message| sink.lock().unwrap().push((level, message.to_string())))
            .unwrap();

        assert!(unsafe { emulated::emit_log(handle.as_ptr(), sys::ALPM_LOG_DEBUG, "loading core\n") });
        assert_eq!(*seen.lock().unwrap(), [(LogLevel::Debug, "loading core\n".to_string())]);
        clear_slots();
    }

    #[test]
    fn second_question_callback_replaces_the_first() {
        let _guard = TEST_LOCK.lock();
        let (_dir, handle) = open();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&first);
        handle
            .set_question_callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let counter = Arc::clone(&second);
        handle
            .set_question_callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        unsafe { emulated::ask_generic(handle.as_ptr(), sys::ALPM_QUESTION_IMPORT_KEY) };
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        clear_slots();
    }

    #[test]
    fn install_answer_is_read_back() {
        let _guard = TEST_LOCK.lock();
        let (_dir, handle) = open();
        let core = handle.register_sync_db("core", SigLevel::empty()).unwrap();
        let linux = core.pkg("linux").unwrap();

        handle
            .set_question_callback(|question| {
                assert_eq!(question.kind().unwrap(), QuestionType::InstallIgnorePkg);
                let install = question.install_ignore_pkg().unwrap();
                assert_eq!(install.pkg().unwrap().name(), "linux");
                install.set_install(true);
            })
            .unwrap();

        assert!(unsafe { emulated::ask_install_ignorepkg(handle.as_ptr(), linux.as_ptr()) });
        clear_slots();
    }

    #[test]
    fn panicking_callback_does_not_unwind_into_native_frames() {
        let _guard = TEST_LOCK.lock();
        let (_dir, handle) = open();
        handle.set_question_callback(|_| panic!("boom")).unwrap();
        let answer = unsafe { emulated::ask_generic(handle.as_ptr(), sys::ALPM_QUESTION_IMPORT_KEY) };
        assert_eq!(answer, 0);
        clear_slots();
    }

    #[test]
    fn default_threshold() {
        let _guard = TEST_LOCK.lock();
        assert_eq!(default_log_level(), LogLevel::Warning);
        set_default_log_level(LogLevel::Debug);
        assert_eq!(default_log_level(), LogLevel::Debug);
        set_default_log_level(LogLevel::Warning);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn default_sink_filters_by_threshold() {
        let _guard = TEST_LOCK.lock();
        set_default_log_level(LogLevel::Error);
        let mut out = Vec::new();
        write_default_log(&mut out, LogLevel::Debug, "filtered out").unwrap();
        assert!(out.is_empty());
        write_default_log(&mut out, LogLevel::Error, "reported").unwrap();
        write_default_log(&mut out, LogLevel::Error, "already terminated\n").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "alpmbind: reported\nalpmbind: already terminated\n");
        set_default_log_level(LogLevel::Warning);
    }

    #[test]
    fn fresh_handle_logs_through_the_default_sink() {
        let _guard = TEST_LOCK.lock();
        clear_slots();
        let captured = Captured::default();
        set_default_log_target(captured.clone());
        set_default_log_level(LogLevel::Error);

        let (_dir, handle) = open();
        assert!(unsafe { emulated::emit_log(handle.as_ptr(), sys::ALPM_LOG_DEBUG, "loading core\n") });
        assert!(unsafe { emulated::emit_log(handle.as_ptr(), sys::ALPM_LOG_ERROR, "native error line") });
        assert_eq!(captured.text(), "alpmbind: native error line\n");

        set_default_log_level(LogLevel::Warning);
        reset_default_log_target();
    }

    #[test]
    fn clearing_the_log_slot_restores_the_default_sink() {
        let _guard = TEST_LOCK.lock();
        let captured = Captured::default();
        set_default_log_target(captured.clone());
        let (_dir, handle) = open();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        handle
            .set_log_callback(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        unsafe { emulated::emit_log(handle.as_ptr(), sys::ALPM_LOG_ERROR, "to the closure") };
        clear_log_callback();
        unsafe { emulated::emit_log(handle.as_ptr(), sys::ALPM_LOG_ERROR, "to the sink") };
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(captured.text(), "alpmbind: to the sink\n");

        reset_default_log_target();
        clear_slots();
    }
}
