//! Question narrowing and the process-wide callback slots.

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alpmbind::{DepMod, Error, ErrorCode, LogLevel, QuestionType};
use alpmbind_testkit::prelude::*;

#[test]
fn select_provider_never_narrows_to_install_ignorepkg() {
    let _guard = callback_lock();
    let th = TestHandle::core();
    let core = th.register("core");
    let providers = [core.pkg("mkinitcpio").unwrap(), core.pkg("booster").unwrap()];

    let failures = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&failures);
    th.set_question_callback(move |question| {
        match question.install_ignore_pkg() {
            Err(Error::WrongQuestionType { expected, actual }) => {
                assert_eq!(expected, QuestionType::InstallIgnorePkg);
                assert_eq!(actual, QuestionType::SelectProvider);
                seen.fetch_add(1, Ordering::SeqCst);
            }
            other => panic!("narrowing should fail, got {other:?}"),
        }
    })
    .unwrap();

    th.ask_select_provider(&providers, "initramfs");
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[test]
fn replace_answer_is_visible_through_a_fresh_view() {
    let _guard = callback_lock();
    let th = TestHandle::core();
    let core = th.register("core");
    let old = core.pkg("mkinitcpio").unwrap();
    let new = core.pkg("booster").unwrap();

    th.set_question_callback(|question| {
        let replace = question.replace().unwrap();
        assert!(!replace.replace());
        assert_eq!(replace.old_pkg().unwrap().name(), "mkinitcpio");
        assert_eq!(replace.new_pkg().unwrap().name(), "booster");
        assert_eq!(replace.new_db().unwrap().name(), "core");
        replace.set_replace(true);

        let again = question.replace().unwrap();
        assert!(again.replace());
    })
    .unwrap();

    assert!(th.ask_replace(&old, &new));
}

#[test]
fn select_provider_index_is_read_back() {
    let _guard = callback_lock();
    let th = TestHandle::core();
    let core = th.register("core");
    let providers = [core.pkg("mkinitcpio").unwrap(), core.pkg("booster").unwrap()];

    th.set_question_callback(|question| {
        let select = question.select_provider().unwrap();
        let dep = select.dep().unwrap();
        assert_eq!(dep.name, "initramfs");
        assert_eq!(dep.modifier, DepMod::Any);

        let names: Vec<String> = select.providers().iter().map(|p| p.name()).collect();
        let index = names.iter().position(|n| n == "booster").unwrap();
        select.set_use_index(index as i32);
    })
    .unwrap();

    assert_eq!(th.ask_select_provider(&providers, "initramfs"), 1);
}

#[test]
fn ignored_package_install_question() {
    let _guard = callback_lock();
    let th = TestHandle::core();
    th.add_ignore_pkg("linux").unwrap();
    let core = th.register("core");
    let linux = core.pkg("linux").unwrap();
    assert!(linux.should_ignore());

    th.set_question_callback(|question| {
        let install = question.install_ignore_pkg().unwrap();
        install.set_install(install.pkg().is_some_and(|pkg| pkg.name() == "linux"));
    })
    .unwrap();

    assert!(th.ask_install_ignorepkg(&linux));
}

#[test]
fn question_views_belong_to_the_asking_handle() {
    let _guard = callback_lock();
    let asking = TestHandle::core();
    asking.add_ignore_pkg("linux").unwrap();
    let core = asking.register("core");
    let linux = core.pkg("linux").unwrap();
    asking.set_question_callback(|_| {}).unwrap();

    let registering = TestHandle::new();
    let seen = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);
    registering
        .set_question_callback(move |question| {
            let install = question.install_ignore_pkg().unwrap();
            let pkg = install.pkg().unwrap();
            let missing = pkg.db().unwrap().pkg("linux-zen").unwrap_err();
            *record.lock().unwrap() = Some((pkg.should_ignore(), missing.code()));
            install.set_install(pkg.should_ignore());
        })
        .unwrap();
    drop(registering);

    assert!(asking.ask_install_ignorepkg(&linux));
    assert_eq!(*seen.lock().unwrap(), Some((true, Some(ErrorCode::PKG_NOT_FOUND))));
}

#[test]
fn generic_answer_for_other_questions() {
    let _guard = callback_lock();
    let th = TestHandle::new();
    th.set_question_callback(|question| {
        if question.kind().unwrap() == QuestionType::CorruptedPkg {
            question.set_answer(true);
        }
    })
    .unwrap();

    assert!(th.ask_corrupted("/var/cache/pacman/pkg/linux-6.8.9.arch1-1-x86_64.pkg.tar.zst"));
    assert!(!th.ask(QuestionType::ImportKey));
}

#[test]
fn latest_question_callback_wins_across_handles() {
    let _guard = callback_lock();
    let first = TestHandle::new();
    let second = TestHandle::new();
    let fired = Arc::new(AtomicI32::new(0));

    let mark = Arc::clone(&fired);
    first
        .set_question_callback(move |_| {
            mark.store(1, Ordering::SeqCst);
        })
        .unwrap();
    let mark = Arc::clone(&fired);
    second
        .set_question_callback(move |_| {
            mark.store(2, Ordering::SeqCst);
        })
        .unwrap();

    // The first handle is still armed, but the slot now holds the second closure.
    first.ask(QuestionType::ImportKey);
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[test]
fn log_callback_receives_level_and_message() {
    let _guard = callback_lock();
    let th = TestHandle::new();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    th.set_log_callback(move |level, message| {
        sink.lock().unwrap().push((level, message.to_string()));
    })
    .unwrap();

    assert!(th.emit_log(LogLevel::Warning, "database 'core' is not valid\n"));
    assert!(th.emit_log(LogLevel::Debug, "loading packages"));
    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], (LogLevel::Warning, "database 'core' is not valid\n".to_string()));
    assert_eq!(lines[1].0, LogLevel::Debug);
}

#[test]
fn unregistered_handle_logs_through_the_default_sink() {
    let _guard = callback_lock();
    alpmbind::clear_log_callback();
    let capture = LogCapture::new();
    alpmbind::set_default_log_target(capture.clone());
    alpmbind::set_default_log_level(LogLevel::Error);

    let th = TestHandle::new();
    assert!(th.emit_log(LogLevel::Debug, "filtered out"));
    assert!(th.emit_log(LogLevel::Error, "native error line"));
    assert_eq!(capture.contents(), "alpmbind: native error line\n");

    alpmbind::set_default_log_level(LogLevel::Warning);
    alpmbind::reset_default_log_target();
}

#[test]
fn default_log_callback_can_be_registered_explicitly() {
    let _guard = callback_lock();
    let capture = LogCapture::new();
    alpmbind::set_default_log_target(capture.clone());
    let th = TestHandle::new();
    th.set_log_callback(alpmbind::default_log_callback).unwrap();

    assert!(th.emit_log(LogLevel::Debug, "below the threshold\n"));
    assert!(th.emit_log(LogLevel::Warning, "database 'core' is not valid\n"));
    assert_eq!(capture.contents(), "alpmbind: database 'core' is not valid\n");

    alpmbind::clear_log_callback();
    alpmbind::reset_default_log_target();
}
