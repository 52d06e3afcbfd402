use super::*;

#[test]
fn status_labels() {
    assert_eq!(ModuleStatus::Ready.label(), "READY");
    assert_eq!(ModuleStatus::Running.label(), "RUNNING");
    assert_eq!(ModuleStatus::Queued.label(), "QUEUED");
    assert_eq!(ModuleStatus::Disabled.label(), "DISABLED");
    assert_eq!(ModuleStatus::DependencyFail.label(), "ERR");
    assert_eq!(ModuleStatus::Panic.to_string(), "PANIC!");
}

#[test]
fn only_disabled_and_dependency_fail_are_sticky() {
    assert!(ModuleStatus::Disabled.is_sticky());
    assert!(ModuleStatus::DependencyFail.is_sticky());
    assert!(!ModuleStatus::Panic.is_sticky());
    assert!(!ModuleStatus::Ready.is_sticky());
}

#[test]
fn ready_has_no_notice() {
    assert!(status_notice(ModuleStatus::Ready, &[]).is_none());
}

#[test]
fn dependency_notice_lists_dependencies() {
    let deps = vec!["valgrind".to_string(), "gcc".to_string()];
    let notice = status_notice(ModuleStatus::DependencyFail, &deps).unwrap();
    assert!(notice.starts_with("One or more dependencies have failed."));
    assert!(notice.ends_with("valgrind, gcc"));
}

#[test]
fn queued_and_running_share_notice() {
    assert_eq!(
        status_notice(ModuleStatus::Queued, &[]),
        status_notice(ModuleStatus::Running, &[])
    );
    assert_eq!(
        status_notice(ModuleStatus::Disabled, &[]).as_deref(),
        Some("This module is disabled.")
    );
    assert!(
        status_notice(ModuleStatus::Panic, &[])
            .unwrap()
            .contains("panic")
    );
}

#[test]
fn issue_display_with_full_location() {
    let issue = Issue::new("unused variable").at("main.c", 4, Some(9));
    assert_eq!(issue.to_string(), "main.c:4:9: unused variable");
}

#[test]
fn issue_display_without_column() {
    let issue = Issue::new("leak").at("list.c", 12, None);
    assert_eq!(issue.to_string(), "list.c:12: leak");
}

#[test]
fn issue_display_with_position_only() {
    let issue = Issue::new("noise").at_position(3, 7);
    assert_eq!(issue.to_string(), "3:7 noise");
}

#[test]
fn plain_issue_is_just_the_message() {
    let issue = Issue::new("File A has differences");
    assert_eq!(issue.to_string(), "File A has differences");
    assert!(!issue.critical);
    assert!(Issue::critical("boom").critical);
}

#[test]
fn issue_serializes_without_empty_location() {
    let json = serde_json::to_string(&Issue::new("x")).unwrap();
    assert_eq!(json, r#"{"message":"x","critical":false}"#);
}

#[test]
fn lock_module_recovers_after_poison() {
    use crate::config::RefCheckerConfig;
    use std::sync::Arc;

    let module: Box<dyn CheckerModule> = Box::new(Module::ref_diff(&RefCheckerConfig::default()));
    let slot: Arc<ModuleSlot> = Arc::new(Mutex::new(module));
    let poisoner = Arc::clone(&slot);
    let _ = std::thread::spawn(move || {
        let _guard = lock_module(&poisoner);
        panic!("poison");
    })
    .join();

    assert!(slot.is_poisoned());
    assert_eq!(lock_module(&slot).name(), "REFS");
}
