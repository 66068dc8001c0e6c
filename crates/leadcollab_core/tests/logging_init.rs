use leadcollab_core::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingConfig,
    LoggingError,
};

#[test]
fn logging_init_is_idempotent_and_rejects_reconfiguration() {
    let dir = tempfile::tempdir().unwrap();
    let dir_str = dir.path().to_str().unwrap().to_string();

    assert!(matches!(
        init_logging("loud", &dir_str),
        Err(LoggingError::UnsupportedLevel(_))
    ));
    assert!(matches!(
        init_logging("info", "relative/logs"),
        Err(LoggingError::RelativeDir(_))
    ));
    assert!(logging_status().is_none());

    init_logging(default_log_level(), &dir_str).unwrap();
    init_logging_from_config(&LoggingConfig {
        level: default_log_level().to_string(),
        dir: dir_str.clone(),
    })
    .unwrap();

    let (level, active_dir) = logging_status().unwrap();
    assert_eq!(level, default_log_level());
    assert_eq!(active_dir, dir.path());

    assert!(matches!(
        init_logging("error", &dir_str),
        Err(LoggingError::Reconfigure { .. })
    ));
    let other = tempfile::tempdir().unwrap();
    assert!(matches!(
        init_logging(default_log_level(), other.path().to_str().unwrap()),
        Err(LoggingError::Reconfigure { .. })
    ));

    log::info!("event=logging_probe module=test status=ok");
    log::logger().flush();
    let has_log_file = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().starts_with("leadcollab"));
    assert!(has_log_file);
}
