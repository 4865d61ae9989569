use elvia::config::LoggingConfig;
use elvia::logging::{LogContext, get_logger, get_logger_with_context, init_logging, parse_log_level};
use tracing::Level;

#[test]
fn parse_accepts_common_spellings() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("Warning").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("ERROR").unwrap(), Level::ERROR);
    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn init_is_idempotent() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let cfg = LoggingConfig {
        file: tmp_dir.path().join("elvia.log").to_string_lossy().to_string(),
        console_output: false,
        ..LoggingConfig::default()
    };
    assert!(init_logging(&cfg).is_ok());
    assert!(init_logging(&cfg).is_ok());

    let logger = get_logger("tests");
    logger.info("logging initialized");
    assert_eq!(logger.context().component, "tests");
}

#[test]
fn context_logger_keeps_metering_point() {
    let logger = get_logger_with_context(LogContext::new("coordinator").with_metering_point("42"));
    logger.debug("context attached");
    assert_eq!(logger.context().metering_point_id.as_deref(), Some("42"));
}
