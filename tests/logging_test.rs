use vhost_router::logging::init_logging;
use vhost_router::settings::{LogFormat, LogOutput, LogSettings, SettingsError};

#[test]
fn test_init_logging_to_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("router.log");
    let settings = LogSettings {
        format: LogFormat::Json,
        level: tracing::Level::DEBUG,
        output: LogOutput::File(path.to_str().unwrap().to_string()),
    };

    let guard = init_logging(&settings).expect("첫 초기화는 성공해야 함");
    tracing::info!(test = "logging", "로그 파일 기록");
    drop(guard);

    assert!(path.exists(), "로그 파일이 생성되어야 함");

    // 전역 구독자는 한 번만 설치 가능
    let result = init_logging(&LogSettings::default());
    assert!(matches!(result, Err(SettingsError::LoggingInit { .. })));
}
