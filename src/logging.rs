use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

use crate::settings::{LogFormat, LogOutput, LogSettings, SettingsError};

/// 설정에 따라 전역 tracing 구독자를 설치합니다.
///
/// `RUST_LOG`가 있으면 설정의 레벨보다 우선합니다. 반환된 가드는 로그 버퍼를
/// 비울 때까지 살아 있어야 합니다. 이미 전역 구독자가 있으면 에러를 돌려줍니다.
pub fn init_logging(settings: &LogSettings) -> Result<WorkerGuard, SettingsError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level).into())
        .from_env_lossy();

    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let file_name = path.file_name().ok_or_else(|| SettingsError::LoggingInit {
                reason: format!("로그 파일 이름이 없음: {}", path.display()),
            })?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy())
                .build(dir)
                .map_err(|e| SettingsError::LoggingInit {
                    reason: format!("로그 파일 열기 실패 {}: {}", path.display(), e),
                })?;
            tracing_appender::non_blocking(appender)
        }
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let result = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    result.map_err(|e| SettingsError::LoggingInit { reason: e.to_string() })?;
    Ok(guard)
}
