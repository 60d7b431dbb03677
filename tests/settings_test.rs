use vhost_router::routing::App;
use vhost_router::settings::{LogFormat, LogOutput, Settings, SettingsError};

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // 테스트 전후 환경변수 초기화를 위한 헬퍼 함수
    fn cleanup_env() {
        std::env::remove_var("ROUTER_CONFIG_FILE");
        std::env::remove_var("ROUTER_LOG_FORMAT");
        std::env::remove_var("ROUTER_LOG_LEVEL");
        std::env::remove_var("ROUTER_LOG_OUTPUT");
        std::env::remove_var("ROUTER_URL_CLEANING");
    }

    // 테스트용 임시 TOML 파일 생성 헬퍼
    fn create_test_toml(content: &str) -> (String, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");
        std::fs::write(&file_path, content).unwrap();
        (file_path.to_str().unwrap().to_string(), dir)
    }

    #[test]
    #[serial]
    fn test_settings_defaults() {
        cleanup_env();

        let settings = Settings::from_env().unwrap();

        assert_eq!(settings.logging.level, tracing::Level::INFO);
        assert_eq!(settings.logging.format, LogFormat::Text);
        assert_eq!(settings.logging.output, LogOutput::Stdout);
        assert_eq!(settings.app.url_cleaning, None);
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        cleanup_env();
        std::env::set_var("ROUTER_LOG_FORMAT", "json");
        std::env::set_var("ROUTER_LOG_LEVEL", "debug");
        std::env::set_var("ROUTER_LOG_OUTPUT", "/var/log/router.log");
        std::env::set_var("ROUTER_URL_CLEANING", "false");

        let settings = Settings::from_env().unwrap();

        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.logging.level, tracing::Level::DEBUG);
        assert_eq!(settings.logging.output, LogOutput::File("/var/log/router.log".to_string()));
        assert_eq!(settings.app.url_cleaning, Some(false));
        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_settings_validation() {
        cleanup_env();

        // 1. 잘못된 로그 레벨
        std::env::set_var("ROUTER_LOG_LEVEL", "invalid_level");
        assert!(matches!(Settings::from_env(), Err(SettingsError::EnvVarInvalid { .. })));
        cleanup_env();

        // 2. 잘못된 로그 형식
        std::env::set_var("ROUTER_LOG_FORMAT", "xml");
        assert!(Settings::from_env().is_err());
        cleanup_env();

        // 3. 잘못된 불리언
        std::env::set_var("ROUTER_URL_CLEANING", "maybe");
        assert!(Settings::from_env().is_err());
        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_settings_from_toml_file() {
        cleanup_env();
        let (path, _dir) = create_test_toml(r#"
            [logging]
            format = "json"
            level = "warn"
            output = "stdout"

            [app]
            urlCleaning = false
            extensions = ["html", "htm"]

            [app.headers]
            "X-Powered-By" = "Router"

            [app.error_pages]
            "404" = "/errors/404.html"
        "#);

        let settings = Settings::from_toml_file(&path).unwrap();

        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.logging.level, tracing::Level::WARN);
        assert_eq!(settings.app.url_cleaning, Some(false));
        assert_eq!(settings.app.extensions, Some(vec!["html".to_string(), "htm".to_string()]));

        // 설정으로 만든 루트 앱의 옵션을 하위 앱이 상속
        let root = App::new(settings.app.clone());
        let child = App::default();
        root.mount("/child", &child).unwrap();
        let resolved = child.resolved_options();
        assert!(!resolved.url_cleaning);
        assert_eq!(resolved.headers.get("X-Powered-By").map(String::as_str), Some("Router"));
        assert_eq!(resolved.error_pages.get("404").map(String::as_str), Some("/errors/404.html"));
    }

    #[test]
    #[serial]
    fn test_settings_load_uses_config_file() {
        cleanup_env();
        let (path, _dir) = create_test_toml("[logging]\nlevel = \"error\"\n");
        std::env::set_var("ROUTER_CONFIG_FILE", &path);

        let settings = Settings::load().unwrap();
        assert_eq!(settings.logging.level, tracing::Level::ERROR);
        cleanup_env();
    }

    #[test]
    fn test_settings_invalid_toml() {
        let result = Settings::from_toml_str("[logging\nlevel = ");
        assert!(matches!(result, Err(SettingsError::ParseError { .. })));

        let result = Settings::from_toml_str("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(SettingsError::ParseError { .. })));
    }

    #[test]
    fn test_settings_invalid_app_options() {
        let result = Settings::from_toml_str("[app.headers]\n\"Bad Header\" = \"x\"\n");
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));

        let result = Settings::from_toml_str("[app]\nextensions = [\"\"]\n");
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));

        let result = Settings::from_toml_str("[app.error_pages]\n\"200\" = \"/ok.html\"\n");
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));
    }

    #[test]
    fn test_settings_missing_file() {
        let result = Settings::from_toml_file("/nonexistent/router.toml");
        assert!(matches!(result, Err(SettingsError::FileError { .. })));
    }
}
