//! 라우터 설정: 로깅과 루트 앱 옵션을 TOML 파일이나 환경 변수에서 읽습니다.

use std::{env, fs, path::Path};
use hyper::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info};
use crate::routing::AppOptions;

mod env_vars;
mod error;
pub mod logging;

pub use env_vars::{parse_env_var, parse_optional_env_var};
pub use error::SettingsError;
pub use logging::{LogFormat, LogOutput, LogSettings};

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 루트 앱 옵션 (하위 앱이 상속)
    #[serde(default)]
    pub app: AppOptions,
}

impl Settings {
    pub fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("ROUTER_CONFIG_FILE") {
            Self::from_toml_file(&config_path)
        } else {
            Self::from_env()
        }
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings = Self::from_toml_str(&content)?;
        info!(path = %path.as_ref().display(), "설정 파일 로드");
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        let settings = Self {
            logging: LogSettings::from_env()?,
            app: AppOptions {
                url_cleaning: parse_optional_env_var("ROUTER_URL_CLEANING")?,
                ..Default::default()
            },
        };

        debug!(?settings, "환경 변수에서 설정 생성");
        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        if let Some(headers) = &self.app.headers {
            for (name, value) in headers {
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| SettingsError::InvalidValue {
                    field: "app.headers".to_string(),
                    value: name.clone(),
                    reason: e.to_string(),
                })?;
                HeaderValue::from_str(value).map_err(|e| SettingsError::InvalidValue {
                    field: format!("app.headers.{}", name),
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            }
        }

        if let Some(extensions) = &self.app.extensions {
            if let Some(bad) = extensions.iter().find(|ext| ext.is_empty() || ext.contains('/')) {
                return Err(SettingsError::InvalidValue {
                    field: "app.extensions".to_string(),
                    value: bad.clone(),
                    reason: "확장자는 비어 있거나 '/'를 포함할 수 없습니다".to_string(),
                });
            }
        }

        if let Some(error_pages) = &self.app.error_pages {
            for code in error_pages.keys() {
                let valid = code.parse::<u16>().map_or(false, |c| (400..600).contains(&c));
                if !valid {
                    return Err(SettingsError::InvalidValue {
                        field: "app.error_pages".to_string(),
                        value: code.clone(),
                        reason: "에러 페이지 키는 400-599 상태 코드여야 합니다".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
