use std::{env, path::Path};
use serde::Deserialize;
use tracing::debug;

mod server;
pub mod logging;
mod router;
mod error;

pub use server::ServerSettings;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use router::RouterSettings;
pub use error::SettingsError;

pub type Result<T> = std::result::Result<T, SettingsError>;
pub use server::parse_env_var;

pub const CONFIG_FILE_ENV: &str = "TRELLIS_CONFIG_FILE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 라우트 등록 정책
    #[serde(default)]
    pub router: RouterSettings,
}

impl Settings {
    /// `TRELLIS_CONFIG_FILE` 이 있으면 TOML 파일에서, 없으면 환경 변수에서 설정을 읽습니다.
    pub async fn load() -> Result<Self> {
        if let Ok(config_path) = env::var(CONFIG_FILE_ENV) {
            Self::from_toml_file(&config_path).await
        } else {
            Self::from_env()
        }
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("설정 파일 로드: {}", path.as_ref().display());
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            router: RouterSettings::from_env()?,
        };

        // 설정 생성 시점에 바로 검증
        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        if let LogOutput::File(path) = &self.logging.output {
            if path.trim().is_empty() {
                return Err(SettingsError::InvalidConfig("로그 파일 경로가 비어 있습니다".to_string()));
            }
        }
        Ok(())
    }
}
