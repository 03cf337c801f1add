use serde::Deserialize;
use super::{server::parse_env_var, SettingsError};

/// 라우트 등록 정책 설정
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RouterSettings {
    /// 충돌하는 라우트 등록을 거부할지 여부 (기본값: false, 마지막 등록 우선)
    #[serde(default)]
    pub strict_routes: bool,
}

impl RouterSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            strict_routes: parse_env_var("TRELLIS_STRICT_ROUTES", || false)?,
        })
    }
}
