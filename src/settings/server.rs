use serde::Deserialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use super::SettingsError;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerSettings {
    /// 바인딩 주소 (기본값: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// HTTP 포트 (기본값: 9999)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// 요청 본문 최대 바이트 수 (기본값: 4 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_http_port() -> u16 { 9999 }

fn default_max_body_bytes() -> usize { crate::server::handler::DEFAULT_MAX_BODY_BYTES }

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            host: parse_env_var("TRELLIS_HOST", default_host)?,
            http_port: parse_env_var("TRELLIS_HTTP_PORT", default_http_port)?,
            max_body_bytes: parse_env_var("TRELLIS_MAX_BODY_BYTES", default_max_body_bytes)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.http_port == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "TRELLIS_HTTP_PORT".to_string(),
                value: self.http_port.to_string(),
                reason: "포트는 0이 될 수 없습니다".to_string(),
            });
        }
        if self.max_body_bytes == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "TRELLIS_MAX_BODY_BYTES".to_string(),
                value: "0".to_string(),
                reason: "요청 본문 크기 제한은 0이 될 수 없습니다".to_string(),
            });
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.http_port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}
