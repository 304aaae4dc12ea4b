//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 파일(`config/default.toml`, 선택)과 `MEMBER__` 접두사의
//! 환경 변수에서 로드되며, 환경 변수가 파일을 오버라이드합니다.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;

/// 서명 비밀 키의 최소 길이 (바이트).
pub const MIN_SECRET_LEN: usize = 32;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증/토큰 설정
    pub auth: AuthConfig,
    /// 쿠키 설정
    #[serde(default)]
    pub cookie: CookieConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 초기 데이터 설정
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 연결 URL
    pub url: String,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/members".to_string(),
            max_connections: 10,
            connect_timeout_secs: 10,
        }
    }
}

/// 인증/토큰 설정.
///
/// 서명 비밀 키는 프로세스 전역 불변 상태로, 시작 시 한 번 로드되며
/// 없거나 너무 짧으면 시작 자체가 실패합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT 서명 비밀 키 (최소 32바이트)
    pub secret: SecretString,
    /// 액세스 토큰 수명 (초)
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: i64,
    /// 리프레시 토큰 수명 (초)
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: i64,
}

fn default_access_ttl() -> i64 {
    3600 // 1시간
}

fn default_refresh_ttl() -> i64 {
    604_800 // 7일
}

/// 쿠키 설정.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CookieConfig {
    /// Secure 플래그 - TLS 배포에서만 켭니다
    #[serde(default)]
    pub secure: bool,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨 필터 (예: "info", "member_api=debug")
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 초기 데이터 설정.
///
/// 시작 시 역할 행과 기본 관리자 계정을 보장하는 데 사용됩니다.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// 시딩 활성화 여부
    pub enabled: bool,
    /// 기본 관리자 사용자 이름
    pub admin_username: String,
    /// 기본 관리자 이메일
    pub admin_email: String,
    /// 기본 관리자 비밀번호 (운영 환경에서는 반드시 오버라이드)
    pub admin_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            admin_username: "admin".to_string(),
            admin_email: "admin@member.local".to_string(),
            admin_password: "admin@123456".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 환경 변수만으로 로드할 수 있습니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드 (예: MEMBER__AUTH__SECRET)
            .add_source(
                config::Environment::with_prefix("MEMBER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// 시작 시 치명적인 설정 결함을 검사합니다.
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(config::ConfigError::Message(format!(
                "auth.secret은 최소 {MIN_SECRET_LEN}바이트여야 합니다"
            )));
        }
        if self.auth.access_token_ttl_secs <= 0 || self.auth.refresh_token_ttl_secs <= 0 {
            return Err(config::ConfigError::Message(
                "토큰 수명은 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}
