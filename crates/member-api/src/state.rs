//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 저장소, 토큰 코덱, 세션 매니저를 묶어 Axum의 State
//! extractor를 통해 핸들러에 주입됩니다. 토큰 코덱은 시작 시 한 번
//! 구성되는 불변 객체이므로 Arc로 공유하면 동기화가 필요 없습니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use member_core::{CookieConfig, MemberStore};

use crate::auth::jwt::TokenCodec;
use crate::auth::session::SessionManager;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 회원/역할 저장소
    pub store: Arc<dyn MemberStore>,

    /// 토큰 코덱 (불변, 시작 시 구성)
    pub codec: Arc<TokenCodec>,

    /// 세션 매니저 - 로그인/리프레시/가입/비밀번호 변경
    pub sessions: SessionManager,

    /// 쿠키 설정
    pub cookies: CookieConfig,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(store: Arc<dyn MemberStore>, codec: TokenCodec, cookies: CookieConfig) -> Self {
        let codec = Arc::new(codec);
        Self {
            sessions: SessionManager::new(store.clone(), codec.clone()),
            store,
            codec,
            cookies,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 인메모리 저장소로 동작하는 상태를 생성합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use member_core::AuthConfig;
    use secrecy::SecretString;

    use crate::repository::InMemoryMemberStore;

    let codec = TokenCodec::new(&AuthConfig {
        secret: SecretString::from(
            "test-secret-key-for-jwt-testing-minimum-32-chars".to_string(),
        ),
        access_token_ttl_secs: 3600,
        refresh_token_ttl_secs: 604_800,
    })
    .expect("test codec construction cannot fail");

    AppState::new(
        Arc::new(InMemoryMemberStore::new()),
        codec,
        CookieConfig::default(),
    )
}
