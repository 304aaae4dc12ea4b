//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/auth` - 로그인/가입/리프레시/비밀번호 변경
//! - `/api/v1/members` - 회원 관리 (역할 보호)

pub mod auth;
pub mod health;
pub mod members;

pub use auth::{auth_router, ChangePasswordRequest, LoginRequest, RegisterRequest};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use members::{members_router, MemberResponse, MemberSearchQuery};

use axum::{middleware, Router};
use std::sync::Arc;

use crate::auth::middleware::authenticate_request;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하고 요청 인증 필터를 적용합니다. 필터는
/// 모든 요청에서 실행되지만 요청을 거부하지 않으며, 보호 여부는 각
/// 핸들러의 추출기가 판정합니다.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/health", health_router())
        .nest("/auth", auth_router())
        .nest("/api/v1/members", members_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_request,
        ))
        .with_state(state)
}
