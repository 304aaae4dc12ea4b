//! 멤버십 백엔드 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (로그인/가입/리프레시/회원 관리)
//! - JWT 인증 및 역할 기반 접근 제어
//! - 통합 성공/에러 응답 봉투
//! - 헬스 체크 엔드포인트
//! - OpenAPI 문서 및 Swagger UI
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 토큰 코덱, 비밀번호 해싱, 세션 매니저, 요청 인증 필터
//! - [`repository`]: `MemberStore` 구현 (Postgres / 인메모리)
//! - [`error`] / [`response`]: 통합 응답 봉투
//! - [`bootstrap`]: 역할/관리자 초기 데이터 시딩
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod openapi;
pub mod repository;
pub mod response;
pub mod routes;
pub mod state;

pub use auth::{
    authenticate_request, hash_password, verify_password, AuthUser, Claims, CurrentUser,
    SessionManager, TokenCodec, TokenPair,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use openapi::swagger_ui_router;
pub use response::ApiSuccessResponse;
pub use routes::create_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
