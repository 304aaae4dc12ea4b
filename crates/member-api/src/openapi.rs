//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::TokenPair;
use crate::error::ApiErrorResponse;
use crate::routes::{
    ChangePasswordRequest, ComponentHealth, ComponentStatus, HealthResponse, LoginRequest,
    MemberResponse, RegisterRequest,
};

/// Member API 문서.
///
/// 모든 엔드포인트와 스키마를 포함하는 OpenAPI 3.0 스펙입니다.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Member API",
        version = "0.1.0",
        description = r#"
# 멤버십 백엔드 REST API

회원가입, 인증, 토큰 관리, 회원 관리를 위한 REST API입니다.

## 인증

보호된 엔드포인트는 JWT Bearer 토큰 인증이 필요합니다.
`Authorization: Bearer <token>` 헤더 또는 `accessToken` 쿠키를 사용하세요.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    paths(
        crate::routes::auth::login,
        crate::routes::auth::register,
        crate::routes::auth::refresh,
        crate::routes::auth::change_password,
        crate::routes::members::list_members,
        crate::routes::members::get_member,
        crate::routes::members::delete_member,
    ),
    components(schemas(
        LoginRequest,
        RegisterRequest,
        ChangePasswordRequest,
        TokenPair,
        MemberResponse,
        ApiErrorResponse,
        HealthResponse,
        ComponentHealth,
        ComponentStatus,
    )),
    tags(
        (name = "auth", description = "로그인/가입/토큰 관리"),
        (name = "members", description = "회원 관리 (역할 보호)"),
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
