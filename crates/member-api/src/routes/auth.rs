//! 인증 endpoint.
//!
//! 로그인, 회원가입, 토큰 리프레시, 비밀번호 변경 API를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `POST /auth/login` - 로그인, 토큰 쌍 발급 + 쿠키 설정
//! - `POST /auth/register` - 회원가입 (`?mode=support`로 상담원 가입)
//! - `POST /auth/refresh` - 리프레시 쿠키로 새 액세스 토큰 발급
//! - `POST /auth/change-password` - 비밀번호 변경 (인증 필요)

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::cookie::{
    build_cookie, get_cookie, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH,
};
use crate::auth::middleware::AuthUser;
use crate::auth::session::Registration;
use crate::auth::TokenPair;
use crate::error::{ApiError, ApiResult};
use crate::response;
use crate::routes::members::MemberResponse;
use crate::state::AppState;

// ==================== 요청 타입 ====================

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// 사용자 이름
    #[validate(length(min = 1, message = "사용자 이름을 입력하세요"))]
    pub username: String,
    /// 비밀번호
    #[validate(length(min = 1, message = "비밀번호를 입력하세요"))]
    pub password: String,
}

/// 회원가입 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// 사용자 이름 (3~50자)
    #[validate(length(min = 3, max = 50, message = "사용자 이름은 3~50자여야 합니다"))]
    pub username: String,
    /// 비밀번호 - 세부 강도 규칙은 서비스에서 검사합니다
    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    pub password: String,
    /// 전체 이름
    #[validate(length(min = 1, message = "이름을 입력하세요"))]
    pub full_name: String,
    /// 이메일
    #[validate(email(message = "이메일 형식이 올바르지 않습니다"))]
    pub email: String,
    /// 전화번호
    #[serde(default)]
    pub phone: Option<String>,
    /// 주소
    #[serde(default)]
    pub address: Option<String>,
    /// 성별
    #[serde(default)]
    pub gender: Option<String>,
    /// 프로필 이미지 URL
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 회원가입 역할 모드.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct RegisterQuery {
    /// "support"인 경우에만 상담원 역할로 가입
    #[serde(default)]
    pub mode: Option<String>,
}

/// 비밀번호 변경 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// 기존 비밀번호
    #[validate(length(min = 1, message = "기존 비밀번호를 입력하세요"))]
    pub old_password: String,
    /// 새 비밀번호
    #[validate(length(min = 1, message = "새 비밀번호를 입력하세요"))]
    pub new_password: String,
}

// ==================== Handler ====================

/// 로그인.
///
/// 성공 시 액세스/리프레시 토큰을 본문과 HttpOnly 쿠키 양쪽으로
/// 내립니다. 리프레시 쿠키는 리프레시 엔드포인트 경로로만 전송됩니다.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공, 토큰 쌍 반환"),
        (status = 401, description = "자격 증명 불일치", body = crate::error::ApiErrorResponse),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    let path = uri.path();
    request
        .validate()
        .map_err(|e| ApiError::from_validation(e, path))?;

    let pair = state
        .sessions
        .login(&request.username, &request.password)
        .await
        .map_err(|e| ApiError::of(e, path))?;

    let mut response =
        response::ok(pair.clone(), "로그인 성공", path).into_response();
    append_token_cookies(&state, response.headers_mut(), &pair);

    Ok(response)
}

/// 회원가입.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    params(RegisterQuery),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "가입 성공"),
        (status = 409, description = "사용자 이름/이메일 중복", body = crate::error::ApiErrorResponse),
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<RegisterQuery>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let path = uri.path();
    request
        .validate()
        .map_err(|e| ApiError::from_validation(e, path))?;

    let member = state
        .sessions
        .register(
            Registration {
                username: request.username,
                password: request.password,
                full_name: request.full_name,
                email: request.email,
                phone: request.phone,
                address: request.address,
                gender: request.gender,
                image_url: request.image_url,
            },
            query.mode.as_deref(),
        )
        .await
        .map_err(|e| ApiError::of(e, path))?;

    Ok(response::created(
        MemberResponse::from(member),
        "회원가입 성공",
        path,
    ))
}

/// 토큰 리프레시.
///
/// 리프레시 토큰 쿠키를 읽어 새 액세스 토큰을 발급합니다. 리프레시
/// 토큰 자체는 회전 없이 그대로 반환됩니다.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "새 액세스 토큰 발급"),
        (status = 401, description = "리프레시 토큰 없음", body = crate::error::ApiErrorResponse),
        (status = 403, description = "리프레시 토큰 만료/무효", body = crate::error::ApiErrorResponse),
    )
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let path = uri.path();
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME).unwrap_or_default();

    let pair = state
        .sessions
        .refresh(&refresh_token)
        .await
        .map_err(|e| ApiError::of(e, path))?;

    let mut response =
        response::ok(pair.clone(), "토큰 갱신 성공", path).into_response();
    response.headers_mut().append(
        SET_COOKIE,
        build_cookie(
            ACCESS_COOKIE_NAME,
            &pair.access_token,
            "/",
            state.codec.access_ttl_secs(),
            state.cookies.secure,
        ),
    );

    Ok(response)
}

/// 비밀번호 변경.
///
/// 인증된 회원 본인의 비밀번호만 변경할 수 있습니다.
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "비밀번호 변경 성공"),
        (status = 400, description = "비밀번호 전제조건 위반", body = crate::error::ApiErrorResponse),
        (status = 401, description = "인증 필요", body = crate::error::ApiErrorResponse),
    )
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    AuthUser(user): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let path = uri.path();
    request
        .validate()
        .map_err(|e| ApiError::from_validation(e, path))?;

    state
        .sessions
        .change_password(&user.username, &request.old_password, &request.new_password)
        .await
        .map_err(|e| ApiError::of(e, path))?;

    Ok(response::ok((), "비밀번호 변경 성공", path))
}

/// 토큰 쿠키 두 개를 응답에 추가합니다.
fn append_token_cookies(state: &AppState, headers: &mut HeaderMap, pair: &TokenPair) {
    headers.append(
        SET_COOKIE,
        build_cookie(
            ACCESS_COOKIE_NAME,
            &pair.access_token,
            "/",
            state.codec.access_ttl_secs(),
            state.cookies.secure,
        ),
    );
    headers.append(
        SET_COOKIE,
        build_cookie(
            REFRESH_COOKIE_NAME,
            &pair.refresh_token,
            REFRESH_COOKIE_PATH,
            state.codec.refresh_ttl_secs(),
            state.cookies.secure,
        ),
    );
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/refresh", post(refresh))
        .route("/change-password", post(change_password))
}
