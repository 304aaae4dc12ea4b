//! 요청 인증 필터.
//!
//! 모든 인바운드 요청에 대해 한 번 실행됩니다. 토큰 추출(헤더 우선,
//! 쿠키 폴백) → 주체 디코딩 → 회원 로드 + 토큰 검증 → 요청 확장에
//! 인증 컨텍스트 주입 순서로 진행하며, 어느 단계에서 실패하든 요청은
//! 거부되지 않고 비인증 상태로 계속 진행됩니다. 보호 여부는 핸들러의
//! 추출기([`AuthUser`], [`AdminUser`], [`StaffUser`])가 판정합니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use member_core::{AuthIdentity, MemberError, RoleName};

use super::cookie::{get_cookie, ACCESS_COOKIE_NAME};
use crate::error::ApiError;
use crate::state::AppState;

/// 요청 범위 인증 컨텍스트.
///
/// 요청마다 새로 만들어지고 요청 종료와 함께 사라집니다. 전역 싱글턴이
/// 아니라 요청 확장(extensions)으로 전달됩니다.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 회원 id
    pub id: i64,
    /// 사용자 이름 (토큰 주체)
    pub username: String,
    /// 부여된 역할
    pub role: RoleName,
}

/// 헤더에서 토큰 추출.
///
/// `Authorization: Bearer` 헤더를 우선하고, 없으면 액세스 토큰 쿠키로
/// 폴백합니다.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    bearer.or_else(|| get_cookie(headers, ACCESS_COOKIE_NAME))
}

/// 요청 인증 미들웨어.
///
/// 성공 시 [`CurrentUser`]를 요청 확장에 한 번만 주입합니다. 이미
/// 컨텍스트가 있으면 아무 것도 하지 않습니다 (멱등).
pub async fn authenticate_request(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<CurrentUser>().is_some() {
        return next.run(request).await;
    }

    if let Some(user) = resolve_user(&state, request.headers()).await {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// 토큰에서 인증 컨텍스트 해석.
///
/// 단계별 단락: 토큰 없음 / 주체 디코딩 실패 / 회원 없음 / 검증 실패
/// 중 무엇이든 `None`으로 끝나고, 요청은 비인증으로 진행됩니다.
async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = extract_token(headers)?;
    let subject = state.codec.subject_of(&token)?;

    let member = match state.store.find_by_username(&subject).await {
        Ok(found) => found?,
        Err(e) => {
            debug!(error = %e, "인증 중 저장소 조회 실패 - 비인증으로 진행");
            return None;
        }
    };

    if !member.is_enabled() || !state.codec.is_valid(&token, member.username()) {
        return None;
    }

    Some(CurrentUser {
        id: member.id,
        username: member.username,
        role: member.role,
    })
}

/// 에러 봉투에 쓸 요청 경로.
///
/// 중첩 라우터 안에서는 `parts.uri`가 접두사가 제거된 경로이므로,
/// 있으면 원본 URI를 사용합니다.
fn request_path(parts: &Parts) -> String {
    parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string())
}

/// 지정한 역할 이상의 권한을 요구합니다.
pub fn require_role(required: RoleName, user: &CurrentUser) -> Result<(), MemberError> {
    if user.role.satisfies(required) {
        Ok(())
    } else {
        Err(MemberError::RoleAccessDenied)
    }
}

/// 인증된 사용자 추출기.
///
/// 미들웨어가 채운 컨텍스트를 읽습니다. 컨텍스트가 없으면 401 봉투로
/// 거부합니다.
#[derive(Debug, Clone)]
pub struct AuthUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::of(MemberError::UnauthorizedAccess, &request_path(parts)))
    }
}

/// 상담원 이상 권한을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct StaffUser(pub CurrentUser);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        require_role(RoleName::Support, &user)
            .map_err(|e| ApiError::of(e, &request_path(parts)))?;
        Ok(StaffUser(user))
    }
}

/// 관리자 권한을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        require_role(RoleName::Admin, &user)
            .map_err(|e| ApiError::of(e, &request_path(parts)))?;
        Ok(AdminUser(user))
    }
}
