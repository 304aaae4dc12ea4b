//! 회원 관리 endpoint.
//!
//! 역할로 보호되는 회원 목록/상세/삭제 API를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/members` - 키워드 검색 + 페이지네이션 (상담원 이상)
//! - `GET /api/v1/members/{id}` - 회원 상세 (상담원 이상)
//! - `DELETE /api/v1/members/{id}` - 소프트 삭제 (관리자)

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use member_core::{Member, MemberError, PageRequest, RoleName, DEFAULT_PAGE_SIZE};

use crate::auth::middleware::{AdminUser, StaffUser};
use crate::error::{ApiError, ApiResult};
use crate::response;
use crate::state::AppState;

// ==================== 응답 타입 ====================

/// 회원 응답 DTO.
///
/// 비밀번호 해시는 절대 포함되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    /// 회원 id
    pub id: i64,
    /// 사용자 이름
    pub username: String,
    /// 이메일
    pub email: String,
    /// 전체 이름
    pub full_name: String,
    /// 전화번호
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// 주소
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// 성별
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// 프로필 이미지 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 역할 이름
    #[schema(value_type = String)]
    pub role: RoleName,
    /// 활성 여부
    pub is_active: bool,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            username: member.username,
            email: member.email,
            full_name: member.full_name,
            phone: member.phone,
            address: member.address,
            gender: member.gender,
            image_url: member.image_url,
            role: member.role,
            is_active: member.is_active,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

/// 회원 검색 쿼리.
#[derive(Debug, Deserialize, IntoParams)]
pub struct MemberSearchQuery {
    /// 페이지 번호 (0부터 시작)
    #[serde(default)]
    pub page: u32,
    /// 페이지 크기 (최대 100)
    #[serde(default = "default_page_size")]
    pub size: u32,
    /// 검색 키워드 (사용자 이름/이름/이메일 부분 일치)
    #[serde(default)]
    pub keyword: Option<String>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

// ==================== Handler ====================

/// 회원 목록 조회.
#[utoipa::path(
    get,
    path = "/api/v1/members",
    tag = "members",
    params(MemberSearchQuery),
    responses(
        (status = 200, description = "회원 페이지 반환"),
        (status = 401, description = "인증 필요", body = crate::error::ApiErrorResponse),
        (status = 403, description = "권한 부족", body = crate::error::ApiErrorResponse),
    )
)]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    StaffUser(_user): StaffUser,
    Query(query): Query<MemberSearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let path = uri.path();
    let keyword = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|kw| !kw.is_empty());

    let page = state
        .store
        .search_page(
            keyword,
            PageRequest {
                page: query.page,
                size: query.size,
            },
        )
        .await
        .map_err(|e| ApiError::of(MemberError::from(e), path))?;

    Ok(response::ok(
        page.map(MemberResponse::from),
        "회원 목록 조회 성공",
        path,
    ))
}

/// 회원 상세 조회.
#[utoipa::path(
    get,
    path = "/api/v1/members/{id}",
    tag = "members",
    params(("id" = i64, Path, description = "회원 id")),
    responses(
        (status = 200, description = "회원 상세 반환"),
        (status = 404, description = "회원 없음", body = crate::error::ApiErrorResponse),
    )
)]
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    StaffUser(_user): StaffUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let path = uri.path();

    let member = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::of(MemberError::from(e), path))?
        .ok_or_else(|| ApiError::of(MemberError::PrincipalNotFound, path))?;

    Ok(response::ok(
        MemberResponse::from(member),
        "회원 조회 성공",
        path,
    ))
}

/// 회원 소프트 삭제.
///
/// 행을 물리적으로 제거하지 않고 비활성 처리합니다.
#[utoipa::path(
    delete,
    path = "/api/v1/members/{id}",
    tag = "members",
    params(("id" = i64, Path, description = "회원 id")),
    responses(
        (status = 200, description = "삭제 성공"),
        (status = 403, description = "관리자 아님", body = crate::error::ApiErrorResponse),
        (status = 404, description = "회원 없음", body = crate::error::ApiErrorResponse),
    )
)]
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    AdminUser(_user): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let path = uri.path();

    let deleted = state
        .store
        .soft_delete(id)
        .await
        .map_err(|e| ApiError::of(MemberError::from(e), path))?;

    if !deleted {
        return Err(ApiError::of(MemberError::PrincipalNotFound, path));
    }

    Ok(response::ok((), "회원 삭제 성공", path))
}

/// 회원 관리 라우터 생성.
pub fn members_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_members))
        .route("/{id}", get(get_member).delete(delete_member))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::password::hash_password;
    use crate::routes::create_router;
    use crate::state::{create_test_state, AppState};
    use member_core::NewMember;

    /// 지정한 역할의 회원을 저장소에 직접 심고 액세스 토큰을 돌려줍니다.
    async fn seed_member(state: &AppState, username: &str, role: RoleName) -> String {
        state
            .store
            .insert_member(NewMember {
                username: username.to_string(),
                email: format!("{username}@x.com"),
                password_hash: hash_password("password1").unwrap(),
                full_name: format!("{username} 회원"),
                phone: None,
                address: None,
                gender: None,
                image_url: None,
                role,
            })
            .await
            .unwrap();

        state.codec.issue_access_token(username, role).unwrap()
    }

    async fn send(
        app: &axum::Router,
        method: &str,
        uri: &str,
        bearer: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let response = app
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    #[tokio::test]
    async fn test_list_requires_authentication() {
        let state = Arc::new(create_test_state());
        let app = create_router(state);

        let (status, body) = send(&app, "GET", "/api/v1/members", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "A40102");
    }

    #[tokio::test]
    async fn test_customer_cannot_list_members() {
        let state = Arc::new(create_test_state());
        let app = create_router(state.clone());
        let token = seed_member(&state, "casual", RoleName::Customer).await;

        let (status, body) = send(&app, "GET", "/api/v1/members", Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "R40301");
    }

    #[tokio::test]
    async fn test_support_can_list_and_search() {
        let state = Arc::new(create_test_state());
        let app = create_router(state.clone());
        let token = seed_member(&state, "helper", RoleName::Support).await;
        seed_member(&state, "alice", RoleName::Customer).await;
        seed_member(&state, "bob", RoleName::Customer).await;

        let (status, body) = send(&app, "GET", "/api/v1/members", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_elements"], 3);

        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/members?keyword=ali&page=0&size=10",
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_elements"], 1);
        assert_eq!(body["data"]["items"][0]["username"], "alice");
        // DTO에 비밀번호 해시가 없습니다
        assert!(body["data"]["items"][0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_get_member_detail_and_not_found() {
        let state = Arc::new(create_test_state());
        let app = create_router(state.clone());
        let token = seed_member(&state, "helper", RoleName::Support).await;

        let (status, body) = send(&app, "GET", "/api/v1/members/1", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "helper");

        let (status, body) = send(&app, "GET", "/api/v1/members/999", Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "U40401");
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let state = Arc::new(create_test_state());
        let app = create_router(state.clone());
        let support_token = seed_member(&state, "helper", RoleName::Support).await;
        let admin_token = seed_member(&state, "boss", RoleName::Admin).await;
        seed_member(&state, "alice", RoleName::Customer).await;

        // 상담원은 삭제 불가
        let (status, _) = send(&app, "DELETE", "/api/v1/members/3", Some(&support_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // 관리자는 삭제 가능
        let (status, _) = send(&app, "DELETE", "/api/v1/members/3", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);

        // 삭제된 회원은 조회되지 않습니다
        let (status, _) = send(&app, "GET", "/api/v1/members/3", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // 이중 삭제는 404
        let (status, _) = send(&app, "DELETE", "/api/v1/members/3", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleted_member_token_no_longer_authenticates() {
        let state = Arc::new(create_test_state());
        let app = create_router(state.clone());
        let admin_token = seed_member(&state, "boss", RoleName::Admin).await;
        let alice_token = seed_member(&state, "alice", RoleName::Customer).await;

        // alice의 토큰은 삭제 전에는 인증됩니다 (본인 비밀번호 변경 시도로 확인)
        let (status, _) = send(&app, "GET", "/api/v1/members/2", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "DELETE", "/api/v1/members/2", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);

        // 소프트 삭제 후 같은 토큰은 비인증으로 처리됩니다
        let (status, body) = send(&app, "GET", "/api/v1/members", Some(&alice_token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "A40102");
    }
}
