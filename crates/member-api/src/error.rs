//! 통합 API 에러 응답.
//!
//! 모든 엔드포인트는 동일한 에러 봉투를 반환합니다. 예상된 비즈니스
//! 실패([`MemberError`])는 분류 코드와 함께 그대로 내려가고, 예상치 못한
//! 실패는 error 레벨로 로깅된 뒤 상세 내용 없이 S50001로 변환됩니다 -
//! 스택 트레이스나 내부 메시지는 클라이언트에 노출되지 않습니다.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use member_core::MemberError;

/// 통합 에러 봉투.
///
/// # 예시
///
/// ```json
/// {
///   "timestamp": "2025-06-01T12:00:00Z",
///   "status": 401,
///   "error": "Unauthorized",
///   "message": "사용자 이름 또는 비밀번호가 올바르지 않습니다",
///   "code": "U40101",
///   "path": "/auth/login"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 발생 시각
    pub timestamp: DateTime<Utc>,
    /// HTTP 상태 코드
    pub status: u16,
    /// HTTP 상태 문구
    pub error: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 분류 코드 (예: "U40101")
    pub code: String,
    /// 요청 경로
    pub path: String,
    /// 필드별 검증 에러 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, String>>,
}

/// 상태 코드가 결합된 API 에러.
///
/// 핸들러와 추출기의 실패 타입이며, `IntoResponse`로 에러 봉투를
/// 렌더링합니다.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorResponse,
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// 비즈니스 에러를 봉투로 변환합니다.
    ///
    /// 내부 에러는 여기서 전체 컨텍스트와 함께 로깅되고, 클라이언트에는
    /// 일반 메시지만 내려갑니다.
    pub fn of(err: MemberError, path: &str) -> Self {
        let status = status_of(&err);
        let message = if let MemberError::Internal(ref detail) = err {
            error!(path = %path, detail = %detail, "처리되지 않은 내부 에러");
            "일시적인 서버 오류가 발생했습니다".to_string()
        } else {
            err.to_string()
        };

        Self {
            status,
            body: ApiErrorResponse {
                timestamp: Utc::now(),
                status: status.as_u16(),
                error: reason_phrase(status),
                message,
                code: err.code().to_string(),
                path: path.to_string(),
                errors: None,
            },
        }
    }

    /// 요청 본문 검증 실패를 봉투로 변환합니다.
    pub fn from_validation(err: validator::ValidationErrors, path: &str) -> Self {
        let errors: HashMap<String, String> = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "유효하지 않은 값입니다".to_string());
                (field.to_string(), message)
            })
            .collect();

        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorResponse {
                timestamp: Utc::now(),
                status: StatusCode::BAD_REQUEST.as_u16(),
                error: reason_phrase(StatusCode::BAD_REQUEST),
                message: "요청 본문이 유효하지 않습니다".to_string(),
                code: "V40001".to_string(),
                path: path.to_string(),
                errors: Some(errors),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

/// 비즈니스 에러 → HTTP 상태 매핑.
fn status_of(err: &MemberError) -> StatusCode {
    match err {
        MemberError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        MemberError::UsernameExists | MemberError::EmailExists => StatusCode::CONFLICT,
        MemberError::PrincipalNotFound | MemberError::RoleNotFound => StatusCode::NOT_FOUND,
        MemberError::RoleAccessDenied => StatusCode::FORBIDDEN,
        MemberError::MissingToken | MemberError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
        MemberError::TokenInvalidOrExpired => StatusCode::FORBIDDEN,
        MemberError::OldPasswordMismatch
        | MemberError::NewPasswordSameAsOld
        | MemberError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        MemberError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
