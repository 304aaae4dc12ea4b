//! 통합 성공 응답 봉투.
//!
//! 모든 성공 응답은 `{timestamp, status, message, data, path}` 형태로
//! 내려갑니다. 에러 봉투는 [`crate::error`]에 있습니다.

use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 통합 성공 봉투.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccessResponse<T> {
    /// 응답 생성 시각
    pub timestamp: DateTime<Utc>,
    /// HTTP 상태 코드
    pub status: u16,
    /// 결과 메시지
    pub message: String,
    /// 페이로드
    pub data: T,
    /// 요청 경로
    pub path: String,
}

/// 지정한 상태 코드로 성공 봉투를 만듭니다.
pub fn with_status<T: Serialize>(
    status: StatusCode,
    data: T,
    message: &str,
    path: &str,
) -> (StatusCode, Json<ApiSuccessResponse<T>>) {
    (
        status,
        Json(ApiSuccessResponse {
            timestamp: Utc::now(),
            status: status.as_u16(),
            message: message.to_string(),
            data,
            path: path.to_string(),
        }),
    )
}

/// 200 OK 성공 봉투.
pub fn ok<T: Serialize>(
    data: T,
    message: &str,
    path: &str,
) -> (StatusCode, Json<ApiSuccessResponse<T>>) {
    with_status(StatusCode::OK, data, message, path)
}

/// 201 Created 성공 봉투.
pub fn created<T: Serialize>(
    data: T,
    message: &str,
    path: &str,
) -> (StatusCode, Json<ApiSuccessResponse<T>>) {
    with_status(StatusCode::CREATED, data, message, path)
}
