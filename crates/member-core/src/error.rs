//! 멤버십 시스템의 에러 타입.
//!
//! 모든 예상된 비즈니스 실패는 [`MemberError`] 하나로 표현되며,
//! 각 변형은 기계가 읽을 수 있는 분류 코드를 가집니다.
//! HTTP 상태 코드 매핑은 API 크레이트에서 처리합니다.

use thiserror::Error;

use crate::domain::store::StoreError;

/// 핵심 비즈니스 에러.
#[derive(Debug, Error)]
pub enum MemberError {
    /// 로그인 실패 - 알 수 없는 사용자와 잘못된 비밀번호를 구분하지 않습니다
    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 회원가입 시 사용자 이름 중복
    #[error("이미 사용 중인 사용자 이름입니다")]
    UsernameExists,

    /// 회원가입 시 이메일 중복
    #[error("이미 사용 중인 이메일입니다")]
    EmailExists,

    /// 대상 회원이 존재하지 않음
    #[error("회원을 찾을 수 없습니다")]
    PrincipalNotFound,

    /// 저장소에 역할 행이 없음 (데이터 정합성 결함)
    #[error("역할을 찾을 수 없습니다")]
    RoleNotFound,

    /// 인증은 되었으나 역할 권한이 부족함
    #[error("이 작업을 수행할 권한이 없습니다")]
    RoleAccessDenied,

    /// 리프레시 토큰이 비어 있거나 전달되지 않음
    #[error("리프레시 토큰이 없습니다")]
    MissingToken,

    /// 토큰 서명/주체/만료 검증 실패
    #[error("토큰이 만료되었거나 유효하지 않습니다")]
    TokenInvalidOrExpired,

    /// 인증되지 않은 요청이 보호된 리소스에 접근함
    #[error("인증이 필요합니다")]
    UnauthorizedAccess,

    /// 비밀번호 변경 시 기존 비밀번호 불일치
    #[error("기존 비밀번호가 올바르지 않습니다")]
    OldPasswordMismatch,

    /// 새 비밀번호가 기존 비밀번호와 동일함
    #[error("새 비밀번호는 기존 비밀번호와 달라야 합니다")]
    NewPasswordSameAsOld,

    /// 비밀번호 최소 요건 미달
    #[error("비밀번호 요건을 충족하지 않습니다: {0}")]
    WeakPassword(&'static str),

    /// 내부 에러 - 상세 내용은 서버 로그에만 남기고 클라이언트에는 노출하지 않습니다
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 멤버십 작업을 위한 Result 타입.
pub type MemberResult<T> = Result<T, MemberError>;

impl MemberError {
    /// 분류 코드 반환.
    ///
    /// 클라이언트가 메시지 파싱 없이 에러 종류를 식별할 수 있는 짧은 코드입니다.
    pub fn code(&self) -> &'static str {
        match self {
            MemberError::InvalidCredentials => "U40101",
            MemberError::UsernameExists => "U40901",
            MemberError::EmailExists => "U40902",
            MemberError::PrincipalNotFound => "U40401",
            MemberError::RoleNotFound => "R40401",
            MemberError::RoleAccessDenied => "R40301",
            MemberError::MissingToken => "A40101",
            MemberError::TokenInvalidOrExpired => "A40301",
            MemberError::UnauthorizedAccess => "A40102",
            MemberError::OldPasswordMismatch => "P40001",
            MemberError::NewPasswordSameAsOld => "P40002",
            MemberError::WeakPassword(_) => "P40003",
            MemberError::Internal(_) => "S50001",
        }
    }

    /// 서버 측 결함인지 확인합니다 (error 레벨 로깅 대상).
    pub fn is_internal(&self) -> bool {
        matches!(self, MemberError::Internal(_))
    }
}

impl From<StoreError> for MemberError {
    /// 저장소 에러를 비즈니스 에러로 변환합니다.
    ///
    /// check-then-write 경합으로 저장소가 유니크 위반을 보고한 경우에도
    /// 일반 실패가 아닌 중복 에러로 번역됩니다.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => MemberError::UsernameExists,
            StoreError::DuplicateEmail => MemberError::EmailExists,
            StoreError::Backend(msg) => MemberError::Internal(msg),
        }
    }
}
