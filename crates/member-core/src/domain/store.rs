//! 영속성 경계.
//!
//! 회원/역할 저장소는 외부 협력자이며, 코어는 이 트레이트를 통해서만
//! 접근합니다. 구현체는 API 크레이트의 repository 모듈에 있습니다.

use async_trait::async_trait;
use thiserror::Error;

use super::member::{Member, NewMember};
use super::page::{Page, PageRequest};
use super::role::{Role, RoleName};

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 사용자 이름 유니크 제약 위반
    #[error("사용자 이름이 이미 존재합니다")]
    DuplicateUsername,

    /// 이메일 유니크 제약 위반
    #[error("이메일이 이미 존재합니다")]
    DuplicateEmail,

    /// 그 외 백엔드 실패
    #[error("저장소 에러: {0}")]
    Backend(String),
}

/// 저장소 작업을 위한 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;

/// 회원/역할 저장소.
///
/// 인증 관련 조회(`find_by_username`, 유니크 검사)는 활성 회원만
/// 대상으로 합니다. `insert_member`는 유니크 검사와 쓰기를 하나의
/// 트랜잭션으로 관찰해야 하며, 경합 시 유니크 위반을
/// [`StoreError::DuplicateUsername`] / [`StoreError::DuplicateEmail`]로
/// 보고해야 합니다.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// 사용자 이름으로 활성 회원 조회.
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Member>>;

    /// id로 활성 회원 조회.
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Member>>;

    /// 활성 회원 중 사용자 이름 존재 여부.
    async fn exists_by_username(&self, username: &str) -> StoreResult<bool>;

    /// 활성 회원 중 이메일 존재 여부.
    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    /// 역할 이름으로 역할 행 조회.
    async fn find_role_by_name(&self, name: RoleName) -> StoreResult<Option<Role>>;

    /// 신규 회원 저장 (트랜잭션).
    async fn insert_member(&self, member: NewMember) -> StoreResult<Member>;

    /// 비밀번호 해시 갱신.
    async fn update_password(&self, username: &str, password_hash: &str) -> StoreResult<()>;

    /// 소프트 삭제. 대상이 있었으면 true를 반환합니다.
    async fn soft_delete(&self, id: i64) -> StoreResult<bool>;

    /// 키워드 검색 + 페이지네이션.
    ///
    /// 키워드는 사용자 이름/전체 이름/이메일에 대해 부분 일치로 비교합니다.
    async fn search_page(
        &self,
        keyword: Option<&str>,
        request: PageRequest,
    ) -> StoreResult<Page<Member>>;

    /// 저장소 연결 상태 확인 (readiness probe용).
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
