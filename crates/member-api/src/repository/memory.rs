//! 인메모리 저장소.
//!
//! DB 없이 세션/미들웨어/라우터를 테스트하기 위한 [`MemberStore`]
//! 구현입니다. 유니크 검사와 삽입을 하나의 잠금 아래에서 수행하므로
//! 동시 가입 경합 의미론이 Postgres 구현과 동일하게 관찰됩니다.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use member_core::{
    Member, MemberStore, NewMember, Page, PageRequest, Role, RoleName, StoreError, StoreResult,
};

struct Inner {
    members: Vec<Member>,
    roles: Vec<Role>,
    next_member_id: i64,
    password_updates: usize,
}

/// 인메모리 회원 저장소.
pub struct InMemoryMemberStore {
    inner: Mutex<Inner>,
}

impl InMemoryMemberStore {
    /// 세 역할 행이 시딩된 저장소 생성.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                members: Vec::new(),
                roles: vec![
                    Role { id: 1, name: RoleName::Admin },
                    Role { id: 2, name: RoleName::Customer },
                    Role { id: 3, name: RoleName::Support },
                ],
                next_member_id: 1,
                password_updates: 0,
            }),
        }
    }

    /// 역할 행이 없는 저장소 생성 (RoleNotFound 경로 테스트용).
    pub fn without_roles() -> Self {
        let store = Self::new();
        store.inner.try_lock().expect("새 저장소는 잠겨 있지 않음").roles.clear();
        store
    }

    /// 지금까지의 비밀번호 갱신 횟수.
    pub async fn password_update_count(&self) -> usize {
        self.inner.lock().await.password_updates
    }
}

impl Default for InMemoryMemberStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_keyword(member: &Member, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    member.username.to_lowercase().contains(&keyword)
        || member.full_name.to_lowercase().contains(&keyword)
        || member.email.to_lowercase().contains(&keyword)
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Member>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .members
            .iter()
            .find(|m| m.is_active && m.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Member>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .members
            .iter()
            .find(|m| m.is_active && m.id == id)
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner
            .members
            .iter()
            .any(|m| m.is_active && m.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.members.iter().any(|m| m.is_active && m.email == email))
    }

    async fn find_role_by_name(&self, name: RoleName) -> StoreResult<Option<Role>> {
        let inner = self.inner.lock().await;
        Ok(inner.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn insert_member(&self, member: NewMember) -> StoreResult<Member> {
        // 검사와 삽입이 같은 잠금 아래에 있어 동시 가입 중 하나만 성공합니다
        let mut inner = self.inner.lock().await;

        if inner
            .members
            .iter()
            .any(|m| m.is_active && m.username == member.username)
        {
            return Err(StoreError::DuplicateUsername);
        }
        if inner
            .members
            .iter()
            .any(|m| m.is_active && m.email == member.email)
        {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let stored = Member {
            id: inner.next_member_id,
            username: member.username,
            email: member.email,
            password_hash: member.password_hash,
            full_name: member.full_name,
            phone: member.phone,
            address: member.address,
            gender: member.gender,
            image_url: member.image_url,
            role: member.role,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        inner.next_member_id += 1;
        inner.members.push(stored.clone());
        Ok(stored)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let member = inner
            .members
            .iter_mut()
            .find(|m| m.is_active && m.username == username)
            .ok_or_else(|| StoreError::Backend("대상 회원이 없습니다".to_string()))?;

        member.password_hash = password_hash.to_string();
        member.updated_at = Utc::now();
        inner.password_updates += 1;
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        match inner.members.iter_mut().find(|m| m.is_active && m.id == id) {
            Some(member) => {
                member.soft_delete();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn search_page(
        &self,
        keyword: Option<&str>,
        request: PageRequest,
    ) -> StoreResult<Page<Member>> {
        let request = request.normalized();
        let inner = self.inner.lock().await;

        let mut matched: Vec<Member> = inner
            .members
            .iter()
            .filter(|m| m.is_active)
            .filter(|m| keyword.map_or(true, |kw| matches_keyword(m, kw)))
            .cloned()
            .collect();
        matched.sort_by_key(|m| m.id);

        let total = matched.len() as u64;
        let items: Vec<Member> = matched
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .collect();

        Ok(Page::new(items, request, total))
    }
}
