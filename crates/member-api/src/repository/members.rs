//! Postgres 회원 저장소.
//!
//! [`MemberStore`]의 sqlx 기반 구현입니다. 인증 관련 조회와 유니크
//! 검사는 모두 활성 회원(`is_active = TRUE`)만 대상으로 합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use member_core::{
    Member, MemberStore, NewMember, Page, PageRequest, Role, RoleName, StoreError, StoreResult,
};

/// Postgres 회원 저장소.
#[derive(Clone)]
pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    /// 연결 풀로 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 내부 연결 풀 참조 (시딩 등 저장소 외 작업용).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    full_name: String,
    phone: Option<String>,
    address: Option<String>,
    gender: Option<String>,
    image_url: Option<String>,
    role_name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl MemberRow {
    fn into_member(self) -> StoreResult<Member> {
        let role = RoleName::parse(&self.role_name).ok_or_else(|| {
            StoreError::Backend(format!("알 수 없는 역할 이름: {}", self.role_name))
        })?;

        Ok(Member {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            phone: self.phone,
            address: self.address,
            gender: self.gender,
            image_url: self.image_url,
            role,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

const MEMBER_COLUMNS: &str = r#"
    m.id, m.username, m.email, m.password_hash, m.full_name,
    m.phone, m.address, m.gender, m.image_url,
    r.name AS role_name, m.is_active, m.created_at, m.updated_at, m.deleted_at
"#;

/// sqlx 에러를 저장소 에러로 변환.
///
/// 유니크 위반은 제약 이름으로 사용자 이름/이메일을 구분합니다.
fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if constraint.contains("email") {
                return StoreError::DuplicateEmail;
            }
            return StoreError::DuplicateUsername;
        }
    }
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Member>> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM members m \
             JOIN roles r ON r.id = m.role_id \
             WHERE m.username = $1 AND m.is_active = TRUE"
        );

        sqlx::query_as::<_, MemberRow>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .map(MemberRow::into_member)
            .transpose()
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Member>> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM members m \
             JOIN roles r ON r.id = m.role_id \
             WHERE m.id = $1 AND m.is_active = TRUE"
        );

        sqlx::query_as::<_, MemberRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .map(MemberRow::into_member)
            .transpose()
    }

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM members WHERE username = $1 AND is_active = TRUE)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM members WHERE email = $1 AND is_active = TRUE)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn find_role_by_name(&self, name: RoleName) -> StoreResult<Option<Role>> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM roles WHERE name = $1")
                .bind(name.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        row.map(|(id, name)| {
            RoleName::parse(&name)
                .map(|name| Role { id, name })
                .ok_or_else(|| StoreError::Backend(format!("알 수 없는 역할 이름: {name}")))
        })
        .transpose()
    }

    async fn insert_member(&self, member: NewMember) -> StoreResult<Member> {
        // 단일 INSERT가 검사-쓰기 경합의 중재자입니다. 활성 회원에 대한
        // 부분 유니크 인덱스 위반은 중복 에러로 번역됩니다.
        let row: (i64, DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO members
                (username, email, password_hash, full_name, phone, address,
                 gender, image_url, role_id, is_active, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8,
                 (SELECT id FROM roles WHERE name = $9), TRUE, now(), now())
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(&member.username)
        .bind(&member.email)
        .bind(&member.password_hash)
        .bind(&member.full_name)
        .bind(&member.phone)
        .bind(&member.address)
        .bind(&member.gender)
        .bind(&member.image_url)
        .bind(member.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(Member {
            id: row.0,
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
            created_at: row.1,
            updated_at: row.2,
            deleted_at: None,
        })
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE members SET password_hash = $2, updated_at = now() \
             WHERE username = $1 AND is_active = TRUE",
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE members SET is_active = FALSE, deleted_at = now(), updated_at = now() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn search_page(
        &self,
        keyword: Option<&str>,
        request: PageRequest,
    ) -> StoreResult<Page<Member>> {
        let request = request.normalized();
        let pattern = keyword.map(|kw| format!("%{}%", kw.trim()));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM members m \
             WHERE m.is_active = TRUE \
               AND ($1::text IS NULL \
                    OR m.username ILIKE $1 \
                    OR m.full_name ILIKE $1 \
                    OR m.email ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM members m \
             JOIN roles r ON r.id = m.role_id \
             WHERE m.is_active = TRUE \
               AND ($1::text IS NULL \
                    OR m.username ILIKE $1 \
                    OR m.full_name ILIKE $1 \
                    OR m.email ILIKE $1) \
             ORDER BY m.id \
             LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, MemberRow>(&query)
            .bind(&pattern)
            .bind(i64::from(request.size))
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let items = rows
            .into_iter()
            .map(MemberRow::into_member)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page::new(items, request, total as u64))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
