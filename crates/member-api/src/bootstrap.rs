//! 초기 데이터 시딩.
//!
//! 시작 시 역할 행 세 개를 보장하고, 관리자 계정이 없으면 기본
//! 관리자를 생성합니다. 가입 API로는 관리자 계정을 만들 수 없으므로
//! 최초 관리자는 여기서만 만들어집니다.

use anyhow::Context;
use tracing::{info, warn};

use member_core::{BootstrapConfig, MemberStore, NewMember, RoleName};

use crate::auth::password::hash_password;
use crate::repository::PgMemberStore;

/// 기본 설정에 들어 있는 관리자 비밀번호.
const DEFAULT_ADMIN_PASSWORD: &str = "admin@123456";

/// 역할/관리자 시딩 실행.
pub async fn seed(store: &PgMemberStore, config: &BootstrapConfig) -> anyhow::Result<()> {
    for role in [RoleName::Admin, RoleName::Customer, RoleName::Support] {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role.as_str())
            .execute(store.pool())
            .await
            .with_context(|| format!("역할 시딩 실패: {role}"))?;
    }

    if store.exists_by_username(&config.admin_username).await? {
        return Ok(());
    }

    if config.admin_password == DEFAULT_ADMIN_PASSWORD {
        warn!("기본 관리자 비밀번호가 사용 중입니다. MEMBER__BOOTSTRAP__ADMIN_PASSWORD로 교체하세요.");
    }

    let password_hash =
        hash_password(&config.admin_password).context("관리자 비밀번호 해싱 실패")?;

    store
        .insert_member(NewMember {
            username: config.admin_username.clone(),
            email: config.admin_email.clone(),
            password_hash,
            full_name: "System Administrator".to_string(),
            phone: None,
            address: None,
            gender: None,
            image_url: None,
            role: RoleName::Admin,
        })
        .await
        .context("기본 관리자 생성 실패")?;

    info!(username = %config.admin_username, "기본 관리자 계정 생성");
    Ok(())
}
