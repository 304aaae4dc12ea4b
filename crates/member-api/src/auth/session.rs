//! 세션 관리.
//!
//! 로그인(자격 증명 검증 → 토큰 쌍 발급), 리프레시(리프레시 토큰 검증 →
//! 새 액세스 토큰 발급), 회원가입(유니크 검사 → 해싱 → 저장),
//! 비밀번호 변경을 오케스트레이션합니다.

use std::sync::Arc;

use tracing::info;

use member_core::{
    AuthIdentity, Member, MemberError, MemberResult, MemberStore, NewMember, RoleName,
};

use super::jwt::{TokenCodec, TokenPair};
use super::password::{hash_password, validate_password_strength, verify_password};

/// 회원가입 프로필.
///
/// HTTP 요청 DTO와 분리된 서비스 입력 타입입니다. 비밀번호는 여기서는
/// 아직 평문이며, 저장 전에 해싱됩니다.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub image_url: Option<String>,
}

/// 세션 매니저.
///
/// 저장소와 토큰 코덱을 묶는 얇은 오케스트레이터입니다. 자체 상태가
/// 없으므로 Clone이 저렴합니다.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn MemberStore>,
    codec: Arc<TokenCodec>,
}

impl SessionManager {
    /// 새 세션 매니저 생성.
    pub fn new(store: Arc<dyn MemberStore>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// 로그인.
    ///
    /// 알 수 없는 사용자 이름과 잘못된 비밀번호는 구분되지 않고 동일한
    /// [`MemberError::InvalidCredentials`]로 실패합니다 (사용자 이름
    /// 열거 방지). 성공 시 역할 클레임이 포함된 액세스 토큰과 리프레시
    /// 토큰을 발급합니다.
    pub async fn login(&self, username: &str, password: &str) -> MemberResult<TokenPair> {
        let member = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(MemberError::InvalidCredentials)?;

        verify_password(password, member.password_hash())
            .map_err(|_| MemberError::InvalidCredentials)?;

        let pair = self
            .codec
            .issue_token_pair(member.username(), member.role())
            .map_err(|e| MemberError::Internal(e.to_string()))?;

        info!(username = %member.username, "로그인 성공");
        Ok(pair)
    }

    /// 리프레시 토큰으로 새 액세스 토큰 발급.
    ///
    /// 리프레시 토큰 자체는 회전 없이 그대로 반환됩니다. 서버 측
    /// 폐기 목록도 없으므로, 토큰은 자체 만료로만 무효화됩니다.
    pub async fn refresh(&self, refresh_token: &str) -> MemberResult<TokenPair> {
        if refresh_token.is_empty() {
            return Err(MemberError::MissingToken);
        }

        // 주체 추출은 서명 검증만 수행하므로 만료된 토큰도 여기는 통과하고,
        // 아래 is_valid에서 만료로 거부됩니다
        let subject = self
            .codec
            .subject_of(refresh_token)
            .ok_or(MemberError::TokenInvalidOrExpired)?;

        let member = self
            .store
            .find_by_username(&subject)
            .await?
            .ok_or(MemberError::InvalidCredentials)?;

        if !self.codec.is_valid(refresh_token, member.username()) {
            return Err(MemberError::TokenInvalidOrExpired);
        }

        let access_token = self
            .codec
            .issue_access_token(member.username(), member.role())
            .map_err(|e| MemberError::Internal(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: self.codec.access_ttl_secs(),
        })
    }

    /// 회원가입.
    ///
    /// 사용자 이름/이메일 유니크 검사를 쓰기 전에 각각 수행하고,
    /// `mode`로 대상 역할을 결정한 뒤 (기본 CUSTOMER, "support"만
    /// SUPPORT 허용) 해싱된 비밀번호로 저장합니다. 동시 가입 경합으로
    /// 저장소가 유니크 위반을 보고하면 중복 에러로 번역됩니다.
    pub async fn register(
        &self,
        registration: Registration,
        mode: Option<&str>,
    ) -> MemberResult<Member> {
        validate_password_strength(&registration.password).map_err(MemberError::WeakPassword)?;

        if self.store.exists_by_username(&registration.username).await? {
            return Err(MemberError::UsernameExists);
        }

        if self.store.exists_by_email(&registration.email).await? {
            return Err(MemberError::EmailExists);
        }

        let role_name = RoleName::from_register_mode(mode);
        let role = self
            .store
            .find_role_by_name(role_name)
            .await?
            .ok_or(MemberError::RoleNotFound)?;

        let password_hash = hash_password(&registration.password)
            .map_err(|e| MemberError::Internal(e.to_string()))?;

        let member = self
            .store
            .insert_member(NewMember {
                username: registration.username,
                email: registration.email,
                password_hash,
                full_name: registration.full_name,
                phone: registration.phone,
                address: registration.address,
                gender: registration.gender,
                image_url: registration.image_url,
                role: role.name,
            })
            .await?;

        info!(username = %member.username, role = %member.role, "신규 회원 등록");
        Ok(member)
    }

    /// 비밀번호 변경.
    ///
    /// 새 비밀번호가 기존과 같은지는 평문 비교가 아니라 저장된 해시에
    /// 대한 검증으로 판정합니다. 어떤 실패 경로에서도 저장소 쓰기는
    /// 일어나지 않습니다.
    pub async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> MemberResult<()> {
        let member = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(MemberError::PrincipalNotFound)?;

        verify_password(old_password, member.password_hash())
            .map_err(|_| MemberError::OldPasswordMismatch)?;

        if verify_password(new_password, member.password_hash()).is_ok() {
            return Err(MemberError::NewPasswordSameAsOld);
        }

        validate_password_strength(new_password).map_err(MemberError::WeakPassword)?;

        let new_hash = hash_password(new_password)
            .map_err(|e| MemberError::Internal(e.to_string()))?;

        self.store.update_password(username, &new_hash).await?;

        info!(username = %username, "비밀번호 변경 완료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryMemberStore;
    use member_core::AuthConfig;
    use secrecy::SecretString;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn test_sessions(store: Arc<InMemoryMemberStore>) -> SessionManager {
        let codec = TokenCodec::new(&AuthConfig {
            secret: SecretString::from(TEST_SECRET.to_string()),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 604_800,
        })
        .unwrap();
        SessionManager::new(store, Arc::new(codec))
    }

    fn alice() -> Registration {
        Registration {
            username: "alice".to_string(),
            password: "password1".to_string(),
            full_name: "Alice Kim".to_string(),
            email: "alice@x.com".to_string(),
            phone: Some("01012345678".to_string()),
            address: None,
            gender: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_customer() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);

        let member = sessions.register(alice(), None).await.unwrap();
        assert_eq!(member.role, RoleName::Customer);
        assert_eq!(member.username, "alice");
        // 평문 비밀번호는 어디에도 남지 않습니다
        assert_ne!(member.password_hash, "password1");
        assert!(member.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_support_mode() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);

        let member = sessions.register(alice(), Some("support")).await.unwrap();
        assert_eq!(member.role, RoleName::Support);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);

        sessions.register(alice(), None).await.unwrap();

        let mut other = alice();
        other.email = "other@x.com".to_string();
        let err = sessions.register(other, None).await.unwrap_err();
        assert!(matches!(err, MemberError::UsernameExists));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);

        sessions.register(alice(), None).await.unwrap();

        let mut other = alice();
        other.username = "bob".to_string();
        let err = sessions.register(other, None).await.unwrap_err();
        assert!(matches!(err, MemberError::EmailExists));
    }

    #[tokio::test]
    async fn test_register_missing_role_row() {
        let store = Arc::new(InMemoryMemberStore::without_roles());
        let sessions = test_sessions(store);

        let err = sessions.register(alice(), None).await.unwrap_err();
        assert!(matches!(err, MemberError::RoleNotFound));
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);

        let mut weak = alice();
        weak.password = "short".to_string();
        let err = sessions.register(weak, None).await.unwrap_err();
        assert!(matches!(err, MemberError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn test_concurrent_registration_one_succeeds() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);

        let a = sessions.clone();
        let b = sessions.clone();
        let (left, right) = tokio::join!(
            tokio::spawn(async move { a.register(alice(), None).await }),
            tokio::spawn(async move { b.register(alice(), None).await }),
        );

        let results = [left.unwrap(), right.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    Err(MemberError::UsernameExists) | Err(MemberError::EmailExists)
                )
            })
            .count();

        assert_eq!(ok, 1);
        assert_eq!(dup, 1);
    }

    #[tokio::test]
    async fn test_login_returns_pair_with_subject() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);
        sessions.register(alice(), None).await.unwrap();

        let pair = sessions.login("alice", "password1").await.unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);
        sessions.register(alice(), None).await.unwrap();

        let wrong_password = sessions.login("alice", "wrong-pass1").await.unwrap_err();
        let unknown_user = sessions.login("nobody", "password1").await.unwrap_err();

        assert!(matches!(wrong_password, MemberError::InvalidCredentials));
        assert!(matches!(unknown_user, MemberError::InvalidCredentials));
        // 두 원인 모두 동일한 메시지로 노출됩니다
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_refresh_flow() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);
        sessions.register(alice(), None).await.unwrap();

        let pair = sessions.login("alice", "password1").await.unwrap();
        let refreshed = sessions.refresh(&pair.refresh_token).await.unwrap();

        // 리프레시 토큰은 회전되지 않습니다
        assert_eq!(refreshed.refresh_token, pair.refresh_token);
        assert!(!refreshed.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rejects_missing_and_garbage_tokens() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);
        sessions.register(alice(), None).await.unwrap();

        assert!(matches!(
            sessions.refresh("").await.unwrap_err(),
            MemberError::MissingToken
        ));
        assert!(matches!(
            sessions.refresh("garbage.token.here").await.unwrap_err(),
            MemberError::TokenInvalidOrExpired
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_unknown_subject() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store.clone());
        sessions.register(alice(), None).await.unwrap();

        let pair = sessions.login("alice", "password1").await.unwrap();

        // 회원이 삭제된 뒤의 리프레시 시도
        let id = store.find_by_username("alice").await.unwrap().unwrap().id;
        store.soft_delete(id).await.unwrap();

        assert!(matches!(
            sessions.refresh(&pair.refresh_token).await.unwrap_err(),
            MemberError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_change_password_flow() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);
        sessions.register(alice(), None).await.unwrap();

        sessions
            .change_password("alice", "password1", "password2")
            .await
            .unwrap();

        // 이전 비밀번호로는 더 이상 로그인 불가
        assert!(sessions.login("alice", "password1").await.is_err());
        assert!(sessions.login("alice", "password2").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_old_mismatch() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);
        sessions.register(alice(), None).await.unwrap();

        let err = sessions
            .change_password("alice", "wrong-old1", "password2")
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::OldPasswordMismatch));
    }

    #[tokio::test]
    async fn test_change_password_same_as_old_writes_nothing() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store.clone());
        sessions.register(alice(), None).await.unwrap();

        let err = sessions
            .change_password("alice", "password1", "password1")
            .await
            .unwrap_err();

        assert!(matches!(err, MemberError::NewPasswordSameAsOld));
        assert_eq!(store.password_update_count().await, 0);
    }

    #[tokio::test]
    async fn test_change_password_unknown_user() {
        let store = Arc::new(InMemoryMemberStore::new());
        let sessions = test_sessions(store);

        let err = sessions
            .change_password("nobody", "password1", "password2")
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::PrincipalNotFound));
    }
}
