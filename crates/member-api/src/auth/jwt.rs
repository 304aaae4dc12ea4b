//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 생성/검증 로직.
//!
//! 서명 검증이 유일한 신뢰 경계입니다. 주체 비교와 만료 판정 등 상위
//! 검사는 모두 서명 검증이 성공한 뒤에만 수행되며, 검증되지 않은
//! 페이로드는 절대 들여다보지 않습니다.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use member_core::{AuthConfig, RoleName, MIN_SECRET_LEN};

/// JWT 페이로드.
///
/// 액세스 토큰은 역할 클레임을 포함하고, 리프레시 토큰은 주체와
/// 시각 정보만 가집니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이름
    pub sub: String,
    /// 사용자 역할 (액세스 토큰에만 존재)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleName>,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
}

/// 토큰 생성 에러.
///
/// 검증 실패는 에러가 아니라 부재(`None`/`false`)로 다루므로,
/// 이 타입은 발급 경로에서만 나타납니다.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("서명 비밀 키가 너무 짧습니다 (최소 {MIN_SECRET_LEN}바이트)")]
    SecretTooShort,
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// 토큰 코덱.
///
/// 시작 시 설정에서 한 번 구성되는 불변 객체입니다. 이후에는 동기화
/// 없이 여러 요청에서 동시에 읽어도 안전합니다.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenCodec {
    /// 설정에서 코덱 생성.
    ///
    /// 비밀 키가 너무 짧으면 실패합니다. 시작 시점에 호출되며,
    /// 실패는 프로세스 시작 실패로 이어집니다.
    pub fn new(config: &AuthConfig) -> Result<Self, JwtError> {
        let secret = config.secret.expose_secret();
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::SecretTooShort);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        })
    }

    /// 액세스 토큰 수명 (초).
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// 리프레시 토큰 수명 (초).
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    /// 지정한 수명으로 토큰 발급.
    ///
    /// 페이로드는 주체, 선택적 역할 클레임, 발급/만료 시각을 가집니다.
    pub fn issue(
        &self,
        subject: &str,
        role: Option<RoleName>,
        ttl_secs: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now + ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(JwtError::from)
    }

    /// 액세스 토큰 발급 (역할 클레임 포함).
    pub fn issue_access_token(
        &self,
        subject: &str,
        role: RoleName,
    ) -> Result<String, JwtError> {
        self.issue(subject, Some(role), self.access_ttl_secs)
    }

    /// 리프레시 토큰 발급 (추가 클레임 없음).
    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(subject, None, self.refresh_ttl_secs)
    }

    /// 액세스 + 리프레시 토큰 쌍 발급.
    pub fn issue_token_pair(
        &self,
        subject: &str,
        role: RoleName,
    ) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(subject, role)?,
            refresh_token: self.issue_refresh_token(subject)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl_secs,
        })
    }

    /// 서명 검증 후 클레임 추출.
    ///
    /// 만료 여부는 여기서 판정하지 않습니다. 만료된 토큰의 주체를
    /// 읽어야 하는 리프레시 흐름이 있기 때문이며, 만료는 [`Self::is_valid`]가
    /// 판정합니다. 서명 불일치, 손상된 구조, 지원하지 않는 알고리즘 등
    /// 모든 검증 실패는 에러가 아닌 `None`으로 흡수됩니다 - 만료된
    /// 세션은 예외 상황이 아니라 일상적인 조건입니다.
    pub fn decode_claims(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims)
    }

    /// 토큰 주체 추출.
    pub fn subject_of(&self, token: &str) -> Option<String> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// 토큰 유효성 판정.
    ///
    /// 서명이 검증되고, 주체가 `expected_subject`와 일치하며, 만료 시각이
    /// 현재보다 엄격히 미래인 경우에만 true입니다. 만료 시각이 현재와
    /// 같거나 이전이면 유효하지 않습니다 (시계 오차 허용 없음).
    pub fn is_valid(&self, token: &str, expected_subject: &str) -> bool {
        match self.decode_claims(token) {
            Some(claims) => {
                claims.sub == expected_subject && claims.exp > Utc::now().timestamp()
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn test_codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig {
            secret: SecretString::from(TEST_SECRET.to_string()),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 604_800,
        })
        .unwrap()
    }

    fn codec_with_secret(secret: &str) -> Result<TokenCodec, JwtError> {
        TokenCodec::new(&AuthConfig {
            secret: SecretString::from(secret.to_string()),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 604_800,
        })
    }

    #[test]
    fn test_short_secret_fails_construction() {
        assert!(matches!(
            codec_with_secret("short"),
            Err(JwtError::SecretTooShort)
        ));
    }

    #[test]
    fn test_issue_and_decode_round_trip() {
        let codec = test_codec();
        let token = codec.issue("alice", Some(RoleName::Customer), 60).unwrap();

        let claims = codec.decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Some(RoleName::Customer));
        assert_eq!(claims.exp - claims.iat, 60);

        assert_eq!(codec.subject_of(&token).as_deref(), Some("alice"));
        assert!(codec.is_valid(&token, "alice"));
    }

    #[test]
    fn test_access_token_carries_role_refresh_does_not() {
        let codec = test_codec();

        let access = codec.issue_access_token("alice", RoleName::Support).unwrap();
        assert_eq!(
            codec.decode_claims(&access).unwrap().role,
            Some(RoleName::Support)
        );

        let refresh = codec.issue_refresh_token("alice").unwrap();
        assert_eq!(codec.decode_claims(&refresh).unwrap().role, None);
    }

    #[test]
    fn test_zero_ttl_token_is_invalid_despite_valid_signature() {
        let codec = test_codec();
        let token = codec.issue("alice", None, 0).unwrap();

        // 서명은 검증되므로 주체는 추출 가능
        assert_eq!(codec.subject_of(&token).as_deref(), Some("alice"));
        // 만료가 현재 이전/동일이므로 유효하지 않음
        assert!(!codec.is_valid(&token, "alice"));
    }

    #[test]
    fn test_subject_mismatch_is_invalid() {
        let codec = test_codec();
        let token = codec.issue("alice", None, 60).unwrap();
        assert!(!codec.is_valid(&token, "bob"));
    }

    #[test]
    fn test_garbage_token_yields_absent() {
        let codec = test_codec();
        assert!(codec.decode_claims("not.a.token").is_none());
        assert!(codec.decode_claims("").is_none());
        assert!(!codec.is_valid("garbage", "alice"));
    }

    #[test]
    fn test_tampered_token_yields_absent() {
        let codec = test_codec();
        let token = codec.issue("alice", None, 60).unwrap();
        let mut tampered = token.clone();
        tampered.replace_range(tampered.len() - 4.., "!!!!");

        assert!(codec.decode_claims(&tampered).is_none());
        assert!(!codec.is_valid(&tampered, "alice"));
    }

    #[test]
    fn test_wrong_secret_rejects() {
        let codec = test_codec();
        let other = codec_with_secret("another-secret-key-for-testing-minimum-32ch").unwrap();

        let token = codec.issue("alice", None, 60).unwrap();
        assert!(other.decode_claims(&token).is_none());
        assert!(!other.is_valid(&token, "alice"));
    }

    #[test]
    fn test_token_pair_shape() {
        let codec = test_codec();
        let pair = codec.issue_token_pair("alice", RoleName::Customer).unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 3600);
        assert!(codec.is_valid(&pair.access_token, "alice"));
        assert!(codec.is_valid(&pair.refresh_token, "alice"));
    }

    #[test]
    fn test_expired_refresh_token_subject_still_extractable() {
        let codec = test_codec();
        let token = codec.issue("alice", None, -10).unwrap();

        assert_eq!(codec.subject_of(&token).as_deref(), Some("alice"));
        assert!(!codec.is_valid(&token, "alice"));
    }
}
