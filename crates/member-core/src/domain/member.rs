//! 회원 엔티티.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::RoleName;

/// 저장된 회원 (Principal).
///
/// `password_hash`는 단방향 해시(PHC 문자열)이며, 평문 비밀번호는 생성
/// 이후 어디에도 저장/전송되지 않습니다. 응답 DTO 변환 시 해시는 제외됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// 회원 id
    pub id: i64,
    /// 사용자 이름 (활성 회원 중 유니크)
    pub username: String,
    /// 이메일 (활성 회원 중 유니크)
    pub email: String,
    /// 비밀번호 해시 (PHC 형식)
    pub password_hash: String,
    /// 전체 이름
    pub full_name: String,
    /// 전화번호
    pub phone: Option<String>,
    /// 주소
    pub address: Option<String>,
    /// 성별
    pub gender: Option<String>,
    /// 프로필 이미지 URL
    pub image_url: Option<String>,
    /// 부여된 역할 (항상 정확히 하나)
    pub role: RoleName,
    /// 활성 여부 - false이면 소프트 삭제된 상태
    pub is_active: bool,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 마지막 수정 시각
    pub updated_at: DateTime<Utc>,
    /// 소프트 삭제 시각
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Member {
    /// 소프트 삭제 처리.
    ///
    /// 행을 물리적으로 제거하지 않고 비활성 플래그와 삭제 시각만 기록합니다.
    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.deleted_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }
}

/// 회원가입으로 생성되는 신규 회원.
///
/// id와 타임스탬프는 저장소가 부여합니다.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub image_url: Option<String>,
    pub role: RoleName,
}

/// 인증 관점의 회원 뷰.
///
/// 저장 엔티티와 인증 주체를 분리합니다. 자격 증명 검증과 요청 인증
/// 필터는 이 트레이트만 요구하므로, 영속 엔티티가 인증 프레임워크
/// 세부 사항을 알 필요가 없습니다.
pub trait AuthIdentity {
    /// 토큰 주체로 쓰이는 사용자 이름.
    fn username(&self) -> &str;
    /// 저장된 비밀번호 해시.
    fn password_hash(&self) -> &str;
    /// 부여된 역할.
    fn role(&self) -> RoleName;
    /// 인증 가능한 상태인지 (소프트 삭제된 계정은 인증 불가).
    fn is_enabled(&self) -> bool;
}

impl AuthIdentity for Member {
    fn username(&self) -> &str {
        &self.username
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }

    fn role(&self) -> RoleName {
        self.role
    }

    fn is_enabled(&self) -> bool {
        self.is_active
    }
}
