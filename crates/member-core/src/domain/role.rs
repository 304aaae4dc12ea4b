//! 역할 기반 접근 제어.
//!
//! 역할 이름은 닫힌 열거형이며, 저장소에는 id가 부여된 행으로 존재합니다.
//! 역할→회원 역참조 컬렉션은 코어에서 다루지 않습니다.

use serde::{Deserialize, Serialize};

/// 회원 역할.
///
/// 시스템에서 회원의 권한 수준을 정의합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleName {
    /// 관리자 - 회원 관리 전체 권한
    Admin,
    /// 상담원 - 회원 조회 권한
    Support,
    /// 일반 고객 - 기본 역할
    Customer,
}

impl RoleName {
    /// 역할의 우선순위 레벨 반환 (높을수록 더 많은 권한).
    pub fn level(&self) -> u8 {
        match self {
            RoleName::Admin => 100,
            RoleName::Support => 50,
            RoleName::Customer => 10,
        }
    }

    /// 지정한 역할 이상의 권한인지 확인.
    pub fn satisfies(&self, required: RoleName) -> bool {
        self.level() >= required.level()
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(RoleName::Admin),
            "SUPPORT" => Some(RoleName::Support),
            "CUSTOMER" => Some(RoleName::Customer),
            _ => None,
        }
    }

    /// 저장소/클레임에 쓰이는 정식 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "ADMIN",
            RoleName::Support => "SUPPORT",
            RoleName::Customer => "CUSTOMER",
        }
    }

    /// 회원가입 mode 파라미터에서 대상 역할 결정.
    ///
    /// mode가 "support"(대소문자 무시)인 경우에만 상담원 역할을 부여하고,
    /// 그 외에는 기본 역할(고객)을 부여합니다. 관리자 계정은 가입으로
    /// 만들 수 없습니다.
    pub fn from_register_mode(mode: Option<&str>) -> Self {
        match mode {
            Some(m) if m.eq_ignore_ascii_case("SUPPORT") => RoleName::Support,
            _ => RoleName::Customer,
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 저장된 역할 행.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// 역할 id
    pub id: i64,
    /// 역할 이름 (유니크)
    pub name: RoleName,
}
