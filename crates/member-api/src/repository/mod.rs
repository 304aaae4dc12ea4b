//! 저장소 구현.
//!
//! `member-core`의 [`MemberStore`](member_core::MemberStore) 트레이트를
//! 구현하는 어댑터들입니다. 운영 환경은 Postgres, 테스트는 인메모리
//! 구현을 사용합니다.

pub mod members;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use members::PgMemberStore;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryMemberStore;
