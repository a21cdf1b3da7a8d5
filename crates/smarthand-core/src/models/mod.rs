//! SmartHand 도메인 모델.
//!
//! 백엔드와 주고받는 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다 (선택 파일 제외).

pub mod document;
pub mod export;
pub mod extraction;
