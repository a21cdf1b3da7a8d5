//! # smarthand-workflow
//!
//! 문서 업로드 → 추출 결과 표시/편집 → 다운로드 흐름.
//!
//! 상태는 [`state::AppState`] 스냅샷 하나로 표현되고, 모든 변경은
//! [`state::Action`]을 리듀서에 통과시켜 새 스냅샷으로 교체한다.
//! [`session::Session`]이 리듀서와 네트워크/저장소 포트를 묶는다.

pub mod download;
pub mod notification;
pub mod saver;
pub mod session;
pub mod state;
pub mod validator;
pub mod view;
