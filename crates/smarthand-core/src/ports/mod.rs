//! 포트 인터페이스 (trait).
//!
//! 어댑터 crate가 이 trait들을 구현하며,
//! `smarthand-app`에서 `Arc<dyn T>`로 와이어링한다.

pub mod clipboard;
pub mod extraction_api;
pub mod file_saver;
