//! # smarthand-network
//!
//! 추출 서비스 HTTP 어댑터.
//! `ExtractionApi` 포트를 reqwest로 구현하며, 모든 요청/응답을 로깅하고
//! 실패를 `CoreError` 하나로 정규화한다.
//!
//! ```rust,ignore
//! use smarthand_network::http_client::HttpExtractionClient;
//!
//! let client = HttpExtractionClient::from_config(&config)?;
//! let health = client.health().await?;
//! ```

pub mod error_mapping;
pub mod http_client;
