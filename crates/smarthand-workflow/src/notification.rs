//! 일시 알림.
//!
//! 성공/에러 메시지를 고정 시간 동안만 보관한다 (기본 3초/5초).
//! 만료는 `tokio::time::Instant` 기준이라 테스트에서 시간을 멈출 수 있다.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// 알림을 발생시킨 영역
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationScope {
    /// 파일 선택/업로드
    Upload,
    /// 결과 패널 (복사, 편집)
    Results,
    /// 다운로드 버튼
    Download,
}

/// 표시 중인 알림
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub scope: NotificationScope,
    pub message: String,
    pub expires_at: Instant,
}

/// 알림 보관소
#[derive(Debug)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    next_id: u64,
    success_ttl: Duration,
    error_ttl: Duration,
}

impl NotificationCenter {
    /// 표시 시간을 지정해 생성
    pub fn new(success_ttl: Duration, error_ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            success_ttl,
            error_ttl,
        }
    }

    /// 성공 알림 추가
    pub fn success(&mut self, scope: NotificationScope, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, scope, message.into())
    }

    /// 에러 알림 추가
    pub fn error(&mut self, scope: NotificationScope, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, scope, message.into())
    }

    fn push(&mut self, kind: NotificationKind, scope: NotificationScope, message: String) -> u64 {
        let ttl = match kind {
            NotificationKind::Success => self.success_ttl,
            NotificationKind::Error => self.error_ttl,
        };
        match kind {
            NotificationKind::Success => info!(scope = ?scope, "{message}"),
            NotificationKind::Error => warn!(scope = ?scope, "{message}"),
        }

        // 같은 영역의 같은 종류 알림은 하나만 유지
        self.items.retain(|n| !(n.scope == scope && n.kind == kind));

        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notification {
            id,
            kind,
            scope,
            message,
            expires_at: Instant::now() + ttl,
        });
        id
    }

    /// 만료되지 않은 알림 (만료된 항목은 제거)
    pub fn active(&mut self) -> Vec<Notification> {
        let now = Instant::now();
        self.items.retain(|n| n.expires_at > now);
        self.items.clone()
    }

    /// 전체 제거
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(5))
    }
}
