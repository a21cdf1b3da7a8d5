//! 터미널 출력 포맷.

use smarthand_workflow::notification::{Notification, NotificationKind};
use smarthand_workflow::view::{ResultView, UploadView};
use std::fmt::Write;

const RULE: &str = "────────────────────────────────────────";

/// 업로드 영역 (파일 카드, 진행률, 인라인 에러)
pub fn upload_panel(view: &UploadView) -> String {
    let mut out = String::new();
    match &view.file {
        Some(card) => {
            let _ = writeln!(out, "[{}] {} ({})", card.kind, card.name, card.size_label);
        }
        None => out.push_str("선택된 파일 없음\n"),
    }
    if let Some(progress) = view.progress {
        let _ = writeln!(out, "업로드 중... {progress}%");
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {error}");
    }
    out
}

/// 결과 패널
pub fn result_panel(view: &ResultView) -> String {
    let mut out = String::new();
    let title = if view.is_editing {
        "추출 텍스트 (편집 중)"
    } else if view.is_edited {
        "추출 텍스트 (편집됨)"
    } else {
        "추출 텍스트"
    };

    let _ = writeln!(out, "{RULE}\n{title}: {}\n{RULE}", view.char_count_label);
    let _ = writeln!(out, "{}", view.text);

    if !view.fields.is_empty() {
        let _ = writeln!(out, "{RULE}");
        let width = view.fields.iter().map(|f| f.label.len()).max().unwrap_or(0);
        for field in &view.fields {
            let _ = writeln!(out, "{:width$}  {}", field.label, field.value);
        }
    }

    let mut stats = Vec::new();
    if let Some(n) = view.entity_count {
        stats.push(format!("entities: {n}"));
    }
    if let Some(n) = view.table_count {
        stats.push(format!("tables: {n}"));
    }
    if !stats.is_empty() {
        let _ = writeln!(out, "{}", stats.join(", "));
    }

    if !view.downloads.is_empty() {
        let buttons: Vec<String> = view
            .downloads
            .iter()
            .map(|b| {
                let mark = if b.pending {
                    "…"
                } else if b.enabled {
                    ""
                } else {
                    " (비활성)"
                };
                format!("{} - {}{}", b.format_id, b.label, mark)
            })
            .collect();
        let _ = writeln!(out, "{RULE}\n다운로드: {}", buttons.join(" | "));
    }
    out
}

/// 알림 목록
pub fn notifications(items: &[Notification]) -> String {
    items
        .iter()
        .map(|n| match n.kind {
            NotificationKind::Success => format!("✓ {}\n", n.message),
            NotificationKind::Error => format!("✗ {}\n", n.message),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthand_core::models::export::ExportFormat;
    use smarthand_workflow::view::{DownloadButton, FieldRow, FileCard};

    fn result_view() -> ResultView {
        ResultView {
            text: "Total: $100".to_string(),
            is_editing: false,
            is_edited: false,
            char_count: 11,
            char_count_label: "11 characters extracted".to_string(),
            fields: vec![FieldRow {
                key: "totalAmount".to_string(),
                label: "TOTAL AMOUNT".to_string(),
                value: "100".to_string(),
            }],
            entity_count: None,
            table_count: Some(2),
            downloads: vec![DownloadButton {
                format_id: "csv".to_string(),
                format: Some(ExportFormat::Csv),
                label: "Comma-separated values".to_string(),
                enabled: true,
                pending: false,
            }],
        }
    }

    #[test]
    fn result_panel_lists_everything() {
        let out = result_panel(&result_view());
        assert!(out.contains("11 characters extracted"));
        assert!(out.contains("Total: $100"));
        assert!(out.contains("TOTAL AMOUNT  100"));
        assert!(out.contains("tables: 2"));
        assert!(!out.contains("entities"));
        assert!(out.contains("csv - Comma-separated values"));
    }

    #[test]
    fn disabled_button_is_marked() {
        let mut view = result_view();
        view.is_editing = true;
        view.downloads[0].enabled = false;
        let out = result_panel(&view);
        assert!(out.contains("편집 중"));
        assert!(out.contains("(비활성)"));
    }

    #[test]
    fn upload_panel_shows_progress_and_error() {
        let view = UploadView {
            file: Some(FileCard {
                name: "invoice.pdf".to_string(),
                size_label: "2 MB".to_string(),
                kind: "PDF".to_string(),
            }),
            progress: Some(42),
            can_upload: false,
            error: None,
        };
        let out = upload_panel(&view);
        assert!(out.contains("[PDF] invoice.pdf (2 MB)"));
        assert!(out.contains("42%"));

        let empty = UploadView {
            file: None,
            progress: None,
            can_upload: false,
            error: Some("File type not supported".to_string()),
        };
        assert!(upload_panel(&empty).contains("! File type not supported"));
    }
}
