//! 업로드 → 편집 → 다운로드 통합 테스트.
//!
//! 실제 HTTP 클라이언트(mockito 서버)와 로컬 저장소를 세션에 연결해 검증한다.

use mockito::Matcher;
use smarthand_core::config::AppConfig;
use smarthand_core::models::document::SelectedFile;
use smarthand_core::models::export::ExportFormat;
use smarthand_network::http_client::HttpExtractionClient;
use smarthand_workflow::saver::LocalFileSaver;
use smarthand_workflow::session::Session;
use std::path::Path;
use std::sync::Arc;

const INVOICE_RESPONSE: &str = r#"{
    "success": true,
    "data": {
        "rawText": "Total: $100",
        "structuredData": {"invoiceNumber": "INV-2024-001", "totalAmount": "$100"},
        "entities": [{"type": "money", "value": "$100"}],
        "downloadFormats": [
            {"format": "excel", "endpoint": "/api/export/excel", "description": "Excel spreadsheet"},
            {"format": "csv", "endpoint": "/api/export/csv", "description": "CSV file"},
            {"format": "text", "endpoint": "/api/export/text", "description": "Plain text"}
        ]
    }
}"#;

fn session_for(server: &mockito::ServerGuard, out_dir: &Path) -> Session {
    let mut config = AppConfig::default_config();
    config.server.base_url = server.url();
    let api = Arc::new(HttpExtractionClient::from_config(&config).unwrap());
    Session::from_config(&config, api, Arc::new(LocalFileSaver::new(out_dir)))
}

async fn extract_mock(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/api/extract")
        .match_body(Matcher::Regex(r#"name="file"; filename="invoice.pdf""#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(INVOICE_RESPONSE)
        .create_async()
        .await
}

#[tokio::test]
async fn two_megabyte_pdf_is_extracted() {
    let mut server = mockito::Server::new_async().await;
    let mock = extract_mock(&mut server).await;
    let dir = tempfile::tempdir().unwrap();

    let pdf = dir.path().join("invoice.pdf");
    std::fs::write(&pdf, vec![b'%'; 2 * 1024 * 1024]).unwrap();

    let session = session_for(&server, dir.path());
    let validation = session
        .select_file(SelectedFile::open(&pdf).await.unwrap())
        .unwrap();
    assert!(validation.is_valid);
    assert_eq!(session.upload_view().file.unwrap().size_label, "2 MB");

    let result = session.upload().await.unwrap();
    mock.assert_async().await;
    assert_eq!(result.raw_text, "Total: $100");

    let view = session.result_view().unwrap();
    assert_eq!(view.char_count_label, "11 characters extracted");
    assert_eq!(view.fields[0].label, "INVOICE NUMBER");
    assert_eq!(view.entity_count, Some(1));
    assert!(view.button(ExportFormat::Csv).unwrap().enabled);
    assert_eq!(view.downloads.len(), 3);
}

#[tokio::test]
async fn edited_text_reaches_export_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let _extract = extract_mock(&mut server).await;
    let export = server
        .mock("GET", "/api/export/csv")
        .match_query(Matcher::Regex("Total.*200".to_string()))
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("Extracted Text\nTotal: $200\n")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = session_for(&server, dir.path());
    session
        .select_file(SelectedFile::from_bytes("invoice.pdf", b"%PDF".to_vec()))
        .unwrap();
    session.upload().await.unwrap();

    session.begin_edit().unwrap();
    session.update_edit_buffer("Total: $200").unwrap();
    session.save_edit().unwrap();

    let saved = session.download(ExportFormat::Csv).await.unwrap();
    export.assert_async().await;

    assert_eq!(saved.filename, "invoice-edited.csv");
    assert_eq!(saved.path, dir.path().join("invoice-edited.csv"));
    assert_eq!(
        std::fs::read_to_string(&saved.path).unwrap(),
        "Extracted Text\nTotal: $200\n"
    );
}

#[tokio::test]
async fn unedited_excel_keeps_plain_name() {
    let mut server = mockito::Server::new_async().await;
    let _extract = extract_mock(&mut server).await;
    let _export = server
        .mock("GET", "/api/export/excel")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(vec![0x50, 0x4b, 0x03, 0x04])
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session = session_for(&server, dir.path());
    session
        .select_file(SelectedFile::from_bytes("invoice.pdf", b"%PDF".to_vec()))
        .unwrap();
    session.upload().await.unwrap();

    let first = session.download(ExportFormat::Excel).await.unwrap();
    let second = session.download(ExportFormat::Excel).await.unwrap();

    assert_eq!(first.filename, "invoice.xlsx");
    assert_eq!(first.size, 4);
    assert_eq!(second.path.file_name().unwrap(), "invoice (1).xlsx");
}

#[tokio::test]
async fn reselecting_clears_previous_result() {
    let mut server = mockito::Server::new_async().await;
    let _extract = extract_mock(&mut server).await;
    let dir = tempfile::tempdir().unwrap();
    let session = session_for(&server, dir.path());

    session
        .select_file(SelectedFile::from_bytes("invoice.pdf", b"%PDF".to_vec()))
        .unwrap();
    session.upload().await.unwrap();
    assert!(session.result_view().is_some());

    session
        .select_file(SelectedFile::from_bytes("receipt.jpg", vec![0xff, 0xd8]))
        .unwrap();
    assert!(session.result_view().is_none());
    assert!(session.upload_view().can_upload);
}
