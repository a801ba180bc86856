use super::*;
use crate::test_support::{employee, FakeBackend};
use axum::http::StatusCode;
use serde_json::json;

fn request(name: &str) -> UpdateEmployeeRequest {
    UpdateEmployeeRequest {
        name: name.to_string(),
        department: "Engineering".to_string(),
        position: "Engineer".to_string(),
        hire_date: "2024-04-01".to_string(),
        email: "new@example.com".to_string(),
        phone: "090-9999-0000".to_string(),
        employment_type: "contract".to_string(),
        notes: String::new(),
    }
}

#[tokio::test]
async fn list_preserves_server_order() {
    let backend = FakeBackend::with_employees(vec![
        employee(9, "Yamada Taro"),
        employee(2, "Tanaka Ichiro"),
        employee(5, "Suzuki Hanako"),
    ]);
    let api = HttpEmployeeApi::new(backend.spawn().await);

    let employees = api.list_employees().await.expect("list");
    let ids: Vec<i64> = employees.iter().map(|e| e.id.0).collect();
    assert_eq!(ids, vec![9, 2, 5]);
}

#[tokio::test]
async fn search_sends_encoded_keyword() {
    let backend = FakeBackend::with_employees(vec![
        employee(1, "Tanaka Ichiro"),
        employee(2, "Sato & Co"),
    ]);
    let api = HttpEmployeeApi::new(backend.spawn().await);

    let found = api.search_employees("Sato & Co").await.expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, EmployeeId(2));
    assert_eq!(
        backend.requests()[0].keyword.as_deref(),
        Some("Sato & Co")
    );
}

#[tokio::test]
async fn create_posts_flattened_body_and_reads_new_id() {
    let backend = FakeBackend::with_employees(vec![employee(1, "Tanaka Ichiro")]);
    let api = HttpEmployeeApi::new(backend.spawn().await);

    let response = api
        .create_employee(&request("Kobayashi Ken"))
        .await
        .expect("create");
    assert_eq!(response.employee_id, Some(EmployeeId(2)));

    let recorded = backend.requests();
    assert_eq!(recorded[0].op, "create");
    assert_eq!(recorded[0].body, Some(request("Kobayashi Ken")));
}

#[tokio::test]
async fn rejection_surfaces_server_message() {
    let backend = FakeBackend::with_employees(vec![employee(1, "Tanaka Ichiro")]);
    backend.fail(
        "update",
        StatusCode::BAD_REQUEST,
        json!({ "message": "email already registered" }),
    );
    let api = HttpEmployeeApi::new(backend.spawn().await);

    let err = api
        .update_employee(EmployeeId(1), &request("Tanaka Ichiro"))
        .await
        .expect_err("must fail");
    match err {
        ApiFailure::Rejected(rejection) => {
            assert_eq!(rejection.status, 400);
            assert_eq!(rejection.message, "email already registered");
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn rejection_without_message_uses_fallback_and_status() {
    let backend = FakeBackend::with_employees(Vec::new());
    backend.fail("list", StatusCode::INTERNAL_SERVER_ERROR, json!({}));
    let api = HttpEmployeeApi::new(backend.spawn().await);

    let err = api.list_employees().await.expect_err("must fail");
    assert_eq!(err.to_string(), "failed to load employees (HTTP 500)");
}

#[tokio::test]
async fn missing_employee_is_a_rejection() {
    let backend = FakeBackend::with_employees(Vec::new());
    let api = HttpEmployeeApi::new(backend.spawn().await);

    let err = api.get_employee(EmployeeId(42)).await.expect_err("must fail");
    assert_eq!(err.to_string(), "employee not found");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let api = HttpEmployeeApi::new("http://127.0.0.1:1");
    let err = api.list_employees().await.expect_err("must fail");
    assert!(matches!(err, ApiFailure::Transport(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn photo_and_csv_uploads_use_expected_multipart_fields() {
    let backend = FakeBackend::with_employees(vec![employee(3, "Tanaka Ichiro")]);
    let api = HttpEmployeeApi::new(backend.spawn().await);

    let photo = FileUpload {
        filename: "face.png".to_string(),
        mime_type: Some("image/png".to_string()),
        bytes: b"png-bytes".to_vec(),
    };
    let uploaded = api.upload_photo(EmployeeId(3), photo).await.expect("photo");
    assert_eq!(uploaded.photo_url.as_deref(), Some("/uploads/3.png"));

    let csv = FileUpload {
        filename: "staff.csv".to_string(),
        mime_type: None,
        bytes: b"name,department\n".to_vec(),
    }
    .with_default_mime("text/csv");
    api.import_csv(csv).await.expect("import");

    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].field, "photo");
    assert_eq!(uploads[0].filename.as_deref(), Some("face.png"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(uploads[0].bytes, b"png-bytes");
    assert_eq!(uploads[1].field, "file");
    assert_eq!(uploads[1].content_type.as_deref(), Some("text/csv"));
}

#[tokio::test]
async fn export_returns_raw_bytes() {
    let backend = FakeBackend::with_employees(Vec::new());
    backend.set_export_body("id,name\n3,田中一郎\n".as_bytes());
    let api = HttpEmployeeApi::new(backend.spawn().await);

    let bytes = api.export_csv().await.expect("export");
    assert_eq!(bytes, "id,name\n3,田中一郎\n".as_bytes());
}

#[tokio::test]
async fn file_upload_from_path_guesses_mime_type() {
    let dir = std::env::temp_dir().join(format!(
        "employee_directory_upload_{}",
        std::process::id()
    ));
    tokio::fs::create_dir_all(&dir).await.expect("temp dir");
    let path = dir.join("portrait.jpg");
    tokio::fs::write(&path, b"jpeg").await.expect("write");

    let upload = FileUpload::from_path(&path).await.expect("read");
    assert_eq!(upload.filename, "portrait.jpg");
    assert_eq!(upload.mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(upload.bytes, b"jpeg");

    let missing = FileUpload::from_path(dir.join("absent.csv")).await;
    assert!(matches!(missing, Err(ApiFailure::Io { .. })));

    tokio::fs::remove_dir_all(dir).await.expect("cleanup");
}

#[test]
fn photo_location_joins_relative_paths() {
    assert_eq!(
        photo_location("http://localhost:5182", "/uploads/3.png"),
        "http://localhost:5182/uploads/3.png"
    );
    assert_eq!(
        photo_location("http://localhost:5182", "https://cdn.example.com/3.png"),
        "https://cdn.example.com/3.png"
    );
}
