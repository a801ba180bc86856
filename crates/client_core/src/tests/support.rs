//! In-process employee backend used by the REST and controller tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{EmployeeDetail, EmployeeId, EmployeeSummary, EmployeeWithDetails},
    protocol::{ApiResponse, ImportResponse, PhotoUploadResponse, UpdateEmployeeRequest},
};
use tokio::net::TcpListener;

type Reply<T> = Result<T, (StatusCode, Json<Value>)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub op: &'static str,
    pub id: Option<i64>,
    pub keyword: Option<String>,
    pub body: Option<UpdateEmployeeRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedUpload {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct BackendState {
    employees: Vec<EmployeeWithDetails>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    uploads: Vec<RecordedUpload>,
    failures: HashMap<&'static str, (StatusCode, Value)>,
    import_result: Option<ImportResponse>,
    import_rows: Vec<EmployeeWithDetails>,
    export_body: Vec<u8>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

pub(crate) fn employee(id: i64, name: &str) -> EmployeeWithDetails {
    EmployeeWithDetails {
        summary: EmployeeSummary {
            id: EmployeeId(id),
            name: name.to_string(),
            department: "Sales".to_string(),
            position: "Staff".to_string(),
            hire_date: "2020-04-01T00:00:00".to_string(),
            email: format!("employee{id}@example.com"),
            phone: format!("090-0000-{id:04}"),
            is_valid: true,
        },
        details: Some(EmployeeDetail {
            employment_type: Some("full-time".to_string()),
            manager_name: Some("Sato".to_string()),
            notes: Some(format!("notes for {name}")),
            ..EmployeeDetail::default()
        }),
    }
}

impl FakeBackend {
    pub fn with_employees(employees: Vec<EmployeeWithDetails>) -> Self {
        let next_id = employees.iter().map(|e| e.id().0).max().unwrap_or(0) + 1;
        let backend = Self::default();
        {
            let mut state = backend.state.lock().expect("backend state");
            state.employees = employees;
            state.next_id = next_id;
        }
        backend
    }

    pub fn fail(&self, op: &'static str, status: StatusCode, body: Value) {
        self.state
            .lock()
            .expect("backend state")
            .failures
            .insert(op, (status, body));
    }

    pub fn set_import_result(&self, result: ImportResponse, rows: Vec<EmployeeWithDetails>) {
        let mut state = self.state.lock().expect("backend state");
        state.import_result = Some(result);
        state.import_rows = rows;
    }

    pub fn set_export_body(&self, body: &[u8]) {
        self.state.lock().expect("backend state").export_body = body.to_vec();
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().expect("backend state").requests.clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.requests().into_iter().map(|r| r.op).collect()
    }

    pub fn count(&self, op: &str) -> usize {
        self.requests().iter().filter(|r| r.op == op).count()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.state.lock().expect("backend state").uploads.clone()
    }

    pub fn employee(&self, id: i64) -> Option<EmployeeWithDetails> {
        self.state
            .lock()
            .expect("backend state")
            .employees
            .iter()
            .find(|e| e.id().0 == id)
            .cloned()
    }

    fn record(
        &self,
        op: &'static str,
        id: Option<i64>,
        keyword: Option<String>,
        body: Option<UpdateEmployeeRequest>,
    ) -> Reply<()> {
        let mut state = self.state.lock().expect("backend state");
        state.requests.push(RecordedRequest {
            op,
            id,
            keyword,
            body,
        });
        match state.failures.get(op) {
            Some((status, body)) => Err((*status, Json(body.clone()))),
            None => Ok(()),
        }
    }

    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/api/employees", get(list).post(create))
            .route("/api/employees/search", get(search))
            .route("/api/employees/import", post(import))
            .route("/api/employees/export", get(export))
            .route(
                "/api/employees/:id",
                get(detail).put(update).delete(remove),
            )
            .route("/api/employees/:id/upload-photo", post(upload_photo))
            .with_state(self.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }
}

fn summaries(employees: &[EmployeeWithDetails]) -> Vec<EmployeeSummary> {
    employees.iter().map(|e| e.summary.clone()).collect()
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "employee not found" })),
    )
}

fn apply_request(target: &mut EmployeeWithDetails, request: &UpdateEmployeeRequest) {
    target.summary.name = request.name.clone();
    target.summary.department = request.department.clone();
    target.summary.position = request.position.clone();
    target.summary.hire_date = request.hire_date.clone();
    target.summary.email = request.email.clone();
    target.summary.phone = request.phone.clone();
    let details = target.details.get_or_insert_with(EmployeeDetail::default);
    details.employment_type = Some(request.employment_type.clone());
    details.notes = Some(request.notes.clone());
}

async fn read_uploads(mut multipart: Multipart) -> Vec<RecordedUpload> {
    let mut uploads = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        uploads.push(RecordedUpload {
            field: name,
            filename,
            content_type,
            bytes,
        });
    }
    uploads
}

async fn list(State(backend): State<FakeBackend>) -> Reply<Json<Vec<EmployeeSummary>>> {
    backend.record("list", None, None, None)?;
    let state = backend.state.lock().expect("backend state");
    Ok(Json(summaries(&state.employees)))
}

async fn search(
    State(backend): State<FakeBackend>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply<Json<Vec<EmployeeSummary>>> {
    let keyword = query.get("keyword").cloned().unwrap_or_default();
    backend.record("search", None, Some(keyword.clone()), None)?;
    let state = backend.state.lock().expect("backend state");
    let matches: Vec<EmployeeWithDetails> = state
        .employees
        .iter()
        .filter(|e| keyword.is_empty() || e.summary.name.contains(&keyword))
        .cloned()
        .collect();
    Ok(Json(summaries(&matches)))
}

async fn detail(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
) -> Reply<Json<EmployeeWithDetails>> {
    backend.record("get", Some(id), None, None)?;
    backend.employee(id).map(Json).ok_or_else(not_found)
}

async fn create(
    State(backend): State<FakeBackend>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Reply<Json<ApiResponse>> {
    backend.record("create", None, None, Some(request.clone()))?;
    let mut state = backend.state.lock().expect("backend state");
    let id = state.next_id;
    state.next_id += 1;
    let mut created = employee(id, &request.name);
    apply_request(&mut created, &request);
    state.employees.push(created);
    Ok(Json(ApiResponse {
        message: "created".to_string(),
        employee_id: Some(EmployeeId(id)),
    }))
}

async fn update(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Reply<Json<ApiResponse>> {
    backend.record("update", Some(id), None, Some(request.clone()))?;
    let mut state = backend.state.lock().expect("backend state");
    let target = state
        .employees
        .iter_mut()
        .find(|e| e.id().0 == id)
        .ok_or_else(not_found)?;
    apply_request(target, &request);
    Ok(Json(ApiResponse {
        message: "updated".to_string(),
        employee_id: None,
    }))
}

async fn remove(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
) -> Reply<Json<ApiResponse>> {
    backend.record("delete", Some(id), None, None)?;
    let mut state = backend.state.lock().expect("backend state");
    let before = state.employees.len();
    state.employees.retain(|e| e.id().0 != id);
    if state.employees.len() == before {
        return Err(not_found());
    }
    Ok(Json(ApiResponse {
        message: "deleted".to_string(),
        employee_id: None,
    }))
}

async fn upload_photo(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Reply<Json<PhotoUploadResponse>> {
    let uploads = read_uploads(multipart).await;
    backend
        .state
        .lock()
        .expect("backend state")
        .uploads
        .extend(uploads);
    backend.record("photo", Some(id), None, None)?;

    let photo_url = format!("/uploads/{id}.png");
    let mut state = backend.state.lock().expect("backend state");
    let target = state
        .employees
        .iter_mut()
        .find(|e| e.id().0 == id)
        .ok_or_else(not_found)?;
    target
        .details
        .get_or_insert_with(EmployeeDetail::default)
        .photo_url = Some(photo_url.clone());
    Ok(Json(PhotoUploadResponse {
        message: "uploaded".to_string(),
        photo_url: Some(photo_url),
    }))
}

async fn import(
    State(backend): State<FakeBackend>,
    multipart: Multipart,
) -> Reply<Json<ImportResponse>> {
    let uploads = read_uploads(multipart).await;
    backend
        .state
        .lock()
        .expect("backend state")
        .uploads
        .extend(uploads);
    backend.record("import", None, None, None)?;

    let mut state = backend.state.lock().expect("backend state");
    let rows = std::mem::take(&mut state.import_rows);
    state.employees.extend(rows);
    Ok(Json(state.import_result.clone().unwrap_or_default()))
}

async fn export(State(backend): State<FakeBackend>) -> Reply<impl IntoResponse> {
    backend.record("export", None, None, None)?;
    let body = backend.state.lock().expect("backend state").export_body.clone();
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}
