//! Mock of the test result webapp's REST API for E2E tests.
//!
//! Starts an in-process HTTP server speaking the `{success, data, message}`
//! envelope over an in-memory store, with a real RSA keypair behind the
//! login handshake so the password encryption path is exercised end to end.

use actix_web::{App, HttpResponse, HttpServer, get, patch, post, web};
use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use testresult_db_access::{ConnectSettings, DbAccess};

/// Database segment of the base URL.
pub const DATABASE: &str = "testresults";

/// Account the mock accepts.
pub const USER: &str = "reporter";

/// Password the mock accepts.
pub const PASSWORD: &str = "correct-horse";

/// In-memory store behind the mock endpoints.
pub struct MockState {
    pub private_key: RsaPrivateKey,
    pub logged_in: bool,
    /// Let the SSO probe fail with a 503
    pub sso_ok: bool,
    /// Let the logout endpoint fail with a 500
    pub logout_ok: bool,
    /// Answer every login with this marker instead of checking the password
    pub login_data_override: Option<String>,

    pub projects: Vec<(String, String, String)>,
    pub results: HashMap<String, Value>,
    pub files: Vec<Value>,
    pub next_file_id: i64,
    pub file_headers: Vec<Value>,
    pub test_cases: Vec<Value>,
    pub next_case_id: i64,
    pub aborts: Vec<Value>,
    pub ccrs: Vec<Value>,
    pub tags: Vec<Value>,
    pub categories: Vec<String>,
    /// Result ids the event-table procedure ran for; "ALL" for the bulk call
    pub evtbl_calls: Vec<String>,
}

impl MockState {
    fn new() -> Self {
        MockState {
            private_key: RsaPrivateKey::new(&mut OsRng, 2048).expect("failed to generate RSA key"),
            logged_in: false,
            sso_ok: true,
            logout_ok: true,
            login_data_override: None,
            projects: Vec::new(),
            results: HashMap::new(),
            files: Vec::new(),
            next_file_id: 1,
            file_headers: Vec::new(),
            test_cases: Vec::new(),
            next_case_id: 1,
            aborts: Vec::new(),
            ccrs: Vec::new(),
            tags: Vec::new(),
            categories: Vec::new(),
            evtbl_calls: Vec::new(),
        }
    }
}

type SharedState = web::Data<Arc<Mutex<MockState>>>;

fn ok(data: Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": data, "message": "" }))
}

fn created(data: Value) -> HttpResponse {
    HttpResponse::Created().json(json!({ "success": true, "data": data, "message": "" }))
}

fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "success": false, "data": null, "message": message }))
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "success": false, "data": null, "message": message }))
}

#[get("/loggedin")]
async fn loggedin(state: SharedState) -> HttpResponse {
    if state.lock().unwrap().sso_ok {
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::ServiceUnavailable().finish()
    }
}

#[get("/getPubKey")]
async fn get_pub_key(state: SharedState) -> HttpResponse {
    let pem = state
        .lock()
        .unwrap()
        .private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("failed to encode public key");
    HttpResponse::Ok().json(json!({ "pubKey": pem }))
}

#[post("/login")]
async fn login(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();

    if let Some(marker) = &state.login_data_override {
        return ok(json!(marker));
    }

    let user = body.get("usr").and_then(Value::as_str).unwrap_or_default();
    let encrypted = body.get("pwd").and_then(Value::as_str).unwrap_or_default();
    let decrypted = STANDARD
        .decode(encrypted)
        .ok()
        .and_then(|ciphertext| state.private_key.decrypt(Pkcs1v15Encrypt, &ciphertext).ok());

    match decrypted {
        Some(password) if user == USER && password == PASSWORD.as_bytes() => {
            state.logged_in = true;
            ok(json!("login_success"))
        }
        _ => HttpResponse::Unauthorized().json(json!({
            "success": false,
            "data": "login_failed",
            "message": "invalid credentials",
        })),
    }
}

#[get("/logout")]
async fn logout(state: SharedState) -> HttpResponse {
    let mut state = state.lock().unwrap();
    if state.logout_ok {
        state.logged_in = false;
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::InternalServerError().finish()
    }
}

#[get("/projects")]
async fn get_project(state: SharedState, query: web::Query<HashMap<String, String>>) -> HttpResponse {
    let state = state.lock().unwrap();
    let wanted = (
        query.get("project").cloned().unwrap_or_default(),
        query.get("variant").cloned().unwrap_or_default(),
        query.get("branch").cloned().unwrap_or_default(),
    );
    if state.projects.contains(&wanted) {
        ok(json!({ "project": wanted.0, "variant": wanted.1, "branch": wanted.2 }))
    } else {
        not_found("no such project")
    }
}

#[post("/projects")]
async fn create_project(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    let triple = (
        body["project"].as_str().unwrap_or_default().to_string(),
        body["variant"].as_str().unwrap_or_default().to_string(),
        body["branch"].as_str().unwrap_or_default().to_string(),
    );
    if state.projects.contains(&triple) {
        return HttpResponse::Conflict()
            .json(json!({ "success": false, "data": null, "message": "duplicate project" }));
    }
    state.projects.push(triple);
    created(Value::Null)
}

#[post("/results")]
async fn create_result(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    let Some(id) = body["test_result_id"].as_str().map(str::to_string) else {
        return bad_request("test_result_id missing");
    };
    if state.results.contains_key(&id) {
        return HttpResponse::Conflict()
            .json(json!({ "success": false, "data": null, "message": "duplicate result" }));
    }
    state.results.insert(id, body.into_inner());
    created(Value::Null)
}

#[get("/results/{id}")]
async fn get_result(state: SharedState, path: web::Path<String>) -> HttpResponse {
    let state = state.lock().unwrap();
    match state.results.get(path.as_str()) {
        Some(record) => ok(record.clone()),
        None => not_found("no such result"),
    }
}

#[patch("/results/{id}")]
async fn patch_result(state: SharedState, path: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    match state.results.get_mut(path.as_str()) {
        Some(record) => {
            let fields = record.as_object_mut().expect("result record is an object");
            for (key, value) in body.as_object().cloned().unwrap_or_default() {
                fields.insert(key, value);
            }
            ok(Value::Null)
        }
        None => not_found("no such result"),
    }
}

#[post("/files")]
async fn create_file(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    let result_id = body["test_result_id"].as_str().unwrap_or_default().to_string();
    if !state.results.contains_key(&result_id) {
        return bad_request("unknown test_result_id");
    }
    let id = state.next_file_id;
    state.next_file_id += 1;
    let mut record = body.into_inner();
    record["id"] = json!(id);
    state.files.push(record);
    created(json!({ "id": id }))
}

#[get("/files/last")]
async fn latest_file(state: SharedState, query: web::Query<HashMap<String, String>>) -> HttpResponse {
    let state = state.lock().unwrap();
    let wanted = query.get("test_result_id");
    let latest = state
        .files
        .iter()
        .filter(|file| wanted.is_none_or(|id| file["test_result_id"].as_str() == Some(id.as_str())))
        .filter_map(|file| file["id"].as_i64())
        .max();
    match latest {
        Some(id) => ok(json!({ "id": id })),
        None => not_found("no files"),
    }
}

#[patch("/files/{id}")]
async fn patch_file(state: SharedState, path: web::Path<i64>, body: web::Json<Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    let id = *path;
    match state
        .files
        .iter_mut()
        .find(|file| file["id"].as_i64() == Some(id))
    {
        Some(record) => {
            let fields = record.as_object_mut().expect("file record is an object");
            for (key, value) in body.as_object().cloned().unwrap_or_default() {
                fields.insert(key, value);
            }
            ok(Value::Null)
        }
        None => not_found("no such file"),
    }
}

#[post("/fileheaders")]
async fn create_file_header(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    let file_id = body["file_id"].as_i64();
    if !state
        .files
        .iter()
        .any(|file| file["id"].as_i64() == file_id)
    {
        return bad_request("unknown file_id");
    }
    state.file_headers.push(body.into_inner());
    created(Value::Null)
}

#[post("/testcases")]
async fn create_test_case(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    let id = state.next_case_id;
    state.next_case_id += 1;
    let mut record = body.into_inner();
    record["id"] = json!(id);
    state.test_cases.push(record);
    created(json!({ "id": id }))
}

#[post("/aborts")]
async fn create_abort(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    state.lock().unwrap().aborts.push(body.into_inner());
    created(Value::Null)
}

#[post("/ccrs")]
async fn create_ccr(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    state.lock().unwrap().ccrs.push(body.into_inner());
    created(Value::Null)
}

#[post("/userresults")]
async fn create_tags(state: SharedState, body: web::Json<Value>) -> HttpResponse {
    state.lock().unwrap().tags.push(body.into_inner());
    created(Value::Null)
}

#[get("/categories")]
async fn get_categories(state: SharedState) -> HttpResponse {
    let state = state.lock().unwrap();
    let items: Vec<Value> = state
        .categories
        .iter()
        .map(|name| json!({ "category": name }))
        .collect();
    ok(json!(items))
}

#[post("/evtblresults")]
async fn update_evtbls(state: SharedState) -> HttpResponse {
    state.lock().unwrap().evtbl_calls.push("ALL".to_string());
    created(Value::Null)
}

#[patch("/evtblresults/{id}")]
async fn update_evtbl(state: SharedState, path: web::Path<String>) -> HttpResponse {
    let mut state = state.lock().unwrap();
    if !state.results.contains_key(path.as_str()) {
        return not_found("no such result");
    }
    let id = path.into_inner();
    state.evtbl_calls.push(id);
    ok(Value::Null)
}

/// In-process webapp mock on an ephemeral port.
pub struct MockWebApp {
    pub host: String,
    pub state: Arc<Mutex<MockState>>,
}

impl MockWebApp {
    /// Start the mock. The server lives for the process lifetime.
    pub async fn start() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let state = Arc::new(Mutex::new(MockState::new()));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let host = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new().service(
                web::scope(&format!("/{}", DATABASE))
                    .app_data(web::Data::new(state_data.clone()))
                    .service(loggedin)
                    .service(get_pub_key)
                    .service(login)
                    .service(logout)
                    .service(get_project)
                    .service(create_project)
                    .service(create_result)
                    .service(latest_file)
                    .service(get_result)
                    .service(patch_result)
                    .service(create_file)
                    .service(patch_file)
                    .service(create_file_header)
                    .service(create_test_case)
                    .service(create_abort)
                    .service(create_ccr)
                    .service(create_tags)
                    .service(get_categories)
                    .service(update_evtbls)
                    .service(update_evtbl),
            )
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        tokio::spawn(server);

        MockWebApp { host, state }
    }

    /// Settings pointing the client at this mock.
    pub fn settings(&self) -> ConnectSettings {
        ConnectSettings::new(self.host.clone(), USER, PASSWORD, DATABASE)
    }
}

/// A REST backend already connected to the mock.
pub async fn connected(mock: &MockWebApp) -> Box<dyn DbAccess> {
    let mut access = testresult_db_access::create("rest").expect("factory");
    access.connect(&mock.settings()).await.expect("connect");
    access
}
