#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{json, Value};

use netw_console::api::NetwApi;
use netw_console::config::AppConfig;
use netw_console::session::{MemoryCredentialStore, ReqwestTransport, SessionClient};
use netw_console::store::AppStore;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
pub const APP_CLIENT_ID: &str = "console-app";
pub const APP_CLIENT_SECRET: &str = "app-secret";

type Reply = (StatusCode, Json<Value>);
type Shared = Arc<Mutex<MockState>>;

#[derive(Default)]
struct MockState {
    access_tokens: HashSet<String>,
    refresh_tokens: HashSet<String>,
    issued: u32,
    hits: Vec<String>,
    clients: Vec<Value>,
    lines: HashMap<String, Vec<Value>>,
    sim_cards: HashMap<String, Vec<Value>>,
}

/// In-process stand-in for the Netw API, one per test
pub struct MockNetw {
    pub port: u16,
    pub base_url: String,
    state: Shared,
}

impl MockNetw {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}/api/1.0", port);
        let state: Shared = Arc::new(Mutex::new(seeded_state()));

        let api = Router::new()
            .route("/Auth/AuthUser", post(auth_user))
            .route("/Auth/refreshToken", post(refresh_token))
            .route("/Clients", get(list_clients))
            .route("/Clients/:id", get(get_client))
            .route("/Clients/:id/lines", get(client_lines))
            .route("/Clients/:id/simcards", get(client_sim_cards))
            .route("/Lines/:id", get(get_line))
            .route("/Lines/:id/consumption", get(line_consumption))
            .with_state(state.clone());
        let app = Router::new().nest("/api/1.0", api);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock API")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { port, base_url, state })
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.api.base_url = self.base_url.clone();
        config.api.client_id = APP_CLIENT_ID.to_string();
        config.api.client_secret = APP_CLIENT_SECRET.to_string();
        config.api.request_timeout_secs = 5;
        config
    }

    pub fn session(&self, storage: Arc<MemoryCredentialStore>) -> SessionClient {
        SessionClient::new(&self.config(), Arc::new(ReqwestTransport::new()), storage)
            .expect("mock base URL is valid")
    }

    pub fn api(&self) -> NetwApi {
        NetwApi::new(self.session(Arc::new(MemoryCredentialStore::new())))
    }

    pub fn store(&self) -> AppStore {
        AppStore::new(self.api(), &self.config())
    }

    /// Reject every access token issued so far, as if they expired server-side
    pub fn revoke_access_tokens(&self) {
        self.state.lock().unwrap().access_tokens.clear();
    }

    /// Reject every token, access and refresh alike
    pub fn revoke_all_tokens(&self) {
        let mut state = self.state.lock().unwrap();
        state.access_tokens.clear();
        state.refresh_tokens.clear();
    }

    pub fn hits(&self) -> Vec<String> {
        self.state.lock().unwrap().hits.clone()
    }

    pub fn hit_count(&self, path: &str) -> usize {
        self.hits().iter().filter(|hit| hit.as_str() == path).count()
    }
}

fn seeded_state() -> MockState {
    let mut state = MockState::default();
    state.clients = vec![
        client("1", "Entreprise ABC", "active"),
        client("2", "Société XYZ", "active"),
        client("3", "Cabinet Dupont", "suspended"),
    ];
    state.lines.insert(
        "1".to_string(),
        vec![
            line("l1", "1", "0612345678", "orange", "active", Some(("Jean", "Martin"))),
            line("l2", "1", "0698765432", "bouygues", "suspended", None),
        ],
    );
    state.lines.insert(
        "2".to_string(),
        vec![line("l3", "2", "0611223344", "orange", "active", Some(("Sophie", "Bernard")))],
    );
    state.sim_cards.insert(
        "1".to_string(),
        vec![sim("s1", "1", "available", "orange"), sim("s2", "1", "activated", "bouygues")],
    );
    state
}

fn client(id: &str, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("contact{}@netw.test", id),
        "phone": "0140000000",
        "createdAt": "2024-01-15T08:00:00Z",
        "updatedAt": "2024-03-01T10:30:00Z",
        "status": status
    })
}

fn line(id: &str, client_id: &str, msisdn: &str, operator: &str, status: &str, holder: Option<(&str, &str)>) -> Value {
    let mut line = json!({
        "id": id,
        "clientId": client_id,
        "msisdn": msisdn,
        "simReference": format!("89330{}", id),
        "operator": operator,
        "plan": "Forfait Pro 50Go",
        "status": status,
        "createdAt": "2024-01-20T09:00:00Z",
        "updatedAt": "2024-01-20T09:00:00Z"
    });
    if let Some((first, last)) = holder {
        line["assignment"] = json!({ "firstName": first, "lastName": last });
    }
    line
}

fn sim(id: &str, client_id: &str, status: &str, operator: &str) -> Value {
    json!({
        "id": id,
        "clientId": client_id,
        "reference": format!("REF-{}", id),
        "status": status,
        "operator": operator,
        "createdAt": "2024-01-20T09:00:00Z"
    })
}

fn ok(data: Value) -> Reply {
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

fn failure(status: StatusCode, error: &str) -> Reply {
    (status, Json(json!({ "success": false, "data": null, "error": error })))
}

fn issue_tokens(state: &mut MockState, user_name: &str) -> Value {
    state.issued += 1;
    let claims = json!({
        "data": {
            "userId": format!("u-{}", user_name),
            "userName": user_name,
            "email": format!("{}@netw.test", user_name),
            "rights": ["read", "write"]
        },
        "jti": state.issued
    });
    let token = jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"mock-netw"))
        .expect("claims encode");
    let refresh = format!("refresh-{}", state.issued);

    state.access_tokens.insert(token.clone());
    state.refresh_tokens.insert(refresh.clone());
    json!({ "token": token, "refreshToken": refresh, "expiresIn": 3600 })
}

// Records the hit and checks the bearer token
fn authorize(state: &Shared, headers: &HeaderMap, hit: String) -> Result<(), Reply> {
    let mut state = state.lock().unwrap();
    state.hits.push(hit);

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match bearer {
        Some(token) if state.access_tokens.contains(token) => Ok(()),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "Invalid or expired token")),
    }
}

async fn auth_user(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    state.hits.push("/Auth/AuthUser".to_string());

    let password_login = body["username"] == USERNAME && body["password"] == PASSWORD;
    let app_login = body["client_name"] == APP_CLIENT_ID && body["client_secret"] == APP_CLIENT_SECRET;

    if password_login {
        ok(issue_tokens(&mut state, USERNAME))
    } else if app_login {
        ok(issue_tokens(&mut state, APP_CLIENT_ID))
    } else {
        failure(StatusCode::UNAUTHORIZED, "Identifiants invalides")
    }
}

async fn refresh_token(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    state.hits.push("/Auth/refreshToken".to_string());

    let presented = body["refreshtoken"].as_str().unwrap_or_default().to_string();
    if state.refresh_tokens.remove(&presented) {
        ok(issue_tokens(&mut state, USERNAME))
    } else {
        failure(StatusCode::UNAUTHORIZED, "Refresh token rejected")
    }
}

async fn list_clients(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&state, &headers, "/Clients".to_string()) {
        return reply;
    }
    let state = state.lock().unwrap();

    let clients: Vec<Value> = state
        .clients
        .iter()
        .map(|client| {
            let id = client["id"].as_str().unwrap_or_default();
            let mut full = client.clone();
            full["lines"] = json!(state.lines.get(id).cloned().unwrap_or_default());
            full["simCards"] = json!(state.sim_cards.get(id).cloned().unwrap_or_default());
            full
        })
        .collect();
    ok(json!(clients))
}

async fn get_client(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    if let Err(reply) = authorize(&state, &headers, format!("/Clients/{}", id)) {
        return reply;
    }
    let state = state.lock().unwrap();

    match state.clients.iter().find(|c| c["id"] == id.as_str()) {
        Some(client) => ok(client.clone()),
        None => failure(StatusCode::NOT_FOUND, "Client introuvable"),
    }
}

async fn client_lines(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    if let Err(reply) = authorize(&state, &headers, format!("/Clients/{}/lines", id)) {
        return reply;
    }
    let state = state.lock().unwrap();
    ok(json!(state.lines.get(&id).cloned().unwrap_or_default()))
}

async fn client_sim_cards(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    if let Err(reply) = authorize(&state, &headers, format!("/Clients/{}/simcards", id)) {
        return reply;
    }
    let state = state.lock().unwrap();
    ok(json!(state.sim_cards.get(&id).cloned().unwrap_or_default()))
}

async fn get_line(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    if let Err(reply) = authorize(&state, &headers, format!("/Lines/{}", id)) {
        return reply;
    }
    let state = state.lock().unwrap();

    let found = state.lines.values().flatten().find(|line| line["id"] == id.as_str()).cloned();
    match found {
        Some(line) => ok(line),
        None => failure(StatusCode::NOT_FOUND, "Ligne introuvable"),
    }
}

async fn line_consumption(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers, format!("/Lines/{}/consumption", id)) {
        return reply;
    }

    if id == "broken" {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Service de consommation indisponible");
    }

    let start = query.get("start").cloned().unwrap_or_else(|| "2024-05-01".to_string());
    let end = query.get("end").cloned().unwrap_or_else(|| "2024-05-31".to_string());
    ok(json!({
        "lineId": id,
        "period": { "start": start, "end": end },
        "data": { "used": 12500.0, "limit": 50000.0, "percentage": 25.0 },
        "voice": { "used": 120.0, "limit": 600.0, "percentage": 20.0 },
        "sms": { "used": 50.0, "limit": 1000.0, "percentage": 5.0 },
        "events": [
            {
                "id": "e1",
                "lineId": id,
                "type": "data",
                "timestamp": "2024-05-02T14:12:00Z",
                "amount": 250.5,
                "description": "Navigation 4G"
            },
            {
                "id": "e2",
                "lineId": id,
                "type": "voice",
                "timestamp": "2024-05-03T09:40:00Z",
                "amount": 12.0,
                "description": "Appel national",
                "cost": 0.0
            }
        ]
    }))
}
