use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::error::NetwError;
use crate::session::{Credential, CredentialStore, HttpRequest, HttpResponse, Transport};

/// Transport that replays scripted responses in order and records what was sent
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, NetwError>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(HttpResponse::new(status, body.to_string()));
    }

    pub fn push_error(&self, error: NetwError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetwError> {
        self.sent.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(NetwError::network(format!("no scripted response for {}", request.url))))
    }
}

/// Credential slot that reads fine but can never be cleared
pub struct UnclearableCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl UnclearableCredentialStore {
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for UnclearableCredentialStore {
    fn load(&self) -> Result<Option<Credential>, NetwError> {
        Ok(self.credential.lock().unwrap().clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), NetwError> {
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), NetwError> {
        Err(NetwError::storage("credential file is read-only"))
    }
}

pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = [
        ("NETW_API_BASE_URL", "http://netw.test/api/1.0"),
        ("NETW_CLIENT_ID", "test-client"),
        ("NETW_CLIENT_SECRET", "test-secret"),
    ]
    .into_iter()
    .collect();
    AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
}

/// Signed (HS256, throwaway key) JWT carrying `payload`
pub fn jwt_with_payload(payload: Value) -> String {
    encode(&Header::default(), &payload, &EncodingKey::from_secret(b"test-signing-key")).unwrap()
}

pub fn user_token(user_id: &str, user_name: &str) -> String {
    jwt_with_payload(json!({
        "data": {
            "userId": user_id,
            "userName": user_name,
            "email": format!("{}@reseller.test", user_name),
            "rights": ["read"]
        },
        "exp": (Utc::now() + Duration::hours(1)).timestamp()
    }))
}

pub fn auth_body(token: &str, refresh_token: &str) -> String {
    json!({
        "token": token,
        "refreshToken": refresh_token,
        "expiresIn": 86400
    })
    .to_string()
}

/// Credential whose access token expires `access_in` from now; refresh stays live a week
pub fn credential_expiring_in(access_token: &str, access_in: Duration) -> Credential {
    let now = Utc::now();
    Credential {
        access_token: access_token.to_string(),
        refresh_token: format!("refresh-{}", access_token),
        access_expires_at: now + access_in,
        refresh_expires_at: now + Duration::days(7),
    }
}

/// Minimal wire-format client with the given lines and SIM cards
pub fn client_json(id: &str, name: &str, lines: Vec<Value>, sim_cards: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("contact@{}.test", id),
        "createdAt": "2024-01-15T08:00:00Z",
        "updatedAt": "2024-01-15T08:00:00Z",
        "status": "active",
        "lines": lines,
        "simCards": sim_cards
    })
}

pub fn line_json(id: &str, client_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "clientId": client_id,
        "msisdn": "0612345678",
        "simReference": format!("SIM-{}", id),
        "operator": "orange",
        "plan": "Forfait 50Go",
        "status": status,
        "createdAt": "2024-01-15T08:00:00Z",
        "updatedAt": "2024-01-15T08:00:00Z"
    })
}

pub fn sim_json(id: &str, client_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "clientId": client_id,
        "reference": format!("REF-{}", id),
        "status": status,
        "operator": "bouygues",
        "createdAt": "2024-01-15T08:00:00Z"
    })
}

pub fn consumption_json(line_id: &str, data: f64, voice: f64, sms: f64) -> Value {
    json!({
        "lineId": line_id,
        "period": { "start": "2024-05-01", "end": "2024-05-31" },
        "data": { "used": data, "limit": 50000.0, "percentage": data / 500.0 },
        "voice": { "used": voice, "limit": 600.0, "percentage": voice / 6.0 },
        "sms": { "used": sms, "limit": 1000.0, "percentage": sms / 10.0 },
        "events": []
    })
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}
