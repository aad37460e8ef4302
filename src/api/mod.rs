//! Typed Netw API endpoints.
//!
//! Every resource endpoint answers with `{ success, data, message?, error? }`;
//! [`NetwApi`] unwraps that envelope so callers only see domain records or
//! a [`NetwError`].

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{NetwError, NetwResult};
use crate::models::{ApiEnvelope, Client, ConsumptionData, Line, Period, SimCard};
use crate::session::{ApiRequest, Credential, SessionClient, SessionUser};

pub struct NetwApi {
    session: SessionClient,
}

impl NetwApi {
    pub fn new(session: SessionClient) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    // ---- Session passthrough ----

    pub async fn authenticate_with_password(&self, username: &str, password: &str) -> NetwResult<Credential> {
        self.session.authenticate_with_password(username, password).await
    }

    pub async fn authenticate_with_app_credentials(&self) -> NetwResult<Credential> {
        self.session.authenticate_with_app_credentials().await
    }

    pub async fn refresh(&self) -> NetwResult<Credential> {
        self.session.refresh().await
    }

    pub fn logout(&self) -> NetwResult<()> {
        self.session.logout()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.current_user()
    }

    // ---- Clients ----

    pub async fn get_clients(&self) -> NetwResult<Vec<Client>> {
        self.fetch(ApiRequest::get("/Clients"), "clients").await
    }

    pub async fn get_client(&self, client_id: &str) -> NetwResult<Client> {
        self.fetch(ApiRequest::get(format!("/Clients/{}", client_id)), "client")
            .await
            .map_err(|e| named_not_found(e, format!("Client {}", client_id)))
    }

    // ---- Lines ----

    pub async fn get_client_lines(&self, client_id: &str) -> NetwResult<Vec<Line>> {
        self.fetch(ApiRequest::get(format!("/Clients/{}/lines", client_id)), "client lines")
            .await
            .map_err(|e| named_not_found(e, format!("Client {}", client_id)))
    }

    pub async fn get_line(&self, line_id: &str) -> NetwResult<Line> {
        self.fetch(ApiRequest::get(format!("/Lines/{}", line_id)), "line")
            .await
            .map_err(|e| named_not_found(e, format!("Line {}", line_id)))
    }

    // ---- SIM cards ----

    pub async fn get_client_sim_cards(&self, client_id: &str) -> NetwResult<Vec<SimCard>> {
        self.fetch(ApiRequest::get(format!("/Clients/{}/simcards", client_id)), "client SIM cards")
            .await
            .map_err(|e| named_not_found(e, format!("Client {}", client_id)))
    }

    // ---- Consumption ----

    pub async fn get_line_consumption(&self, line_id: &str, period: Option<&Period>) -> NetwResult<ConsumptionData> {
        let mut request = ApiRequest::get(format!("/Lines/{}/consumption", line_id));
        if let Some(period) = period {
            request = request
                .with_query("start", period.start.clone())
                .with_query("end", period.end.clone());
        }

        self.fetch(request, "line consumption")
            .await
            .map_err(|e| named_not_found(e, format!("Line {}", line_id)))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest, what: &str) -> NetwResult<T> {
        let envelope: ApiEnvelope<T> = self.session.request(&request).await?;
        unwrap_envelope(envelope, what).map(|data| {
            debug!("Fetched {} from {}", what, request.endpoint);
            data
        })
    }
}

fn unwrap_envelope<T>(envelope: ApiEnvelope<T>, what: &str) -> NetwResult<T> {
    if !envelope.success {
        return Err(NetwError::api(200, envelope.failure_message()));
    }
    envelope
        .data
        .ok_or_else(|| NetwError::decode(format!("{} response carried no data", what)))
}

// Replace the raw endpoint path with the entity the caller asked for
fn named_not_found(err: NetwError, entity: String) -> NetwError {
    match err {
        NetwError::NotFound(_) => NetwError::NotFound(entity),
        other => other,
    }
}
