//! Application state and the actions that mutate it.
//!
//! [`AppStore`] is an explicit object handed to whoever renders state; there
//! is no process-wide instance. Every action takes `&mut self`, so actions on
//! one store never interleave and a caller that awaits an action observes
//! its settled state, including any nested client load.

pub mod filter;
pub mod fixtures;
pub mod stats;

pub use filter::{FilterOptions, LineView, SimCardView};
pub use stats::{compute_dashboard_stats, ConsumptionSummary, DashboardStats};

use serde::Serialize;
use tracing::{info, warn};

use crate::api::NetwApi;
use crate::config::AppConfig;
use crate::error::NetwError;
use crate::models::{Client, ClientStatus, ClientUpdate, ConsumptionData, LineStatus, Period, SimStatus};
use crate::session::SessionUser;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub authenticated: bool,
    pub session_user: Option<SessionUser>,
    pub clients: Vec<Client>,
    pub selected_client: Option<Client>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AppState {
    pub fn find_client(&self, client_id: &str) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == client_id)
    }

    /// Merge `update` into the client with `client_id` and into the selected
    /// copy when it is the same client. Returns false when no client matched.
    pub fn apply_client_update(&mut self, client_id: &str, update: &ClientUpdate) -> bool {
        let mut matched = false;
        for client in self.clients.iter_mut().filter(|client| client.id == client_id) {
            *client = client.merged(update);
            matched = true;
        }

        if let Some(selected) = self.selected_client.as_mut() {
            if selected.id == client_id {
                *selected = selected.merged(update);
                matched = true;
            }
        }

        matched
    }

    /// Insert or replace a client by id, keeping roster order
    pub fn upsert_client(&mut self, client: Client) {
        match self.clients.iter_mut().find(|existing| existing.id == client.id) {
            Some(existing) => *existing = client,
            None => self.clients.push(client),
        }
    }

    fn clear_auth(&mut self) {
        self.authenticated = false;
        self.session_user = None;
    }
}

pub struct AppStore {
    api: NetwApi,
    state: AppState,
    demo_mode: bool,
}

impl AppStore {
    pub fn new(api: NetwApi, config: &AppConfig) -> Self {
        Self {
            api,
            state: AppState::default(),
            demo_mode: config.demo_mode,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn api(&self) -> &NetwApi {
        &self.api
    }

    pub fn is_demo_mode(&self) -> bool {
        self.demo_mode
    }

    fn begin(&mut self) {
        self.state.loading = true;
        self.state.error = None;
    }

    fn succeed(&mut self) {
        self.state.loading = false;
        self.state.error = None;
    }

    fn fail(&mut self, err: &NetwError) {
        warn!("Action failed: {}", err);
        if err.is_session_expired() {
            self.state.clear_auth();
        }
        self.state.loading = false;
        self.state.error = Some(err.user_message());
    }

    // ---- Authentication ----

    /// Password login, followed by a client load on success
    pub async fn login(&mut self, username: &str, password: &str) {
        self.begin();

        match self.api.authenticate_with_password(username, password).await {
            Ok(_) => self.mark_authenticated(),
            Err(e) if self.demo_mode => {
                warn!("Login failed ({}), continuing in demo mode", e);
                self.state.authenticated = true;
                self.state.session_user = Some(fixtures::demo_user(username));
                self.succeed();
            }
            Err(e) => {
                self.state.clear_auth();
                self.fail(&e);
                return;
            }
        }

        self.load_clients().await;
    }

    /// Application-credential login, followed by a client load on success
    pub async fn login_with_app_credentials(&mut self) {
        self.begin();

        match self.api.authenticate_with_app_credentials().await {
            Ok(_) => self.mark_authenticated(),
            Err(e) => {
                self.state.clear_auth();
                self.fail(&e);
                return;
            }
        }

        self.load_clients().await;
    }

    fn mark_authenticated(&mut self) {
        self.state.authenticated = true;
        self.state.session_user = self.api.current_user();
        info!(
            "Logged in as {}",
            self.state
                .session_user
                .as_ref()
                .map(|user| user.user_name.as_str())
                .unwrap_or("<unknown>")
        );
        self.succeed();
    }

    /// Drop the credential and every piece of loaded state. Never fails.
    pub fn logout(&mut self) {
        if let Err(e) = self.api.logout() {
            warn!("Logout could not clear stored credential: {}", e);
        }
        self.state = AppState::default();
    }

    /// Mirror the stored credential into the store without a network call,
    /// loading clients if authenticated and none are loaded yet
    pub async fn check_auth(&mut self) {
        self.begin();

        let authenticated = self.api.is_authenticated();
        self.state.authenticated = authenticated;
        self.state.session_user = if authenticated { self.api.current_user() } else { None };

        if authenticated && self.state.clients.is_empty() {
            self.load_clients().await;
        } else {
            self.succeed();
        }
    }

    // ---- Clients ----

    /// Replace the roster with the remote one. On failure the previous roster stays.
    pub async fn load_clients(&mut self) {
        self.begin();

        match self.api.get_clients().await {
            Ok(clients) => {
                info!("Loaded {} clients", clients.len());
                self.replace_clients(clients);
                self.succeed();
            }
            Err(e) if self.demo_mode => {
                warn!("Client load failed ({}), using demo clients", e);
                self.replace_clients(fixtures::demo_clients());
                self.succeed();
            }
            Err(e) => self.fail(&e),
        }
    }

    fn replace_clients(&mut self, clients: Vec<Client>) {
        self.state.clients = clients;

        // Keep the selection pointing at the fresh copy when it is still listed
        let refreshed = self
            .state
            .selected_client
            .as_ref()
            .and_then(|selected| self.state.find_client(&selected.id).cloned());
        if let Some(fresh) = refreshed {
            self.state.selected_client = Some(fresh);
        }
    }

    /// Fetch one client with its lines and SIM cards and select it
    pub async fn load_client(&mut self, client_id: &str) {
        self.begin();

        let result = async {
            let mut client = self.api.get_client(client_id).await?;
            client.lines = self.api.get_client_lines(client_id).await?;
            client.sim_cards = self.api.get_client_sim_cards(client_id).await?;
            Ok::<_, NetwError>(client)
        }
        .await;

        match result {
            Ok(client) => {
                self.state.upsert_client(client.clone());
                self.state.selected_client = Some(client);
                self.succeed();
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn select_client(&mut self, client: Option<Client>) {
        self.state.selected_client = client;
    }

    /// Local-only merge of `update` into the client; nothing is sent remotely
    pub fn update_client(&mut self, client_id: &str, update: &ClientUpdate) {
        self.begin();

        if self.state.apply_client_update(client_id, update) {
            self.succeed();
        } else {
            self.fail(&NetwError::not_found(format!("Client {}", client_id)));
        }
    }

    // ---- Consumption ----

    /// Fetch a line's consumption snapshot and attach it to the loaded line
    pub async fn load_line_consumption(&mut self, line_id: &str, period: Option<&Period>) -> Option<ConsumptionData> {
        self.begin();

        match self.api.get_line_consumption(line_id, period).await {
            Ok(consumption) => {
                let owners = self
                    .state
                    .clients
                    .iter_mut()
                    .chain(self.state.selected_client.as_mut());
                for client in owners {
                    for line in client.lines.iter_mut().filter(|line| line.id == line_id) {
                        line.consumption = Some(consumption.clone());
                    }
                }
                self.succeed();
                Some(consumption)
            }
            Err(e) => {
                self.fail(&e);
                None
            }
        }
    }

    // ---- General ----

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    pub fn compute_dashboard_stats(&self) -> DashboardStats {
        compute_dashboard_stats(&self.state.clients)
    }

    pub fn clients(&self, options: &FilterOptions<ClientStatus>) -> Vec<&Client> {
        filter::filter_clients(&self.state.clients, options)
    }

    pub fn lines(&self, options: &FilterOptions<LineStatus>) -> Vec<LineView<'_>> {
        filter::filter_lines(filter::all_lines(&self.state.clients), options)
    }

    pub fn sim_cards(&self, options: &FilterOptions<SimStatus>) -> Vec<SimCardView<'_>> {
        filter::filter_sim_cards(filter::all_sim_cards(&self.state.clients), options)
    }
}
