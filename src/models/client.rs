use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Line, LineStatus, SimCard, SimStatus, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
    Suspended,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
            ClientStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(ClientStatus::Active),
            "inactive" => Ok(ClientStatus::Inactive),
            "suspended" => Ok(ClientStatus::Suspended),
            _ => Err(UnknownVariant::new("client status", s)),
        }
    }
}

/// A reseller customer. Owns its lines and SIM cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: ClientStatus,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub sim_cards: Vec<SimCard>,
}

impl Client {
    pub fn active_line_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.status == LineStatus::Active)
            .count()
    }

    pub fn available_sim_count(&self) -> usize {
        self.sim_cards
            .iter()
            .filter(|sim| sim.status == SimStatus::Available)
            .count()
    }

    /// Return a copy with `update` merged in; fields absent from the update are kept
    pub fn merged(&self, update: &ClientUpdate) -> Client {
        let mut next = self.clone();
        if let Some(name) = &update.name {
            next.name = name.clone();
        }
        if let Some(email) = &update.email {
            next.email = Some(email.clone());
        }
        if let Some(phone) = &update.phone {
            next.phone = Some(phone.clone());
        }
        if let Some(address) = &update.address {
            next.address = Some(address.clone());
        }
        if let Some(status) = update.status {
            next.status = status;
        }
        if let Some(updated_at) = update.updated_at {
            next.updated_at = updated_at;
        }
        next
    }
}

/// Partial client fields for a local update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClientStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClientUpdate {
    pub fn status(status: ClientStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
