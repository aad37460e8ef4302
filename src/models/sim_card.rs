use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Operator, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimStatus {
    Available,
    Activated,
    Blocked,
}

impl SimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimStatus::Available => "available",
            SimStatus::Activated => "activated",
            SimStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SimStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "available" => Ok(SimStatus::Available),
            "activated" => Ok(SimStatus::Activated),
            "blocked" => Ok(SimStatus::Blocked),
            _ => Err(UnknownVariant::new("SIM status", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimCard {
    pub id: String,
    pub client_id: String,
    pub reference: String,
    pub status: SimStatus,
    pub operator: Operator,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
    /// Line this card was activated on, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
}
