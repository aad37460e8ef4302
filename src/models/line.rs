use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ConsumptionData, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Orange,
    Bouygues,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Orange => "orange",
            Operator::Bouygues => "bouygues",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "orange" => Ok(Operator::Orange),
            "bouygues" => Ok(Operator::Bouygues),
            _ => Err(UnknownVariant::new("operator", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Active,
    Inactive,
    Suspended,
    Pending,
}

impl LineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineStatus::Active => "active",
            LineStatus::Inactive => "inactive",
            LineStatus::Suspended => "suspended",
            LineStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LineStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(LineStatus::Active),
            "inactive" => Ok(LineStatus::Inactive),
            "suspended" => Ok(LineStatus::Suspended),
            "pending" => Ok(LineStatus::Pending),
            _ => Err(UnknownVariant::new("line status", s)),
        }
    }
}

/// Person a line is handed out to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub first_name: String,
    pub last_name: String,
}

impl Assignment {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A mobile line. `client_id` is a back-reference; the owning client holds the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: String,
    pub client_id: String,
    pub msisdn: String,
    pub sim_reference: String,
    pub operator: Operator,
    pub plan: String,
    pub status: LineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumption: Option<ConsumptionData>,
}
