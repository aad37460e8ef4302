use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Billing window a consumption snapshot covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: String,
    pub end: String,
}

impl Period {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// One metered dimension. Units: MB for data, minutes for voice, messages for SMS.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Meter {
    pub used: f64,
    pub limit: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionKind {
    Data,
    Voice,
    Sms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionEvent {
    pub id: String,
    pub line_id: String,
    #[serde(rename = "type")]
    pub kind: ConsumptionKind,
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionData {
    pub line_id: String,
    pub period: Period,
    pub data: Meter,
    pub voice: Meter,
    pub sms: Meter,
    #[serde(default)]
    pub events: Vec<ConsumptionEvent>,
}

impl ConsumptionData {
    pub fn meter(&self, kind: ConsumptionKind) -> &Meter {
        match kind {
            ConsumptionKind::Data => &self.data,
            ConsumptionKind::Voice => &self.voice,
            ConsumptionKind::Sms => &self.sms,
        }
    }
}
