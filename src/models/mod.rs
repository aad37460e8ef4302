/// Domain records returned by the Netw API

pub mod client;
pub mod consumption;
pub mod line;
pub mod sim_card;

pub use client::{Client, ClientStatus, ClientUpdate};
pub use consumption::{ConsumptionData, ConsumptionEvent, ConsumptionKind, Meter, Period};
pub use line::{Assignment, Line, LineStatus, Operator};
pub use sim_card::{SimCard, SimStatus};

use serde::{Deserialize, Serialize};

/// Standard response envelope: `{ success, data, message?, error? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Best available failure description from the envelope
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request was not successful".to_string())
    }
}

/// Error returned when a wire string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
