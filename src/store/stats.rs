use serde::{Deserialize, Serialize};

use crate::models::Client;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionSummary {
    pub total_data_used: f64,
    pub total_voice_used: f64,
    pub total_sms_used: f64,
}

/// Dashboard aggregates, always derived from the loaded client roster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clients: usize,
    pub total_lines: usize,
    pub active_lines: usize,
    pub total_sim_cards: usize,
    pub available_sim_cards: usize,
    pub consumption_summary: ConsumptionSummary,
}

pub fn compute_dashboard_stats(clients: &[Client]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_clients: clients.len(),
        ..DashboardStats::default()
    };

    for client in clients {
        stats.total_lines += client.lines.len();
        stats.active_lines += client.active_line_count();
        stats.total_sim_cards += client.sim_cards.len();
        stats.available_sim_cards += client.available_sim_count();

        // Lines without a snapshot contribute nothing
        for consumption in client.lines.iter().filter_map(|line| line.consumption.as_ref()) {
            stats.consumption_summary.total_data_used += consumption.data.used;
            stats.consumption_summary.total_voice_used += consumption.voice.used;
            stats.consumption_summary.total_sms_used += consumption.sms.used;
        }
    }

    stats
}
