//! List filtering for clients, lines and SIM cards.
//!
//! Lines and SIM cards are listed across every loaded client, each paired
//! with the name of the client that owns it.

use serde::Serialize;

use crate::models::{Client, ClientStatus, Line, LineStatus, Operator, SimCard, SimStatus};

/// Optional status, operator and free-text criteria; `None` matches everything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions<S> {
    pub status: Option<S>,
    pub operator: Option<Operator>,
    pub search: Option<String>,
}

impl<S> Default for FilterOptions<S> {
    fn default() -> Self {
        Self {
            status: None,
            operator: None,
            search: None,
        }
    }
}

impl<S> FilterOptions<S> {
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView<'a> {
    pub client_name: &'a str,
    #[serde(flatten)]
    pub line: &'a Line,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimCardView<'a> {
    pub client_name: &'a str,
    #[serde(flatten)]
    pub sim_card: &'a SimCard,
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

pub fn filter_clients<'a>(clients: &'a [Client], options: &FilterOptions<ClientStatus>) -> Vec<&'a Client> {
    let term = options.search_term();
    clients
        .iter()
        .filter(|client| options.status.map_or(true, |status| client.status == status))
        .filter(|client| match &term {
            Some(term) => {
                contains_ci(&client.name, term)
                    || client.email.as_deref().map_or(false, |email| contains_ci(email, term))
            }
            None => true,
        })
        .collect()
}

pub fn all_lines(clients: &[Client]) -> Vec<LineView<'_>> {
    clients
        .iter()
        .flat_map(|client| {
            client.lines.iter().map(move |line| LineView {
                client_name: &client.name,
                line,
            })
        })
        .collect()
}

pub fn filter_lines<'a>(lines: Vec<LineView<'a>>, options: &FilterOptions<LineStatus>) -> Vec<LineView<'a>> {
    let term = options.search_term();
    lines
        .into_iter()
        .filter(|view| options.status.map_or(true, |status| view.line.status == status))
        .filter(|view| options.operator.map_or(true, |operator| view.line.operator == operator))
        .filter(|view| match &term {
            Some(term) => {
                view.line.msisdn.contains(term.as_str())
                    || view.line.assignment.as_ref().map_or(false, |a| {
                        contains_ci(&a.first_name, term) || contains_ci(&a.last_name, term)
                    })
                    || contains_ci(view.client_name, term)
            }
            None => true,
        })
        .collect()
}

pub fn all_sim_cards(clients: &[Client]) -> Vec<SimCardView<'_>> {
    clients
        .iter()
        .flat_map(|client| {
            client.sim_cards.iter().map(move |sim_card| SimCardView {
                client_name: &client.name,
                sim_card,
            })
        })
        .collect()
}

pub fn filter_sim_cards<'a>(
    sim_cards: Vec<SimCardView<'a>>,
    options: &FilterOptions<SimStatus>,
) -> Vec<SimCardView<'a>> {
    let term = options.search_term();
    sim_cards
        .into_iter()
        .filter(|view| options.status.map_or(true, |status| view.sim_card.status == status))
        .filter(|view| options.operator.map_or(true, |operator| view.sim_card.operator == operator))
        .filter(|view| match &term {
            Some(term) => contains_ci(&view.sim_card.reference, term) || contains_ci(view.client_name, term),
            None => true,
        })
        .collect()
}
