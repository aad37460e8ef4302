//! Demo-mode stand-in data, used only when `NETW_DEMO_MODE` is enabled and
//! the remote API cannot be used.

use chrono::Utc;

use crate::models::{
    Assignment, Client, ClientStatus, Line, LineStatus, Operator, SimCard, SimStatus,
};
use crate::session::SessionUser;

pub fn demo_user(username: &str) -> SessionUser {
    SessionUser {
        user_id: "demo-user-1".to_string(),
        user_name: username.to_string(),
        email: format!("{}@demo.invalid", username),
        rights: vec!["admin".to_string(), "read".to_string(), "write".to_string()],
    }
}

pub fn demo_clients() -> Vec<Client> {
    let now = Utc::now();

    vec![
        Client {
            id: "1".to_string(),
            name: "Client Démo 1".to_string(),
            email: Some("client1@demo.invalid".to_string()),
            phone: Some("0123456789".to_string()),
            address: Some("123 Rue de la Démo, 75001 Paris".to_string()),
            created_at: now,
            updated_at: now,
            status: ClientStatus::Active,
            lines: vec![Line {
                id: "line1".to_string(),
                client_id: "1".to_string(),
                msisdn: "0123456789".to_string(),
                sim_reference: "SIM001".to_string(),
                operator: Operator::Orange,
                plan: "Forfait 50Go".to_string(),
                status: LineStatus::Active,
                assignment: Some(Assignment {
                    first_name: "Jean".to_string(),
                    last_name: "Dupont".to_string(),
                }),
                created_at: now,
                updated_at: now,
                consumption: None,
            }],
            sim_cards: vec![
                SimCard {
                    id: "sim1".to_string(),
                    client_id: "1".to_string(),
                    reference: "SIM001".to_string(),
                    status: SimStatus::Activated,
                    operator: Operator::Orange,
                    created_at: now,
                    activated_at: Some(now),
                    line_id: Some("line1".to_string()),
                },
                SimCard {
                    id: "sim2".to_string(),
                    client_id: "1".to_string(),
                    reference: "SIM002".to_string(),
                    status: SimStatus::Available,
                    operator: Operator::Bouygues,
                    created_at: now,
                    activated_at: None,
                    line_id: None,
                },
            ],
        },
        Client {
            id: "2".to_string(),
            name: "Client Démo 2".to_string(),
            email: Some("client2@demo.invalid".to_string()),
            phone: Some("0987654321".to_string()),
            address: Some("456 Avenue de la Démo, 69000 Lyon".to_string()),
            created_at: now,
            updated_at: now,
            status: ClientStatus::Active,
            lines: Vec::new(),
            sim_cards: vec![SimCard {
                id: "sim3".to_string(),
                client_id: "2".to_string(),
                reference: "SIM003".to_string(),
                status: SimStatus::Available,
                operator: Operator::Orange,
                created_at: now,
                activated_at: None,
                line_id: None,
            }],
        },
    ]
}
