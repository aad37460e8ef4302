use clap::Subcommand;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::models::{Operator, SimStatus};
use crate::store::{AppStore, FilterOptions};

#[derive(Subcommand)]
pub enum SimCommands {
    #[command(about = "List SIM cards across all clients")]
    List {
        #[arg(long, help = "Only SIM cards of this client ID")]
        client: Option<String>,
        #[arg(long, help = "Filter by status (available, activated, blocked)")]
        status: Option<String>,
        #[arg(long, help = "Filter by operator (orange, bouygues)")]
        operator: Option<String>,
        #[arg(long, help = "Search in reference and client name")]
        search: Option<String>,
    },
}

pub async fn handle(cmd: SimCommands, store: &mut AppStore, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SimCommands::List { client, status, operator, search } => {
            let options = FilterOptions {
                status: parse_opt::<SimStatus>(status)?,
                operator: parse_opt::<Operator>(operator)?,
                search,
            };
            require_session(store, &output_format).await?;

            let sims: Vec<_> = store
                .sim_cards(&options)
                .into_iter()
                .filter(|view| client.as_deref().map_or(true, |id| view.sim_card.client_id == id))
                .collect();
            if sims.is_empty() {
                return output_empty_collection(&output_format, "sim_cards", "No SIM cards found");
            }

            match output_format {
                OutputFormat::Json => output_json_collection("sim_cards", &sims)?,
                OutputFormat::Text => {
                    println!("{:<14} {:<9} {:<10} {:<24} {:<12} {}", "REFERENCE", "OPERATOR", "STATUS", "CLIENT", "LINE", "ACTIVATED");
                    println!("{}", "-".repeat(90));

                    for view in &sims {
                        let sim = view.sim_card;
                        let activated = sim.activated_at.map(|at| at.format("%Y-%m-%d").to_string());
                        println!("{:<14} {:<9} {:<10} {:<24} {:<12} {}",
                            sim.reference, sim.operator, sim.status, view.client_name,
                            or_dash(sim.line_id.as_deref()), or_dash(activated.as_deref()));
                    }

                    let available = sims.iter().filter(|v| v.sim_card.status == SimStatus::Available).count();
                    let orange = sims.iter().filter(|v| v.sim_card.operator == Operator::Orange).count();
                    println!();
                    println!("{} SIM card(s): {} available, {} Orange, {} Bouygues",
                        sims.len(), available, orange, sims.len() - orange);
                }
            }
            Ok(())
        }
    }
}
