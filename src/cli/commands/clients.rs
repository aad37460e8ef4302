use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::models::{ClientStatus, ClientUpdate};
use crate::store::{AppStore, FilterOptions};

#[derive(Subcommand)]
pub enum ClientCommands {
    #[command(about = "List clients")]
    List {
        #[arg(long, help = "Filter by status (active, inactive, suspended)")]
        status: Option<String>,
        #[arg(long, help = "Search in name and email")]
        search: Option<String>,
    },

    #[command(about = "Show a client with its lines and SIM cards")]
    Show {
        #[arg(help = "Client ID")]
        id: String,
    },

    #[command(about = "Edit client fields locally (not sent to Netw)")]
    Update {
        #[arg(help = "Client ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long, help = "active, inactive or suspended")]
        status: Option<String>,
    },
}

pub async fn handle(cmd: ClientCommands, store: &mut AppStore, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ClientCommands::List { status, search } => {
            let options = FilterOptions {
                status: parse_opt::<ClientStatus>(status)?,
                operator: None,
                search,
            };
            require_session(store, &output_format).await?;

            let clients = store.clients(&options);
            if clients.is_empty() {
                return output_empty_collection(&output_format, "clients", "No clients found");
            }

            match output_format {
                OutputFormat::Json => output_json_collection("clients", &clients)?,
                OutputFormat::Text => {
                    println!("{:<10} {:<30} {:<10} {:>6} {:>6} {}", "ID", "NAME", "STATUS", "LINES", "SIMS", "EMAIL");
                    println!("{}", "-".repeat(90));

                    for client in &clients {
                        println!("{:<10} {:<30} {:<10} {:>6} {:>6} {}",
                            client.id, client.name, client.status, client.lines.len(),
                            client.sim_cards.len(), or_dash(client.email.as_deref()));
                    }
                    println!();
                    println!("{} client(s)", clients.len());
                }
            }
            Ok(())
        }
        ClientCommands::Show { id } => {
            require_session(store, &output_format).await?;
            store.load_client(&id).await;
            ensure_no_store_error(store, &output_format)?;

            let client = match &store.state().selected_client {
                Some(client) => client,
                None => return Err(anyhow::anyhow!("Client '{}' not found", id)),
            };

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(client)?),
                OutputFormat::Text => {
                    println!("Client: {} ({})", client.name, client.id);
                    println!("Status: {}", client.status);
                    println!("Email: {}", or_dash(client.email.as_deref()));
                    println!("Phone: {}", or_dash(client.phone.as_deref()));
                    println!("Address: {}", or_dash(client.address.as_deref()));
                    println!("Created: {}", client.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
                    println!();
                    println!("Lines: {} ({} active)", client.lines.len(), client.active_line_count());
                    for line in &client.lines {
                        let holder = line.assignment.as_ref().map(|a| a.full_name());
                        println!("  {:<14} {:<9} {:<10} {:<20} {}",
                            line.msisdn, line.operator, line.status, line.plan, or_dash(holder.as_deref()));
                    }
                    println!();
                    println!("SIM cards: {} ({} available)", client.sim_cards.len(), client.available_sim_count());
                    for sim in &client.sim_cards {
                        println!("  {:<14} {:<9} {:<10} {}",
                            sim.reference, sim.operator, sim.status, or_dash(sim.line_id.as_deref()));
                    }
                }
            }
            Ok(())
        }
        ClientCommands::Update { id, name, email, phone, address, status } => {
            let update = ClientUpdate {
                name,
                email,
                phone,
                address,
                status: parse_opt::<ClientStatus>(status)?,
                updated_at: None,
            };
            if update.is_empty() {
                return Err(anyhow::anyhow!("Nothing to update; pass at least one field"));
            }

            require_session(store, &output_format).await?;
            store.update_client(&id, &update);
            ensure_no_store_error(store, &output_format)?;

            output_success(
                &output_format,
                &format!("Client '{}' updated locally (not sent to Netw)", id),
                Some(json!({ "client": store.state().find_client(&id) })),
            )
        }
    }
}
