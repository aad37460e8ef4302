use clap::Subcommand;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::models::{LineStatus, Operator, Period};
use crate::store::{AppStore, FilterOptions};

#[derive(Subcommand)]
pub enum LineCommands {
    #[command(about = "List lines across all clients")]
    List {
        #[arg(long, help = "Only lines of this client ID")]
        client: Option<String>,
        #[arg(long, help = "Filter by status (active, inactive, suspended, pending)")]
        status: Option<String>,
        #[arg(long, help = "Filter by operator (orange, bouygues)")]
        operator: Option<String>,
        #[arg(long, help = "Search in number, assignee and client name")]
        search: Option<String>,
    },

    #[command(about = "Show data, voice and SMS consumption of a line")]
    Consumption {
        #[arg(help = "Line ID")]
        id: String,
        #[arg(long, requires = "end", help = "Period start (YYYY-MM-DD)")]
        start: Option<String>,
        #[arg(long, requires = "start", help = "Period end (YYYY-MM-DD)")]
        end: Option<String>,
    },
}

pub async fn handle(cmd: LineCommands, store: &mut AppStore, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        LineCommands::List { client, status, operator, search } => {
            let options = FilterOptions {
                status: parse_opt::<LineStatus>(status)?,
                operator: parse_opt::<Operator>(operator)?,
                search,
            };
            require_session(store, &output_format).await?;

            let lines: Vec<_> = store
                .lines(&options)
                .into_iter()
                .filter(|view| client.as_deref().map_or(true, |id| view.line.client_id == id))
                .collect();
            if lines.is_empty() {
                return output_empty_collection(&output_format, "lines", "No lines found");
            }

            match output_format {
                OutputFormat::Json => output_json_collection("lines", &lines)?,
                OutputFormat::Text => {
                    println!("{:<14} {:<9} {:<10} {:<20} {:<24} {:>6} {:>6} {:>6}",
                        "MSISDN", "OPERATOR", "STATUS", "PLAN", "CLIENT", "DATA", "VOICE", "SMS");
                    println!("{}", "-".repeat(104));

                    for view in &lines {
                        let line = view.line;
                        let usage = |pct: Option<f64>| pct.map_or("-".to_string(), |p| format!("{:.0}%", p));
                        let consumption = line.consumption.as_ref();
                        println!("{:<14} {:<9} {:<10} {:<20} {:<24} {:>6} {:>6} {:>6}",
                            line.msisdn, line.operator, line.status, line.plan, view.client_name,
                            usage(consumption.map(|c| c.data.percentage)),
                            usage(consumption.map(|c| c.voice.percentage)),
                            usage(consumption.map(|c| c.sms.percentage)));
                    }
                    println!();
                    println!("{} line(s)", lines.len());
                }
            }
            Ok(())
        }
        LineCommands::Consumption { id, start, end } => {
            let period = match (start, end) {
                (Some(start), Some(end)) => Some(Period::new(start, end)),
                _ => None,
            };

            require_session(store, &output_format).await?;
            let consumption = store.load_line_consumption(&id, period.as_ref()).await;
            ensure_no_store_error(store, &output_format)?;

            let consumption = match consumption {
                Some(consumption) => consumption,
                None => return Err(anyhow::anyhow!("No consumption data for line '{}'", id)),
            };

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&consumption)?),
                OutputFormat::Text => {
                    println!("Line: {}", consumption.line_id);
                    println!("Period: {} -> {}", consumption.period.start, consumption.period.end);
                    println!("Data:  {:.0} / {:.0} MB ({:.0}%)", consumption.data.used, consumption.data.limit, consumption.data.percentage);
                    println!("Voice: {:.0} / {:.0} min ({:.0}%)", consumption.voice.used, consumption.voice.limit, consumption.voice.percentage);
                    println!("SMS:   {:.0} / {:.0} ({:.0}%)", consumption.sms.used, consumption.sms.limit, consumption.sms.percentage);

                    if !consumption.events.is_empty() {
                        println!();
                        println!("{:<20} {:<6} {:>10} {:>8} {}", "TIMESTAMP", "TYPE", "AMOUNT", "COST", "DESCRIPTION");
                        for event in &consumption.events {
                            let kind = serde_json::to_value(event.kind)?;
                            println!("{:<20} {:<6} {:>10.2} {:>8} {}",
                                event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                                kind.as_str().unwrap_or("-"),
                                event.amount,
                                event.cost.map_or("-".to_string(), |c| format!("{:.2}", c)),
                                event.description);
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
