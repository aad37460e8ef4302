use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::store::AppStore;

pub async fn handle(store: &mut AppStore, output_format: OutputFormat) -> anyhow::Result<()> {
    require_session(store, &output_format).await?;
    let stats = store.compute_dashboard_stats();

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Clients:      {}", stats.total_clients);
            println!("Lines:        {} ({} active)", stats.total_lines, stats.active_lines);
            println!("SIM cards:    {} ({} available)", stats.total_sim_cards, stats.available_sim_cards);
            println!();
            println!("Consumption (loaded snapshots)");
            println!("  Data:  {:.0} MB", stats.consumption_summary.total_data_used);
            println!("  Voice: {:.0} min", stats.consumption_summary.total_voice_used);
            println!("  SMS:   {:.0}", stats.consumption_summary.total_sms_used);
        }
    }
    Ok(())
}
