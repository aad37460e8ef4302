use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use std::io::{self, BufRead, Write};

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::store::AppStore;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login with a Netw username and password")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Login with the configured application id and secret")]
    AppLogin,

    #[command(about = "Logout and forget stored tokens")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Refresh authentication token")]
    Refresh,

    #[command(about = "Show current user information")]
    Whoami,
}

fn prompt_password(username: &str) -> anyhow::Result<String> {
    eprint!("Password for {}: ", username);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn report_login(store: &AppStore, output_format: &OutputFormat) -> anyhow::Result<()> {
    let state = store.state();
    if !state.authenticated {
        let message = state.error.clone().unwrap_or_else(|| "Login failed".to_string());
        output_error(output_format, &message, Some("AUTH_ERROR"))?;
        return Err(anyhow::anyhow!("{}", message));
    }

    let user_name = state
        .session_user
        .as_ref()
        .map(|user| user.user_name.clone())
        .unwrap_or_default();
    output_success(
        output_format,
        &format!("Logged in as '{}' ({} clients loaded)", user_name, state.clients.len()),
        Some(json!({
            "user": state.session_user,
            "clients": state.clients.len(),
            "demo_mode": store.is_demo_mode(),
        })),
    )?;

    // Authenticated, but the roster could not be loaded
    if let Some(message) = &state.error {
        output_error(output_format, message, None)?;
    }
    Ok(())
}

pub async fn handle(cmd: AuthCommands, store: &mut AppStore, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password(&username)?,
            };

            store.login(&username, &password).await;
            report_login(store, &output_format)
        }
        AuthCommands::AppLogin => {
            store.login_with_app_credentials().await;
            report_login(store, &output_format)
        }
        AuthCommands::Logout => {
            store.logout();
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let session = store.api().session();
            let credential = session.credential();
            let now = Utc::now();

            let access_live = credential.as_ref().and_then(|c| c.live_access_token(now)).is_some();
            let refresh_live = credential.as_ref().and_then(|c| c.live_refresh_token(now)).is_some();

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "authenticated": session.is_authenticated(),
                        "server": session.base_url(),
                        "access_expires_at": credential.as_ref().map(|c| c.access_expires_at),
                        "refresh_expires_at": credential.as_ref().map(|c| c.refresh_expires_at),
                        "refreshable": refresh_live,
                    }))?);
                }
                OutputFormat::Text => {
                    println!("Server: {}", session.base_url());
                    match &credential {
                        Some(c) if access_live => {
                            println!("Status: authenticated");
                            println!("Access token expires: {}", c.access_expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
                            println!("Refresh token expires: {}", c.refresh_expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
                        }
                        Some(c) if refresh_live => {
                            println!("Status: access token expired (refreshable until {})",
                                c.refresh_expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
                        }
                        _ => println!("Status: not authenticated"),
                    }
                }
            }
            Ok(())
        }
        AuthCommands::Refresh => match store.api().refresh().await {
            Ok(credential) => output_success(
                &output_format,
                "Token refreshed",
                Some(json!({ "access_expires_at": credential.access_expires_at })),
            ),
            Err(e) => {
                output_error(&output_format, &e.user_message(), Some(e.error_code()))?;
                Err(e.into())
            }
        },
        AuthCommands::Whoami => match store.api().current_user() {
            Some(user) => {
                match output_format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
                    OutputFormat::Text => {
                        println!("User ID: {}", or_dash(Some(&user.user_id)));
                        println!("Name: {}", or_dash(Some(&user.user_name)));
                        println!("Email: {}", or_dash(Some(&user.email)));
                        println!("Rights: {}", if user.rights.is_empty() { "-".to_string() } else { user.rights.join(", ") });
                    }
                }
                Ok(())
            }
            None => {
                output_error(&output_format, "Not logged in", Some("NOT_AUTHENTICATED"))?;
                Err(anyhow::anyhow!("Not logged in"))
            }
        },
    }
}
