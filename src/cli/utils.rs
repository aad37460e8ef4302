use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::store::AppStore;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print a serializable collection as `{ name: [...] }`
pub fn output_json_collection<T: Serialize>(collection_name: &str, items: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&json!({
        collection_name: items
    }))?);
    Ok(())
}

/// Turn a store error left by the last action into a command failure
pub fn ensure_no_store_error(store: &AppStore, output_format: &OutputFormat) -> anyhow::Result<()> {
    if let Some(message) = &store.state().error {
        output_error(output_format, message, None)?;
        return Err(anyhow::anyhow!("{}", message));
    }
    Ok(())
}

/// Load the session from disk and the roster from the API; fail if logged out
pub async fn require_session(store: &mut AppStore, output_format: &OutputFormat) -> anyhow::Result<()> {
    store.check_auth().await;

    if !store.state().authenticated {
        let message = store
            .state()
            .error
            .clone()
            .unwrap_or_else(|| "Not logged in. Use 'netw auth login <username>' first".to_string());
        output_error(output_format, &message, Some("NOT_AUTHENTICATED"))?;
        return Err(anyhow::anyhow!("{}", message));
    }

    ensure_no_store_error(store, output_format)
}

/// Placeholder for absent optional text columns
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// Parse an optional CLI filter value
pub fn parse_opt<T>(value: Option<String>) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| v.parse::<T>().map_err(|e| anyhow::anyhow!("{}", e)))
        .transpose()
}
