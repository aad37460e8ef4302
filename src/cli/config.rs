use std::fs;
use std::path::PathBuf;

pub const CREDENTIALS_FILE: &str = "credentials.json";

/// CLI state directory: `NETW_CLI_CONFIG_DIR`, else `$HOME/.config/netw/cli`
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("NETW_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("netw").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Location of the persisted session credential
pub fn credentials_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join(CREDENTIALS_FILE))
}
