//! Print the effective configuration.

use anyhow::Result;

use polyglot_types::config::AppConfig;

/// Print `config` as TOML, or JSON with `--json`.
///
/// Secrets are never part of [`AppConfig`], so the output is safe to share.
pub fn show_config(config: &AppConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}
