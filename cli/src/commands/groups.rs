use anyhow::{Context, Result};
use colored::*;
use serde_json::json;
use user::config::group_variable;
use user::RemoteUserConfig;

use crate::OutputFormat;

/// Show the effective remote user configuration.
pub fn execute(format: OutputFormat) -> Result<()> {
    let config = RemoteUserConfig::from_env().context("Invalid group configuration")?;

    match format {
        OutputFormat::Json => {
            let groups: Vec<_> = config
                .group_roles
                .slots()
                .iter()
                .map(|(token, role)| {
                    json!({
                        "variable": group_variable(*role),
                        "token": token,
                        "role": role,
                    })
                })
                .collect();
            let output = json!({
                "auto_create_users": config.auto_create_users,
                "default_account_name": config.default_account_name,
                "groups": groups,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("{}", "Remote user configuration".bold());
            println!(
                "  Auto-create users:  {}",
                if config.auto_create_users {
                    "enabled".green()
                } else {
                    "disabled".yellow()
                }
            );
            println!("  Default account:    {}", config.default_account_name);
            println!();
            println!("{}", "Group mapping".bold());
            for (token, role) in config.group_roles.slots() {
                println!(
                    "  {:<14} {:<24} -> {}",
                    group_variable(*role).dimmed(),
                    token,
                    role.to_string().cyan()
                );
            }
        }
    }

    Ok(())
}
