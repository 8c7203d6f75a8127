//! Property listing command.

use anyhow::Result;
use colored::Colorize;
use console::style;

use gsc_client::SearchConsoleClient;

pub async fn run(client: &SearchConsoleClient) -> Result<()> {
    let sites = client.list_sites().await?;

    if sites.is_empty() {
        println!("{}", "No properties found for this account.".yellow());
        return Ok(());
    }

    for site in sites {
        println!("{:<60} {}", site.site_url, style(site.permission_level).dim());
    }
    Ok(())
}
