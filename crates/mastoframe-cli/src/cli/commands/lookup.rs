//! One-shot account id lookup.

use anyhow::{Context, Result};
use mastoframe_core::config::Config;
use mastoframe_mastodon::{MastodonClient, MastodonSettings};

pub async fn run(config: &Config, account: &str, limit: usize) -> Result<()> {
    let settings = MastodonSettings::from_config(&config.mastodon)?;
    let client = MastodonClient::new(&settings);

    let accounts = client
        .account_search(account, limit)
        .await
        .with_context(|| format!("search for account {account}"))?;

    if accounts.is_empty() {
        eprintln!("No accounts found for {account}");
        return Ok(());
    }
    for found in accounts {
        println!("{}: {}", found.acct, found.id);
    }
    Ok(())
}
