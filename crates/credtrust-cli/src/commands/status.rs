//! `credtrust status`: Query the status of a running CredTrust node.

use clap::Args;
use serde::Deserialize;

use super::{get_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    version: String,
    storage_backend: String,
    issuer_count: usize,
    credential_count: usize,
    unique_issuer_names: bool,
    uptime_secs: u64,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let status: StatusResponse = get_json(&client, &args.endpoint, "/api/v1/status", "status")
        .await
        .map_err(|e| e.context("is the node running? start it with: credtrust-node"))?;

    println!("Node Status:");
    println!("  Version:      {}", status.version);
    println!("  Storage:      {}", status.storage_backend);
    println!("  Issuers:      {}", status.issuer_count);
    println!("  Credentials:  {}", status.credential_count);
    println!(
        "  Unique names: {}",
        if status.unique_issuer_names { "enforced" } else { "not enforced" }
    );
    println!("  Uptime:       {}s", status.uptime_secs);
    Ok(())
}
