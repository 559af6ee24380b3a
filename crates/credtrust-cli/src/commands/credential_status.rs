//! `credtrust credential-status`: Look up a credential's revocation status.

use clap::Args;
use serde::Deserialize;

use super::{get_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct CredentialStatusArgs {
    /// Credential id (`urn:uuid:...`).
    #[arg(short, long)]
    pub credential_id: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialStatusResponse {
    credential_id: String,
    status: String,
}

pub async fn run(args: &CredentialStatusArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let path = format!("/api/v1/credentials/{}/status", args.credential_id);
    let data: CredentialStatusResponse =
        get_json(&client, &args.endpoint, &path, "status lookup").await?;
    println!("{}: {}", data.credential_id, data.status);
    Ok(())
}
