//! `credtrust revoke`: Revoke a credential.

use clap::Args;
use serde::{Deserialize, Serialize};

use super::{post_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Credential id (`urn:uuid:...`).
    #[arg(short, long)]
    pub credential_id: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeRequest<'a> {
    credential_id: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    pub credential_id: String,
    pub status: String,
    pub already_revoked: bool,
}

pub async fn revoke(
    client: &reqwest::Client,
    endpoint: &str,
    credential_id: &str,
) -> anyhow::Result<RevokeResponse> {
    post_json(
        client,
        endpoint,
        "/api/v1/credentials/revoke",
        &RevokeRequest { credential_id },
        "revocation",
    )
    .await
}

pub async fn run(args: &RevokeArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let data = revoke(&client, &args.endpoint, &args.credential_id).await?;
    if data.already_revoked {
        println!("Credential {} was already revoked.", data.credential_id);
    } else {
        println!("Credential {} revoked.", data.credential_id);
    }
    println!("  Status: {}", data.status);
    Ok(())
}
