//! `credtrust register`: Register a new issuer.

use clap::Args;
use serde::{Deserialize, Serialize};

use super::{post_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display name of the issuer.
    #[arg(short, long)]
    pub name: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IssuerResponse {
    pub identifier: String,
    pub name: String,
    pub algorithm: String,
    pub public_key: String,
    pub created_at: String,
}

pub async fn register(
    client: &reqwest::Client,
    endpoint: &str,
    name: &str,
) -> anyhow::Result<IssuerResponse> {
    post_json(
        client,
        endpoint,
        "/api/v1/issuers",
        &RegisterRequest { name },
        "registration",
    )
    .await
}

pub fn print_issuer(issuer: &IssuerResponse) {
    println!("  Identifier: {}", issuer.identifier);
    println!("  Name:       {}", issuer.name);
    println!("  Algorithm:  {}", issuer.algorithm);
    println!("  Public key: {}", issuer.public_key);
    println!("  Created:    {}", issuer.created_at);
}

pub async fn run(args: &RegisterArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let issuer = register(&client, &args.endpoint, &args.name).await?;
    println!("Issuer registered!");
    print_issuer(&issuer);
    Ok(())
}
