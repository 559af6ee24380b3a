//! `credtrust issuers`: List registered issuers, or show one.

use clap::Args;
use serde::Deserialize;

use super::register::{print_issuer, IssuerResponse};
use super::{get_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct IssuersArgs {
    /// Show only this issuer.
    #[arg(short, long)]
    pub identifier: Option<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct IssuersResponse {
    issuers: Vec<IssuerResponse>,
    count: usize,
}

pub async fn run(args: &IssuersArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();

    if let Some(ref identifier) = args.identifier {
        let path = format!("/api/v1/issuers/{}", identifier);
        let issuer: IssuerResponse = get_json(&client, &args.endpoint, &path, "lookup").await?;
        print_issuer(&issuer);
        return Ok(());
    }

    let data: IssuersResponse =
        get_json(&client, &args.endpoint, "/api/v1/issuers", "listing").await?;
    if data.count == 0 {
        println!("No issuers registered.");
        return Ok(());
    }
    println!("Registered issuers ({}):", data.count);
    for issuer in &data.issuers {
        println!("  {}  {}", issuer.identifier, issuer.name);
    }
    Ok(())
}
