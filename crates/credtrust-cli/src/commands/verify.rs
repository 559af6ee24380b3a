//! `credtrust verify`: Verify a credential token.

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Token (inline, or path to a file containing it).
    #[arg(short, long)]
    pub token: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub checks: Vec<VerifyCheck>,
    #[serde(default)]
    pub credential_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct VerifyCheck {
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
}

/// Ask the node for a verdict. Rejections (malformed token, unknown issuer)
/// come back as a negative response carrying `error`.
pub async fn verify(
    client: &reqwest::Client,
    endpoint: &str,
    token: &str,
) -> anyhow::Result<VerifyResponse> {
    let url = format!("{}/api/v1/credentials/verify", endpoint.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .json(&VerifyRequest { token })
        .send()
        .await
        .with_context(|| format!("could not reach node at {}", endpoint))?;

    let status = resp.status();
    if status.is_success() || status.is_client_error() {
        let data: VerifyResponse = resp
            .json()
            .await
            .with_context(|| format!("unexpected verify response (HTTP {})", status))?;
        return Ok(data);
    }
    Err(super::failure("verification", resp).await)
}

pub fn print_verdict(data: &VerifyResponse) {
    if data.valid {
        println!("Credential is VALID");
    } else {
        match data.reason {
            Some(ref reason) => println!("Credential is INVALID ({})", reason),
            None => println!("Credential is INVALID"),
        }
    }
    if let Some(ref error) = data.error {
        println!("  Error: {}", error);
    }
    if let Some(ref id) = data.credential_id {
        println!("  ID: {}", id);
    }
    for check in &data.checks {
        let icon = if check.passed { "PASS" } else { "FAIL" };
        print!("  [{}] {}", icon, check.name);
        if let Some(ref detail) = check.detail {
            print!(": {}", detail);
        }
        println!();
    }
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    // Try reading as file first, then as an inline token
    let token = if std::path::Path::new(&args.token).exists() {
        std::fs::read_to_string(&args.token)?
    } else {
        args.token.clone()
    };

    let client = reqwest::Client::new();
    let data = verify(&client, &args.endpoint, token.trim()).await?;
    print_verdict(&data);
    Ok(())
}
