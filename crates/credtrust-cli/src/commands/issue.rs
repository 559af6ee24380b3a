//! `credtrust issue`: Issue a credential to a holder.

use clap::Args;
use serde::{Deserialize, Serialize};

use super::{post_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Identifier of the issuing issuer (`did:ct:...`).
    #[arg(short, long)]
    pub issuer: String,

    /// Holder identifier.
    #[arg(long)]
    pub holder: String,

    /// Credential type(s), comma-separated.
    #[arg(short = 't', long, value_delimiter = ',')]
    pub credential_type: Vec<String>,

    /// Claims as a JSON object.
    #[arg(short, long, default_value = "{}")]
    pub claims: String,

    /// Print only the token, for piping into `credtrust verify`.
    #[arg(long)]
    pub token_only: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub issuer_identifier: String,
    pub holder: String,
    pub claims: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResponse {
    pub credential_id: String,
    pub issuer: String,
    pub holder: String,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    pub issued_at: String,
    pub token: String,
}

pub fn parse_claims(claims: &str) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str(claims) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => anyhow::bail!("claims must be a JSON object"),
        Err(e) => anyhow::bail!("invalid claims JSON: {}", e),
    }
}

pub async fn issue(
    client: &reqwest::Client,
    endpoint: &str,
    request: &IssueRequest,
) -> anyhow::Result<CredentialResponse> {
    post_json(client, endpoint, "/api/v1/credentials/issue", request, "issuance").await
}

pub async fn run(args: &IssueArgs) -> anyhow::Result<()> {
    let request = IssueRequest {
        issuer_identifier: args.issuer.clone(),
        holder: args.holder.clone(),
        claims: parse_claims(&args.claims)?,
        credential_type: args.credential_type.clone(),
    };

    let client = reqwest::Client::new();
    let data = issue(&client, &args.endpoint, &request).await?;

    if args.token_only {
        println!("{}", data.token);
        return Ok(());
    }
    println!("Credential issued!");
    println!("  ID:      {}", data.credential_id);
    println!("  Issuer:  {}", data.issuer);
    println!("  Holder:  {}", data.holder);
    println!("  Type:    {}", data.credential_type.join(", "));
    println!("  Issued:  {}", data.issued_at);
    println!("  Token:   {}", data.token);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_claims_object() {
        let claims = parse_claims(r#"{"role":"Intern","company":"Acme"}"#).unwrap();
        assert_eq!(claims["role"], "Intern");
    }

    #[test]
    fn test_parse_claims_rejects_non_object() {
        assert!(parse_claims("[1,2]").is_err());
        assert!(parse_claims("not json").is_err());
    }

    #[test]
    fn test_request_json_shape() {
        let request = IssueRequest {
            issuer_identifier: "did:ct:abc".into(),
            holder: "did:example:student123".into(),
            claims: parse_claims(r#"{"role":"Intern"}"#).unwrap(),
            credential_type: vec!["InternshipCertificate".into()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["issuerIdentifier"], "did:ct:abc");
        assert_eq!(json["type"][0], "InternshipCertificate");
    }
}
