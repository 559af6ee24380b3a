//! `credtrust demo`: Walk through the full credential lifecycle against a
//! running node: register, issue, verify, revoke, verify again.

use clap::Args;

use super::issue::{issue, parse_claims, IssueRequest};
use super::register::register;
use super::revoke::revoke;
use super::verify::{print_verdict, verify};
use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Name of the demo issuer.
    #[arg(long, default_value = "Acme Internships Pvt Ltd")]
    pub issuer_name: String,

    /// Holder of the demo credential.
    #[arg(long, default_value = "did:example:student123")]
    pub holder: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

const DEMO_CLAIMS: &str = r#"{
    "role": "Frontend Intern",
    "company": "Acme",
    "startDate": "2025-06-01",
    "endDate": "2025-08-31",
    "remarks": "Completed project X"
}"#;

pub async fn run(args: &DemoArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();

    println!("1) Register issuer");
    let issuer = register(&client, &args.endpoint, &args.issuer_name).await?;
    println!("   issuer: {} ({})", issuer.identifier, issuer.name);

    println!("\n2) Issue internship credential");
    let request = IssueRequest {
        issuer_identifier: issuer.identifier.clone(),
        holder: args.holder.clone(),
        claims: parse_claims(DEMO_CLAIMS)?,
        credential_type: vec!["InternshipCertificate".into()],
    };
    let credential = issue(&client, &args.endpoint, &request).await?;
    println!("   credentialId: {}", credential.credential_id);

    println!("\n3) Verify credential");
    let first = verify(&client, &args.endpoint, &credential.token).await?;
    print_verdict(&first);
    if !first.valid {
        anyhow::bail!("freshly issued credential did not verify");
    }

    println!("\n4) Revoke credential");
    let receipt = revoke(&client, &args.endpoint, &credential.credential_id).await?;
    println!("   {} is {}", receipt.credential_id, receipt.status);

    println!("\n5) Verify after revoke (should fail)");
    let second = verify(&client, &args.endpoint, &credential.token).await?;
    print_verdict(&second);
    if second.valid {
        anyhow::bail!("revoked credential still verified");
    }

    println!("\nDemo complete.");
    Ok(())
}
