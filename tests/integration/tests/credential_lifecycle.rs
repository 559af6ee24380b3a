//! Integration test: full credential lifecycle across crates.
//!
//! Registers issuers, issues, verifies, and revokes credentials through the
//! trust service, with credtrust-crypto and credtrust-core underneath.

use std::sync::Arc;

use credtrust_core::{CredentialState, Did, TrustPolicy};
use credtrust_credentials::verifier::{SIGNATURE_CHECK, STATUS_CHECK};
use credtrust_credentials::{
    decode, CredentialRecord, FailureReason, InMemoryCredentialStore, IssueRequest, Issuer,
    RevocationRegistry, RevocationStatus, TrustError, TrustService,
};
use credtrust_crypto::{derive_identifier, KeyPair};

fn internship_claims() -> credtrust_core::Claims {
    serde_json::from_value(serde_json::json!({
        "role": "Frontend Intern",
        "company": "Acme",
        "startDate": "2025-06-01",
        "endDate": "2025-08-31",
        "remarks": "Completed project X"
    }))
    .unwrap()
}

fn internship_request(issuer: &Issuer) -> IssueRequest {
    IssueRequest {
        issuer: issuer.identifier.uri().to_string(),
        holder: "did:example:student123".into(),
        claims: internship_claims(),
        credential_type: vec!["InternshipCertificate".into()],
    }
}

// =========================================================================
// Register -> issue -> verify -> revoke -> verify
// =========================================================================

#[tokio::test]
async fn test_acme_internship_lifecycle() {
    let service = TrustService::in_memory(TrustPolicy::default());

    let issuer = service
        .register_issuer("Acme Internships Pvt Ltd")
        .await
        .expect("registration should succeed");
    assert!(issuer.identifier.uri().starts_with("did:ct:"));
    assert_eq!(issuer.identifier, derive_identifier(&issuer.public_key));

    let credential = service
        .issue_credential(internship_request(&issuer))
        .await
        .expect("issuance should succeed");
    assert!(credential.credential_id.starts_with("urn:uuid:"));
    assert_eq!(credential.issuer, issuer.identifier);
    assert_eq!(
        credential.credential_type,
        vec!["VerifiableCredential", "InternshipCertificate"]
    );

    let result = service.verify_credential(&credential.token).await.unwrap();
    assert!(result.valid);
    assert!(result.reason.is_none());
    assert!(result.check(SIGNATURE_CHECK).unwrap().passed);
    assert!(result.check(STATUS_CHECK).unwrap().passed);
    assert_eq!(result.credential_id.as_deref(), Some(credential.credential_id.as_str()));
    assert_eq!(result.holder.as_deref(), Some("did:example:student123"));

    let receipt = service
        .revoke_credential(&credential.credential_id)
        .await
        .unwrap();
    assert_eq!(receipt.status, RevocationStatus::Revoked);
    assert!(!receipt.already_revoked);

    let result = service.verify_credential(&credential.token).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Some(FailureReason::Revoked));
    assert!(result.check(SIGNATURE_CHECK).unwrap().passed);
    assert!(!result.check(STATUS_CHECK).unwrap().passed);

    let again = service
        .revoke_credential(&credential.credential_id)
        .await
        .unwrap();
    assert!(again.already_revoked);
    assert!(service.is_revoked(&credential.credential_id).await.unwrap());
}

#[tokio::test]
async fn test_token_carries_issued_claims() {
    let service = TrustService::in_memory(TrustPolicy::default());
    let issuer = service.register_issuer("Acme").await.unwrap();
    let credential = service
        .issue_credential(internship_request(&issuer))
        .await
        .unwrap();

    let decoded = decode(&credential.token).unwrap();
    assert_eq!(decoded.header.alg, "EdDSA");
    assert_eq!(decoded.header.kid, issuer.identifier.uri());
    assert_eq!(decoded.payload.jti, credential.credential_id);
    assert_eq!(decoded.payload.sub, "did:example:student123");
    assert_eq!(decoded.payload.vc.credential_subject, internship_claims());
    assert_eq!(
        decoded.payload.issued_at().unwrap(),
        credential.issued_at
    );
}

#[tokio::test]
async fn test_credentials_stay_bound_to_their_issuer() {
    let service = TrustService::in_memory(TrustPolicy::default());
    let acme = service.register_issuer("Acme").await.unwrap();
    let globex = service.register_issuer("Globex").await.unwrap();

    let from_acme = service
        .issue_credential(internship_request(&acme))
        .await
        .unwrap();
    let from_globex = service
        .issue_credential(internship_request(&globex))
        .await
        .unwrap();

    service
        .revoke_credential(&from_acme.credential_id)
        .await
        .unwrap();

    assert!(!service.verify_credential(&from_acme.token).await.unwrap().valid);
    let result = service.verify_credential(&from_globex.token).await.unwrap();
    assert!(result.valid);
    assert_eq!(result.issuer, globex.identifier);
}

#[tokio::test]
async fn test_imported_key_yields_deterministic_identifier() {
    let service = TrustService::in_memory(TrustPolicy::default());
    let keypair = KeyPair::generate().unwrap();
    let expected = derive_identifier(&keypair.public_key());

    let issuer = service
        .register_issuer_with_key("Acme", keypair)
        .await
        .unwrap();
    assert_eq!(issuer.identifier, expected);
    assert_eq!(service.issuer(expected.uri()).await.unwrap(), issuer);
}

// =========================================================================
// Registration policy
// =========================================================================

#[tokio::test]
async fn test_duplicate_names_allowed_by_default() {
    let service = TrustService::in_memory(TrustPolicy::default());
    let a = service.register_issuer("Acme").await.unwrap();
    let b = service.register_issuer("Acme").await.unwrap();
    assert_ne!(a.identifier, b.identifier);
    assert_eq!(service.issuers().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unique_names_under_concurrent_registration() {
    let policy = TrustPolicy {
        unique_issuer_names: true,
        ..TrustPolicy::default()
    };
    let service = Arc::new(TrustService::in_memory(policy));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.register_issuer("Acme").await })
        })
        .collect();

    let mut registered = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => registered += 1,
            Err(TrustError::IssuerAlreadyExists(_)) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(registered, 1);
    assert_eq!(rejected, 15);
}

#[tokio::test]
async fn test_blank_inputs_rejected() {
    let service = TrustService::in_memory(TrustPolicy::default());
    assert!(matches!(
        service.register_issuer("   ").await,
        Err(TrustError::InvalidName(_))
    ));

    let issuer = service.register_issuer("Acme").await.unwrap();
    let mut request = internship_request(&issuer);
    request.holder = "  ".into();
    assert!(matches!(
        service.issue_credential(request).await,
        Err(TrustError::InvalidHolder(_))
    ));
    assert_eq!(service.credential_count().await.unwrap(), 0);
}

// =========================================================================
// Unknown issuers and credentials
// =========================================================================

#[tokio::test]
async fn test_unknown_issuer_cannot_issue() {
    let service = TrustService::in_memory(TrustPolicy::default());
    let stranger = derive_identifier(&KeyPair::generate().unwrap().public_key());
    let request = IssueRequest {
        issuer: stranger.uri().to_string(),
        holder: "did:example:student123".into(),
        claims: Default::default(),
        credential_type: vec![],
    };
    assert!(matches!(
        service.issue_credential(request).await,
        Err(TrustError::UnknownIssuer(_))
    ));
}

#[tokio::test]
async fn test_token_from_another_service_is_unknown_issuer() {
    let theirs = TrustService::in_memory(TrustPolicy::default());
    let ours = TrustService::in_memory(TrustPolicy::default());

    let issuer = theirs.register_issuer("Acme").await.unwrap();
    let credential = theirs
        .issue_credential(internship_request(&issuer))
        .await
        .unwrap();

    let err = ours.verify_credential(&credential.token).await.unwrap_err();
    assert!(matches!(err, TrustError::UnknownIssuer(_)));
    assert_eq!(err.kind(), "UnknownIssuerError");
}

#[tokio::test]
async fn test_revoking_unknown_credential_fails() {
    let service = TrustService::in_memory(TrustPolicy::default());
    assert!(matches!(
        service.revoke_credential("urn:uuid:does-not-exist").await,
        Err(TrustError::UnknownCredential(_))
    ));
    assert!(!service.is_revoked("urn:uuid:does-not-exist").await.unwrap());
}

// =========================================================================
// Revocation registry
// =========================================================================

fn sample_record(id: &str) -> CredentialRecord {
    let issuer: Did = derive_identifier(&KeyPair::generate().unwrap().public_key());
    CredentialRecord::new(id, issuer, "did:example:holder", chrono::Utc::now(), "a.b.c")
}

#[tokio::test]
async fn test_registry_rejects_duplicate_ids() {
    let registry = RevocationRegistry::new(Arc::new(InMemoryCredentialStore::new()));
    registry
        .record_issued(sample_record("urn:uuid:1"))
        .await
        .unwrap();
    let err = registry
        .record_issued(sample_record("urn:uuid:1"))
        .await
        .unwrap_err();
    assert!(matches!(err, TrustError::DuplicateCredential(_)));
    assert_eq!(registry.count().await.unwrap(), 1);
    assert_eq!(
        registry.status_of("urn:uuid:1").await.unwrap(),
        RevocationStatus::Active
    );
}

#[tokio::test]
async fn test_concurrent_revocations_have_one_winner() {
    let registry = RevocationRegistry::new(Arc::new(InMemoryCredentialStore::new()));
    registry
        .record_issued(sample_record("urn:uuid:race"))
        .await
        .unwrap();

    let outcomes = futures::future::join_all((0..24).map(|_| {
        let registry = registry.clone();
        tokio::spawn(async move { registry.revoke("urn:uuid:race").await })
    }))
    .await;

    let winners = outcomes
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .filter(|outcome| !outcome.already_revoked())
        .count();
    assert_eq!(winners, 1);

    let record = registry.record("urn:uuid:race").await.unwrap().unwrap();
    assert_eq!(record.state, CredentialState::Revoked);
    assert!(record.revoked_at.is_some());
}
