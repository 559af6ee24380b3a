//! Integration test: tampered, forged, and malformed tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use credtrust_core::TrustPolicy;
use credtrust_credentials::verifier::STATUS_CHECK;
use credtrust_credentials::{
    Credential, CredentialIssuer, FailureReason, IssueRequest, IssuerRecord, TrustError,
    TrustService,
};
use credtrust_crypto::KeyPair;

async fn issued() -> (TrustService, Credential) {
    let service = TrustService::in_memory(TrustPolicy::default());
    let issuer = service.register_issuer("Acme").await.unwrap();
    let credential = service
        .issue_credential(IssueRequest {
            issuer: issuer.identifier.uri().to_string(),
            holder: "did:example:student123".into(),
            claims: serde_json::from_value(serde_json::json!({"role": "Intern"})).unwrap(),
            credential_type: vec!["InternshipCertificate".into()],
        })
        .await
        .unwrap();
    (service, credential)
}

fn segments(token: &str) -> Vec<String> {
    token.split('.').map(str::to_string).collect()
}

fn b64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn unb64(segment: &str) -> Vec<u8> {
    URL_SAFE_NO_PAD.decode(segment).unwrap()
}

// =========================================================================
// Tampering yields a negative verdict, never an error
// =========================================================================

#[tokio::test]
async fn test_edited_claims_fail_signature() {
    let (service, credential) = issued().await;
    let mut parts = segments(&credential.token);

    let mut payload: serde_json::Value = serde_json::from_slice(&unb64(&parts[1])).unwrap();
    payload["vc"]["credentialSubject"]["role"] = serde_json::json!("CEO");
    parts[1] = b64(&serde_json::to_vec(&payload).unwrap());

    let result = service.verify_credential(&parts.join(".")).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Some(FailureReason::InvalidSignature));
    assert!(result.credential_id.is_none());
}

#[tokio::test]
async fn test_flipped_payload_bytes_fail_signature() {
    let (service, credential) = issued().await;
    let parts = segments(&credential.token);
    let payload = unb64(&parts[1]);

    for index in [0, payload.len() / 2, payload.len() - 1] {
        let mut forged = payload.clone();
        forged[index] ^= 0x20;
        let token = format!("{}.{}.{}", parts[0], b64(&forged), parts[2]);
        let result = service.verify_credential(&token).await.unwrap();
        assert!(!result.valid);
        assert_eq!(result.reason, Some(FailureReason::InvalidSignature));
    }
}

#[tokio::test]
async fn test_any_character_edit_fails_signature() {
    let (service, credential) = issued().await;
    let parts = segments(&credential.token);

    for segment in 1..=2 {
        let original: Vec<char> = parts[segment].chars().collect();
        for position in 0..original.len() {
            let mut edited = original.clone();
            edited[position] = if edited[position] == 'A' { 'B' } else { 'A' };
            let mut forged = parts.clone();
            forged[segment] = edited.into_iter().collect();

            let result = service
                .verify_credential(&forged.join("."))
                .await
                .unwrap_or_else(|e| panic!("segment {segment} char {position}: {e}"));
            assert!(!result.valid);
            assert_eq!(
                result.reason,
                Some(FailureReason::InvalidSignature),
                "segment {segment} char {position}"
            );
        }
    }
}

#[tokio::test]
async fn test_non_canonical_signature_tail_fails_signature() {
    let (service, credential) = issued().await;
    let mut token = credential.token.clone();
    token.pop();
    token.push('B');

    let result = service.verify_credential(&token).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Some(FailureReason::InvalidSignature));
}

#[tokio::test]
async fn test_every_signature_byte_is_checked() {
    let (service, credential) = issued().await;
    let parts = segments(&credential.token);
    let signature = unb64(&parts[2]);

    for index in [0, 17, 31, 32, 63] {
        let mut forged = signature.clone();
        forged[index] ^= 0x01;
        let token = format!("{}.{}.{}", parts[0], parts[1], b64(&forged));
        let result = service.verify_credential(&token).await.unwrap();
        assert_eq!(
            result.reason,
            Some(FailureReason::InvalidSignature),
            "flipping byte {index} went unnoticed"
        );
    }
}

#[tokio::test]
async fn test_revoked_and_tampered_reports_signature_first() {
    let (service, credential) = issued().await;
    service
        .revoke_credential(&credential.credential_id)
        .await
        .unwrap();

    let mut parts = segments(&credential.token);
    let mut signature = unb64(&parts[2]);
    signature[5] ^= 0xff;
    parts[2] = b64(&signature);

    let result = service.verify_credential(&parts.join(".")).await.unwrap();
    assert_eq!(result.reason, Some(FailureReason::InvalidSignature));
    let status = result.check(STATUS_CHECK).unwrap();
    assert!(!status.passed);
}

#[tokio::test]
async fn test_signed_but_unrecorded_credential_is_unknown() {
    let seed = [7u8; 32];
    let service = TrustService::in_memory(TrustPolicy::default());
    service
        .register_issuer_with_key("Acme", KeyPair::from_seed(&seed))
        .await
        .unwrap();

    // Sign with the same key outside the service, so nothing is recorded.
    let record = IssuerRecord::from_keypair("Acme", KeyPair::from_seed(&seed), chrono::Utc::now());
    let stray = CredentialIssuer::from_record(&record)
        .issue("did:example:student123", vec![], Default::default())
        .unwrap();

    let result = service.verify_credential(&stray.token).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.reason, Some(FailureReason::UnknownCredential));
    assert_eq!(result.credential_id.as_deref(), Some(stray.credential_id.as_str()));
}

// =========================================================================
// Structural rejection
// =========================================================================

#[tokio::test]
async fn test_alg_none_rejected() {
    let (service, credential) = issued().await;
    let parts = segments(&credential.token);
    let mut header: serde_json::Value = serde_json::from_slice(&unb64(&parts[0])).unwrap();
    header["alg"] = serde_json::json!("none");
    let token = format!("{}.{}.{}", b64(&serde_json::to_vec(&header).unwrap()), parts[1], parts[2]);

    let err = service.verify_credential(&token).await.unwrap_err();
    assert!(matches!(err, TrustError::UnsupportedAlgorithm(_)));
}

#[tokio::test]
async fn test_hs256_rejected() {
    let (service, credential) = issued().await;
    let parts = segments(&credential.token);
    let mut header: serde_json::Value = serde_json::from_slice(&unb64(&parts[0])).unwrap();
    header["alg"] = serde_json::json!("HS256");
    let token = format!("{}.{}.{}", b64(&serde_json::to_vec(&header).unwrap()), parts[1], parts[2]);

    let err = service.verify_credential(&token).await.unwrap_err();
    assert_eq!(err.kind(), "UnsupportedAlgorithmError");
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_kid_of_another_did_method_is_unknown_issuer() {
    let (service, credential) = issued().await;
    let parts = segments(&credential.token);
    let header = serde_json::json!({
        "alg": "EdDSA",
        "kid": "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK",
        "typ": "vc+jwt"
    });
    let token = format!("{}.{}.{}", b64(&serde_json::to_vec(&header).unwrap()), parts[1], parts[2]);

    let err = service.verify_credential(&token).await.unwrap_err();
    assert!(matches!(err, TrustError::UnknownIssuer(_)));
    assert_eq!(err.kind(), "UnknownIssuerError");

    let issue_err = service
        .issue_credential(IssueRequest {
            issuer: "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK".into(),
            holder: "did:example:student123".into(),
            claims: Default::default(),
            credential_type: vec![],
        })
        .await
        .unwrap_err();
    assert_eq!(issue_err.kind(), err.kind());
}

#[tokio::test]
async fn test_malformed_tokens_rejected() {
    let (service, credential) = issued().await;
    let parts = segments(&credential.token);

    let cases = [
        String::new(),
        "not-a-token".to_string(),
        format!("{}.{}", parts[0], parts[1]),
        format!("{}.{}.{}.{}", parts[0], parts[1], parts[2], parts[2]),
        format!("!!!.{}.{}", parts[1], parts[2]),
        format!("{}.{}.", parts[0], parts[1]),
    ];
    for token in cases {
        let err = service.verify_credential(&token).await.unwrap_err();
        assert!(
            matches!(err, TrustError::MalformedToken(_)),
            "{token:?} gave {err:?}"
        );
    }
}

#[tokio::test]
async fn test_truncated_signature_is_malformed() {
    let (service, credential) = issued().await;
    let parts = segments(&credential.token);
    let signature = unb64(&parts[2]);
    let token = format!("{}.{}.{}", parts[0], parts[1], b64(&signature[..32]));

    let err = service.verify_credential(&token).await.unwrap_err();
    assert!(matches!(err, TrustError::MalformedToken(_)));
}
