//! Request-binding integrity (spec §4.5 "Binding integrity ... links every
//! downstream action back to a fixed request fingerprint", §4.5
//! "Settlement & binding integrity"): the gate's authorize step records a
//! fingerprint of the request/response it guarded; every later action
//! (verify's evidence, and every downstream action named in spec §4.5) must
//! reproduce it exactly.

use serde::{Deserialize, Serialize};
use settld_codec::sha256_hex_of_canon;

use crate::error::X402Error;

/// The fixed fingerprint recorded at authorize time (SPEC_FULL.md §4.5):
/// method, host, path, and the request body's content hash.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestBinding {
    pub method: String,
    pub host: String,
    pub path: String,
    pub request_body_sha256: String,
}

impl RequestBinding {
    pub fn binding_hash(&self) -> Result<String, X402Error> {
        Ok(sha256_hex_of_canon(self)?)
    }

    fn evidence_ref_request(hash: &str) -> String {
        format!("http:request_sha256:{hash}")
    }

    fn evidence_ref_response(hash: &str) -> String {
        format!("http:response_sha256:{hash}")
    }
}

/// Checks that `evidence_refs` (supplied at `verify`) includes the
/// authorize-time request/response binding hashes (spec §4.5 "`evidenceRefs`
/// MUST include both `http:request_sha256:<hex>` and
/// `http:response_sha256:<hex>` matching the binding recorded at
/// authorize").
pub fn check_request_binding_evidence(
    evidence_refs: &[String],
    expected_request_sha256: &str,
    expected_response_sha256: &str,
) -> Result<(), X402Error> {
    let has_request = evidence_refs
        .iter()
        .any(|r| r.starts_with("http:request_sha256:"));
    let has_response = evidence_refs
        .iter()
        .any(|r| r.starts_with("http:response_sha256:"));
    if !has_request || !has_response {
        return Err(X402Error::RequestBindingEvidenceRequired);
    }
    let expected_request = RequestBinding::evidence_ref_request(expected_request_sha256);
    let expected_response = RequestBinding::evidence_ref_response(expected_response_sha256);
    if !evidence_refs.iter().any(|r| r == &expected_request)
        || !evidence_refs.iter().any(|r| r == &expected_response)
    {
        return Err(X402Error::RequestBindingEvidenceMismatch);
    }
    Ok(())
}

/// Checks that `evidence_refs` is a superset of `required_session_refs`
/// (spec §4.5 "the evidenceRefs must additionally include every
/// `session:event:*` and `session:chain:*` ref captured then; missing
/// subset ⇒ `X402_PROMPT_RISK_EVIDENCE_REQUIRED` with the exact
/// `missingEvidenceRefs` list").
pub fn check_prompt_risk_evidence(
    evidence_refs: &[String],
    required_session_refs: &[String],
) -> Result<(), X402Error> {
    let missing: Vec<String> = required_session_refs
        .iter()
        .filter(|required| !evidence_refs.iter().any(|r| r == *required))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(X402Error::PromptRiskEvidenceRequired(missing))
    }
}

/// Verifies a downstream action's `bindingEvidence` hashes to the gate's
/// recorded request binding (spec §4.5 "Every downstream action ... must
/// include `bindingEvidence` that hashes to the original request binding").
pub fn check_binding_evidence(
    gate_id: &str,
    binding_evidence: Option<&str>,
    expected_binding_hash: &str,
) -> Result<(), X402Error> {
    match binding_evidence {
        None => Err(X402Error::BindingEvidenceRequired(gate_id.to_string())),
        Some(evidence) if evidence != expected_binding_hash => {
            Err(X402Error::BindingEvidenceMismatch(gate_id.to_string()))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> RequestBinding {
        RequestBinding {
            method: "POST".to_string(),
            host: "api.example.com".to_string(),
            path: "/tools/search".to_string(),
            request_body_sha256: "h1".to_string(),
        }
    }

    #[test]
    fn missing_evidence_is_required_error() {
        let err = check_request_binding_evidence(&[], "h1", "h2").unwrap_err();
        assert!(matches!(err, X402Error::RequestBindingEvidenceRequired));
    }

    #[test]
    fn mismatched_hash_is_mismatch_error() {
        let refs = vec![
            "http:request_sha256:wrong".to_string(),
            "http:response_sha256:h2".to_string(),
        ];
        let err = check_request_binding_evidence(&refs, "h1", "h2").unwrap_err();
        assert!(matches!(err, X402Error::RequestBindingEvidenceMismatch));
    }

    #[test]
    fn matching_evidence_passes() {
        let refs = vec![
            "http:request_sha256:h1".to_string(),
            "http:response_sha256:h2".to_string(),
        ];
        check_request_binding_evidence(&refs, "h1", "h2").unwrap();
    }

    #[test]
    fn binding_hash_is_stable() {
        let b = binding();
        assert_eq!(b.binding_hash().unwrap(), b.binding_hash().unwrap());
    }

    #[test]
    fn missing_session_evidence_lists_exact_missing_refs() {
        let required = vec!["session:event:a".to_string(), "session:chain:b".to_string()];
        let present = vec!["session:event:a".to_string()];
        let err = check_prompt_risk_evidence(&present, &required).unwrap_err();
        match err {
            X402Error::PromptRiskEvidenceRequired(missing) => {
                assert_eq!(missing, vec!["session:chain:b".to_string()])
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
