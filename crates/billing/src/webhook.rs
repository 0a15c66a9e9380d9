//! Provider webhook signature verification (spec §4.10 "Webhook endpoint
//! verifies provider signature (HMAC over `t=<ts>.<body>`, tolerance window
//! configurable)").

use crate::error::BillingError;

/// Constant-time byte comparison, so signature checking doesn't leak match
/// length through early-exit timing.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Verifies a provider webhook's signature header of the form
/// `t=<unix_ts>,v1=<hex_hmac>` against `secret`, where the signed message is
/// `t=<ts>.<body>` (spec §4.10). `now` and `tolerance_seconds` bound replay:
/// a signature with a timestamp older or newer than the tolerance is
/// rejected even if the HMAC matches.
pub fn verify_webhook_signature(
    secret: &[u8],
    header: &str,
    body: &[u8],
    now_unix: i64,
    tolerance_seconds: i64,
) -> Result<(), BillingError> {
    let mut ts: Option<i64> = None;
    let mut signature_hex: Option<&str> = None;
    for part in header.split(',') {
        let mut kv = part.splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some("t"), Some(v)) => {
                ts = Some(
                    v.parse::<i64>()
                        .map_err(|_| BillingError::WebhookTimestampMalformed(v.to_string()))?,
                );
            }
            (Some("v1"), Some(v)) => signature_hex = Some(v),
            _ => {}
        }
    }

    let ts = ts.ok_or(BillingError::WebhookSignatureMissing)?;
    let signature_hex = signature_hex.ok_or(BillingError::WebhookSignatureMissing)?;

    if (now_unix - ts).abs() > tolerance_seconds {
        return Err(BillingError::WebhookTimestampOutOfTolerance {
            ts,
            tolerance_seconds,
        });
    }

    let signed_message = format!("t={ts}.{}", String::from_utf8_lossy(body));
    let expected = settld_codec::hmac_sha256(secret, signed_message.as_bytes())?;
    let expected_hex = hex::encode(expected);

    if !constant_time_eq(expected_hex.as_bytes(), signature_hex.as_bytes()) {
        return Err(BillingError::WebhookSignatureMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &[u8], ts: i64, body: &[u8]) -> String {
        let signed_message = format!("t={ts}.{}", String::from_utf8_lossy(body));
        let sig = settld_codec::hmac_sha256(secret, signed_message.as_bytes()).unwrap();
        format!("t={ts},v1={}", hex::encode(sig))
    }

    #[test]
    fn accepts_a_correctly_signed_webhook_within_tolerance() {
        let secret = b"whsec_test";
        let body = br#"{"eventId":"evt_1"}"#;
        let header = sign(secret, 1_700_000_000, body);
        verify_webhook_signature(secret, &header, body, 1_700_000_005, 300).unwrap();
    }

    #[test]
    fn rejects_tampered_body() {
        let secret = b"whsec_test";
        let body = br#"{"eventId":"evt_1"}"#;
        let header = sign(secret, 1_700_000_000, body);
        let tampered = br#"{"eventId":"evt_2"}"#;
        let err = verify_webhook_signature(secret, &header, tampered, 1_700_000_005, 300)
            .unwrap_err();
        assert!(matches!(err, BillingError::WebhookSignatureMismatch));
    }

    #[test]
    fn rejects_timestamp_outside_tolerance() {
        let secret = b"whsec_test";
        let body = br#"{"eventId":"evt_1"}"#;
        let header = sign(secret, 1_700_000_000, body);
        let err = verify_webhook_signature(secret, &header, body, 1_700_001_000, 300)
            .unwrap_err();
        assert!(matches!(
            err,
            BillingError::WebhookTimestampOutOfTolerance { .. }
        ));
    }

    #[test]
    fn rejects_missing_signature_header() {
        let err = verify_webhook_signature(b"whsec_test", "", b"{}", 1_700_000_000, 300)
            .unwrap_err();
        assert!(matches!(err, BillingError::WebhookSignatureMissing));
    }
}
