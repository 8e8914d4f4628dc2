//! Webhook signature verification.
//!
//! Authenticates provider callbacks with HMAC-SHA256 over `"{t}.{body}"`
//! and rejects signatures whose timestamp falls outside the tolerance
//! window, which bounds replay of captured deliveries.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::Timestamp;

use super::errors::WebhookError;
use super::event::WebhookEvent;

type HmacSha256 = Hmac<Sha256>;

/// Largest body the verifier will authenticate (1 MiB).
pub const MAX_PAYLOAD_BYTES: usize = 1_048_576;

/// Default maximum signature age (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Maximum allowed clock skew for future timestamps (1 minute).
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components of the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp the signature was generated at.
    pub timestamp: i64,
    /// Every v1 (HMAC-SHA256) signature present. Secret rotation may send several.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<hex>[,v1=<hex>...][,v0=<hex>]`.
    ///
    /// Unknown keys, `v0` included, are ignored.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::MalformedHeader("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::MalformedHeader("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::MalformedHeader("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| WebhookError::MalformedHeader("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::MalformedHeader(
                "missing v1 signature".to_string(),
            ));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier bound to one shared secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: SecretString,
    tolerance_secs: i64,
    max_payload_bytes: usize,
}

impl WebhookVerifier {
    /// Creates a verifier with the default tolerance and payload limit.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            max_payload_bytes: MAX_PAYLOAD_BYTES,
        }
    }

    /// Overrides the maximum signature age.
    pub fn with_tolerance_secs(mut self, secs: i64) -> Self {
        self.tolerance_secs = secs;
        self
    }

    /// Overrides the payload size limit.
    pub fn with_max_payload_bytes(mut self, bytes: usize) -> Self {
        self.max_payload_bytes = bytes;
        self
    }

    /// Verifies against the current wall clock.
    pub fn verify(&self, raw_body: &str, signature_header: &str) -> Result<WebhookEvent, WebhookError> {
        self.verify_at(raw_body, signature_header, Timestamp::now().as_unix_secs())
    }

    /// Verifies the delivery as of `now` (Unix seconds).
    ///
    /// # Verification Steps
    ///
    /// 1. Reject missing secret, body or signature, and oversized bodies
    /// 2. Require the `t=` prefix and parse the header
    /// 3. Check the timestamp against the tolerance window
    /// 4. Compare every v1 signature with the expected HMAC in constant time
    /// 5. Parse the body into a `WebhookEvent`
    pub fn verify_at(
        &self,
        raw_body: &str,
        signature_header: &str,
        now: i64,
    ) -> Result<WebhookEvent, WebhookError> {
        if self.secret.expose_secret().is_empty() {
            return Err(WebhookError::MissingSecret);
        }
        if raw_body.is_empty() {
            return Err(WebhookError::MissingPayload);
        }
        if signature_header.is_empty() {
            return Err(WebhookError::MissingSignature);
        }
        if raw_body.len() > self.max_payload_bytes {
            return Err(WebhookError::PayloadTooLarge {
                size: raw_body.len(),
                limit: self.max_payload_bytes,
            });
        }
        if !signature_header.starts_with("t=") {
            return Err(WebhookError::MalformedHeader(
                "expected t= prefix".to_string(),
            ));
        }

        let header = SignatureHeader::parse(signature_header)?;
        self.validate_timestamp(header.timestamp, now)?;

        let expected = compute_signature(self.secret.expose_secret(), header.timestamp, raw_body)?;
        let matched = header
            .v1_signatures
            .iter()
            .fold(false, |acc, candidate| acc | constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        WebhookEvent::from_payload(raw_body, signature_header)
    }

    fn validate_timestamp(&self, timestamp: i64, now: i64) -> Result<(), WebhookError> {
        let age = now - timestamp;

        if age > self.tolerance_secs {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"[REDACTED]")
            .field("tolerance_secs", &self.tolerance_secs)
            .field("max_payload_bytes", &self.max_payload_bytes)
            .finish()
    }
}

/// Verifies a delivery with a one-off verifier using default limits.
pub fn verify(
    raw_body: &str,
    signature_header: &str,
    shared_secret: &str,
) -> Result<WebhookEvent, WebhookError> {
    WebhookVerifier::new(shared_secret).verify(raw_body, signature_header)
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &str) -> Result<String, WebhookError> {
    compute_signature(secret, timestamp, payload).map(hex::encode)
}

/// Full signature header value for a payload, as the provider would send it.
pub fn signature_header(secret: &str, timestamp: i64, payload: &str) -> Result<String, WebhookError> {
    Ok(format!("t={},v1={}", timestamp, sign_payload(secret, timestamp, payload)?))
}

fn compute_signature(secret: &str, timestamp: i64, payload: &str) -> Result<Vec<u8>, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::MissingSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::EventType;

    const TEST_SECRET: &str = "whsec_test_secret_12345";
    const NOW: i64 = 1_705_276_800;

    fn payload() -> String {
        r#"{"id":"evt_1","type":"payment_intent.succeeded","created":1705276800,"livemode":false,"data":{"object":{"id":"pi_1"}}}"#
            .to_string()
    }

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(TEST_SECRET)
    }

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parses_valid_header() {
        let header = SignatureHeader::parse("t=1614556800,v1=abcdef0123456789").unwrap();
        assert_eq!(header.timestamp, 1614556800);
        assert_eq!(header.v1_signatures, vec![hex::decode("abcdef0123456789").unwrap()]);
    }

    #[test]
    fn parses_multiple_v1_and_ignores_v0() {
        let header = SignatureHeader::parse("t=1,v1=aa,v1=bb,v0=cc").unwrap();
        assert_eq!(header.v1_signatures.len(), 2);
    }

    #[test]
    fn rejects_header_without_timestamp() {
        let err = SignatureHeader::parse("v1=aa").unwrap_err();
        assert_eq!(err, WebhookError::MalformedHeader("missing timestamp".to_string()));
    }

    #[test]
    fn rejects_header_without_v1() {
        assert!(SignatureHeader::parse("t=1,v0=aa").is_err());
    }

    #[test]
    fn rejects_non_hex_signature() {
        assert!(SignatureHeader::parse("t=1,v1=zz").is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn fresh_signature_with_correct_secret_verifies() {
        let body = payload();
        let sig = signature_header(TEST_SECRET, NOW, &body).unwrap();

        let event = verifier().verify_at(&body, &sig, NOW).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, EventType::PaymentIntentSucceeded);
    }

    #[test]
    fn any_matching_v1_is_accepted() {
        let body = payload();
        let good = sign_payload(TEST_SECRET, NOW, &body).unwrap();
        let sig = format!("t={},v1={},v1={}", NOW, "00".repeat(32), good);

        assert!(verifier().verify_at(&body, &sig, NOW).is_ok());
    }

    #[test]
    fn empty_signature_fails() {
        let err = verifier().verify_at(&payload(), "", NOW).unwrap_err();
        assert_eq!(err, WebhookError::MissingSignature);
    }

    #[test]
    fn empty_body_fails() {
        let err = verifier().verify_at("", "t=1,v1=aa", NOW).unwrap_err();
        assert_eq!(err, WebhookError::MissingPayload);
    }

    #[test]
    fn missing_secret_fails() {
        let body = payload();
        let sig = signature_header(TEST_SECRET, NOW, &body).unwrap();
        let err = WebhookVerifier::new("").verify_at(&body, &sig, NOW).unwrap_err();
        assert_eq!(err, WebhookError::MissingSecret);
    }

    #[test]
    fn signature_without_timestamp_prefix_fails() {
        let body = payload();
        let good = sign_payload(TEST_SECRET, NOW, &body).unwrap();
        let sig = format!("v1={},t={}", good, NOW);

        let err = verifier().verify_at(&body, &sig, NOW).unwrap_err();
        assert!(matches!(err, WebhookError::MalformedHeader(_)));
    }

    #[test]
    fn oversized_body_fails() {
        let body = "x".repeat(MAX_PAYLOAD_BYTES + 1);
        let sig = signature_header(TEST_SECRET, NOW, &body).unwrap();

        let err = verifier().verify_at(&body, &sig, NOW).unwrap_err();
        assert!(matches!(err, WebhookError::PayloadTooLarge { .. }));
    }

    #[test]
    fn single_byte_tamper_fails() {
        let body = payload();
        let sig = signature_header(TEST_SECRET, NOW, &body).unwrap();
        let tampered = body.replacen("pi_1", "pi_2", 1);

        let err = verifier().verify_at(&tampered, &sig, NOW).unwrap_err();
        assert_eq!(err, WebhookError::InvalidSignature);
    }

    #[test]
    fn different_secret_fails() {
        let body = payload();
        let sig = signature_header("whsec_other_secret", NOW, &body).unwrap();

        let err = verifier().verify_at(&body, &sig, NOW).unwrap_err();
        assert_eq!(err, WebhookError::InvalidSignature);
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Tolerance Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_at_tolerance_boundary_verifies() {
        let body = payload();
        let signed_at = NOW - DEFAULT_TOLERANCE_SECS;
        let sig = signature_header(TEST_SECRET, signed_at, &body).unwrap();

        assert!(verifier().verify_at(&body, &sig, NOW).is_ok());
    }

    #[test]
    fn signature_past_tolerance_fails() {
        let body = payload();
        let signed_at = NOW - DEFAULT_TOLERANCE_SECS - 1;
        let sig = signature_header(TEST_SECRET, signed_at, &body).unwrap();

        let err = verifier().verify_at(&body, &sig, NOW).unwrap_err();
        assert_eq!(err, WebhookError::TimestampOutOfRange);
    }

    #[test]
    fn custom_tolerance_is_honored() {
        let body = payload();
        let sig = signature_header(TEST_SECRET, NOW - 30, &body).unwrap();

        let err = verifier()
            .with_tolerance_secs(10)
            .verify_at(&body, &sig, NOW)
            .unwrap_err();
        assert_eq!(err, WebhookError::TimestampOutOfRange);
    }

    #[test]
    fn small_future_skew_is_tolerated() {
        let body = payload();
        let sig = signature_header(TEST_SECRET, NOW + 30, &body).unwrap();
        assert!(verifier().verify_at(&body, &sig, NOW).is_ok());
    }

    #[test]
    fn far_future_timestamp_fails() {
        let body = payload();
        let sig = signature_header(TEST_SECRET, NOW + MAX_CLOCK_SKEW_SECS + 1, &body).unwrap();

        let err = verifier().verify_at(&body, &sig, NOW).unwrap_err();
        assert_eq!(err, WebhookError::InvalidTimestamp);
    }

    #[test]
    fn free_function_uses_wall_clock() {
        let body = payload();
        let now = Timestamp::now().as_unix_secs();
        let sig = signature_header(TEST_SECRET, now, &body).unwrap();

        assert!(verify(&body, &sig, TEST_SECRET).is_ok());
        assert!(verify(&body, &sig, "whsec_wrong").is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", verifier());
        assert!(!rendered.contains(TEST_SECRET));
    }
}
