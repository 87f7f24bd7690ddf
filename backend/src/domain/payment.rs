//! Payment claims and gateway signature verification.
//!
//! A claim reported by the client is untrusted until its signature matches
//! `hex(HMAC-SHA256(secret, order_id + "|" + payment_id))`.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::ids::UserId;
use super::order::CourseSelection;

type HmacSha256 = Hmac<Sha256>;

/// Validation errors for payment claims.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentClaimError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

/// A payment completion reported by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentClaim {
    order_id: String,
    payment_id: String,
    signature: String,
    courses: CourseSelection,
    user: UserId,
}

impl PaymentClaim {
    /// Validate that every textual field is present and non-blank.
    pub fn try_new(
        order_id: &str,
        payment_id: &str,
        signature: &str,
        courses: CourseSelection,
        user: UserId,
    ) -> Result<Self, PaymentClaimError> {
        Ok(Self {
            order_id: required(order_id, "razorpay_order_id")?,
            payment_id: required(payment_id, "razorpay_payment_id")?,
            signature: required(signature, "razorpay_signature")?,
            courses,
            user,
        })
    }

    /// Gateway order identifier, trimmed.
    pub fn order_id(&self) -> &str {
        self.order_id.as_str()
    }

    /// Gateway payment identifier, trimmed.
    pub fn payment_id(&self) -> &str {
        self.payment_id.as_str()
    }

    /// Signature as supplied; it is not normalised before comparison.
    pub fn signature(&self) -> &str {
        self.signature.as_str()
    }

    /// Courses to enroll once the signature and the paid order check out.
    pub fn courses(&self) -> &CourseSelection {
        &self.courses
    }

    /// Student who made the payment.
    pub fn user(&self) -> UserId {
        self.user
    }
}

fn required(value: &str, field: &'static str) -> Result<String, PaymentClaimError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PaymentClaimError::MissingField { field });
    }
    Ok(trimmed.to_owned())
}

/// Server-held secret shared with the payment gateway.
#[derive(Clone)]
pub struct SigningSecret(Zeroizing<String>);

impl SigningSecret {
    /// Wrap a secret; the buffer is zeroed on drop.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Borrow the raw secret. Never log the result.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Error raised when the signing secret cannot key the MAC.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payment signing secret must not be empty")]
pub struct SigningKeyError;

/// Recomputes and checks gateway signatures.
#[derive(Clone)]
pub struct SignatureVerifier {
    mac: HmacSha256,
}

impl SignatureVerifier {
    /// Key a verifier with `secret`.
    pub fn new(secret: &SigningSecret) -> Result<Self, SigningKeyError> {
        if secret.expose().is_empty() {
            return Err(SigningKeyError);
        }
        let mac = HmacSha256::new_from_slice(secret.expose().as_bytes())
            .map_err(|_| SigningKeyError)?;
        Ok(Self { mac })
    }

    fn keyed(&self, order_id: &str, payment_id: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        mac
    }

    /// Lowercase hex signature for `order_id|payment_id`.
    ///
    /// # Examples
    /// ```
    /// use eduquest::domain::{SignatureVerifier, SigningSecret};
    ///
    /// let verifier = SignatureVerifier::new(&SigningSecret::new("secret")).expect("key");
    /// let signature = verifier.sign("order_1", "pay_1");
    /// assert!(verifier.verify("order_1", "pay_1", &signature));
    /// assert!(!verifier.verify("order_1", "pay_2", &signature));
    /// ```
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        hex::encode(self.keyed(order_id, payment_id).finalize().into_bytes())
    }

    /// Constant-time check of a claimed signature.
    ///
    /// Anything that is not lowercase hex of the right length fails the same
    /// way as a mismatch.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let lowercase_hex = signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !lowercase_hex {
            return false;
        }
        let Ok(claimed) = hex::decode(signature) else {
            return false;
        };
        self.keyed(order_id, payment_id)
            .verify_slice(&claimed)
            .is_ok()
    }

    /// Verify a [`PaymentClaim`].
    pub fn verify_claim(&self, claim: &PaymentClaim) -> bool {
        self.verify(claim.order_id(), claim.payment_id(), claim.signature())
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignatureVerifier(<redacted>)")
    }
}
