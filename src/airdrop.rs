//! Devnet Airdrop Boundary
//!
//! The vault does not talk to any chain. Funding a wallet goes through a
//! [`FundingProvider`] supplied by the embedder; this module validates the
//! request first and turns provider failures into user-facing messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{LAMPORTS_PER_SOL, MAX_AIRDROP_AMOUNT, MIN_AIRDROP_AMOUNT};
use crate::error::{VaultError, VaultResult};
use crate::wallet::{validate_airdrop_amount, validate_solana_address};

/// Shown whenever the provider reports throttling
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please wait a few minutes and try again.";

/// Failure reported by a funding provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("rate limit reached: {0}")]
    RateLimited(String),
    #[error("{0}")]
    Request(String),
    #[error("confirmation failed: {0}")]
    Confirmation(String),
}

/// External service able to fund a Solana address on a test network
#[async_trait]
pub trait FundingProvider: Send + Sync {
    /// Submit the airdrop, returning the transaction signature
    async fn request_airdrop(&self, public_key: &str, lamports: u64) -> Result<String, ProviderError>;

    /// Wait until `signature` is confirmed
    async fn confirm(&self, _signature: &str) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// A validated airdrop request
#[derive(Debug, Clone, PartialEq)]
pub struct AirdropRequest {
    pub public_key: String,
    pub amount: f64,
    pub lamports: u64,
}

impl AirdropRequest {
    /// Validate against the default 0.1 - 2 SOL range
    pub fn new(public_key: &str, amount: f64) -> VaultResult<Self> {
        Self::with_range(public_key, amount, MIN_AIRDROP_AMOUNT, MAX_AIRDROP_AMOUNT)
    }

    pub fn with_range(public_key: &str, amount: f64, min: f64, max: f64) -> VaultResult<Self> {
        let public_key = match validate_solana_address(public_key) {
            (true, Some(normalized)) => normalized,
            _ => return Err(VaultError::validation("Invalid public key")),
        };
        let amount = validate_airdrop_amount(amount, min, max)?;

        Ok(Self {
            public_key,
            amount,
            lamports: (amount * LAMPORTS_PER_SOL as f64).floor() as u64,
        })
    }
}

/// Outcome handed back to the caller, mirroring the stored JSON shape
/// `{ success, signature? , error? }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AirdropResult {
    pub fn succeeded(signature: impl Into<String>) -> Self {
        Self {
            success: true,
            signature: Some(signature.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            signature: None,
            error: Some(error.into()),
        }
    }

    /// Signature on success; `RateLimited` or `ExternalService` otherwise
    pub fn into_result(self) -> VaultResult<String> {
        match (self.success, self.signature, self.error) {
            (true, Some(signature), _) => Ok(signature),
            (_, _, Some(error)) if error == RATE_LIMIT_MESSAGE => Err(VaultError::rate_limited(error)),
            (_, _, error) => Err(VaultError::external_service(
                error.unwrap_or_else(|| "Unknown error occurred".to_string()),
            )),
        }
    }
}

/// User-facing text for a provider failure
pub fn classify_provider_error(error: &ProviderError) -> String {
    let message = error.to_string();
    if matches!(error, ProviderError::RateLimited(_))
        || message.to_lowercase().contains("rate limit")
    {
        return RATE_LIMIT_MESSAGE.to_string();
    }
    message
}

/// Validate, submit and confirm an airdrop. Never fails: every problem comes
/// back as a failed [`AirdropResult`].
pub async fn request_airdrop(
    provider: &dyn FundingProvider,
    public_key: &str,
    amount: f64,
) -> AirdropResult {
    let request = match AirdropRequest::new(public_key, amount) {
        Ok(request) => request,
        Err(e) => return AirdropResult::failed(e.message),
    };

    let outcome = async {
        let signature = provider
            .request_airdrop(&request.public_key, request.lamports)
            .await?;
        provider.confirm(&signature).await?;
        Ok::<_, ProviderError>(signature)
    }
    .await;

    match outcome {
        Ok(signature) => {
            crate::log_info!(
                "airdrop",
                "Airdrop confirmed",
                recipient = request.public_key,
                lamports = request.lamports,
                signature = signature
            );
            AirdropResult::succeeded(signature)
        }
        Err(e) => {
            crate::log_warn!("airdrop", "Airdrop failed", reason = e);
            AirdropResult::failed(classify_provider_error(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const PUBKEY: &str = "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk";

    struct MockProvider {
        response: Result<String, ProviderError>,
        confirm: Result<(), ProviderError>,
        calls: Mutex<Vec<(String, u64)>>,
    }

    impl MockProvider {
        fn returning(response: Result<String, ProviderError>) -> Self {
            Self {
                response,
                confirm: Ok(()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FundingProvider for MockProvider {
        async fn request_airdrop(&self, public_key: &str, lamports: u64) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push((public_key.to_string(), lamports));
            self.response.clone()
        }

        async fn confirm(&self, _signature: &str) -> Result<(), ProviderError> {
            self.confirm.clone()
        }
    }

    #[test]
    fn test_request_lamports_floor() {
        let request = AirdropRequest::new(PUBKEY, 1.5).unwrap();
        assert_eq!(request.lamports, 1_500_000_000);

        let request = AirdropRequest::new(PUBKEY, 0.1234567891).unwrap();
        assert_eq!(request.lamports, 123_456_789);
    }

    #[test]
    fn test_request_validation() {
        assert_eq!(
            AirdropRequest::new("nope", 1.0).unwrap_err().message,
            "Invalid public key"
        );
        assert_eq!(
            AirdropRequest::new(PUBKEY, 5.0).unwrap_err().message,
            "Amount must be between 0.1 and 2 SOL"
        );
        assert!(AirdropRequest::with_range(PUBKEY, 5.0, 1.0, 10.0).is_ok());
    }

    #[tokio::test]
    async fn test_successful_airdrop() {
        let provider = MockProvider::returning(Ok("5sig".to_string()));
        let result = request_airdrop(&provider, PUBKEY, 1.0).await;

        assert_eq!(result, AirdropResult::succeeded("5sig"));
        assert_eq!(
            provider.calls.lock().unwrap().as_slice(),
            &[(PUBKEY.to_string(), LAMPORTS_PER_SOL)]
        );
    }

    #[tokio::test]
    async fn test_invalid_input_skips_provider() {
        let provider = MockProvider::returning(Ok("sig".to_string()));
        let result = request_airdrop(&provider, PUBKEY, 0.01).await;

        assert!(!result.success);
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_message() {
        let provider = MockProvider::returning(Err(ProviderError::Request(
            "429 Too Many Requests: airdrop rate limit reached".to_string(),
        )));
        let result = request_airdrop(&provider, PUBKEY, 1.0).await;
        assert_eq!(result.error.as_deref(), Some(RATE_LIMIT_MESSAGE));
        assert_eq!(
            result.into_result().unwrap_err().code,
            crate::error::ErrorCode::RateLimited
        );
    }

    #[tokio::test]
    async fn test_confirmation_failure_passes_through() {
        let mut provider = MockProvider::returning(Ok("sig".to_string()));
        provider.confirm = Err(ProviderError::Confirmation("blockhash expired".into()));

        let result = request_airdrop(&provider, PUBKEY, 1.0).await;
        assert_eq!(
            result.error.as_deref(),
            Some("confirmation failed: blockhash expired")
        );
        assert_eq!(
            result.into_result().unwrap_err().code,
            crate::error::ErrorCode::ExternalService
        );
    }

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_value(AirdropResult::failed("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "boom" }));

        let json = serde_json::to_value(AirdropResult::succeeded("sig")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "signature": "sig" }));
    }
}
