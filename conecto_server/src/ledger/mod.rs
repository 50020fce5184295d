//! Ledger access layer.
//!
//! `CreatorLedger` is the seam between the HTTP surface and the chain: every
//! read or write the server performs against the registry or a creator's
//! subscription contract goes through this trait. The production
//! implementation lives in [`evm`] and drives the generated bindings; tests
//! substitute a recording mock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod evm;

pub use evm::EvmLedger;

// Ledger-specific Result type
pub type Result<T> = anyhow::Result<T>;

/// A creator's on-chain record in the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatorRecord {
    pub handle: String,
    /// Address of the creator's subscription contract; empty until the
    /// first publication deploys one.
    pub subscription_contract: String,
}

/// On-chain landing page record. Colors are stored as single bytes, not
/// hex strings; see `preferences::colors` for the conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WebsitePreference {
    pub name: String,
    pub description: String,
    pub logo: String,
    pub text_color: u8,
    pub secondary_color: u8,
    pub primary_color: u8,
    pub bg_color: u8,
}

impl WebsitePreference {
    /// An unclaimed handle decodes to an all-default record.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty() && self.logo.is_empty()
    }
}

/// Metadata for one token type registered during a lazy mint. The image is
/// intentionally left unset for subscription tiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenDescriptor {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Claim parameters for one token type: price, per-wallet limit, start time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimTerms {
    pub max_claimable_per_wallet: u64,
    /// Price in native-token units (e.g. 9.99 ETH-denominated)
    pub price: f64,
    pub start: DateTime<Utc>,
}

/// Read/write operations against the registry and subscription contracts.
///
/// Write methods submit a signed transaction and resolve once it is mined;
/// errors from the underlying network call are propagated uncategorized.
#[async_trait]
pub trait CreatorLedger: Send + Sync {
    /// Whether a handle has already been claimed.
    async fn handle_claimed(&self, handle: &str) -> Result<bool>;

    /// Claim a handle for the signing account.
    async fn claim_handle(&self, handle: &str) -> Result<()>;

    /// The registry record for a creator address.
    async fn creator_record(&self, creator: &str) -> Result<CreatorRecord>;

    /// Address of the creator's subscription contract; empty string when
    /// none has been deployed yet.
    async fn subscription_contract(&self, creator: &str) -> Result<String>;

    /// Deploy a fresh subscription contract for a creator slug and return
    /// its address.
    async fn deploy_subscription_contract(&self, slug: &str) -> Result<String>;

    /// Record a deployed subscription contract against a creator in the
    /// registry.
    async fn register_subscription_contract(&self, creator: &str, contract: &str) -> Result<()>;

    /// Register one token type per descriptor in a single batched
    /// transaction.
    async fn lazy_mint(&self, contract: &str, tokens: &[TokenDescriptor]) -> Result<()>;

    /// Set the claim conditions for one token type.
    async fn set_claim_conditions(
        &self,
        contract: &str,
        token_id: u64,
        terms: &ClaimTerms,
    ) -> Result<()>;

    /// Landing page record for a handle. Unknown handles decode to an
    /// empty record.
    async fn website_preferences(&self, handle: &str) -> Result<WebsitePreference>;

    /// Write a creator's landing page record.
    async fn set_website_preferences(
        &self,
        creator: &str,
        preference: &WebsitePreference,
    ) -> Result<()>;
}

/// Derive the token symbol for a creator's subscription contract from the
/// slug: first character uppercased plus the last character, or "NFT" for
/// slugs too short to carry one.
pub fn subscription_symbol(slug: &str) -> String {
    let chars: Vec<char> = slug.chars().collect();
    if chars.len() > 2 {
        let mut symbol = chars[0].to_uppercase().to_string();
        symbol.push(chars[chars.len() - 1]);
        symbol
    } else {
        "NFT".to_string()
    }
}
