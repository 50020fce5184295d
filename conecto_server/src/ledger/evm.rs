//! EVM implementation of [`CreatorLedger`] using ethers-rs.
//!
//! Connects to the configured JSON-RPC endpoint with the admin wallet as
//! signer. Subscription contracts are deployed as minimal proxies through
//! the proxy factory, pointing at the configured ERC-1155 drop
//! implementation.

use super::{ClaimTerms, CreatorLedger, CreatorRecord, Result, TokenDescriptor, WebsitePreference};
use crate::config::Config;
use crate::contracts::{
    ClaimCondition, Conecto, DropErc1155, ProxyDeployedFilter, TwFactory,
    WebsitePreference as OnchainPreference,
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use base64::Engine;
use ethers::contract::parse_log;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, TransactionReceipt, U256};
use ethers::utils::{keccak256, parse_units};
use std::sync::Arc;

/// Sentinel "currency" address for the chain's native token, as used by the
/// drop contract's claim conditions.
const NATIVE_TOKEN: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

type AdminClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct EvmLedger {
    client: Arc<AdminClient>,
    registry: Conecto<AdminClient>,
    factory: TwFactory<AdminClient>,
    drop_implementation: Address,
}

impl EvmLedger {
    /// Connect to the configured network with the admin wallet as signer.
    pub fn new(config: &Config) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| anyhow!("Failed to create HTTP provider: {}", e))?;

        let wallet = config
            .admin_private_key
            .parse::<LocalWallet>()
            .map_err(|e| anyhow!("Invalid admin private key: {}", e))?
            .with_chain_id(config.chain_id);

        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        let registry_address = parse_address(&config.registry_address, "registry")?;
        let factory_address = parse_address(&config.factory_address, "factory")?;
        let drop_implementation = parse_address(&config.drop_implementation, "implementation")?;

        Ok(Self {
            registry: Conecto::new(registry_address, client.clone()),
            factory: TwFactory::new(factory_address, client.clone()),
            client,
            drop_implementation,
        })
    }

    fn drop_contract(&self, address: &str) -> Result<DropErc1155<AdminClient>> {
        let address = parse_address(address, "subscription contract")?;
        Ok(DropErc1155::new(address, self.client.clone()))
    }

    fn admin_address(&self) -> Address {
        self.client.signer().address()
    }
}

#[async_trait]
impl CreatorLedger for EvmLedger {
    async fn handle_claimed(&self, handle: &str) -> Result<bool> {
        let claimed = self
            .registry
            .claimed_handles(handle.to_string())
            .call()
            .await
            .map_err(|e| anyhow!("Failed to read claimed handles: {}", e))?;
        Ok(claimed)
    }

    async fn claim_handle(&self, handle: &str) -> Result<()> {
        // the pending transaction borrows the call, so the call must
        // outlive the await
        let call = self.registry.claim_handle(handle.to_string());
        let pending = call
            .send()
            .await
            .map_err(|e| anyhow!("Failed to submit claimHandle: {}", e))?;
        ensure_mined(pending.await?, "claimHandle")?;
        Ok(())
    }

    async fn creator_record(&self, creator: &str) -> Result<CreatorRecord> {
        let creator = parse_address(creator, "creator")?;
        let (handle, subscription_contract) = self
            .registry
            .creators(creator)
            .call()
            .await
            .map_err(|e| anyhow!("Failed to read creator record: {}", e))?;
        Ok(CreatorRecord {
            handle,
            subscription_contract,
        })
    }

    async fn subscription_contract(&self, creator: &str) -> Result<String> {
        let creator = parse_address(creator, "creator")?;
        let address = self
            .registry
            .get_subscription_contract(creator)
            .call()
            .await
            .map_err(|e| anyhow!("Failed to read subscription contract: {}", e))?;
        Ok(address)
    }

    async fn deploy_subscription_contract(&self, slug: &str) -> Result<String> {
        let admin = self.admin_address();
        let name = format!("{} Subscription", slug);
        let symbol = super::subscription_symbol(slug);

        // initialize() calldata for the proxy, encoded through the drop
        // binding bound to the zero address.
        let init = DropErc1155::new(Address::zero(), self.client.clone())
            .initialize(
                admin,
                name,
                symbol,
                String::new(),
                Vec::new(),
                admin,
                admin,
                0,
                0,
                admin,
            )
            .calldata()
            .ok_or_else(|| anyhow!("Failed to encode initialize calldata"))?;

        let salt = deployment_salt(slug);
        let call = self
            .factory
            .deploy_proxy_by_implementation(self.drop_implementation, init, salt);
        let pending = call
            .send()
            .await
            .map_err(|e| anyhow!("Failed to submit proxy deployment: {}", e))?;
        let receipt = ensure_mined(pending.await?, "proxy deployment")?;

        let deployed = receipt
            .logs
            .iter()
            .find_map(|log| parse_log::<ProxyDeployedFilter>(log.clone()).ok())
            .ok_or_else(|| anyhow!("Deployment receipt carries no ProxyDeployed event"))?;

        Ok(format!("{:?}", deployed.proxy))
    }

    async fn register_subscription_contract(&self, creator: &str, contract: &str) -> Result<()> {
        let creator = parse_address(creator, "creator")?;
        let call = self
            .registry
            .set_subscription_contract(creator, contract.to_string());
        let pending = call
            .send()
            .await
            .map_err(|e| anyhow!("Failed to submit setSubscriptionContract: {}", e))?;
        ensure_mined(pending.await?, "setSubscriptionContract")?;
        Ok(())
    }

    async fn lazy_mint(&self, contract: &str, tokens: &[TokenDescriptor]) -> Result<()> {
        let drop = self.drop_contract(contract)?;
        let base_uri = metadata_uri(tokens)?;

        let call = drop.lazy_mint(U256::from(tokens.len()), base_uri, Bytes::default());
        let pending = call
            .send()
            .await
            .map_err(|e| anyhow!("Failed to submit lazyMint: {}", e))?;
        ensure_mined(pending.await?, "lazyMint")?;
        Ok(())
    }

    async fn set_claim_conditions(
        &self,
        contract: &str,
        token_id: u64,
        terms: &ClaimTerms,
    ) -> Result<()> {
        let drop = self.drop_contract(contract)?;
        let price: U256 = parse_units(terms.price.to_string(), 18)
            .map_err(|e| anyhow!("Unrepresentable tier price {}: {}", terms.price, e))?
            .into();

        let condition = ClaimCondition {
            start_timestamp: U256::from(terms.start.timestamp().max(0) as u64),
            max_claimable_supply: U256::MAX,
            supply_claimed: U256::zero(),
            quantity_limit_per_wallet: U256::from(terms.max_claimable_per_wallet),
            merkle_root: [0u8; 32],
            price_per_token: price,
            currency: parse_address(NATIVE_TOKEN, "native token")?,
            metadata: String::new(),
        };

        let call = drop.set_claim_conditions(U256::from(token_id), vec![condition], false);
        let pending = call
            .send()
            .await
            .map_err(|e| anyhow!("Failed to submit setClaimConditions: {}", e))?;
        ensure_mined(pending.await?, "setClaimConditions")?;
        Ok(())
    }

    async fn website_preferences(&self, handle: &str) -> Result<WebsitePreference> {
        let preference = self
            .registry
            .get_website_preferences_by_handle(handle.to_string())
            .call()
            .await
            .map_err(|e| anyhow!("Failed to read website preferences: {}", e))?;
        Ok(from_onchain(preference))
    }

    async fn set_website_preferences(
        &self,
        creator: &str,
        preference: &WebsitePreference,
    ) -> Result<()> {
        let creator = parse_address(creator, "creator")?;
        let call = self
            .registry
            .set_website_preferences(creator, to_onchain(preference));
        let pending = call
            .send()
            .await
            .map_err(|e| anyhow!("Failed to submit setWebsitePreferences: {}", e))?;
        ensure_mined(pending.await?, "setWebsitePreferences")?;
        Ok(())
    }
}

fn parse_address(value: &str, what: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .with_context(|| format!("Invalid {} address: {}", what, value))
}

/// Check a mined receipt for on-chain success.
fn ensure_mined(receipt: Option<TransactionReceipt>, what: &str) -> Result<TransactionReceipt> {
    let receipt = receipt.ok_or_else(|| anyhow!("{} transaction dropped", what))?;
    if receipt.status == Some(1.into()) {
        Ok(receipt)
    } else {
        Err(anyhow!("{} transaction reverted on-chain", what))
    }
}

fn deployment_salt(slug: &str) -> [u8; 32] {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .to_be_bytes();
    let mut seed = Vec::with_capacity(slug.len() + nanos.len());
    seed.extend_from_slice(slug.as_bytes());
    seed.extend_from_slice(&nanos);
    keccak256(seed)
}

/// Token metadata travels as a base64 data URI; pinning to external storage
/// is out of scope for this server.
fn metadata_uri(tokens: &[TokenDescriptor]) -> Result<String> {
    let json = serde_json::to_vec(tokens).context("Failed to serialize token metadata")?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(json);
    Ok(format!("data:application/json;base64,{}", encoded))
}

fn from_onchain(preference: OnchainPreference) -> WebsitePreference {
    WebsitePreference {
        name: preference.name,
        description: preference.description,
        logo: preference.logo,
        text_color: preference.text_color,
        secondary_color: preference.secondary_color,
        primary_color: preference.primary_color,
        bg_color: preference.bg_color,
    }
}

fn to_onchain(preference: &WebsitePreference) -> OnchainPreference {
    OnchainPreference {
        name: preference.name.clone(),
        description: preference.description.clone(),
        logo: preference.logo.clone(),
        text_color: preference.text_color,
        secondary_color: preference.secondary_color,
        primary_color: preference.primary_color,
        bg_color: preference.bg_color,
    }
}
