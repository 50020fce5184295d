//! Shared test support: a scripted, call-recording ledger.

use async_trait::async_trait;
use conecto_server::ledger::{
    ClaimTerms, CreatorLedger, CreatorRecord, Result, TokenDescriptor, WebsitePreference,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One recorded write (or resolve) against the mock ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    Resolve {
        creator: String,
    },
    Deploy {
        slug: String,
    },
    Register {
        creator: String,
        contract: String,
    },
    LazyMint {
        contract: String,
        tokens: Vec<TokenDescriptor>,
    },
    SetClaimConditions {
        contract: String,
        token_id: u64,
        max_claimable_per_wallet: u64,
        price: f64,
    },
}

#[derive(Default)]
pub struct MockLedger {
    pub calls: Mutex<Vec<LedgerCall>>,
    /// What `subscription_contract` resolves to; empty means not deployed
    pub existing_contract: Mutex<String>,
    /// Address handed out by `deploy_subscription_contract`
    pub deploy_result: Mutex<String>,
    /// Method name that should fail, if any
    pub fail_on: Mutex<Option<&'static str>>,
    /// When set, `subscription_contract` parks until notified
    pub resolve_gate: Mutex<Option<Arc<Notify>>>,
    pub claimed_handles: Mutex<HashSet<String>>,
    pub preferences: Mutex<HashMap<String, WebsitePreference>>,
    pub creator_records: Mutex<HashMap<String, CreatorRecord>>,
}

impl MockLedger {
    pub fn new() -> Self {
        let ledger = Self::default();
        *ledger.deploy_result.lock().unwrap() = "0xdeployedcontract".to_string();
        ledger
    }

    pub fn with_existing_contract(contract: &str) -> Self {
        let ledger = Self::new();
        *ledger.existing_contract.lock().unwrap() = contract.to_string();
        ledger
    }

    pub fn recorded(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next(&self, method: &'static str) {
        *self.fail_on.lock().unwrap() = Some(method);
    }

    pub fn clear_failure(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    fn check_failure(&self, method: &'static str) -> Result<()> {
        if *self.fail_on.lock().unwrap() == Some(method) {
            anyhow::bail!("{} rejected by test script", method);
        }
        Ok(())
    }

    fn record(&self, call: LedgerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CreatorLedger for MockLedger {
    async fn handle_claimed(&self, handle: &str) -> Result<bool> {
        self.check_failure("handle_claimed")?;
        Ok(self.claimed_handles.lock().unwrap().contains(handle))
    }

    async fn claim_handle(&self, handle: &str) -> Result<()> {
        self.check_failure("claim_handle")?;
        self.claimed_handles
            .lock()
            .unwrap()
            .insert(handle.to_string());
        Ok(())
    }

    async fn creator_record(&self, creator: &str) -> Result<CreatorRecord> {
        self.check_failure("creator_record")?;
        Ok(self
            .creator_records
            .lock()
            .unwrap()
            .get(creator)
            .cloned()
            .unwrap_or(CreatorRecord {
                handle: String::new(),
                subscription_contract: String::new(),
            }))
    }

    async fn subscription_contract(&self, creator: &str) -> Result<String> {
        let gate = self.resolve_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_failure("subscription_contract")?;
        self.record(LedgerCall::Resolve {
            creator: creator.to_string(),
        });
        Ok(self.existing_contract.lock().unwrap().clone())
    }

    async fn deploy_subscription_contract(&self, slug: &str) -> Result<String> {
        self.check_failure("deploy_subscription_contract")?;
        self.record(LedgerCall::Deploy {
            slug: slug.to_string(),
        });
        Ok(self.deploy_result.lock().unwrap().clone())
    }

    async fn register_subscription_contract(&self, creator: &str, contract: &str) -> Result<()> {
        self.check_failure("register_subscription_contract")?;
        self.record(LedgerCall::Register {
            creator: creator.to_string(),
            contract: contract.to_string(),
        });
        Ok(())
    }

    async fn lazy_mint(&self, contract: &str, tokens: &[TokenDescriptor]) -> Result<()> {
        self.check_failure("lazy_mint")?;
        self.record(LedgerCall::LazyMint {
            contract: contract.to_string(),
            tokens: tokens.to_vec(),
        });
        Ok(())
    }

    async fn set_claim_conditions(
        &self,
        contract: &str,
        token_id: u64,
        terms: &ClaimTerms,
    ) -> Result<()> {
        self.check_failure("set_claim_conditions")?;
        self.record(LedgerCall::SetClaimConditions {
            contract: contract.to_string(),
            token_id,
            max_claimable_per_wallet: terms.max_claimable_per_wallet,
            price: terms.price,
        });
        Ok(())
    }

    async fn website_preferences(&self, handle: &str) -> Result<WebsitePreference> {
        self.check_failure("website_preferences")?;
        Ok(self
            .preferences
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_website_preferences(
        &self,
        creator: &str,
        preference: &WebsitePreference,
    ) -> Result<()> {
        self.check_failure("set_website_preferences")?;
        self.preferences
            .lock()
            .unwrap()
            .insert(creator.to_string(), preference.clone());
        Ok(())
    }
}
