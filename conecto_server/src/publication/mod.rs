//! Subscription publication engine.
//!
//! Publishing a creator's tiers is a four-step sequence against the ledger:
//! resolve the creator's subscription contract, provision one if absent
//! (deploy, then register it in the registry), lazy-mint one token type per
//! tier, and set claim conditions per tier.
//!
//! The sequence is tracked as an explicit per-creator record of
//! (phase + inputs). A second request while a record is in flight is
//! rejected instead of racing the first, and a request after a partial
//! failure resumes from the recorded phase instead of re-executing from the
//! start, so a crash between deploy and mint cannot double-deploy or
//! double-mint.

use crate::ledger::{ClaimTerms, CreatorLedger, TokenDescriptor};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Tier inputs as submitted to the publication route.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TierSpec {
    pub name: String,
    pub price: f64,
    pub description: String,
}

/// Where a publication attempt currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Look up the creator's existing subscription contract
    Resolve,
    /// Deploy a fresh subscription contract
    Provision,
    /// Record the deployed contract in the registry
    Register { contract: String },
    /// Lazy-mint one token type per tier
    Mint { contract: String },
    /// Set claim conditions tier by tier
    Price { contract: String, next_tier: usize },
    Complete,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Resolve => "resolve",
            Phase::Provision => "provision",
            Phase::Register { .. } => "register",
            Phase::Mint { .. } => "mint",
            Phase::Price { .. } => "price",
            Phase::Complete => "complete",
        }
    }
}

/// Per-creator publication state: the phase reached plus the inputs the
/// attempt was started with.
#[derive(Debug, Clone)]
pub struct PublicationRecord {
    pub slug: String,
    pub tiers: Vec<TierSpec>,
    pub phase: Phase,
    pub in_flight: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum PublicationError {
    #[error("a publication for this creator is already in flight")]
    InFlight,
    #[error("publication failed during {phase}: {source}")]
    Ledger {
        phase: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Successful publication result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Empty tier list: nothing was written
    NoTiers,
    Published {
        contract: String,
        /// Whether this publication deployed the subscription contract
        deployed: bool,
        /// Whether this call resumed an earlier failed attempt
        resumed: bool,
    },
}

type Records = Arc<RwLock<HashMap<String, PublicationRecord>>>;

pub struct PublicationEngine {
    ledger: Arc<dyn CreatorLedger>,
    records: Records,
}

impl PublicationEngine {
    pub fn new(ledger: Arc<dyn CreatorLedger>) -> Self {
        Self {
            ledger,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Publish a creator's tiers, resuming a prior failed attempt when one
    /// is on record.
    pub async fn publish(
        &self,
        creator: &str,
        slug: &str,
        tiers: Vec<TierSpec>,
    ) -> Result<Outcome, PublicationError> {
        if tiers.is_empty() {
            info!("no tiers to publish for {}", creator);
            return Ok(Outcome::NoTiers);
        }

        // Claim or resume the creator's record under the write lock so two
        // concurrent submissions cannot both start from Resolve.
        let (phase, slug, tiers, resumed) = {
            let mut records = self.records.write().await;
            match records.get_mut(creator) {
                Some(record) if record.in_flight => return Err(PublicationError::InFlight),
                Some(record) => {
                    warn!(
                        "resuming publication for {} from phase {}",
                        creator,
                        record.phase.name()
                    );
                    record.in_flight = true;
                    record.updated_at = Utc::now();
                    (record.phase.clone(), record.slug.clone(), record.tiers.clone(), true)
                }
                None => {
                    records.insert(
                        creator.to_string(),
                        PublicationRecord {
                            slug: slug.to_string(),
                            tiers: tiers.clone(),
                            phase: Phase::Resolve,
                            in_flight: true,
                            updated_at: Utc::now(),
                        },
                    );
                    (Phase::Resolve, slug.to_string(), tiers, false)
                }
            }
        };

        // The phase loop runs on its own task: if the request future is
        // dropped (client disconnect), the loop still runs to completion or
        // to a parked, non-in-flight record instead of stranding the flag.
        let task = tokio::spawn(run_phases(
            self.ledger.clone(),
            self.records.clone(),
            creator.to_string(),
            slug,
            tiers,
            phase,
            resumed,
        ));
        match task.await {
            Ok(result) => result,
            Err(e) => Err(PublicationError::Ledger {
                phase: "execution",
                source: anyhow::Error::new(e),
            }),
        }
    }

    /// The phase a creator's pending publication is parked at, if any.
    pub async fn pending_phase(&self, creator: &str) -> Option<String> {
        let records = self.records.read().await;
        records
            .get(creator)
            .map(|record| record.phase.name().to_string())
    }
}

/// The detached phase loop: owns its inputs so it survives a dropped
/// request future.
async fn run_phases(
    ledger: Arc<dyn CreatorLedger>,
    records: Records,
    creator: String,
    slug: String,
    tiers: Vec<TierSpec>,
    mut phase: Phase,
    resumed: bool,
) -> Result<Outcome, PublicationError> {
    let mut contract = match &phase {
        Phase::Register { contract }
        | Phase::Mint { contract }
        | Phase::Price { contract, .. } => contract.clone(),
        _ => String::new(),
    };
    let mut deployed = false;

    loop {
        match step(ledger.as_ref(), &creator, &slug, &tiers, &phase).await {
            Ok(next) => {
                if matches!(phase, Phase::Provision) {
                    deployed = true;
                }
                if let Phase::Register { contract: c }
                | Phase::Mint { contract: c }
                | Phase::Price { contract: c, .. } = &next
                {
                    contract = c.clone();
                }
                if next == Phase::Complete {
                    records.write().await.remove(&creator);
                    info!("publication complete for {} ({} tiers)", creator, tiers.len());
                    return Ok(Outcome::Published {
                        contract,
                        deployed,
                        resumed,
                    });
                }
                checkpoint(&records, &creator, next.clone()).await;
                phase = next;
            }
            Err(source) => {
                let failed = phase.name();
                warn!("publication for {} failed during {}: {}", creator, failed, source);
                // keep the record so a later attempt resumes here
                if let Some(record) = records.write().await.get_mut(&creator) {
                    record.in_flight = false;
                    record.updated_at = Utc::now();
                }
                return Err(PublicationError::Ledger {
                    phase: failed,
                    source,
                });
            }
        }
    }
}

async fn checkpoint(records: &Records, creator: &str, phase: Phase) {
    if let Some(record) = records.write().await.get_mut(creator) {
        record.phase = phase;
        record.updated_at = Utc::now();
    }
}

/// Execute one phase and return the next one.
async fn step(
    ledger: &dyn CreatorLedger,
    creator: &str,
    slug: &str,
    tiers: &[TierSpec],
    phase: &Phase,
) -> anyhow::Result<Phase> {
    match phase {
        Phase::Resolve => {
            let existing = ledger.subscription_contract(creator).await?;
            if existing.is_empty() {
                Ok(Phase::Provision)
            } else {
                Ok(Phase::Mint { contract: existing })
            }
        }
        Phase::Provision => {
            let contract = ledger.deploy_subscription_contract(slug).await?;
            info!("subscription contract for {} deployed at {}", slug, contract);
            Ok(Phase::Register { contract })
        }
        Phase::Register { contract } => {
            ledger
                .register_subscription_contract(creator, contract)
                .await?;
            Ok(Phase::Mint {
                contract: contract.clone(),
            })
        }
        Phase::Mint { contract } => {
            let tokens: Vec<TokenDescriptor> = tiers
                .iter()
                .map(|tier| TokenDescriptor {
                    name: tier.name.clone(),
                    description: tier.description.clone(),
                    image: None,
                })
                .collect();
            ledger.lazy_mint(contract, &tokens).await?;
            Ok(Phase::Price {
                contract: contract.clone(),
                next_tier: 0,
            })
        }
        Phase::Price {
            contract,
            next_tier,
        } => {
            if *next_tier >= tiers.len() {
                return Ok(Phase::Complete);
            }
            let terms = ClaimTerms {
                max_claimable_per_wallet: 1,
                price: tiers[*next_tier].price,
                start: Utc::now(),
            };
            ledger
                .set_claim_conditions(contract, *next_tier as u64, &terms)
                .await?;
            Ok(Phase::Price {
                contract: contract.clone(),
                next_tier: next_tier + 1,
            })
        }
        Phase::Complete => Ok(Phase::Complete),
    }
}
