//! Preference store: the editable landing-page state for one editing
//! session.
//!
//! Holds identity fields, a color palette, and an ordered list of
//! subscription tiers. The store lives for a single session and is never
//! persisted server-side; publishing round-trips the tiers through the
//! publication engine and the on-chain record.

use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod colors;

pub use colors::ColorPalette;

/// Placeholder logo shown before an upload.
pub const PLACEHOLDER_LOGO: &str = "/api/placeholder/100/100";

/// One priced subscription offering. The list position, not the id, becomes
/// the on-chain token index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionTier {
    /// Client-generated, time-based identifier
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
}

/// A single tier field update.
#[derive(Debug, Clone, PartialEq)]
pub enum TierField {
    Name(String),
    Price(f64),
    Description(String),
}

/// In-memory form state for a creator's landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceStore {
    pub name: String,
    pub description: String,
    /// Logo as a data URI once uploaded
    pub logo: String,
    pub colors: ColorPalette,
    pub tiers: Vec<SubscriptionTier>,
    #[serde(skip)]
    last_tier_id: u64,
}

impl Default for PreferenceStore {
    fn default() -> Self {
        let mut store = Self {
            name: String::new(),
            description: String::new(),
            logo: PLACEHOLDER_LOGO.to_string(),
            colors: ColorPalette::default(),
            tiers: Vec::new(),
            last_tier_id: 0,
        };
        // fresh sessions start with one starter tier
        let id = store.next_tier_id();
        store.tiers.push(SubscriptionTier {
            id,
            name: "Base".to_string(),
            price: 9.99,
            description: "Base plan".to_string(),
        });
        store
    }
}

impl PreferenceStore {
    /// Append a tier with placeholder values and a fresh identifier, and
    /// return the identifier.
    pub fn add_tier(&mut self) -> String {
        let id = self.next_tier_id();
        self.tiers.push(SubscriptionTier {
            id: id.clone(),
            name: "New description".to_string(),
            price: 0.0,
            description: "Description".to_string(),
        });
        id
    }

    /// Remove a tier by identifier. Returns whether a tier was removed;
    /// the remaining tiers keep their order.
    pub fn remove_tier(&mut self, id: &str) -> bool {
        let before = self.tiers.len();
        self.tiers.retain(|tier| tier.id != id);
        self.tiers.len() != before
    }

    /// Update one field of the tier with the given identifier. Returns
    /// whether a tier matched.
    pub fn update_tier(&mut self, id: &str, field: TierField) -> bool {
        match self.tiers.iter_mut().find(|tier| tier.id == id) {
            Some(tier) => {
                match field {
                    TierField::Name(name) => tier.name = name,
                    TierField::Price(price) => tier.price = price,
                    TierField::Description(description) => tier.description = description,
                }
                true
            }
            None => false,
        }
    }

    /// Read an uploaded image file into a `data:` URI and use it as the
    /// logo.
    pub async fn set_logo_from_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let mime = match path.extension().and_then(|e| e.to_str()) {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.logo = format!("data:{};base64,{}", mime, encoded);
        Ok(())
    }

    /// Time-based tier identifier, bumped when two tiers land on the same
    /// millisecond.
    fn next_tier_id(&mut self) -> String {
        let mut candidate = Utc::now().timestamp_millis().max(0) as u64;
        if candidate <= self.last_tier_id {
            candidate = self.last_tier_id + 1;
        }
        self.last_tier_id = candidate;
        candidate.to_string()
    }
}
