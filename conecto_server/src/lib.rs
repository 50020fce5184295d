//! Conecto server: creator handles, landing pages, and tokenized
//! subscription tiers.
//!
//! A creator claims a human-readable handle, customizes a landing page
//! (logo, copy, color palette, subscription tiers), and publishes the tiers
//! as ERC-1155 token types on an EVM network. The public page renders a
//! creator's published landing page by handle, through the same renderer
//! that backs the editor preview.

pub mod api;
pub mod config;
pub mod contracts;
pub mod ledger;
pub mod pages;
pub mod preferences;
pub mod publication;
