//! Trust signal for web sources.

use serde::{Deserialize, Serialize};

/// Domains (or domain suffixes) whose content is treated as high authority.
pub const HIGH_AUTHORITY_DOMAINS: &[&str] = &[
    ".gov",
    ".edu",
    "forbes.com",
    "techcrunch.com",
    "bloomberg.com",
    "nytimes.com",
    "wsj.com",
    "hbr.org",
    "mckinsey.com",
    "gartner.com",
    "statista.com",
    "hubspot.com",
    "salesforce.com",
    "adobe.com",
    "bbc.com",
    "reuters.com",
    "investopedia.com",
    "nature.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityTier {
    High,
    Normal,
}

/// Classify a link by substring match against [`HIGH_AUTHORITY_DOMAINS`].
pub fn classify(link: &str) -> AuthorityTier {
    if HIGH_AUTHORITY_DOMAINS
        .iter()
        .any(|domain| link.contains(domain))
    {
        AuthorityTier::High
    } else {
        AuthorityTier::Normal
    }
}
