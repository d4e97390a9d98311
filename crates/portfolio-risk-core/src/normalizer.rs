//! Input normalisation.
//!
//! Projects fund and direct holdings onto one uniform [`NormalizedAsset`]
//! so the aggregator can group every holding along the same six
//! dimensions. Missing optional fields fall back to the labels in
//! [`crate::defaults`]; a fund without an explicit asset class is labelled by
//! an injectable [`AssetClassifier`].

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_CURRENCY, DEFAULT_FUND_ASSET_CLASS, DEFAULT_FUND_SECTOR, DIRECT_ASSET_CLASS,
    DIRECT_HOLDINGS_LABEL, DIRECT_VINTAGE_LABEL, UNKNOWN_LABEL,
};
use crate::types::{DirectHolding, FundHolding, Money};

/// Where a normalised asset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    Fund,
    Direct,
}

/// One holding projected onto the aggregation dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAsset {
    pub id: String,
    pub source: AssetSource,
    pub amount: Money,
    pub asset_class: String,
    pub geography: String,
    pub manager: String,
    pub vintage: String,
    pub currency: String,
    pub sector: String,
}

/// Infers an asset-class label for a fund that does not carry one.
pub trait AssetClassifier {
    fn classify(&self, fund: &FundHolding) -> String;
}

/// Keyword matcher over a fund's strategy, sector and name.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAssetClassifier;

/// Checked in order; first hit wins.
const ASSET_CLASS_KEYWORDS: &[(&[&str], &str)] = &[
    (&["secondar"], "Secondaries"),
    (&["fund of funds", "fund-of-funds", "fof"], "Fund of Funds"),
    (&["venture", "seed", "early stage", "early-stage"], "Venture Capital"),
    (&["growth"], "Growth Equity"),
    (&["buyout", "lbo"], "Buyout"),
    (
        &["credit", "debt", "lending", "mezzanine", "loan"],
        "Private Credit",
    ),
    (&["real estate", "property", "reit"], "Real Estate"),
    (&["infrastructure", "infra "], "Infrastructure"),
];

impl AssetClassifier for KeywordAssetClassifier {
    fn classify(&self, fund: &FundHolding) -> String {
        let haystack = [
            fund.strategy.as_deref(),
            fund.sector.as_deref(),
            Some(fund.name.as_str()),
        ]
        .iter()
        .flatten()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

        ASSET_CLASS_KEYWORDS
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| contains_word(&haystack, n)))
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| DEFAULT_FUND_ASSET_CLASS.to_string())
    }
}

/// Short keywords ("fof", "lbo") must match a whole word, not a fragment.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.len() > 3 {
        return haystack.contains(needle);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == needle)
}

/// Trimmed value, or the fallback when absent or blank.
fn label_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn normalize_fund(fund: &FundHolding, classifier: &dyn AssetClassifier) -> NormalizedAsset {
    let asset_class = match fund.asset_class.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => classifier.classify(fund),
    };
    NormalizedAsset {
        id: fund.id.clone(),
        source: AssetSource::Fund,
        amount: fund.nav,
        asset_class,
        geography: label_or(fund.domicile.as_deref(), UNKNOWN_LABEL),
        manager: label_or(fund.manager.as_deref(), UNKNOWN_LABEL),
        vintage: fund
            .vintage
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        currency: label_or(fund.base_currency.as_deref(), DEFAULT_CURRENCY),
        sector: label_or(fund.sector.as_deref(), DEFAULT_FUND_SECTOR),
    }
}

pub fn normalize_direct(holding: &DirectHolding) -> NormalizedAsset {
    NormalizedAsset {
        id: holding.id.clone(),
        source: AssetSource::Direct,
        amount: holding.value(),
        asset_class: label_or(holding.asset_class.as_deref(), DIRECT_ASSET_CLASS),
        geography: label_or(holding.geography.as_deref(), DIRECT_HOLDINGS_LABEL),
        manager: label_or(Some(holding.name.as_str()), DIRECT_HOLDINGS_LABEL),
        vintage: DIRECT_VINTAGE_LABEL.to_string(),
        currency: label_or(holding.currency.as_deref(), DEFAULT_CURRENCY),
        sector: label_or(holding.sector.as_deref(), DIRECT_HOLDINGS_LABEL),
    }
}

/// Funds first, then direct holdings, each in input order.
pub fn normalize_holdings(
    funds: &[FundHolding],
    directs: &[DirectHolding],
    classifier: &dyn AssetClassifier,
) -> Vec<NormalizedAsset> {
    funds
        .iter()
        .map(|f| normalize_fund(f, classifier))
        .chain(directs.iter().map(normalize_direct))
        .collect()
}
