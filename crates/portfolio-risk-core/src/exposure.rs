//! Exposure aggregation across six dimensions.
//!
//! Each dimension groups normalised assets by label, sums amounts, and
//! expresses every group as a whole-number percentage of that dimension's
//! own total. Non-positive amounts are excluded from both numerator and
//! denominator. Entries are sorted by amount, largest first; equal amounts
//! keep label order so output is stable.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arith::{saturating_div, saturating_sum};
use crate::normalizer::NormalizedAsset;
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    AssetClass,
    Geography,
    Manager,
    Vintage,
    Currency,
    Sector,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::AssetClass,
        Dimension::Geography,
        Dimension::Manager,
        Dimension::Vintage,
        Dimension::Currency,
        Dimension::Sector,
    ];

    /// The asset's label along this dimension.
    pub fn label_of(self, asset: &NormalizedAsset) -> &str {
        match self {
            Dimension::AssetClass => &asset.asset_class,
            Dimension::Geography => &asset.geography,
            Dimension::Manager => &asset.manager,
            Dimension::Vintage => &asset.vintage,
            Dimension::Currency => &asset.currency,
            Dimension::Sector => &asset.sector,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::AssetClass => write!(f, "Asset class"),
            Dimension::Geography => write!(f, "Geography"),
            Dimension::Manager => write!(f, "Manager"),
            Dimension::Vintage => write!(f, "Vintage"),
            Dimension::Currency => write!(f, "Currency"),
            Dimension::Sector => write!(f, "Sector"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureEntry {
    pub name: String,
    pub amount: Money,
    pub percentage: Percent,
}

/// One dimension's breakdown. `amounts` mirrors `entries` for lookup by
/// label; labels are whatever the data contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionExposure {
    pub dimension: Dimension,
    pub total: Money,
    pub entries: Vec<ExposureEntry>,
    pub amounts: BTreeMap<String, Money>,
}

impl DimensionExposure {
    /// Share of the largest group, zero for an empty dimension.
    pub fn top_percentage(&self) -> Percent {
        self.entries
            .first()
            .map(|e| e.percentage)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn amount_of(&self, name: &str) -> Money {
        self.amounts.get(name).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureBreakdown {
    pub asset_class: DimensionExposure,
    pub geography: DimensionExposure,
    pub manager: DimensionExposure,
    pub vintage: DimensionExposure,
    pub currency: DimensionExposure,
    pub sector: DimensionExposure,
}

impl ExposureBreakdown {
    pub fn get(&self, dimension: Dimension) -> &DimensionExposure {
        match dimension {
            Dimension::AssetClass => &self.asset_class,
            Dimension::Geography => &self.geography,
            Dimension::Manager => &self.manager,
            Dimension::Vintage => &self.vintage,
            Dimension::Currency => &self.currency,
            Dimension::Sector => &self.sector,
        }
    }

    /// Dimensions in their fixed reporting order.
    pub fn iter(&self) -> impl Iterator<Item = &DimensionExposure> {
        Dimension::ALL.into_iter().map(move |d| self.get(d))
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Group assets along one dimension.
pub fn aggregate_dimension(assets: &[NormalizedAsset], dimension: Dimension) -> DimensionExposure {
    let mut amounts: BTreeMap<String, Money> = BTreeMap::new();
    for asset in assets.iter().filter(|a| a.amount > Decimal::ZERO) {
        let slot = amounts
            .entry(dimension.label_of(asset).to_string())
            .or_insert(Decimal::ZERO);
        *slot = slot.saturating_add(asset.amount);
    }

    let total = saturating_sum(amounts.values().copied());

    let mut entries: Vec<ExposureEntry> = amounts
        .iter()
        .map(|(name, amount)| ExposureEntry {
            name: name.clone(),
            amount: *amount,
            percentage: percentage_of(*amount, total),
        })
        .collect();

    // Stable sort: ties keep the map's label order.
    entries.sort_by(|a, b| b.amount.cmp(&a.amount));

    DimensionExposure {
        dimension,
        total,
        entries,
        amounts,
    }
}

/// Aggregate all six dimensions.
pub fn aggregate_exposures(assets: &[NormalizedAsset]) -> ExposureBreakdown {
    ExposureBreakdown {
        asset_class: aggregate_dimension(assets, Dimension::AssetClass),
        geography: aggregate_dimension(assets, Dimension::Geography),
        manager: aggregate_dimension(assets, Dimension::Manager),
        vintage: aggregate_dimension(assets, Dimension::Vintage),
        currency: aggregate_dimension(assets, Dimension::Currency),
        sector: aggregate_dimension(assets, Dimension::Sector),
    }
}

/// `part / whole × 100`, zero when the whole is not positive.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Percent {
    if whole <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        saturating_div(part, whole).saturating_mul(dec!(100))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
