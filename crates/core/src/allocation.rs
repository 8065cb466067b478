//! Capped market-cap-weighted capital allocation.
//!
//! Weights start proportional to market capitalization. Every asset whose
//! weight exceeds the cap is pinned at the cap, and the remaining weight is
//! spread over the uncapped assets in proportion to their market caps. This
//! repeats until no uncapped asset is over the cap, the same construction
//! capped market indices use.

use crate::error::AllocationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Provisional weights within this distance above the cap count as within it.
const WEIGHT_EPSILON: f64 = 1e-12;

/// Doublings of the search window allowed before bracketing 100 is abandoned.
const MAX_BRACKET_WIDENINGS: usize = 64;

/// Shortfall of `asset_cap * asset_count` below 1 that is put down to
/// representation error (`0.1` across 10 assets) rather than a real deficit.
#[allow(clippy::cast_precision_loss)]
fn feasibility_slack(asset_count: usize) -> f64 {
    asset_count as f64 * f64::EPSILON
}

/// One asset of an allocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInput {
    pub symbol: String,
    pub market_cap: f64,
    pub price: f64,
}

impl AssetInput {
    pub fn new(symbol: impl Into<String>, market_cap: f64, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            market_cap,
            price,
        }
    }
}

/// A complete allocation request.
///
/// Serialized with the field name `coins` for the asset list, which is what
/// the browser client posts; `assets` is accepted as an alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Maximum weight fraction any single asset may receive, in `(0, 1]`.
    pub asset_cap: f64,
    /// Capital to distribute across the assets.
    pub total_capital: f64,
    #[serde(rename = "coins", alias = "assets")]
    pub assets: Vec<AssetInput>,
}

impl AllocationRequest {
    /// Runs [`allocate`] on this request.
    ///
    /// # Errors
    /// See [`allocate`].
    pub fn allocate(&self) -> Result<Vec<AllocationResult>, AllocationError> {
        allocate(self.asset_cap, self.total_capital, &self.assets)
    }
}

/// Allocation for one asset, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub symbol: String,
    /// Share of total capital in percent, `0..=asset_cap * 100`.
    pub allocation_percentage: f64,
    /// Units purchasable with the assigned capital.
    pub amount: f64,
    pub price: f64,
}

impl AllocationResult {
    /// Capital assigned to this asset out of `total_capital`.
    #[must_use]
    pub fn capital(&self, total_capital: f64) -> f64 {
        self.allocation_percentage / 100.0 * total_capital
    }
}

/// Final weights plus which assets ended pinned at the cap.
#[derive(Debug, Clone, PartialEq)]
pub struct CappedWeights {
    pub weights: Vec<f64>,
    pub capped: Vec<bool>,
}

/// Allocates `total_capital` across `assets` by capped market-cap weight.
///
/// Results come back in input order. Percentages sum to exactly `100.0`
/// when added left to right; any asset's percentage is at most
/// `asset_cap * 100`, and uncapped assets keep their market-cap ratios.
///
/// # Errors
/// Returns `AllocationError::InvalidInput` for an empty asset list, a cap
/// outside `(0, 1]`, non-positive capital, an empty symbol, or a
/// non-positive market cap or price, or a price so small the unit amount
/// overflows. Returns `AllocationError::InfeasibleConstraint` when
/// `asset_cap * assets.len() < 1`.
pub fn allocate(
    asset_cap: f64,
    total_capital: f64,
    assets: &[AssetInput],
) -> Result<Vec<AllocationResult>, AllocationError> {
    validate(asset_cap, total_capital, assets)?;

    let market_caps: Vec<f64> = assets.iter().map(|a| a.market_cap).collect();
    let CappedWeights { weights, capped } = capped_weights(&market_caps, asset_cap)?;

    let mut percentages: Vec<f64> = weights.iter().map(|w| w * 100.0).collect();
    let target = reconcile_target(&weights, &capped);
    reconcile_to_hundred(&mut percentages, target);

    assets
        .iter()
        .zip(percentages)
        .map(|(asset, allocation_percentage)| {
            let capital = allocation_percentage / 100.0 * total_capital;
            let amount = capital / asset.price;
            if !amount.is_finite() {
                return Err(AllocationError::invalid_asset(
                    "price",
                    &asset.symbol,
                    asset.price,
                    "too small for the capital assigned to it",
                ));
            }
            Ok(AllocationResult {
                symbol: asset.symbol.clone(),
                allocation_percentage,
                amount,
                price: asset.price,
            })
        })
        .collect()
}

/// Checks every precondition of [`allocate`] without computing anything.
///
/// # Errors
/// The first violated precondition, in the order: asset list, cap,
/// capital, per-asset fields, feasibility.
pub fn validate(
    asset_cap: f64,
    total_capital: f64,
    assets: &[AssetInput],
) -> Result<(), AllocationError> {
    if assets.is_empty() {
        return Err(AllocationError::invalid(
            "assets",
            "[]",
            "at least one asset is required",
        ));
    }

    if !asset_cap.is_finite() || asset_cap <= 0.0 || asset_cap > 1.0 {
        return Err(AllocationError::invalid(
            "asset_cap",
            asset_cap,
            "must be in (0, 1]",
        ));
    }

    if !total_capital.is_finite() || total_capital <= 0.0 {
        return Err(AllocationError::invalid(
            "total_capital",
            total_capital,
            "must be positive",
        ));
    }

    for asset in assets {
        if asset.symbol.trim().is_empty() {
            return Err(AllocationError::invalid(
                "symbol",
                format!("{:?}", asset.symbol),
                "must not be empty",
            ));
        }
        if !asset.market_cap.is_finite() || asset.market_cap <= 0.0 {
            return Err(AllocationError::invalid_asset(
                "market_cap",
                &asset.symbol,
                asset.market_cap,
                "must be positive",
            ));
        }
        if !asset.price.is_finite() || asset.price <= 0.0 {
            return Err(AllocationError::invalid_asset(
                "price",
                &asset.symbol,
                asset.price,
                "must be positive",
            ));
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let reachable = asset_cap * assets.len() as f64;
    if reachable < 1.0 - feasibility_slack(assets.len()) {
        return Err(AllocationError::InfeasibleConstraint {
            asset_cap,
            asset_count: assets.len(),
        });
    }

    Ok(())
}

/// Water-fills market caps into weights no greater than `asset_cap`.
///
/// Inputs must already satisfy [`validate`]. Every free asset over the cap
/// in an iteration is capped in that same iteration, so ties at the cap are
/// resolved together and the outcome does not depend on input order.
///
/// # Errors
/// Returns `AllocationError::InfeasibleConstraint` if every asset ends up
/// capped while weight is still left to distribute.
pub fn capped_weights(market_caps: &[f64], asset_cap: f64) -> Result<CappedWeights, AllocationError> {
    let n = market_caps.len();
    let mut weights = vec![0.0; n];
    let mut capped = vec![false; n];
    let mut free: Vec<usize> = (0..n).collect();
    let mut remaining = 1.0_f64;
    let mut iteration = 0_usize;

    loop {
        if free.is_empty() {
            if remaining > feasibility_slack(n) {
                return Err(AllocationError::InfeasibleConstraint {
                    asset_cap,
                    asset_count: n,
                });
            }
            break;
        }

        // Scaled by the largest free cap so the sum stays finite near
        // f64::MAX and at least 1 when the rest underflow.
        let largest = free.iter().map(|&i| market_caps[i]).fold(0.0_f64, f64::max);
        let free_mass: f64 = free.iter().map(|&i| market_caps[i] / largest).sum();
        for &i in &free {
            weights[i] = market_caps[i] / largest / free_mass * remaining;
        }

        let before = free.len();
        free.retain(|&i| {
            if weights[i] > asset_cap + WEIGHT_EPSILON {
                weights[i] = asset_cap;
                capped[i] = true;
                false
            } else {
                true
            }
        });
        let newly_capped = before - free.len();

        iteration += 1;
        if newly_capped == 0 {
            debug!(iteration, free = free.len(), remaining, "capping converged");
            break;
        }

        // Recomputed from the capped count rather than accumulated, so the
        // all-capped remainder is exactly `1 - asset_cap * n`.
        #[allow(clippy::cast_precision_loss)]
        let pinned = asset_cap * (n - free.len()) as f64;
        remaining = 1.0 - pinned;
        debug!(iteration, newly_capped, remaining, "capped over-weight assets");
    }

    Ok(CappedWeights { weights, capped })
}

/// Index that absorbs rounding residue: the largest free weight, earliest
/// on ties, or the first asset when all are capped.
fn reconcile_target(weights: &[f64], capped: &[bool]) -> usize {
    let mut target: Option<usize> = None;
    for (i, (&w, &is_capped)) in weights.iter().zip(capped).enumerate() {
        if is_capped {
            continue;
        }
        match target {
            Some(t) if weights[t] >= w => {}
            _ => target = Some(i),
        }
    }
    target.unwrap_or(0)
}

/// Sets `percentages[target]` so the left-to-right sum is exactly 100.
///
/// The sum is monotone in any one entry, so after the direct `100 - others`
/// estimate the exact value is found by bisecting over the bit patterns of
/// non-negative floats around it. Round-half-even in the intermediate sums
/// can skip 100 when the target sits early in the order; the last entry
/// feeds the final addition directly and always reaches it.
#[allow(clippy::float_cmp)]
fn reconcile_to_hundred(percentages: &mut [f64], target: usize) {
    let others: f64 = percentages
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != target)
        .map(|(_, p)| p)
        .sum();
    percentages[target] = (100.0 - others).max(0.0);
    if ordered_sum(percentages) == 100.0 || bisect_to_hundred(percentages, target) {
        return;
    }

    let last = percentages.len() - 1;
    if last != target && bisect_to_hundred(percentages, last) {
        debug!(index = target, "residual moved to last entry");
        return;
    }
    debug!(index = target, sum = ordered_sum(percentages), "sum left one step off 100");
}

/// Bisects `percentages[index]` for a left-to-right sum of exactly 100.
/// Leaves the closest value from above in place when 100 is not reachable.
#[allow(clippy::float_cmp)]
fn bisect_to_hundred(percentages: &mut [f64], index: usize) -> bool {
    let estimate = percentages[index];
    #[allow(clippy::cast_precision_loss)]
    let mut delta = (percentages.len() + 1) as f64 * 100.0 * f64::EPSILON;
    let mut bracket = None;
    for _ in 0..MAX_BRACKET_WIDENINGS {
        let lo = (estimate - delta).max(0.0);
        let hi = estimate + delta;
        if sum_with(percentages, index, lo) <= 100.0 && sum_with(percentages, index, hi) >= 100.0 {
            bracket = Some((lo.to_bits(), hi.to_bits()));
            break;
        }
        delta *= 2.0;
    }
    let Some((mut lo, mut hi)) = bracket else {
        percentages[index] = estimate;
        return false;
    };

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if sum_with(percentages, index, f64::from_bits(mid)) < 100.0 {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    sum_with(percentages, index, f64::from_bits(lo)) == 100.0
}

fn ordered_sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn sum_with(percentages: &mut [f64], target: usize, value: f64) -> f64 {
    percentages[target] = value;
    ordered_sum(percentages)
}
