//! Tiered sub-score curves
//!
//! Each curve is a step function over domain-chosen bands rather than a
//! smooth mapping. All return values are in [0, 100].

/// Liquidity at or above this is scored on absolute volume
const DEEP_POOL_LIQUIDITY_USD: f64 = 1_000_000.0;

/// Score assigned to fragmented liquidity
const FRAGMENTED_SCORE: f64 = 40.0;

/// (lower bound in USD, score), highest band first
const LIQUIDITY_BANDS: &[(f64, f64)] = &[
    (10_000_000.0, 100.0),
    (5_000_000.0, 90.0),
    (2_000_000.0, 80.0),
    (1_000_000.0, 70.0),
    (500_000.0, 55.0),
    (250_000.0, 40.0),
    (100_000.0, 25.0),
];

/// (lower bound in USD, score) for deep pools, highest band first
const DEEP_POOL_VOLUME_BANDS: &[(f64, f64)] = &[
    (5_000_000.0, 100.0),
    (1_000_000.0, 90.0),
    (250_000.0, 75.0),
    (100_000.0, 60.0),
    (25_000.0, 40.0),
];

/// (upper bound on top-10 %, exclusive, score), lowest band first
const HOLDER_BANDS: &[(f64, f64)] = &[
    (20.0, 100.0),
    (30.0, 90.0),
    (40.0, 75.0),
    (50.0, 60.0),
    (60.0, 40.0),
    (70.0, 25.0),
];

fn step_down(value: f64, bands: &[(f64, f64)], floor: f64) -> f64 {
    bands
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, score)| *score)
        .unwrap_or(floor)
}

/// Liquidity score from aggregate USD liquidity, capped at 100 past $10M
pub fn liquidity_score(liquidity_usd: f64) -> f64 {
    step_down(liquidity_usd, LIQUIDITY_BANDS, 10.0)
}

/// Volume score.
///
/// Deep pools are scored on absolute daily volume, where heavy trading is
/// healthy. Shallower pools are scored on turnover, where volume far above
/// the pool depth is penalised.
pub fn volume_score(volume_24h_usd: f64, liquidity_usd: f64) -> f64 {
    if liquidity_usd <= 0.0 || volume_24h_usd <= 0.0 {
        return 0.0;
    }

    if liquidity_usd >= DEEP_POOL_LIQUIDITY_USD {
        return step_down(volume_24h_usd, DEEP_POOL_VOLUME_BANDS, 20.0);
    }

    let turnover = volume_24h_usd / liquidity_usd;
    match turnover {
        t if t < 0.01 => 20.0,
        t if t < 0.05 => 50.0,
        t if t <= 0.50 => 100.0,
        t if t <= 1.0 => 70.0,
        t if t <= 2.0 => 40.0,
        _ => 20.0,
    }
}

/// Holder score from top-10 concentration, lower concentration is better
pub fn holder_score(top10_concentration: f64) -> f64 {
    HOLDER_BANDS
        .iter()
        .find(|(max, _)| top10_concentration < *max)
        .map(|(_, score)| *score)
        .unwrap_or(10.0)
}

/// Full marks when liquidity is concentrated, a fixed penalty otherwise
pub fn fragmentation_score(fragmentation_safe: bool) -> f64 {
    if fragmentation_safe {
        100.0
    } else {
        FRAGMENTED_SCORE
    }
}
