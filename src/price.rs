//! Price derivation engine
//!
//! Reverses a trade's effect on the pool reserves to recover the
//! pre-trade price, and computes the percent change against the
//! post-trade price. Pure functions, no state, no I/O.
//!
//! Price is defined as token-reserve / sol-reserve (token units per
//! unit of sol). All arithmetic runs on `rust_decimal::Decimal` so the
//! results are reproducible regardless of reserve magnitude; native
//! floats are never involved.

use {crate::events::TradeEvent, rust_decimal::Decimal, thiserror::Error};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// Reversing the trade produced a zero reserve or wrapped around
    /// the integer range. The event is malformed and must be rejected;
    /// a zero reserve would make the price ratio undefined.
    #[error("invalid trade reconstruction: {0}")]
    InvalidReconstruction(&'static str),
}

/// Result of deriving prices for a single trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub change_percent: Decimal,
}

/// Derive pre/post-trade prices and the percent change for a trade.
///
/// A buy moves sol into the pool and tokens out, so the pre-trade
/// reserves are post_sol - sol_amount and post_token + token_amount.
/// A sell inverts the signs.
pub fn derive(trade: &TradeEvent) -> Result<PriceQuote, PriceError> {
    let (pre_sol, pre_token) = if trade.is_buy {
        (
            trade.real_sol_reserves.checked_sub(trade.sol_amount),
            trade.real_token_reserves.checked_add(trade.token_amount),
        )
    } else {
        (
            trade.real_sol_reserves.checked_add(trade.sol_amount),
            trade.real_token_reserves.checked_sub(trade.token_amount),
        )
    };

    let pre_sol = pre_sol.ok_or(PriceError::InvalidReconstruction(
        "pre-trade sol reserve out of range",
    ))?;
    let pre_token = pre_token.ok_or(PriceError::InvalidReconstruction(
        "pre-trade token reserve out of range",
    ))?;

    if pre_sol == 0 {
        return Err(PriceError::InvalidReconstruction("pre-trade sol reserve is zero"));
    }
    if pre_token == 0 {
        return Err(PriceError::InvalidReconstruction("pre-trade token reserve is zero"));
    }
    if trade.real_sol_reserves == 0 {
        return Err(PriceError::InvalidReconstruction("post-trade sol reserve is zero"));
    }

    // Checked operations throughout: with u64-range reserves the
    // price ratio of ratios can exceed what Decimal represents, and an
    // overflow must reject the event rather than fault.
    let old_price = Decimal::from(pre_token)
        .checked_div(Decimal::from(pre_sol))
        .ok_or(PriceError::InvalidReconstruction("pre-trade price out of range"))?;
    let new_price = Decimal::from(trade.real_token_reserves)
        .checked_div(Decimal::from(trade.real_sol_reserves))
        .ok_or(PriceError::InvalidReconstruction("post-trade price out of range"))?;
    let change_percent = new_price
        .checked_div(old_price)
        .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
        .and_then(|delta| delta.checked_mul(Decimal::from(100)))
        .ok_or(PriceError::InvalidReconstruction("percent change out of range"))?;

    Ok(PriceQuote {
        old_price,
        new_price,
        change_percent,
    })
}
