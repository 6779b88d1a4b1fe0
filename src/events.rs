use serde::{Deserialize, Serialize};

/// Events delivered by the curve event source, already demultiplexed
/// into typed variants. The subscription plumbing that produces these
/// lives outside this crate.
///
/// The variants are matched exhaustively in the dispatcher, so a new
/// event kind is a compile-time decision rather than a silently ignored
/// case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CurveEvent {
    Create(CreateEvent),
    Trade(TradeEvent),
    Complete(CompleteEvent),
}

impl CurveEvent {
    /// Mint address the event refers to.
    pub fn mint(&self) -> &str {
        match self {
            CurveEvent::Create(e) => &e.mint,
            CurveEvent::Trade(e) => &e.mint,
            CurveEvent::Complete(e) => &e.mint,
        }
    }
}

/// A new asset was created on the bonding curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub mint: String,
}

/// A trade against the bonding curve. Reserve values are the pool's
/// post-trade holdings in base units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    pub mint: String,
    pub user: String,
    pub is_buy: bool,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub real_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub slot: u64,
    pub signature: String,
}

/// The bonding curve completed (asset graduated off the curve).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteEvent {
    pub mint: String,
    pub user: String,
    pub slot: u64,
    pub signature: String,
}
