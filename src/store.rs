//! In-memory ledger store
//!
//! One `Token` per mint address, each holding an append-only sequence
//! of transactions in arrival order. The serde shapes here are the
//! snapshot document: `Store` serializes directly to the `{"tokens":
//! [...]}` file that persistence writes, so field names and ordering
//! match the wire format.

use {
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Append against an address that was never registered.
    /// Register-before-append is the caller's obligation; hitting this
    /// means an upstream ordering defect, not a recoverable condition.
    #[error("no asset registered for address {0}")]
    UnknownAsset(String),
}

/// Human-readable metadata attached to a token once the directory
/// lookup succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
}

/// A single trade applied to a token's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub user: String,
    pub is_buy: bool,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub price_change_percent: f64,
    #[serde(with = "rust_decimal::serde::str")]
    pub old_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub new_price: Decimal,
    pub slot: u64,
    pub signature: String,
    pub real_sol_reserves: u64,
    pub real_token_reserves: u64,
}

/// One traded asset and its ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<TokenInfo>,
    pub txs: Vec<Transaction>,
}

/// The full ledger. Tokens keep their first-seen order so the emitted
/// snapshot document is stable across saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub tokens: Vec<Token>,
}

impl Store {
    pub fn find(&self, address: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.address == address)
    }

    fn find_mut(&mut self, address: &str) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.address == address)
    }

    /// Ensure a token record exists for `address`, attaching `info` if
    /// the record does not carry metadata yet. Existing metadata is
    /// never overwritten; existing transactions are never touched.
    pub fn upsert(&mut self, address: &str, info: Option<TokenInfo>) {
        match self.find_mut(address) {
            Some(token) => {
                if token.info.is_none() {
                    token.info = info;
                }
            }
            None => self.tokens.push(Token {
                address: address.to_string(),
                info,
                txs: Vec::new(),
            }),
        }
    }

    /// Append a transaction to an existing token's ledger.
    pub fn append(&mut self, address: &str, tx: Transaction) -> Result<(), StoreError> {
        let token = self
            .find_mut(address)
            .ok_or_else(|| StoreError::UnknownAsset(address.to_string()))?;
        token.txs.push(tx);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tx(signature: &str) -> Transaction {
        Transaction {
            user: "User1111".to_string(),
            is_buy: true,
            sol_amount: 10,
            token_amount: 20,
            price_change_percent: 1.5,
            old_price: dec!(2.0),
            new_price: dec!(2.03),
            slot: 42,
            signature: signature.to_string(),
            real_sol_reserves: 100,
            real_token_reserves: 200,
        }
    }

    #[test]
    fn upsert_creates_once() {
        let mut store = Store::default();
        store.upsert("mintA", None);
        store.upsert("mintA", None);

        assert_eq!(store.len(), 1);
        assert!(store.find("mintA").unwrap().info.is_none());
    }

    #[test]
    fn upsert_never_overwrites_info() {
        let mut store = Store::default();
        let first = TokenInfo {
            name: "First".to_string(),
            symbol: "FST".to_string(),
        };
        let second = TokenInfo {
            name: "Second".to_string(),
            symbol: "SND".to_string(),
        };

        store.upsert("mintA", None);
        store.upsert("mintA", Some(first.clone()));
        store.upsert("mintA", Some(second));

        assert_eq!(store.find("mintA").unwrap().info, Some(first));
    }

    #[test]
    fn append_preserves_arrival_order() {
        let mut store = Store::default();
        store.upsert("mintA", None);

        // Slots deliberately out of order; arrival order must win.
        for (sig, slot) in [("s1", 9), ("s2", 3), ("s3", 7)] {
            let mut t = tx(sig);
            t.slot = slot;
            store.append("mintA", t).unwrap();
        }

        let sigs: Vec<&str> = store
            .find("mintA")
            .unwrap()
            .txs
            .iter()
            .map(|t| t.signature.as_str())
            .collect();
        assert_eq!(sigs, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn append_to_unknown_asset_is_an_error() {
        let mut store = Store::default();
        let err = store.append("missing", tx("s1")).unwrap_err();
        assert_eq!(err, StoreError::UnknownAsset("missing".to_string()));
        assert!(store.is_empty());
    }
}
