//! Event dispatcher
//!
//! The single mutator of the ledger store. Events arrive over a
//! bounded channel in arrival order and are applied one at a time:
//! resolve metadata, derive prices (trades only), then apply the
//! registration upsert and the ledger append as one write-lock
//! critical section. The persistence task only ever takes the read
//! lock, so each event's mutation is atomic with respect to
//! snapshots.

use {
    crate::{
        events::{CompleteEvent, CreateEvent, CurveEvent, TradeEvent},
        price,
        registry::Registry,
        store::{Store, Transaction},
    },
    rust_decimal::prelude::ToPrimitive,
    std::sync::Arc,
    tokio::sync::{mpsc, RwLock},
};

/// Message sent through the channel from event producers to the
/// dispatcher task.
#[derive(Debug, Clone)]
pub enum LedgerMessage {
    Event(CurveEvent),
    Shutdown,
}

/// Background task that drains the event channel and applies each
/// event to the store. Exits on `Shutdown` or when all senders drop;
/// messages already queued ahead of the shutdown are still applied.
pub async fn dispatcher_task(
    mut rx: mpsc::Receiver<LedgerMessage>,
    registry: Registry,
    store: Arc<RwLock<Store>>,
) {
    log::info!("dispatcher started");

    while let Some(message) = rx.recv().await {
        match message {
            LedgerMessage::Event(event) => handle_event(event, &registry, &store).await,
            LedgerMessage::Shutdown => {
                log::info!("dispatcher received shutdown signal");
                break;
            }
        }
    }

    log::info!("dispatcher stopped");
}

async fn handle_event(event: CurveEvent, registry: &Registry, store: &Arc<RwLock<Store>>) {
    match event {
        CurveEvent::Create(create) => handle_create(create, registry).await,
        CurveEvent::Trade(trade) => handle_trade(trade, registry, store).await,
        CurveEvent::Complete(complete) => handle_complete(complete, registry).await,
    }
}

async fn handle_create(event: CreateEvent, registry: &Registry) {
    registry.register(&event.mint).await;
    log::info!("new token: {}", event.mint);
}

async fn handle_trade(event: TradeEvent, registry: &Registry, store: &Arc<RwLock<Store>>) {
    // Resolve metadata before touching the store: the registration
    // upsert and the ledger append must land under one write-lock
    // acquisition so a snapshot can never see this trade half-applied.
    let info = registry.resolve(&event.mint).await;

    let quote = match price::derive(&event) {
        Ok(quote) => quote,
        Err(e) => {
            log::warn!(
                "rejecting trade {} for {}: {}",
                event.signature,
                event.mint,
                e
            );
            store.write().await.upsert(&event.mint, info);
            return;
        }
    };

    let change_percent = match quote.change_percent.to_f64() {
        Some(v) if v.is_finite() => v,
        _ => {
            log::warn!(
                "rejecting trade {} for {}: percent change not representable",
                event.signature,
                event.mint
            );
            store.write().await.upsert(&event.mint, info);
            return;
        }
    };

    let tx = Transaction {
        user: event.user,
        is_buy: event.is_buy,
        sol_amount: event.sol_amount,
        token_amount: event.token_amount,
        price_change_percent: change_percent,
        old_price: quote.old_price,
        new_price: quote.new_price,
        slot: event.slot,
        signature: event.signature,
        real_sol_reserves: event.real_sol_reserves,
        real_token_reserves: event.real_token_reserves,
    };

    let label = {
        let mut store = store.write().await;
        store.upsert(&event.mint, info);
        if let Err(e) = store.append(&event.mint, tx) {
            // The upsert just above guarantees the asset exists, so
            // this is an internal defect, not bad input.
            log::error!("ledger append failed: {}", e);
            return;
        }
        store
            .find(&event.mint)
            .and_then(|t| t.info.as_ref())
            .map(|info| format!("{} ({})", info.name, info.symbol))
            .unwrap_or_else(|| event.mint.clone())
    };

    log::info!(
        "trade: {} {} -> {} ({}%)",
        label,
        quote.old_price.round_dp(9),
        quote.new_price.round_dp(9),
        quote.change_percent.round_dp(4)
    );
}

async fn handle_complete(event: CompleteEvent, registry: &Registry) {
    registry.register(&event.mint).await;
    log::info!(
        "curve complete: {} by {} (slot={}, sig={})",
        event.mint,
        event.user,
        event.slot,
        event.signature
    );
}
