
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod metadata;
pub mod persistence;
pub mod price;
pub mod registry;
pub mod store;
