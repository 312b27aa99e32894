pub mod connection;
pub mod migrations;
pub mod persistence;
pub mod stores;

pub use connection::{connect, connect_with_settings, DbPool};
pub use persistence::{open_stores, DomainStores, StoreSetupError};
pub use stores::{JsonStore, MemoryStore, SqlBookingStore, SqlLeadStore, SqlTicketStore};
