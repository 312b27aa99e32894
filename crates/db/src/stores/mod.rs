pub mod json;
pub mod memory;
pub mod sqlite;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use sqlite::{SqlBookingStore, SqlLeadStore, SqlTicketStore};
