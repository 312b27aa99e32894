pub mod config;
pub mod domain;
pub mod errors;
pub mod faq;
pub mod flows;
pub mod intent;
pub mod sanitize;
pub mod session;
pub mod store;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::{Booking, ChatMessage, Domain, Lead, Role, Severity, Ticket};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use faq::{KnowledgeBase, KnowledgeError, FAQ_FALLBACK};
pub use flows::{advance, flow_for, FlowError, FlowRecord, FlowReply, FlowSpec, FlowTurn};
pub use intent::{ActionHint, Classification, Intent, NluContext};
pub use sanitize::sanitize_input;
pub use session::{Session, SessionStore, MAX_MESSAGES_BEFORE_SUMMARY};
pub use store::{CommittedRecord, FlowPersistence, RecordStore, StoreError};
