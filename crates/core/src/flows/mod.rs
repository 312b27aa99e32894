pub mod domains;
pub mod engine;
pub mod extract;
pub mod slots;

pub use domains::{flow_for, FieldSpec, FlowSpec};
pub use engine::{advance, FlowError, FlowRecord, FlowReply, FlowTurn};
pub use extract::Extractor;
pub use slots::{generate_slots, BUSINESS_HOURS, MAX_SLOTS};
