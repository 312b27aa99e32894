//! NLU and orchestration for the conversational intake assistant.
//!
//! This crate is the "front of house" of the system:
//! - **Classification** (`classifier`, `keyword`, `remote`) — map free text
//!   onto an intent label plus pre-extracted entities. The remote backend is
//!   optional; the deterministic keyword classifier is always available and
//!   doubles as the unconditional fallback.
//! - **Routing** (`router`) — resolve the intent for each turn, delegate to
//!   the matching slot-filling flow, the FAQ lookup, or the hand-off reply,
//!   and keep the per-session state in step.
//!
//! The classifier is strictly a translator: it never fills a record field on
//! its own authority and never decides when a flow commits. Those decisions
//! stay in the deterministic flow engine in `atende-core`.

pub mod classifier;
pub mod keyword;
pub mod remote;
pub mod router;

pub use classifier::{build_classifier, Classifier};
pub use keyword::KeywordClassifier;
pub use remote::RemoteClassifier;
pub use router::{DialogueRouter, RouterError, TurnReply, CLOSING_CTA, PRIVACY_NOTICE};
