//! Case files for a small legal practice.
//!
//! Cases point at reference records by id and at each other through
//! symmetric relation links. [`store::CaseStore`] owns the cases and keeps
//! those links consistent on every save.

pub mod advisory;
pub mod case;
pub mod entity;
pub mod interchange;
pub mod ledger;
pub mod quick_create;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod store;

pub use case::{CaseRecord, CaseStatus, LedgerEntry, LedgerKind, ReferenceSlot, TimelineEvent};
pub use entity::{EntityType, ReferenceRecord};
pub use registry::Registries;
pub use session::PracticeSession;
pub use store::CaseStore;
