//! State stores
//!
//! App-wide mutable state shared by independent views. Stores are explicit
//! constructed containers (no ambient singletons): each holds the shared
//! [`SourceSwitch`] and its own `RwLock`ed state snapshot.
//!
//! [`SourceSwitch`]: crate::source::SourceSwitch

mod directory;
mod finance;
mod pos;

pub use directory::DirectoryStore;
pub use finance::{FinanceStore, FinanceSummary};
pub use pos::{PosState, PosStore};
