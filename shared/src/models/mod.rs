//! Domain models
//!
//! Entities as persisted by the hosted backend. The client treats the
//! backend as authoritative; these types only keep illegal states from
//! being constructed locally.

mod customer;
mod dining_table;
mod finance;
mod location;
mod menu;
mod order;
mod payment;
mod staff;
mod tenant;

pub use customer::*;
pub use dining_table::*;
pub use finance::*;
pub use location::*;
pub use menu::*;
pub use order::*;
pub use payment::*;
pub use staff::*;
pub use tenant::*;
