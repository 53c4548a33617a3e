//! Caseflow Core - Entity Types
//!
//! Data structures shared by every other crate: typed identifiers, the
//! assignment and caseworker records, the error taxonomy, configuration and
//! the business-hour deadline calculator. No I/O lives here.

mod clock;
mod config;
mod deadline;
mod entities;
mod enums;
mod error;
mod event;
mod identity;

pub use clock::*;
pub use config::*;
pub use deadline::*;
pub use entities::*;
pub use enums::*;
pub use error::*;
pub use event::*;
pub use identity::*;
