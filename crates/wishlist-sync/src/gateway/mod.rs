//! Gateway Layer
//!
//! Contracts for the hosted identity service and document store, plus the
//! explicitly constructed `Backend` handle the controller is started with.
//! Implementations: the browser bridge in the UI crate, `memory` here.

mod path;
mod stream;
mod traits;

pub mod memory;

pub use path::CollectionPath;
pub use stream::{AuthStateStream, EventStream, SnapshotStream};
pub use traits::{Backend, CollectionGateway, Identity, IdentityProvider};
