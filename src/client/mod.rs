//! # Remote Collaborators
//!
//! Contracts for everything this crate persists or reads remotely, plus an
//! in-memory implementation.
//!
//! ## Architecture
//!
//! - **RoutingStore**: routing headers and their ordered steps
//! - **ReferenceDataSource**: processes and operation templates offered by the editor
//! - **OrderSource**: orders whose operations feed the flow diagram
//! - **InMemoryRoutingStore**: records every call, supports injected failures and latency
//!
//! ## Usage
//!
//! ```rust
//! use mesflow_core::client::{InMemoryRoutingStore, RoutingStore};
//! use mesflow_core::models::RoutingHeader;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryRoutingStore::new();
//! let routing = store.create_routing(&RoutingHeader::new("Machining", 3)).await?;
//! assert_eq!(store.routing_count(), 1);
//! # let _ = routing;
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod traits;

pub use memory::{InMemoryRoutingStore, StoreCall, StoreOperation};
pub use traits::{remote_error, NoReferenceData, OrderSource, ReferenceDataSource, RoutingStore};
