//! Granary Warehouse
//!
//! The warehouse is the external collaborator every step operation talks to.
//! [`WarehouseClient`] is the full surface the executor needs: dataset and
//! table creation, existence checks, and SQL execution (fire-and-forget or
//! scalar-returning).
//!
//! [`MemoryWarehouse`] is the bundled implementation: an in-process store
//! used by the CLI demo and the integration tests. Real deployments would
//! implement the trait against an actual warehouse API.

mod client;
mod error;
mod memory;

pub use client::WarehouseClient;
pub use error::WarehouseError;
pub use memory::MemoryWarehouse;
