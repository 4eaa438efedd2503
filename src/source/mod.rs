//! Inventory source implementations.

pub mod http;
pub mod traits;

pub use http::{Credentials, HttpInventoryClient, workspace_base_url};
pub use traits::InventorySource;
