//! Session construction and the per-workspace entry point

mod builder;
mod session;

pub use builder::{Assetgate, AssetgateBuilder};
pub use session::InventorySession;
