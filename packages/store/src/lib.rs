//! Client-side persistence and configuration shared by the BruceOps crates.

pub mod config;
pub mod kv;

mod memory;
pub use memory::MemoryStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local::LocalStorageStore;

pub use crate::config::{ClientConfig, IdentityStrategy};
pub use crate::kv::KeyValueStore;
