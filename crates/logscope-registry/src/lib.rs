//! # logscope-registry
//!
//! Event schema sources and the build-once schema set.
//!
//! - `AbiParser` turns ABI JSON or Solidity declarations into `EventSchema`s
//! - `SchemaSet` indexes them by signature hash and implements the core
//!   `SchemaRegistry` trait
//! - `AbiFetcher` (feature `remote`) downloads ABIs over HTTP

pub mod abi;
#[cfg(feature = "remote")]
pub mod remote;
pub mod set;

pub use abi::AbiParser;
pub use set::SchemaSet;

#[cfg(feature = "remote")]
pub use remote::{AbiFetcher, RemoteError};
