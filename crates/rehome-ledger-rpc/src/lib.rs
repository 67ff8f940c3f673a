//! Ethereum JSON-RPC ledger backend.
//!
//! Talks to a development chain (Ganache or similar) over HTTP: accounts via
//! `eth_accounts`, table reads via `eth_call`, adoptions via
//! `eth_sendTransaction` with receipt polling for confirmation.

pub mod abi;
pub mod client;
pub mod contract;

pub use client::{DEFAULT_ENDPOINT, RpcClient, RpcConfig};
pub use contract::RpcContract;
