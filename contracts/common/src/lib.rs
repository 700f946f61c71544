//! Shared building blocks for the medical ledger contracts.
//!
//! This crate provides:
//! - [`state_machine`] — the record verification lifecycle
//!   (`Unverified → Verified`) and its transition rules.
//! - [`ttl`] — storage TTL policy and helpers that write and extend an entry
//!   in one step.
//!
//! Contract-specific errors live in each contract crate; the only error type
//! defined here is [`state_machine::TransitionError`].

#![no_std]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod state_machine;
pub mod ttl;

pub use state_machine::{RecordState, TransitionError};
