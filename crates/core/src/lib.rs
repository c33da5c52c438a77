//! Domain types and pure logic for the ChefMatch recommendation pipeline.
//!
//! Nothing in this crate performs I/O. Storage, messaging and HTTP live in
//! the `db`, `events`, `pipeline` and `api` crates, which plug into the
//! collaborator traits declared in [`ports`].

pub mod category;
pub mod error;
pub mod events;
pub mod ports;
pub mod ranking;
pub mod recommendation;
pub mod types;
