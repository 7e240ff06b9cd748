//! keytable: a string-keyed open-addressing table, a field-name tag
//! registry built on it, and a TLV record encoder fed by the registry.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the collision-resolution core small and independently
//!   verifiable, with the record-encoding glue layered on top of it.
//! - Layers:
//!   - KeyTable<V, S>: the data structure. Open addressing with forward
//!     linear probing over a power-of-two slot array, occupancy capped at
//!     half capacity by doubling growth, owned key copies, external
//!     iterator over physical slot order.
//!   - TagRegistry: wraps KeyTable<u32> to hand out dense, stable integer
//!     tags for field names, starting at 1, in first-seen order.
//!   - TlvBox / TlvRecord: tag-length-value encoder and decoder for one
//!     record's (tag, payload) pairs.
//!   - RecordEncoder: drives newline-delimited JSON records through the
//!     registry and codec into a binary sink.
//!
//! Constraints
//! - No deletion: an empty slot is proof of absence, so probes terminate
//!   without tombstones. This is load-bearing for `get`.
//! - Load factor <= 1/2 before every insertion; capacity only doubles.
//! - Keys are owned by the table (one durable copy each, made on first
//!   insertion, reused on overwrite, released on drop). Values are stored
//!   by move and never inspected.
//! - Not internally synchronized: a table is `&mut`-exclusive like any
//!   Rust container; callers sharing one across threads serialize access
//!   themselves.
//!
//! Hashing
//! - Default hasher is 64-bit FNV-1a over the raw key bytes, unkeyed and
//!   deterministic; slot index is `hash & (capacity - 1)`. The table is
//!   generic over `BuildHasher`, so a per-instance seeded hasher can be
//!   substituted where keys are attacker-controlled.
//!
//! Iteration
//! - `iter` borrows the table shared, so inserting during iteration is a
//!   compile error rather than a documented hazard. Order is the physical
//!   slot order of the moment: deterministic per state, reshuffled by
//!   growth, not insertion order.
//!
//! Notes and non-goals
//! - No removal, no non-string keys, no occupancy shrinking.
//! - Failed operations (allocation failure, capacity overflow) leave the
//!   table exactly as it was; errors carry no partial state.
//! - The pipeline writes concatenated per-record TLV buffers with no outer
//!   framing; callers needing boundaries keep the per-record buffers.

pub mod fnv;
pub mod key_table;
mod key_table_proptest;
pub mod pipeline;
pub mod tag_registry;
pub mod tlv;

// Public surface
pub use fnv::{Fnv1aBuildHasher, Fnv1aHasher};
pub use key_table::{KeyTable, SetError};
pub use pipeline::{EncodeError, EncodeSummary, RecordEncoder};
pub use tag_registry::TagRegistry;
pub use tlv::{TlvBox, TlvError, TlvRecord, TlvValue};
