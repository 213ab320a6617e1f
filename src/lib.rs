//! id-manager: a thread-safe table that stores values under `u16` ids and
//! hands out fresh ids, either before the value exists (reservation) or
//! together with it.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the id bookkeeping in a plain single-threaded structure and
//!   put all locking in one thin layer above it.
//! - Layers:
//!   - SlotTable<V>: structural layer. Owns the id -> `Slot<V>` map and the
//!     reservation cursor; every state transition and every error is decided
//!     here. No locks, no logging.
//!   - IdManager<V>: public API. Wraps a SlotTable in a `parking_lot`
//!     `RwLock` behind an `Arc`, returns `Release` handles, emits `tracing`
//!     events, and guards each entry point with a debug-only reentrancy
//!     check.
//!
//! Slot states
//! - Absent: the id is not in the table.
//! - `Slot::Reserved`: claimed by `reserve_next_id`, no value yet.
//! - `Slot::Occupied(v)`: value bound by `add` or `set`.
//!
//! Reservation
//! - The cursor is the last reserved id. The next reservation probes
//!   cursor+1, cursor+2, ... wrapping through `u16::MAX` to 0, and claims the
//!   first absent id. The cursor id itself is never probed, so a table whose
//!   only absent id is the cursor reports `NoMoreAvailableValues`.
//! - Only reservation moves the cursor.
//!
//! Concurrency
//! - Writers (`reserve_next_id`, `pop`, `add`, `set`, `Release::release`)
//!   take the write lock; readers (`get`, `do_range`, `len`,
//!   `contains_key`, `last_id`) take the read lock. Concurrent reservations
//!   never share an id; among racing `add`/`set` calls on one id exactly one
//!   succeeds.
//!
//! Reentrancy policy
//! - `do_range` holds the read lock while it calls the visitor. A visitor
//!   that calls back into the same manager (or any of its clones) would
//!   deadlock; debug builds panic instead. Values rejected by a failed `add`
//!   or `set` are dropped while the lock is held, so `Drop` for `V` must not
//!   call into the manager either. Values removed by `Release::release` are
//!   dropped after the lock is released.
//!
//! Notes and non-goals
//! - No persistence and no ids beyond 16 bits.
//! - `do_range` order is unspecified.
//! - `get` does not distinguish a reserved id from an unknown one;
//!   `contains_key` answers that question separately.
//! - `Release` is explicit: dropping one leaves the id in place.

pub mod error;
mod id_manager;
mod reentrancy;
#[cfg(feature = "bench_internal")]
pub mod slot_table;
#[cfg(not(feature = "bench_internal"))]
mod slot_table;
#[cfg(test)]
mod slot_table_proptest;

// Public surface
pub use error::{IdError, Result};
pub use id_manager::{IdManager, Release};
pub use slot_table::Slot;
