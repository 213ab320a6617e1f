//! IdManager: thread-safe public layer over `SlotTable`.

use crate::error::Result;
use crate::reentrancy::DebugReentrancy;
use crate::slot_table::SlotTable;
use core::fmt;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

struct Shared<V> {
    table: RwLock<SlotTable<V>>,
    reentrancy: DebugReentrancy,
}

/// Stores arbitrary values under `u16` ids and hands out fresh ids on
/// request. Cloning yields another handle to the same table.
pub struct IdManager<V> {
    shared: Arc<Shared<V>>,
}

impl<V> IdManager<V> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                table: RwLock::new(SlotTable::new()),
                reentrancy: DebugReentrancy::new(),
            }),
        }
    }

    fn release_for(&self, id: u16) -> Release<V> {
        Release {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Reserves the next free id after the last reserved one, wrapping
    /// around the id space. The id stays reserved-empty until `set`.
    pub fn reserve_next_id(&self) -> Result<(u16, Release<V>)> {
        let _g = self.shared.reentrancy.enter();
        let res = self.shared.table.write().reserve_next();
        match res {
            Ok(id) => {
                trace!(id, "reserved id");
                Ok((id, self.release_for(id)))
            }
            Err(e) => {
                debug!(cursor = self.shared.table.read().cursor(), "id space exhausted");
                Err(e)
            }
        }
    }

    /// Removes the value stored under `id` and returns it.
    pub fn pop(&self, id: u16) -> Result<V> {
        let _g = self.shared.reentrancy.enter();
        let v = self.shared.table.write().take(id)?;
        trace!(id, "popped id");
        Ok(v)
    }

    /// Stores `value` under `id` without a prior reservation. Fails if `id`
    /// is already present in any state.
    pub fn add(&self, id: u16, value: V) -> Result<Release<V>> {
        let _g = self.shared.reentrancy.enter();
        self.shared.table.write().insert(id, value)?;
        trace!(id, "added id");
        Ok(self.release_for(id))
    }

    /// Binds `value` to an id obtained from `reserve_next_id`.
    pub fn set(&self, id: u16, value: V) -> Result<()> {
        let _g = self.shared.reentrancy.enter();
        self.shared.table.write().fill(id, value)?;
        trace!(id, "set id");
        Ok(())
    }

    /// Returns a clone of the value stored under `id`. Reserved ids that
    /// have no value yet look the same as unknown ids.
    pub fn get(&self, id: u16) -> Option<V>
    where
        V: Clone,
    {
        let _g = self.shared.reentrancy.enter();
        let table = self.shared.table.read();
        table.get(id).cloned()
    }

    /// Calls `visit` for every present id, passing `None` for reserved ids,
    /// until it returns `false`. Order is unspecified. The table is
    /// read-locked throughout; `visit` must not call back into this manager.
    pub fn do_range<F>(&self, mut visit: F)
    where
        F: FnMut(u16, Option<&V>) -> bool,
    {
        let _g = self.shared.reentrancy.enter();
        let table = self.shared.table.read();
        for (id, v) in table.iter() {
            if !visit(id, v) {
                break;
            }
        }
    }

    /// Number of present ids, reserved or set.
    pub fn len(&self) -> usize {
        let _g = self.shared.reentrancy.enter();
        let table = self.shared.table.read();
        table.len()
    }

    pub fn is_empty(&self) -> bool {
        let _g = self.shared.reentrancy.enter();
        let table = self.shared.table.read();
        table.is_empty()
    }

    /// Whether `id` is present, reserved or set.
    pub fn contains_key(&self, id: u16) -> bool {
        let _g = self.shared.reentrancy.enter();
        let table = self.shared.table.read();
        table.contains_key(id)
    }

    /// The id most recently handed out by `reserve_next_id`, or 0.
    pub fn last_id(&self) -> u16 {
        let _g = self.shared.reentrancy.enter();
        let table = self.shared.table.read();
        table.cursor()
    }
}

impl<V> Default for IdManager<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for IdManager<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V> fmt::Debug for IdManager<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("IdManager");
        match self.shared.table.try_read() {
            Some(table) => d
                .field("len", &table.len())
                .field("last_id", &table.cursor()),
            None => d.field("table", &format_args!("<locked>")),
        };
        d.finish()
    }
}

/// Frees the id it was created for. Returned by `reserve_next_id` and `add`.
///
/// Releasing removes the id whatever it currently holds, so a release that
/// runs after the id was popped and handed out again frees the new owner's
/// entry. Releasing an id that is already gone does nothing. Dropping a
/// `Release` does not release.
pub struct Release<V> {
    id: u16,
    shared: Weak<Shared<V>>,
}

impl<V> Release<V> {
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn release(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let removed = {
            let _g = shared.reentrancy.enter();
            shared.table.write().remove(self.id)
        };
        // the removed value is dropped once the lock is released
        trace!(id = self.id, removed = removed.is_some(), "released id");
    }
}

impl<V> Clone for Release<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<V> fmt::Debug for Release<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Release").field("id", &self.id).finish()
    }
}
