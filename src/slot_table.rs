//! SlotTable: single-threaded structural layer holding the three-state slots
//! and the reservation cursor.

use crate::error::{IdError, Result};
use hashbrown::hash_map::{self, Entry as MapEntry};
use hashbrown::HashMap;

/// State of a key that is present in the table. A key missing from the
/// table is absent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Slot<V> {
    /// Claimed by a reservation; no value bound yet.
    Reserved,
    Occupied(V),
}

impl<V> Slot<V> {
    pub fn value(&self) -> Option<&V> {
        match self {
            Slot::Reserved => None,
            Slot::Occupied(v) => Some(v),
        }
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self, Slot::Reserved)
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            Slot::Reserved => None,
            Slot::Occupied(v) => Some(v),
        }
    }
}

#[derive(Debug)]
pub struct SlotTable<V> {
    slots: HashMap<u16, Slot<V>>,
    // last key handed out by `reserve_next`; nothing else moves it
    cursor: u16,
}

impl<V> Default for SlotTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over present entries in `SlotTable`, in unspecified order.
pub struct Iter<'a, V> {
    it: hash_map::Iter<'a, u16, Slot<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u16, Option<&'a V>);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(&id, slot)| (id, slot.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<V> SlotTable<V> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    pub fn contains_key(&self, id: u16) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn slot(&self, id: u16) -> Option<&Slot<V>> {
        self.slots.get(&id)
    }

    /// Value bound to `id`; `None` for both absent and reserved keys.
    pub fn get(&self, id: u16) -> Option<&V> {
        self.slot(id).and_then(Slot::value)
    }

    /// Claims the first absent key after the cursor, wrapping around the
    /// 16-bit space. The cursor key itself is never a candidate.
    pub fn reserve_next(&mut self) -> Result<u16> {
        let start = self.cursor;
        let mut id = start.wrapping_add(1);
        while id != start {
            if let MapEntry::Vacant(v) = self.slots.entry(id) {
                v.insert(Slot::Reserved);
                self.cursor = id;
                return Ok(id);
            }
            id = id.wrapping_add(1);
        }
        Err(IdError::NoMoreAvailableValues)
    }

    /// Binds `value` to an absent key. Never overwrites.
    pub fn insert(&mut self, id: u16, value: V) -> Result<()> {
        match self.slots.entry(id) {
            MapEntry::Occupied(_) => Err(IdError::AlreadyExists(id)),
            MapEntry::Vacant(v) => {
                v.insert(Slot::Occupied(value));
                Ok(())
            }
        }
    }

    /// Binds `value` to a reserved key.
    pub fn fill(&mut self, id: u16, value: V) -> Result<()> {
        match self.slots.get_mut(&id) {
            None => Err(IdError::NotReserved(id)),
            Some(slot) if !slot.is_reserved() => Err(IdError::AlreadyExists(id)),
            Some(slot) => {
                *slot = Slot::Occupied(value);
                Ok(())
            }
        }
    }

    /// Removes and returns the value bound to `id`. Reserved keys stay in
    /// place.
    pub fn take(&mut self, id: u16) -> Result<V> {
        match self.slots.entry(id) {
            MapEntry::Vacant(_) => Err(IdError::NoSuchKey(id)),
            MapEntry::Occupied(e) => {
                if e.get().is_reserved() {
                    return Err(IdError::ValueNotSet(id));
                }
                e.remove().into_value().ok_or(IdError::ValueNotSet(id))
            }
        }
    }

    /// Drops whatever is stored under `id`, in any state.
    pub fn remove(&mut self, id: u16) -> Option<Slot<V>> {
        self.slots.remove(&id)
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.slots.iter(),
        }
    }
}
