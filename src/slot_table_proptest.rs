#![cfg(test)]

// Property tests for SlotTable kept inside the crate so they do not
// require feature gates to access internal modules.

use crate::error::IdError;
use crate::slot_table::{Slot, SlotTable};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// Ids are drawn from a small window so operations collide with each other
// and with the ids handed out by reservation (which start at 1).
const WINDOW: u16 = 24;

#[derive(Clone, Debug)]
enum Op {
    Reserve,
    Insert(u16, i32),
    Fill(u16, i32),
    Take(u16),
    Remove(u16),
    Get(u16),
    Iterate,
}

fn arb_op() -> impl Strategy<Value = Op> {
    let id = 0..WINDOW;
    prop_oneof![
        3 => Just(Op::Reserve),
        1 => (id.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (id.clone(), any::<i32>()).prop_map(|(k, v)| Op::Fill(k, v)),
        1 => id.clone().prop_map(Op::Take),
        1 => id.clone().prop_map(Op::Remove),
        1 => id.prop_map(Op::Get),
        1 => Just(Op::Iterate),
    ]
}

// Model: `None` is reserved-empty, `Some(v)` is occupied, missing is absent.
#[derive(Default)]
struct Model {
    slots: BTreeMap<u16, Option<i32>>,
    cursor: u16,
}

impl Model {
    fn reserve(&mut self) -> Result<u16, IdError> {
        let mut id = self.cursor.wrapping_add(1);
        while id != self.cursor {
            if !self.slots.contains_key(&id) {
                self.slots.insert(id, None);
                self.cursor = id;
                return Ok(id);
            }
            id = id.wrapping_add(1);
        }
        Err(IdError::NoMoreAvailableValues)
    }
}

// Property: State-machine equivalence against a BTreeMap model.
// Invariants exercised across random operation sequences:
// - Reservation returns the lowest absent id after the cursor and advances
//   the cursor to it; nothing else moves the cursor.
// - `insert` never overwrites; `fill` only binds reserved ids.
// - `take` errors leave the entry in place; success removes it.
// - `get` hides reserved ids; `slot` exposes all three states.
// - `iter` yields every present id exactly once; `len` matches the model.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut sut: SlotTable<i32> = SlotTable::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Reserve => {
                    prop_assert_eq!(sut.reserve_next(), model.reserve());
                }
                Op::Insert(k, v) => {
                    let expected = if model.slots.contains_key(&k) {
                        Err(IdError::AlreadyExists(k))
                    } else {
                        model.slots.insert(k, Some(v));
                        Ok(())
                    };
                    prop_assert_eq!(sut.insert(k, v), expected);
                }
                Op::Fill(k, v) => {
                    let expected = match model.slots.get_mut(&k) {
                        None => Err(IdError::NotReserved(k)),
                        Some(Some(_)) => Err(IdError::AlreadyExists(k)),
                        Some(slot) => {
                            *slot = Some(v);
                            Ok(())
                        }
                    };
                    prop_assert_eq!(sut.fill(k, v), expected);
                }
                Op::Take(k) => {
                    let expected = match model.slots.get(&k) {
                        None => Err(IdError::NoSuchKey(k)),
                        Some(None) => Err(IdError::ValueNotSet(k)),
                        Some(Some(v)) => {
                            let v = *v;
                            model.slots.remove(&k);
                            Ok(v)
                        }
                    };
                    prop_assert_eq!(sut.take(k), expected);
                }
                Op::Remove(k) => {
                    let expected = model.slots.remove(&k).map(|v| match v {
                        None => Slot::Reserved,
                        Some(v) => Slot::Occupied(v),
                    });
                    prop_assert_eq!(sut.remove(k), expected);
                }
                Op::Get(k) => {
                    let expected = model.slots.get(&k).copied().flatten();
                    prop_assert_eq!(sut.get(k).copied(), expected);
                    prop_assert_eq!(sut.contains_key(k), model.slots.contains_key(&k));
                    let state = sut.slot(k).map(|s| s.value().copied());
                    prop_assert_eq!(state, model.slots.get(&k).copied());
                }
                Op::Iterate => {
                    let mut seen = BTreeMap::new();
                    for (k, v) in sut.iter() {
                        prop_assert!(seen.insert(k, v.copied()).is_none(), "id {} yielded twice", k);
                    }
                    prop_assert_eq!(&seen, &model.slots);
                }
            }

            prop_assert_eq!(sut.cursor(), model.cursor);
            prop_assert_eq!(sut.len(), model.slots.len());
            prop_assert_eq!(sut.is_empty(), model.slots.is_empty());
        }
    }
}

// Property: Without releases in between, reservations never repeat an id
// and come out in increasing order from an empty table.
proptest! {
    #[test]
    fn prop_reservations_unique(n in 1usize..2000) {
        let mut t: SlotTable<()> = SlotTable::new();
        let mut seen = BTreeSet::new();
        let mut last = 0u16;
        for _ in 0..n {
            let id = t.reserve_next().unwrap();
            prop_assert!(id > last);
            prop_assert!(seen.insert(id));
            last = id;
        }
        prop_assert_eq!(t.cursor(), last);
        prop_assert_eq!(t.len(), n);
    }
}
