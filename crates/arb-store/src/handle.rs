//! Slot+generation table mapping `u64` handles to owned objects.
//!
//! A handle packs the slot index into the upper 32 bits and the slot's
//! generation into the lower 32. Generations start at 1, so `0` is never a
//! live handle. Removing an object bumps the generation, which turns every
//! outstanding copy of the old handle stale.

use arb_core::Handle;

fn pack(slot: u32, generation: u32) -> Handle {
    (u64::from(slot) << 32) | u64::from(generation)
}

fn unpack(handle: Handle) -> (usize, u32) {
    ((handle >> 32) as usize, handle as u32)
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Owned objects addressed by generation-checked handles.
pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Store `value`, returning its handle, or `None` once the slot index
    /// space is exhausted.
    pub fn insert(&mut self, value: T) -> Option<Handle> {
        let handle = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.value = Some(value);
            pack(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).ok()?;
            self.slots.push(Slot {
                generation: 1,
                value: Some(value),
            });
            pack(idx, 1)
        };
        self.live += 1;
        Some(handle)
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        let (idx, generation) = unpack(handle);
        self.slots.get(idx).filter(|s| s.generation == generation)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slot(handle)?.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let (idx, generation) = unpack(handle);
        let slot = self.slots.get_mut(idx)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Take the object out, invalidating `handle`.
    ///
    /// A slot whose generation would wrap to 0 is retired instead of being
    /// recycled, so a handle value is never issued twice.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let (idx, generation) = unpack(handle);
        let slot = self.slots.get_mut(idx)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free.push(idx as u32);
        }
        self.live -= 1;
        Some(value)
    }

    /// Live handles with their objects, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let value = slot.value.as_ref()?;
            Some((pack(idx as u32, slot.generation), value))
        })
    }

    #[cfg(test)]
    fn force_generation(&mut self, handle: Handle, generation: u32) -> Handle {
        let (idx, _) = unpack(handle);
        self.slots[idx].generation = generation;
        pack(idx as u32, generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_never_a_handle() {
        let mut table = HandleTable::new();
        let h = table.insert("a").unwrap();
        assert_ne!(h, 0);
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn insert_get_remove() {
        let mut table = HandleTable::new();
        let h = table.insert(7).unwrap();
        assert_eq!(table.get(h), Some(&7));
        *table.get_mut(h).unwrap() = 8;
        assert_eq!(table.len(), 1);
        assert_eq!(table.remove(h), Some(8));
        assert_eq!(table.len(), 0);
        assert_eq!(table.get(h), None);
        assert_eq!(table.remove(h), None);
    }

    #[test]
    fn recycled_slot_gets_fresh_handle() {
        let mut table = HandleTable::new();
        let old = table.insert(1).unwrap();
        table.remove(old);
        let new = table.insert(2).unwrap();
        assert_ne!(old, new);
        assert_eq!(old >> 32, new >> 32, "slot is reused");
        assert_eq!(table.get(old), None);
        assert_eq!(table.get(new), Some(&2));
    }

    #[test]
    fn wrapped_slot_is_retired() {
        let mut table = HandleTable::new();
        let h = table.insert(1).unwrap();
        let h = table.force_generation(h, u32::MAX);
        assert_eq!(table.remove(h), Some(1));
        let next = table.insert(2).unwrap();
        assert_eq!(next >> 32, 1, "retired slot must not be reused");
    }

    #[test]
    fn iter_lists_only_live_objects() {
        let mut table = HandleTable::new();
        let a = table.insert('a').unwrap();
        let b = table.insert('b').unwrap();
        let c = table.insert('c').unwrap();
        table.remove(b);
        let live: Vec<_> = table.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(live, [(a, 'a'), (c, 'c')]);
    }
}
