//! Reusable coordinate deduper for revival-candidate evaluation.
//!
//! An open-addressed linear-probing hash set for [`Coord`] keys. Slots are
//! lazily cleared with an epoch stamp, so each generation can start a fresh
//! set without touching the full backing array.

use super::coord::Coord;

const LOAD_NUM: usize = 3;
const LOAD_DEN: usize = 4;

#[derive(Clone, Copy)]
struct Slot {
    key: Coord,
    stamp: u32,
}

impl Slot {
    const EMPTY: Self = Self {
        key: Coord::new(0, 0),
        stamp: 0,
    };
}

#[inline(always)]
fn coord_hash(c: Coord) -> u64 {
    // Two independent multipliers keep grid-aligned keys from colliding.
    const MX: u64 = 0x517c_c1b7_2722_0a95;
    const MY: u64 = 0x6c62_272e_07bb_0142;
    let hx = (c.x as u64).wrapping_mul(MX);
    let hy = (c.y as u64).wrapping_mul(MY);
    hx ^ hy.rotate_right(32)
}

#[inline(always)]
fn slots_for(keys: usize) -> usize {
    keys.saturating_mul(LOAD_DEN)
        .div_ceil(LOAD_NUM)
        .next_power_of_two()
        .max(16)
}

pub struct CoordSet {
    slots: Vec<Slot>,
    mask: usize,
    stamp: u32,
    len: usize,
}

impl Default for CoordSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordSet {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(cap: usize) -> Self {
        let slots = slots_for(cap);
        Self {
            slots: vec![Slot::EMPTY; slots],
            mask: slots - 1,
            stamp: 1,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget every key in O(1) (amortised over stamp wrap-around).
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.stamp = 1;
            for slot in &mut self.slots {
                slot.stamp = 0;
            }
        }
    }

    #[inline]
    pub fn reserve_for(&mut self, keys: usize) {
        if keys == 0 {
            return;
        }
        let needed = slots_for(keys);
        if needed > self.slots.len() {
            self.resize(needed);
        }
    }

    #[inline(always)]
    fn needs_grow(&self) -> bool {
        self.len * LOAD_DEN >= self.slots.len() * LOAD_NUM
    }

    fn resize(&mut self, new_slots: usize) {
        debug_assert!(new_slots.is_power_of_two());
        let old_slots = std::mem::replace(&mut self.slots, vec![Slot::EMPTY; new_slots]);
        self.mask = new_slots - 1;
        self.len = 0;

        for slot in old_slots {
            if slot.stamp == self.stamp {
                self.insert_rehash(slot.key);
            }
        }
    }

    #[inline(always)]
    fn insert_rehash(&mut self, key: Coord) {
        let mut pos = coord_hash(key) as usize & self.mask;
        loop {
            let slot = &mut self.slots[pos];
            if slot.stamp != self.stamp {
                *slot = Slot {
                    key,
                    stamp: self.stamp,
                };
                self.len += 1;
                return;
            }
            pos = (pos + 1) & self.mask;
        }
    }

    /// Insert a coordinate.
    /// Returns `true` if newly inserted, `false` if it already existed.
    #[inline]
    pub fn insert(&mut self, key: Coord) -> bool {
        if self.needs_grow() {
            self.resize((self.slots.len() * 2).max(16));
        }

        let mut pos = coord_hash(key) as usize & self.mask;
        loop {
            let slot = &mut self.slots[pos];
            if slot.stamp != self.stamp {
                *slot = Slot {
                    key,
                    stamp: self.stamp,
                };
                self.len += 1;
                return true;
            }
            if slot.key == key {
                return false;
            }
            pos = (pos + 1) & self.mask;
        }
    }

    #[inline]
    pub fn contains(&self, key: Coord) -> bool {
        let mut pos = coord_hash(key) as usize & self.mask;
        loop {
            let slot = &self.slots[pos];
            if slot.stamp != self.stamp {
                return false;
            }
            if slot.key == key {
                return true;
            }
            pos = (pos + 1) & self.mask;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoordSet;
    use crate::sparse::coord::Coord;

    #[test]
    fn dedups_within_generation_and_resets_across_generations() {
        let mut set = CoordSet::new();
        assert!(set.insert(Coord::new(1, 2)));
        assert!(!set.insert(Coord::new(1, 2)));
        assert!(set.insert(Coord::new(-5, 9)));
        assert_eq!(set.len(), 2);

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(Coord::new(-5, 9)));
        assert!(set.insert(Coord::new(1, 2)));
        assert!(!set.insert(Coord::new(1, 2)));
    }

    #[test]
    fn reserve_and_insert_many() {
        let mut set = CoordSet::with_capacity(8);
        set.reserve_for(10_000);
        for i in 0..10_000i64 {
            assert!(set.insert(Coord::new(i, -i)));
        }
        for i in 0..10_000i64 {
            assert!(!set.insert(Coord::new(i, -i)));
        }
        assert_eq!(set.len(), 10_000);
    }

    #[test]
    fn growth_keeps_existing_keys() {
        let mut set = CoordSet::with_capacity(1);
        for i in 0..500i64 {
            set.insert(Coord::new(i * 64, i64::MIN + i));
        }
        for i in 0..500i64 {
            assert!(set.contains(Coord::new(i * 64, i64::MIN + i)));
        }
        assert!(!set.contains(Coord::new(1, 1)));
    }

    #[test]
    fn stamp_wraparound_clears_stale_slots() {
        let mut set = CoordSet::new();
        set.insert(Coord::new(3, 3));
        set.stamp = u32::MAX;
        set.clear();
        assert_eq!(set.stamp, 1);
        assert!(!set.contains(Coord::new(3, 3)));
        assert!(set.insert(Coord::new(3, 3)));
    }
}
