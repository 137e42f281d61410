use crate::heap::HeapRef;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ordering of a single field access.
///
/// `Plain` accesses are untorn but unordered. `Volatile` loads acquire and
/// volatile stores release, so all volatile accesses of a program are seen in
/// one consistent order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOrder {
    Plain,
    Volatile,
}

impl MemoryOrder {
    pub const fn of(volatile: bool) -> Self {
        if volatile {
            MemoryOrder::Volatile
        } else {
            MemoryOrder::Plain
        }
    }

    const fn load(self) -> Ordering {
        match self {
            MemoryOrder::Plain => Ordering::Relaxed,
            MemoryOrder::Volatile => Ordering::Acquire,
        }
    }

    const fn store(self) -> Ordering {
        match self {
            MemoryOrder::Plain => Ordering::Relaxed,
            MemoryOrder::Volatile => Ordering::Release,
        }
    }
}

/// A value that fits in one 64-bit slot.
pub trait SlotRepr: Copy {
    fn into_bits(self) -> u64;
    fn from_bits(bits: u64) -> Self;
}

impl SlotRepr for bool {
    fn into_bits(self) -> u64 {
        self as u64
    }

    fn from_bits(bits: u64) -> Self {
        bits != 0
    }
}

macro_rules! int_slot_repr {
    ($($ty:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl SlotRepr for $ty {
                fn into_bits(self) -> u64 {
                    self as $unsigned as u64
                }

                fn from_bits(bits: u64) -> Self {
                    bits as $unsigned as $ty
                }
            }
        )*
    };
}

int_slot_repr! {
    i8 => u8,
    i16 => u16,
    u16 => u16,
    i32 => u32,
    i64 => u64,
}

impl SlotRepr for f32 {
    fn into_bits(self) -> u64 {
        self.to_bits() as u64
    }

    fn from_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl SlotRepr for f64 {
    fn into_bits(self) -> u64 {
        self.to_bits()
    }

    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

/// References are stored as `addr`, with 0 standing for null.
impl SlotRepr for Option<HeapRef> {
    fn into_bits(self) -> u64 {
        self.map_or(0, |addr| {
            debug_assert_ne!(addr, 0, "heap address 0 is reserved for null");
            addr as u64
        })
    }

    fn from_bits(bits: u64) -> Self {
        (bits != 0).then_some(bits as HeapRef)
    }
}

/// Field storage of one instance: one atomic 64-bit cell per slot, so no
/// access, long and double included, can tear.
#[derive(Debug)]
pub struct SlotTable(Box<[AtomicU64]>);

impl SlotTable {
    pub fn new(count: usize) -> Self {
        Self((0..count).map(|_| AtomicU64::new(0)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn cell(&self, slot: usize) -> &AtomicU64 {
        assert!(
            slot < self.0.len(),
            "slot {} out of bounds for an instance with {} slots",
            slot,
            self.0.len()
        );
        &self.0[slot]
    }

    #[inline]
    pub fn load<T: SlotRepr>(&self, slot: usize, order: MemoryOrder) -> T {
        T::from_bits(self.cell(slot).load(order.load()))
    }

    #[inline]
    pub fn store<T: SlotRepr>(&self, slot: usize, value: T, order: MemoryOrder) {
        self.cell(slot).store(value.into_bits(), order.store())
    }

    /// Atomically replaces `expected` with `new`, returning whether it did.
    /// Always has volatile semantics.
    pub fn compare_and_swap<T: SlotRepr>(&self, slot: usize, expected: T, new: T) -> bool {
        self.cell(slot)
            .compare_exchange(
                expected.into_bits(),
                new.into_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Atomically stores `new` and returns the previous value.
    pub fn get_and_set<T: SlotRepr>(&self, slot: usize, new: T) -> T {
        T::from_bits(self.cell(slot).swap(new.into_bits(), Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_values_keep_their_sign() {
        let slots = SlotTable::new(4);
        slots.store(0, -1i8, MemoryOrder::Plain);
        slots.store(1, i16::MIN, MemoryOrder::Volatile);
        slots.store(2, u16::MAX, MemoryOrder::Plain);
        slots.store(3, -7i32, MemoryOrder::Plain);
        assert_eq!(slots.load::<i8>(0, MemoryOrder::Plain), -1);
        assert_eq!(slots.load::<i16>(1, MemoryOrder::Volatile), i16::MIN);
        assert_eq!(slots.load::<u16>(2, MemoryOrder::Plain), u16::MAX);
        assert_eq!(slots.load::<i32>(3, MemoryOrder::Volatile), -7);
    }

    #[test]
    fn fresh_slots_read_as_zero_and_null() {
        let slots = SlotTable::new(1);
        assert!(!slots.load::<bool>(0, MemoryOrder::Plain));
        assert_eq!(slots.load::<f64>(0, MemoryOrder::Plain), 0.0);
        assert_eq!(slots.load::<Option<HeapRef>>(0, MemoryOrder::Plain), None);
    }

    #[test]
    fn compare_and_swap_compares_bits() {
        let slots = SlotTable::new(1);
        slots.store(0, f32::NAN, MemoryOrder::Plain);
        assert!(slots.compare_and_swap(0, f32::NAN, 1.0f32));
        assert!(!slots.compare_and_swap(0, f32::NAN, 2.0f32));
        assert_eq!(slots.get_and_set(0, 3.0f32), 1.0);
    }

    #[test]
    #[should_panic(expected = "slot 2 out of bounds")]
    fn out_of_bounds_slot_is_fatal() {
        SlotTable::new(2).load::<i32>(2, MemoryOrder::Plain);
    }
}
