use lasso::Spur;
use std::num::NonZeroU32;

pub type Symbol = Spur;

/// Index of a class in the method area. Never zero, so `Option<ClassId>` is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(NonZeroU32);

impl ClassId {
    pub fn new(id: NonZeroU32) -> Self {
        Self(id)
    }

    pub fn from_index(index: usize) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index as u32))
    }

    pub fn into_inner(self) -> NonZeroU32 {
        self.0
    }

    pub fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub name: Symbol,
    pub desc: Symbol,
}

impl FieldKey {
    pub fn new_with_str(name: &str, desc: &str, interner: &lasso::ThreadedRodeo) -> Self {
        Self {
            name: interner.get_or_intern(name),
            desc: interner.get_or_intern(desc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_id_index_round_trip() {
        let id = ClassId::from_index(0);
        assert_eq!(id.into_inner().get(), 1);
        assert_eq!(id.to_index(), 0);
        assert_eq!(ClassId::from_index(41).to_index(), 41);
    }
}
