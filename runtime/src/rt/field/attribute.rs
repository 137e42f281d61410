use crate::Symbol;

/// Field attributes kept after linking. Indices point into the holder's
/// runtime constant pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAttribute {
    ConstantValue { value_index: u16 },
    Signature { signature_index: u16 },
    Synthetic,
    Deprecated,
    Unknown { name: Symbol, data: Box<[u8]> },
}
