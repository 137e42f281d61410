use crate::error::JvmError;
use crate::{Symbol, build_exception, throw_exception};
use lasso::ThreadedRodeo;
use once_cell::sync::OnceCell;
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum RuntimeConstantType {
    Unused,
    Utf8,
    Integer,
    Float,
    Long,
    Double,
}

impl Display for RuntimeConstantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_str = match self {
            RuntimeConstantType::Unused => "Unused",
            RuntimeConstantType::Utf8 => "Utf8",
            RuntimeConstantType::Integer => "Integer",
            RuntimeConstantType::Float => "Float",
            RuntimeConstantType::Long => "Long",
            RuntimeConstantType::Double => "Double",
        };
        write!(f, "{}", type_str)
    }
}

/// Utf8 constant, interned on first lookup.
#[derive(Debug)]
pub struct Utf8Entry {
    pub value: String,
    utf8_sym: OnceCell<Symbol>,
}

impl Utf8Entry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            utf8_sym: OnceCell::new(),
        }
    }
}

#[derive(Debug)]
pub enum RuntimeConstant {
    Unused,
    Utf8(Utf8Entry),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
}

impl RuntimeConstant {
    pub fn utf8(value: impl Into<String>) -> Self {
        RuntimeConstant::Utf8(Utf8Entry::new(value))
    }

    pub fn get_type(&self) -> RuntimeConstantType {
        match self {
            RuntimeConstant::Unused => RuntimeConstantType::Unused,
            RuntimeConstant::Utf8(_) => RuntimeConstantType::Utf8,
            RuntimeConstant::Integer(_) => RuntimeConstantType::Integer,
            RuntimeConstant::Float(_) => RuntimeConstantType::Float,
            RuntimeConstant::Long(_) => RuntimeConstantType::Long,
            RuntimeConstant::Double(_) => RuntimeConstantType::Double,
        }
    }
}

#[derive(Debug, Default)]
pub struct RuntimeConstantPool {
    entries: Vec<RuntimeConstant>,
}

impl RuntimeConstantPool {
    /// Index 0 is reserved, as in the class file format; `entries[0]` is
    /// expected to be [`RuntimeConstant::Unused`].
    pub fn new(entries: Vec<RuntimeConstant>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::new(vec![RuntimeConstant::Unused])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, idx: &u16) -> Result<&RuntimeConstant, JvmError> {
        self.entries.get(*idx as usize).ok_or(build_exception!(
            ClassFormatError,
            "Invalid constant pool index: {}",
            *idx
        ))
    }

    pub fn get_utf8_sym(&self, idx: &u16, interner: &ThreadedRodeo) -> Result<Symbol, JvmError> {
        match self.entry(idx)? {
            RuntimeConstant::Utf8(entry) => Ok(*entry
                .utf8_sym
                .get_or_init(|| interner.get_or_intern(&entry.value))),
            other => throw_exception!(
                IncompatibleClassChangeError,
                pool_idx: *idx,
                expected: RuntimeConstantType::Utf8,
                actual: other.get_type()
            ),
        }
    }
}
