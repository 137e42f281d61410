//! Debugger-facing view of fields.
//!
//! The JDWP agent never touches field storage directly: it talks to a
//! [`FieldRef`] and keeps its field watchpoints as [`FieldBreakpoint`]s on the
//! field itself, so the interpreter can ask the field whether it is watched.

use crate::error::JvmError;
use crate::heap::Instance;
use crate::keys::ClassId;
use crate::vm::Value;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// JDWP value tags, as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Tag {
    Array = 91,   // '['
    Byte = 66,    // 'B'
    Char = 67,    // 'C'
    Object = 76,  // 'L'
    Float = 70,   // 'F'
    Double = 68,  // 'D'
    Int = 73,     // 'I'
    Long = 74,    // 'J'
    Short = 83,   // 'S'
    Boolean = 90, // 'Z'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBreakpointKind {
    Access,
    Modification,
}

/// A field watchpoint installed by the debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBreakpoint {
    pub request_id: i32,
    pub kind: FieldBreakpointKind,
}

impl FieldBreakpoint {
    pub fn access(request_id: i32) -> Self {
        Self {
            request_id,
            kind: FieldBreakpointKind::Access,
        }
    }

    pub fn modification(request_id: i32) -> Self {
        Self {
            request_id,
            kind: FieldBreakpointKind::Modification,
        }
    }
}

pub trait FieldRef {
    fn tag_constant(&self) -> u8;

    fn name_as_string(&self) -> &str;

    /// `None` for hidden fields.
    fn type_as_string(&self) -> Option<&str>;

    fn generic_signature_as_string(&self) -> Result<String, JvmError>;

    fn modifiers(&self) -> i32;

    fn declaring_class_id(&self) -> ClassId;

    fn get_value(&self, obj: &Instance) -> Result<Value, JvmError>;

    fn set_value(&self, obj: &Instance, value: Value) -> Result<(), JvmError>;

    fn has_active_breakpoint(&self) -> bool;

    fn field_breakpoint_infos(&self) -> Vec<FieldBreakpoint>;

    fn add_field_breakpoint_info(&self, info: FieldBreakpoint);

    fn remove_field_breakpoint_info(&self, request_id: i32);
}
