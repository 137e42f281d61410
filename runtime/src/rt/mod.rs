use crate::error::JvmError;
use crate::heap::HeapRef;
use crate::keys::ClassId;
use crate::rt::class::InstanceClass;
use crate::rt::field::kind::FieldKind;
use crate::Symbol;
use std::sync::Arc;

pub mod class;
pub mod constant_pool;
pub mod field;

/// Resolves a type name to a class on behalf of a class loader.
///
/// `type_name` is a field descriptor: a primitive character, `L<name>;` or an
/// array descriptor. `loader` and `protection_domain` are those of the class
/// asking for the resolution; `None` means the bootstrap loader.
pub trait TypeRegistry: Send + Sync {
    fn resolve(
        &self,
        type_name: Symbol,
        loader: Option<HeapRef>,
        protection_domain: Option<HeapRef>,
    ) -> Result<ClassId, JvmError>;
}

#[derive(Debug, Clone)]
pub struct PrimitiveClass {
    pub id: ClassId,
    pub name: Symbol,
    pub kind: FieldKind,
}

/// Array class, created on first use. It belongs to the loader of its
/// component class.
#[derive(Debug, Clone)]
pub struct ArrayClass {
    pub id: ClassId,
    /// The array descriptor, e.g. `[I` or `[Ljava/lang/String;`.
    pub name: Symbol,
    pub component: ClassId,
    pub defining_loader: Option<HeapRef>,
}

#[derive(Debug, Clone)]
pub enum JvmClass {
    Instance(Arc<InstanceClass>),
    Primitive(PrimitiveClass),
    Array(ArrayClass),
}

impl JvmClass {
    pub fn id(&self) -> ClassId {
        match self {
            JvmClass::Instance(class) => class.id(),
            JvmClass::Primitive(class) => class.id,
            JvmClass::Array(class) => class.id,
        }
    }

    pub fn name(&self) -> Symbol {
        match self {
            JvmClass::Instance(class) => class.name(),
            JvmClass::Primitive(class) => class.name,
            JvmClass::Array(class) => class.name,
        }
    }

    pub fn defining_loader(&self) -> Option<HeapRef> {
        match self {
            JvmClass::Instance(class) => class.defining_loader(),
            JvmClass::Primitive(_) => None,
            JvmClass::Array(class) => class.defining_loader,
        }
    }
}
