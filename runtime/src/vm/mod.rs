use crate::heap::HeapRef;
use crate::rt::field::kind::FieldKind;

pub mod coercion;

/// Uniform representation of a field value, one variant per field kind.
/// References are `Ref` or `Null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Ref(HeapRef),
    Null,
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Boolean(_) => FieldKind::Boolean,
            Value::Byte(_) => FieldKind::Byte,
            Value::Short(_) => FieldKind::Short,
            Value::Char(_) => FieldKind::Char,
            Value::Int(_) => FieldKind::Int,
            Value::Float(_) => FieldKind::Float,
            Value::Long(_) => FieldKind::Long,
            Value::Double(_) => FieldKind::Double,
            Value::Ref(_) | Value::Null => FieldKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_nullable_obj_ref(&self) -> Option<Option<HeapRef>> {
        match self {
            Value::Ref(addr) => Some(Some(*addr)),
            Value::Null => Some(None),
            _ => None,
        }
    }
}

impl From<FieldKind> for Value {
    /// Zero value of a freshly allocated slot of that kind.
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Boolean => Value::Boolean(false),
            FieldKind::Byte => Value::Byte(0),
            FieldKind::Short => Value::Short(0),
            FieldKind::Char => Value::Char(0),
            FieldKind::Int => Value::Int(0),
            FieldKind::Float => Value::Float(0.0),
            FieldKind::Long => Value::Long(0),
            FieldKind::Double => Value::Double(0.0),
            FieldKind::Object => Value::Null,
        }
    }
}

impl From<Option<HeapRef>> for Value {
    fn from(value: Option<HeapRef>) -> Self {
        value.map_or(Value::Null, Value::Ref)
    }
}

macro_rules! value_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from_primitive! {
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    u16 => Char,
    i32 => Int,
    f32 => Float,
    i64 => Long,
    f64 => Double,
}
