use crate::heap::HeapRef;
use crate::vm::Value;

macro_rules! primitive_coercions {
    ($($name:ident -> $ty:ty: $variant:ident = $default:expr;)*) => {
        $(
            fn $name(&self, value: Value, default_if_null: bool) -> $ty {
                match value {
                    Value::$variant(v) => v,
                    Value::Null if default_if_null => $default,
                    Value::Ref(obj) => match self.unbox(obj) {
                        Some(Value::$variant(v)) => v,
                        other => panic!(
                            concat!("cannot unbox {} (boxed value {:?}) as ", stringify!($ty)),
                            obj, other
                        ),
                    },
                    other => panic!(concat!("cannot coerce {:?} to ", stringify!($ty)), other),
                }
            }
        )*
    };
}

/// Turns a generically read [`Value`] into a Rust value of a fixed kind.
///
/// A value of the requested kind is returned as is. A reference is unboxed
/// through [`Coercion::unbox`]. `Null` becomes the kind's zero value when the
/// caller passes `default_if_null`. Anything else is a bug in the caller and
/// panics.
pub trait Coercion {
    /// Primitive payload of a boxed guest object, `None` if `obj` is not a box.
    fn unbox(&self, obj: HeapRef) -> Option<Value>;

    primitive_coercions! {
        as_boolean -> bool: Boolean = false;
        as_byte -> i8: Byte = 0;
        as_short -> i16: Short = 0;
        as_char -> u16: Char = 0;
        as_int -> i32: Int = 0;
        as_float -> f32: Float = 0.0;
        as_long -> i64: Long = 0;
        as_double -> f64: Double = 0.0;
    }

    fn as_object(&self, value: Value) -> Option<HeapRef> {
        match value {
            Value::Ref(obj) => Some(obj),
            Value::Null => None,
            other => panic!("cannot coerce {:?} to a reference", other),
        }
    }
}

/// Coercion that knows no boxes: only exact kinds and nulls are accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictCoercion;

impl Coercion for StrictCoercion {
    fn unbox(&self, _obj: HeapRef) -> Option<Value> {
        None
    }
}
