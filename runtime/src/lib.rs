//! Field handles for the lagertha runtime.
//!
//! A [`Field`] is the link-time record of one instance field of a class. It
//! reads and writes the field's slot in any [`Instance`] of that class with
//! the right width and memory ordering, resolves the field's declared type on
//! first use, and carries the debugger's field breakpoints behind a flag that
//! costs one load when no debugger is attached.

pub mod error;
pub mod heap;
pub mod jdwp;
pub mod keys;
pub mod rt;
pub mod vm;

pub use crate::error::JvmError;
pub use crate::heap::method_area::MethodArea;
pub use crate::heap::{Heap, HeapRef, Instance};
pub use crate::keys::{ClassId, FieldKey, Symbol};
pub use crate::rt::TypeRegistry;
pub use crate::rt::field::kind::FieldKind;
pub use crate::rt::field::{Field, LinkedField};
pub use crate::vm::Value;

#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log-runtime-traces")]
        tracing_log::log::debug!($($arg)*);
        #[cfg(not(feature = "log-runtime-traces"))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

#[macro_export]
macro_rules! debug_error_log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "log-runtime-traces")]
        tracing_log::log::error!($($arg)*);
        #[cfg(not(feature = "log-runtime-traces"))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

/// Builds a [`JvmError::JavaException`] of the given guest exception kind.
#[macro_export]
macro_rules! build_exception {
    ($kind:ident) => {
        $crate::error::JvmError::JavaException($crate::error::JavaExceptionFromJvm::new(
            $crate::error::JavaExceptionKind::$kind,
        ))
    };
    ($kind:ident, pool_idx: $idx:expr, expected: $expected:expr, actual: $actual:expr) => {
        $crate::error::JvmError::JavaException(
            $crate::error::JavaExceptionFromJvm::with_runtime_pool_incompatible_class_change(
                $crate::error::JavaExceptionKind::$kind,
                $idx,
                $expected,
                $actual,
            ),
        )
    };
    ($kind:ident, type_sym: $type_sym:expr) => {
        $crate::error::JvmError::JavaException(
            $crate::error::JavaExceptionFromJvm::with_unresolved_type(
                $crate::error::JavaExceptionKind::$kind,
                $type_sym,
            ),
        )
    };
    ($kind:ident, $fmt:literal, $($arg:tt)+) => {
        $crate::error::JvmError::JavaException($crate::error::JavaExceptionFromJvm::with_message(
            $crate::error::JavaExceptionKind::$kind,
            format!($fmt, $($arg)+),
        ))
    };
    ($kind:ident, $msg:expr) => {
        $crate::error::JvmError::JavaException($crate::error::JavaExceptionFromJvm::with_message(
            $crate::error::JavaExceptionKind::$kind,
            $msg,
        ))
    };
}

#[macro_export]
macro_rules! throw_exception {
    ($($args:tt)*) => {
        Err($crate::build_exception!($($args)*))
    };
}
