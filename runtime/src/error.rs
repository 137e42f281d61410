use crate::heap::HeapRef;
use crate::keys::{ClassId, Symbol};
use crate::rt::constant_pool::RuntimeConstantType;
use lasso::ThreadedRodeo;
use std::fmt::Display;

#[derive(Debug)]
pub enum JvmError {
    /// The operation is not supported on this receiver, e.g. a field access on a
    /// foreign object that has no managed storage.
    InvalidOperation(String),
    ClassNotRegistered(ClassId),
    WrongHeapAddress(HeapRef),
    JavaException(JavaExceptionFromJvm),
}

impl From<JavaExceptionFromJvm> for JvmError {
    fn from(value: JavaExceptionFromJvm) -> Self {
        JvmError::JavaException(value)
    }
}

impl Display for JvmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for JvmError {}

impl JvmError {
    pub fn into_pretty_string(self, interner: &ThreadedRodeo) -> String {
        match self {
            JvmError::JavaException(ex) => {
                let mut result = ex.kind.class_name_dot();
                if let Some(message) = ex.message {
                    let resolved_message = message.into_resolved(interner);
                    result.push_str(": ");
                    result.push_str(&resolved_message);
                }
                if let Some(cause) = ex.cause {
                    result.push_str(&format!(
                        "\nCaused by: {}",
                        JvmError::JavaException(*cause).into_pretty_string(interner)
                    ));
                }
                result
            }
            JvmError::InvalidOperation(message) => message,
            _ => format!("{:?}", self),
        }
    }

    pub fn java_exception_kind(&self) -> Option<JavaExceptionKind> {
        match self {
            JvmError::JavaException(ex) => Some(ex.kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExceptionMessage {
    Resolved(String),
    UnresolvedType(Symbol),
    IncompatibleClassChangeRuntimePool {
        pool_idx: u16,
        expected: RuntimeConstantType,
        actual: RuntimeConstantType,
    },
}

impl ExceptionMessage {
    pub fn into_resolved(self, interner: &ThreadedRodeo) -> String {
        match self {
            ExceptionMessage::Resolved(s) => s,
            ExceptionMessage::UnresolvedType(type_sym) => {
                let descriptor = interner.resolve(&type_sym);
                descriptor
                    .strip_prefix('L')
                    .and_then(|s| s.strip_suffix(';'))
                    .unwrap_or(descriptor)
                    .to_string()
            }
            ExceptionMessage::IncompatibleClassChangeRuntimePool {
                pool_idx,
                expected,
                actual,
            } => {
                format!(
                    "Incompatible class change at runtime constant pool index {}: expected {}, found {}",
                    pool_idx, expected, actual
                )
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavaExceptionKind {
    InternalError,
    NoClassDefFoundError,
    LinkageError,
    IncompatibleClassChangeError,
    NoSuchFieldError,
    ClassFormatError,
}

impl JavaExceptionKind {
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::InternalError => "java/lang/InternalError",
            Self::NoClassDefFoundError => "java/lang/NoClassDefFoundError",
            Self::LinkageError => "java/lang/LinkageError",
            Self::IncompatibleClassChangeError => "java/lang/IncompatibleClassChangeError",
            Self::NoSuchFieldError => "java/lang/NoSuchFieldError",
            Self::ClassFormatError => "java/lang/ClassFormatError",
        }
    }

    pub fn class_name_dot(self) -> String {
        self.class_name().replace('/', ".")
    }
}

#[derive(Debug, Clone)]
pub struct JavaExceptionFromJvm {
    pub kind: JavaExceptionKind,
    pub message: Option<ExceptionMessage>,
    pub cause: Option<Box<JavaExceptionFromJvm>>,
}

impl JavaExceptionFromJvm {
    pub fn new(kind: JavaExceptionKind) -> Self {
        Self {
            kind,
            message: None,
            cause: None,
        }
    }

    pub fn with_message(kind: JavaExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(ExceptionMessage::Resolved(message.into())),
            cause: None,
        }
    }

    pub fn with_unresolved_type(kind: JavaExceptionKind, type_sym: Symbol) -> Self {
        Self {
            kind,
            message: Some(ExceptionMessage::UnresolvedType(type_sym)),
            cause: None,
        }
    }

    pub fn with_runtime_pool_incompatible_class_change(
        kind: JavaExceptionKind,
        pool_idx: u16,
        expected: RuntimeConstantType,
        actual: RuntimeConstantType,
    ) -> Self {
        Self {
            kind,
            message: Some(ExceptionMessage::IncompatibleClassChangeRuntimePool {
                pool_idx,
                expected,
                actual,
            }),
            cause: None,
        }
    }

    pub fn caused_by(mut self, cause: JavaExceptionFromJvm) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}
