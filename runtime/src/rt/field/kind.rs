use crate::jdwp::Tag;
use std::fmt::Display;

/// Storage category of a field. Closed: every dispatch on it is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Float,
    Long,
    Double,
    Object,
}

impl FieldKind {
    pub const PRIMITIVES: [FieldKind; 8] = [
        FieldKind::Boolean,
        FieldKind::Byte,
        FieldKind::Short,
        FieldKind::Char,
        FieldKind::Int,
        FieldKind::Float,
        FieldKind::Long,
        FieldKind::Double,
    ];

    /// Kind of a field descriptor: the base type character, or `Object` for
    /// class and array types.
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        let kind = match descriptor.as_bytes() {
            [b'Z'] => FieldKind::Boolean,
            [b'B'] => FieldKind::Byte,
            [b'S'] => FieldKind::Short,
            [b'C'] => FieldKind::Char,
            [b'I'] => FieldKind::Int,
            [b'F'] => FieldKind::Float,
            [b'J'] => FieldKind::Long,
            [b'D'] => FieldKind::Double,
            [b'L', .., b';'] if descriptor.len() > 2 => FieldKind::Object,
            [b'[', rest @ ..] if !rest.is_empty() => FieldKind::Object,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn is_primitive(self) -> bool {
        !matches!(self, FieldKind::Object)
    }

    /// Long and double take two operand-stack and local-variable slots.
    pub const fn needs_two_slots(self) -> bool {
        matches!(self, FieldKind::Long | FieldKind::Double)
    }

    pub const fn descriptor_char(self) -> char {
        match self {
            FieldKind::Boolean => 'Z',
            FieldKind::Byte => 'B',
            FieldKind::Short => 'S',
            FieldKind::Char => 'C',
            FieldKind::Int => 'I',
            FieldKind::Float => 'F',
            FieldKind::Long => 'J',
            FieldKind::Double => 'D',
            FieldKind::Object => 'L',
        }
    }

    pub const fn java_name(self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Byte => "byte",
            FieldKind::Short => "short",
            FieldKind::Char => "char",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Long => "long",
            FieldKind::Double => "double",
            FieldKind::Object => "object",
        }
    }

    pub const fn to_tag(self) -> Tag {
        match self {
            FieldKind::Boolean => Tag::Boolean,
            FieldKind::Byte => Tag::Byte,
            FieldKind::Short => Tag::Short,
            FieldKind::Char => Tag::Char,
            FieldKind::Int => Tag::Int,
            FieldKind::Float => Tag::Float,
            FieldKind::Long => Tag::Long,
            FieldKind::Double => Tag::Double,
            FieldKind::Object => Tag::Object,
        }
    }
}

impl From<Tag> for FieldKind {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Boolean => FieldKind::Boolean,
            Tag::Byte => FieldKind::Byte,
            Tag::Short => FieldKind::Short,
            Tag::Char => FieldKind::Char,
            Tag::Int => FieldKind::Int,
            Tag::Float => FieldKind::Float,
            Tag::Long => FieldKind::Long,
            Tag::Double => FieldKind::Double,
            Tag::Object | Tag::Array => FieldKind::Object,
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.java_name())
    }
}
