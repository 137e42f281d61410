//! Reading and writing a field's slot in an instance.
//!
//! Every accessor rejects foreign instances with
//! [`JvmError::InvalidOperation`]. Calling an accessor of the wrong kind, or
//! on an instance whose class does not inherit from the field's holder, is a
//! bug in the caller and trips a debug assertion.
//!
//! A volatile field, or any access with `force_volatile`, uses volatile
//! ordering; everything else is plain. Compare-and-swap and get-and-set are
//! always volatile.

use crate::error::JvmError;
use crate::heap::slots::{MemoryOrder, SlotTable};
use crate::heap::{HeapRef, Instance};
use crate::rt::field::Field;
use crate::rt::field::kind::FieldKind;
use crate::vm::Value;
use crate::vm::coercion::Coercion;

macro_rules! primitive_accessors {
    ($($kind:ident: $ty:ty => $get:ident, $set:ident;)*) => {
        $(
            pub fn $get(&self, obj: &Instance, force_volatile: bool) -> Result<$ty, JvmError> {
                if FieldKind::$kind.needs_two_slots() {
                    self.assert_two_slots(FieldKind::$kind);
                }
                self.assert_kind(FieldKind::$kind);
                let slots = self.checked_slots(obj)?;
                Ok(slots.load(self.slot(), self.memory_order(force_volatile)))
            }

            pub fn $set(
                &self,
                obj: &Instance,
                value: $ty,
                force_volatile: bool,
            ) -> Result<(), JvmError> {
                if FieldKind::$kind.needs_two_slots() {
                    self.assert_two_slots(FieldKind::$kind);
                }
                self.assert_kind(FieldKind::$kind);
                let slots = self.checked_slots(obj)?;
                slots.store(self.slot(), value, self.memory_order(force_volatile));
                Ok(())
            }
        )*
    };
}

macro_rules! coercing_getters {
    ($($name:ident => $coerce:ident -> $ty:ty;)*) => {
        $(
            pub fn $name(
                &self,
                coercion: &dyn Coercion,
                obj: &Instance,
                default_if_null: bool,
                force_volatile: bool,
            ) -> Result<$ty, JvmError> {
                let value = self.get(obj, force_volatile)?;
                Ok(coercion.$coerce(value, default_if_null))
            }
        )*
    };
}

impl Field {
    #[inline]
    fn memory_order(&self, force_volatile: bool) -> MemoryOrder {
        MemoryOrder::of(force_volatile || self.is_volatile())
    }

    #[inline]
    fn assert_kind(&self, expected: FieldKind) {
        debug_assert_eq!(
            self.kind(),
            expected,
            "{} accessor used on field {}",
            expected,
            self
        );
    }

    #[inline]
    fn assert_two_slots(&self, accessor: FieldKind) {
        debug_assert!(
            self.kind().needs_two_slots(),
            "{} accessor needs a two-slot field, {} is not one",
            accessor,
            self
        );
    }

    fn checked_slots<'a>(&self, obj: &'a Instance) -> Result<&'a SlotTable, JvmError> {
        let slots = obj.slots()?;
        debug_assert!(
            obj.class().is_subclass_of(self.declaring_class().id()),
            "field {} accessed on an instance of {}",
            self,
            obj.class()
        );
        Ok(slots)
    }

    fn assert_visible(&self) {
        assert!(
            !self.is_hidden(),
            "hidden field {} must be accessed through the hidden accessors",
            self
        );
    }

    primitive_accessors! {
        Boolean: bool => get_boolean, set_boolean;
        Byte: i8 => get_byte, set_byte;
        Short: i16 => get_short, set_short;
        Char: u16 => get_char, set_char;
        Int: i32 => get_int, set_int;
        Float: f32 => get_float, set_float;
        Long: i64 => get_long, set_long;
        Double: f64 => get_double, set_double;
    }

    pub fn get_object(
        &self,
        obj: &Instance,
        force_volatile: bool,
    ) -> Result<Option<HeapRef>, JvmError> {
        self.assert_visible();
        self.load_reference(obj, force_volatile)
    }

    pub fn set_object(
        &self,
        obj: &Instance,
        value: Option<HeapRef>,
        force_volatile: bool,
    ) -> Result<(), JvmError> {
        self.assert_visible();
        self.store_reference(obj, value, force_volatile)
    }

    pub fn get_hidden_object(
        &self,
        obj: &Instance,
        force_volatile: bool,
    ) -> Result<Option<HeapRef>, JvmError> {
        assert!(self.is_hidden(), "field {} is not hidden", self);
        self.load_reference(obj, force_volatile)
    }

    pub fn set_hidden_object(
        &self,
        obj: &Instance,
        value: Option<HeapRef>,
        force_volatile: bool,
    ) -> Result<(), JvmError> {
        assert!(self.is_hidden(), "field {} is not hidden", self);
        self.store_reference(obj, value, force_volatile)
    }

    fn load_reference(
        &self,
        obj: &Instance,
        force_volatile: bool,
    ) -> Result<Option<HeapRef>, JvmError> {
        self.assert_kind(FieldKind::Object);
        let slots = self.checked_slots(obj)?;
        Ok(slots.load(self.slot(), self.memory_order(force_volatile)))
    }

    fn store_reference(
        &self,
        obj: &Instance,
        value: Option<HeapRef>,
        force_volatile: bool,
    ) -> Result<(), JvmError> {
        self.assert_kind(FieldKind::Object);
        let slots = self.checked_slots(obj)?;
        slots.store(self.slot(), value, self.memory_order(force_volatile));
        Ok(())
    }

    pub fn compare_and_swap_int(
        &self,
        obj: &Instance,
        expected: i32,
        new: i32,
    ) -> Result<bool, JvmError> {
        self.assert_kind(FieldKind::Int);
        let slots = self.checked_slots(obj)?;
        Ok(slots.compare_and_swap(self.slot(), expected, new))
    }

    pub fn compare_and_swap_long(
        &self,
        obj: &Instance,
        expected: i64,
        new: i64,
    ) -> Result<bool, JvmError> {
        self.assert_two_slots(FieldKind::Long);
        self.assert_kind(FieldKind::Long);
        let slots = self.checked_slots(obj)?;
        Ok(slots.compare_and_swap(self.slot(), expected, new))
    }

    pub fn compare_and_swap_object(
        &self,
        obj: &Instance,
        expected: Option<HeapRef>,
        new: Option<HeapRef>,
    ) -> Result<bool, JvmError> {
        self.assert_visible();
        self.assert_kind(FieldKind::Object);
        let slots = self.checked_slots(obj)?;
        Ok(slots.compare_and_swap(self.slot(), expected, new))
    }

    /// Stores `new` and returns the reference it replaced.
    pub fn get_and_set_object(
        &self,
        obj: &Instance,
        new: Option<HeapRef>,
    ) -> Result<Option<HeapRef>, JvmError> {
        self.assert_visible();
        self.assert_kind(FieldKind::Object);
        let slots = self.checked_slots(obj)?;
        Ok(slots.get_and_set(self.slot(), new))
    }

    /// Reads the field as a [`Value`] of the field's kind.
    #[hotpath::measure]
    pub fn get(&self, obj: &Instance, force_volatile: bool) -> Result<Value, JvmError> {
        let value = match self.kind() {
            FieldKind::Boolean => Value::Boolean(self.get_boolean(obj, force_volatile)?),
            FieldKind::Byte => Value::Byte(self.get_byte(obj, force_volatile)?),
            FieldKind::Short => Value::Short(self.get_short(obj, force_volatile)?),
            FieldKind::Char => Value::Char(self.get_char(obj, force_volatile)?),
            FieldKind::Int => Value::Int(self.get_int(obj, force_volatile)?),
            FieldKind::Float => Value::Float(self.get_float(obj, force_volatile)?),
            FieldKind::Long => Value::Long(self.get_long(obj, force_volatile)?),
            FieldKind::Double => Value::Double(self.get_double(obj, force_volatile)?),
            FieldKind::Object if self.is_hidden() => {
                Value::from(self.get_hidden_object(obj, force_volatile)?)
            }
            FieldKind::Object => Value::from(self.get_object(obj, force_volatile)?),
        };
        Ok(value)
    }

    /// Writes a [`Value`] that must match the field's kind.
    #[hotpath::measure]
    pub fn set(&self, obj: &Instance, value: Value, force_volatile: bool) -> Result<(), JvmError> {
        match (self.kind(), value) {
            (FieldKind::Boolean, Value::Boolean(v)) => self.set_boolean(obj, v, force_volatile),
            (FieldKind::Byte, Value::Byte(v)) => self.set_byte(obj, v, force_volatile),
            (FieldKind::Short, Value::Short(v)) => self.set_short(obj, v, force_volatile),
            (FieldKind::Char, Value::Char(v)) => self.set_char(obj, v, force_volatile),
            (FieldKind::Int, Value::Int(v)) => self.set_int(obj, v, force_volatile),
            (FieldKind::Float, Value::Float(v)) => self.set_float(obj, v, force_volatile),
            (FieldKind::Long, Value::Long(v)) => self.set_long(obj, v, force_volatile),
            (FieldKind::Double, Value::Double(v)) => self.set_double(obj, v, force_volatile),
            (FieldKind::Object, Value::Ref(_) | Value::Null) => {
                let reference = match value {
                    Value::Ref(addr) => Some(addr),
                    _ => None,
                };
                if self.is_hidden() {
                    self.set_hidden_object(obj, reference, force_volatile)
                } else {
                    self.set_object(obj, reference, force_volatile)
                }
            }
            (kind, value) => panic!("cannot store {:?} into {} field {}", value, kind, self),
        }
    }

    coercing_getters! {
        get_as_boolean => as_boolean -> bool;
        get_as_byte => as_byte -> i8;
        get_as_short => as_short -> i16;
        get_as_char => as_char -> u16;
        get_as_int => as_int -> i32;
        get_as_float => as_float -> f32;
        get_as_long => as_long -> i64;
        get_as_double => as_double -> f64;
    }

    pub fn get_as_object(
        &self,
        coercion: &dyn Coercion,
        obj: &Instance,
        force_volatile: bool,
    ) -> Result<Option<HeapRef>, JvmError> {
        let value = self.get(obj, force_volatile)?;
        Ok(coercion.as_object(value))
    }
}
