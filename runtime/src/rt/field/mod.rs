use crate::error::JvmError;
use crate::heap::Instance;
use crate::jdwp::{FieldBreakpoint, FieldRef};
use crate::keys::{ClassId, FieldKey};
use crate::rt::TypeRegistry;
use crate::rt::class::InstanceClass;
use crate::rt::field::attribute::FieldAttribute;
use crate::rt::field::breakpoint::BreakpointRegistry;
use crate::rt::field::flags::FieldFlags;
use crate::rt::field::kind::FieldKind;
use crate::vm::Value;
use crate::{Symbol, debug_error_log, debug_log, throw_exception};
use once_cell::sync::OnceCell;
use std::fmt::Display;
use std::sync::Arc;

pub mod access;
pub mod attribute;
pub mod breakpoint;
pub mod flags;
pub mod kind;
pub mod stable;

/// A field as produced by the linker, before it gets a handle.
#[derive(Debug, Clone)]
pub struct LinkedField {
    pub name: Symbol,
    /// Raw descriptor symbol. Present for hidden fields too.
    pub type_sym: Symbol,
    pub kind: FieldKind,
    pub slot: usize,
    pub flags: FieldFlags,
    pub attributes: Vec<FieldAttribute>,
}

impl LinkedField {
    pub fn new(
        name: Symbol,
        type_sym: Symbol,
        kind: FieldKind,
        slot: usize,
        flags: FieldFlags,
    ) -> Self {
        Self {
            name,
            type_sym,
            kind,
            slot,
            flags,
            attributes: Vec::new(),
        }
    }

    /// Interns `name` and `descriptor` and derives the kind from the
    /// descriptor.
    pub fn from_descriptor(
        name: &str,
        descriptor: &str,
        slot: usize,
        flags: FieldFlags,
        interner: &lasso::ThreadedRodeo,
    ) -> Result<Self, JvmError> {
        let Some(kind) = FieldKind::from_descriptor(descriptor) else {
            return throw_exception!(
                ClassFormatError,
                "Field {} has invalid descriptor {}",
                name,
                descriptor
            );
        };
        Ok(Self::new(
            interner.get_or_intern(name),
            interner.get_or_intern(descriptor),
            kind,
            slot,
            flags,
        ))
    }

    pub fn with_attributes(mut self, attributes: Vec<FieldAttribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn signature_index(&self) -> Option<u16> {
        self.attributes.iter().find_map(|attr| match attr {
            FieldAttribute::Signature { signature_index } => Some(*signature_index),
            _ => None,
        })
    }
}

/// Handle for one instance field of one class.
///
/// Everything but the two lazy caches and the breakpoint registry is fixed
/// when the holder is linked.
pub struct Field {
    linked: LinkedField,
    holder: Arc<InstanceClass>,
    /// `None` iff the field is hidden.
    descriptor: Option<Symbol>,
    type_klass_cache: OnceCell<ClassId>,
    generic_signature: OnceCell<Symbol>,
    breakpoints: BreakpointRegistry,
}

impl Field {
    pub fn new(holder: Arc<InstanceClass>, linked: LinkedField, hidden: bool) -> Self {
        Self {
            descriptor: (!hidden).then_some(linked.type_sym),
            linked,
            holder,
            type_klass_cache: OnceCell::new(),
            generic_signature: OnceCell::new(),
            breakpoints: BreakpointRegistry::new(),
        }
    }

    pub fn name(&self) -> Symbol {
        self.linked.name
    }

    /// Declared descriptor, `None` for hidden fields.
    pub fn descriptor(&self) -> Option<Symbol> {
        self.descriptor
    }

    pub fn kind(&self) -> FieldKind {
        self.linked.kind
    }

    pub fn is_hidden(&self) -> bool {
        self.descriptor.is_none()
    }

    pub fn slot(&self) -> usize {
        self.linked.slot
    }

    pub fn flags(&self) -> FieldFlags {
        self.linked.flags
    }

    pub fn modifiers(&self) -> i32 {
        self.linked.flags.recognized()
    }

    pub fn is_volatile(&self) -> bool {
        self.linked.flags.is_volatile()
    }

    pub fn attributes(&self) -> &[FieldAttribute] {
        &self.linked.attributes
    }

    pub fn declaring_class(&self) -> &Arc<InstanceClass> {
        &self.holder
    }

    pub(crate) fn matches(&self, key: &FieldKey) -> bool {
        self.linked.name == key.name && self.descriptor == Some(key.desc)
    }

    fn interner(&self) -> &lasso::ThreadedRodeo {
        self.holder.interner()
    }

    pub fn name_as_string(&self) -> &str {
        self.interner().resolve(&self.linked.name)
    }

    pub fn type_as_string(&self) -> Option<&str> {
        self.descriptor.map(|sym| self.interner().resolve(&sym))
    }

    /// The class of the declared type, resolved on first call through
    /// `registry` with the holder's loader and protection domain.
    ///
    /// Concurrent first calls resolve once and all see the same class. A
    /// failed resolution is not remembered; the next call tries again.
    #[hotpath::measure]
    pub fn resolve_type_klass(&self, registry: &dyn TypeRegistry) -> Result<ClassId, JvmError> {
        if let Some(class_id) = self.type_klass_cache.get() {
            return Ok(*class_id);
        }
        let Some(descriptor) = self.descriptor else {
            panic!("hidden field {} has no declared type to resolve", self);
        };
        self.type_klass_cache
            .get_or_try_init(|| {
                debug_log!("Resolving type of field {}", self);
                let resolved = registry.resolve(
                    descriptor,
                    self.holder.defining_loader(),
                    self.holder.protection_domain(),
                );
                match &resolved {
                    Ok(class_id) => debug_log!("Field {} has type class {:?}", self, class_id),
                    Err(e) => debug_error_log!("Failed to resolve type of field {}: {}", self, e),
                }
                resolved
            })
            .copied()
    }

    /// Generic signature symbol: the `Signature` attribute when present,
    /// otherwise the raw descriptor. Memoized.
    pub fn generic_signature(&self) -> Result<Symbol, JvmError> {
        self.generic_signature
            .get_or_try_init(|| match self.linked.signature_index() {
                Some(idx) => self.holder.cp.get_utf8_sym(&idx, self.interner()),
                None => Ok(self.descriptor.unwrap_or(self.linked.type_sym)),
            })
            .copied()
    }

    pub fn generic_signature_as_string(&self) -> Result<&str, JvmError> {
        let sym = self.generic_signature()?;
        Ok(self.interner().resolve(&sym))
    }

    #[inline]
    pub fn has_active_breakpoint(&self) -> bool {
        self.breakpoints.is_active()
    }

    pub fn breakpoints(&self) -> &BreakpointRegistry {
        &self.breakpoints
    }

    pub fn add_breakpoint(&self, info: FieldBreakpoint) {
        self.breakpoints.add(info)
    }

    pub fn remove_breakpoint(&self, request_id: i32) {
        self.breakpoints.remove(request_id, self)
    }

    pub fn active_breakpoints(&self) -> Vec<FieldBreakpoint> {
        self.breakpoints.infos()
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("holder", &self.holder.name_as_string())
            .field("name", &self.name_as_string())
            .field("descriptor", &self.type_as_string())
            .field("kind", &self.linked.kind)
            .field("slot", &self.linked.slot)
            .field("flags", &self.linked.flags)
            .finish()
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}: {}",
            self.holder,
            self.name_as_string(),
            self.type_as_string().unwrap_or("<hidden>")
        )
    }
}

impl FieldRef for Field {
    fn tag_constant(&self) -> u8 {
        self.kind().to_tag().into()
    }

    fn name_as_string(&self) -> &str {
        Field::name_as_string(self)
    }

    fn type_as_string(&self) -> Option<&str> {
        Field::type_as_string(self)
    }

    fn generic_signature_as_string(&self) -> Result<String, JvmError> {
        Field::generic_signature_as_string(self).map(str::to_string)
    }

    fn modifiers(&self) -> i32 {
        Field::modifiers(self)
    }

    fn declaring_class_id(&self) -> ClassId {
        self.holder.id()
    }

    fn get_value(&self, obj: &Instance) -> Result<Value, JvmError> {
        self.get(obj, false)
    }

    fn set_value(&self, obj: &Instance, value: Value) -> Result<(), JvmError> {
        self.set(obj, value, false)
    }

    fn has_active_breakpoint(&self) -> bool {
        Field::has_active_breakpoint(self)
    }

    fn field_breakpoint_infos(&self) -> Vec<FieldBreakpoint> {
        self.active_breakpoints()
    }

    fn add_field_breakpoint_info(&self, info: FieldBreakpoint) {
        self.add_breakpoint(info)
    }

    fn remove_field_breakpoint_info(&self, request_id: i32) {
        self.remove_breakpoint(request_id)
    }
}
