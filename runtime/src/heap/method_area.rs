use crate::error::{JavaExceptionFromJvm, JavaExceptionKind, JvmError};
use crate::heap::HeapRef;
use crate::keys::{ClassId, FieldKey};
use crate::rt::class::{ClassDefinition, InstanceClass};
use crate::rt::field::kind::FieldKind;
use crate::rt::field::{Field, LinkedField};
use crate::rt::{ArrayClass, JvmClass, PrimitiveClass, TypeRegistry};
use crate::{Symbol, build_exception, debug_log, throw_exception};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lasso::ThreadedRodeo;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Classes and their linked instance fields.
///
/// Classes are registered per defining loader: the same name may be defined
/// once by every loader. Lookups that miss in the requesting loader fall back
/// to the bootstrap loader (`None`).
///
/// Primitive and array classes are kept apart from the named classes, so no
/// `L<name>;` descriptor can ever resolve to one of them.
pub struct MethodArea {
    interner: Arc<ThreadedRodeo>,
    next_class_index: AtomicU32,
    classes: DashMap<ClassId, JvmClass>,
    class_name_to_id: DashMap<(Option<HeapRef>, Symbol), ClassId>,
    primitive_classes: DashMap<FieldKind, ClassId>,
    array_classes: DashMap<(Option<HeapRef>, Symbol), ClassId>,
    fields: DashMap<ClassId, LinkedFields>,
}

#[derive(Default)]
struct LinkedFields {
    declared: Vec<Arc<Field>>,
    hidden: Vec<Arc<Field>>,
}

impl MethodArea {
    pub fn new(interner: Arc<ThreadedRodeo>) -> Self {
        debug_log!("Creating Method Area...");
        let method_area = Self {
            interner,
            next_class_index: AtomicU32::new(0),
            classes: DashMap::new(),
            class_name_to_id: DashMap::new(),
            primitive_classes: DashMap::new(),
            array_classes: DashMap::new(),
            fields: DashMap::new(),
        };

        for kind in FieldKind::PRIMITIVES {
            let name = method_area.interner.get_or_intern_static(kind.java_name());
            let id = method_area.next_class_id();
            method_area
                .classes
                .insert(id, JvmClass::Primitive(PrimitiveClass { id, name, kind }));
            method_area.primitive_classes.insert(kind, id);
        }

        method_area
    }

    pub fn interner(&self) -> &Arc<ThreadedRodeo> {
        &self.interner
    }

    fn next_class_id(&self) -> ClassId {
        ClassId::from_index(self.next_class_index.fetch_add(1, Ordering::Relaxed) as usize)
    }

    pub fn define_class(
        &self,
        definition: ClassDefinition,
    ) -> Result<Arc<InstanceClass>, JvmError> {
        let name = self.interner.get_or_intern(&definition.name);
        let super_class = definition
            .super_id
            .map(|id| self.get_instance_class(&id))
            .transpose()?;

        if let Some(super_class) = &super_class
            && super_class.instance_slot_count() > definition.instance_slot_count
        {
            return throw_exception!(
                ClassFormatError,
                "Class {} has {} instance slots, fewer than its superclass {} with {}",
                definition.name,
                definition.instance_slot_count,
                super_class.name_as_string(),
                super_class.instance_slot_count()
            );
        }

        let entry = match self
            .class_name_to_id
            .entry((definition.defining_loader, name))
        {
            Entry::Occupied(_) => {
                return throw_exception!(
                    LinkageError,
                    "attempted duplicate class definition for {}",
                    definition.name
                );
            }
            Entry::Vacant(entry) => entry,
        };

        let id = self.next_class_id();
        let class = Arc::new(InstanceClass::new(
            id,
            name,
            super_class,
            definition,
            self.interner.clone(),
        ));
        self.classes.insert(id, JvmClass::Instance(class.clone()));
        entry.insert(id);
        debug_log!("Defined class {} with id {:?}", class, id);

        Ok(class)
    }

    pub fn get_class(&self, id: &ClassId) -> Result<JvmClass, JvmError> {
        self.classes
            .get(id)
            .map(|class| class.value().clone())
            .ok_or(JvmError::ClassNotRegistered(*id))
    }

    pub fn get_instance_class(&self, id: &ClassId) -> Result<Arc<InstanceClass>, JvmError> {
        match self.get_class(id)? {
            JvmClass::Instance(class) => Ok(class),
            class => Err(JvmError::InvalidOperation(format!(
                "{} is not an instance class",
                self.interner.resolve(&class.name())
            ))),
        }
    }

    pub fn get_class_name(&self, id: &ClassId) -> Result<&str, JvmError> {
        let name = self.get_class(id)?.name();
        Ok(self.interner.resolve(&name))
    }

    pub fn get_class_id(&self, loader: Option<HeapRef>, name: Symbol) -> Option<ClassId> {
        self.class_name_to_id
            .get(&(loader, name))
            .or_else(|| self.class_name_to_id.get(&(None, name)))
            .map(|id| *id)
    }

    pub fn get_primitive_class_id(&self, kind: FieldKind) -> Option<ClassId> {
        self.primitive_classes.get(&kind).map(|id| *id)
    }

    /// The array class of `descriptor`, registered on first request in the
    /// loader of its component class.
    fn get_array_class_id(
        &self,
        descriptor: Symbol,
        loader: Option<HeapRef>,
        protection_domain: Option<HeapRef>,
    ) -> Result<ClassId, JvmError> {
        let component_desc = &self.interner.resolve(&descriptor)[1..];
        let component_sym = self.interner.get_or_intern(component_desc);
        let component = match self.resolve(component_sym, loader, protection_domain) {
            Ok(component) => component,
            Err(JvmError::JavaException(cause)) => {
                return Err(JavaExceptionFromJvm::with_unresolved_type(
                    JavaExceptionKind::NoClassDefFoundError,
                    descriptor,
                )
                .caused_by(cause)
                .into());
            }
            Err(e) => return Err(e),
        };
        let defining_loader = self.get_class(&component)?.defining_loader();

        match self.array_classes.entry((defining_loader, descriptor)) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let id = self.next_class_id();
                self.classes.insert(
                    id,
                    JvmClass::Array(ArrayClass {
                        id,
                        name: descriptor,
                        component,
                        defining_loader,
                    }),
                );
                entry.insert(id);
                debug_log!(
                    "Created array class {} with id {:?}",
                    self.interner.resolve(&descriptor),
                    id
                );
                Ok(id)
            }
        }
    }

    /// Builds the field handles of a class from its linked fields. A class is
    /// linked once.
    pub fn link_fields(
        &self,
        holder: &ClassId,
        declared: Vec<LinkedField>,
        hidden: Vec<LinkedField>,
    ) -> Result<Vec<Arc<Field>>, JvmError> {
        let class = self.get_instance_class(holder)?;
        let first_own_slot = class
            .super_class()
            .map_or(0, |super_class| super_class.instance_slot_count());

        for linked in declared.iter().chain(&hidden) {
            if linked.slot < first_own_slot || linked.slot >= class.instance_slot_count() {
                return throw_exception!(
                    ClassFormatError,
                    "Field {}.{} has slot {} outside of [{}, {})",
                    class,
                    self.interner.resolve(&linked.name),
                    linked.slot,
                    first_own_slot,
                    class.instance_slot_count()
                );
            }
        }

        let mut slot_owners = HashMap::new();
        for linked in declared.iter().chain(&hidden) {
            if let Some(owner) = slot_owners.insert(linked.slot, linked.name) {
                return throw_exception!(
                    ClassFormatError,
                    "Fields {}.{} and {}.{} share slot {}",
                    class,
                    self.interner.resolve(&owner),
                    class,
                    self.interner.resolve(&linked.name),
                    linked.slot
                );
            }
        }

        let entry = match self.fields.entry(*holder) {
            Entry::Occupied(_) => {
                return throw_exception!(
                    LinkageError,
                    "Fields of class {} are already linked",
                    class
                );
            }
            Entry::Vacant(entry) => entry,
        };

        let linked = LinkedFields {
            declared: declared
                .into_iter()
                .map(|linked| Arc::new(Field::new(class.clone(), linked, false)))
                .collect(),
            hidden: hidden
                .into_iter()
                .map(|linked| Arc::new(Field::new(class.clone(), linked, true)))
                .collect(),
        };
        debug_log!(
            "Linked {} fields and {} hidden fields of {}",
            linked.declared.len(),
            linked.hidden.len(),
            class
        );
        let all = linked
            .declared
            .iter()
            .chain(&linked.hidden)
            .cloned()
            .collect();
        entry.insert(linked);

        Ok(all)
    }

    /// Guest-visible fields declared by `class_id` itself.
    pub fn declared_fields(&self, class_id: &ClassId) -> Vec<Arc<Field>> {
        self.fields
            .get(class_id)
            .map(|fields| fields.declared.clone())
            .unwrap_or_default()
    }

    /// Finds a guest-visible field by name and descriptor, starting at
    /// `class_id` and walking up the superclass chain.
    pub fn lookup_field(&self, class_id: &ClassId, key: &FieldKey) -> Result<Arc<Field>, JvmError> {
        let mut current = Some(self.get_instance_class(class_id)?);
        while let Some(class) = current {
            if let Some(fields) = self.fields.get(&class.id())
                && let Some(field) = fields.declared.iter().find(|field| field.matches(key))
            {
                return Ok(field.clone());
            }
            current = class.super_class().cloned();
        }
        throw_exception!(NoSuchFieldError, "{}", self.interner.resolve(&key.name))
    }

    pub fn lookup_hidden_field(&self, class_id: &ClassId, name: Symbol) -> Option<Arc<Field>> {
        self.fields.get(class_id).and_then(|fields| {
            fields
                .hidden
                .iter()
                .find(|field| field.name() == name)
                .cloned()
        })
    }
}

impl TypeRegistry for MethodArea {
    fn resolve(
        &self,
        type_name: Symbol,
        loader: Option<HeapRef>,
        protection_domain: Option<HeapRef>,
    ) -> Result<ClassId, JvmError> {
        let descriptor = self.interner.resolve(&type_name);
        let resolved = match descriptor.as_bytes() {
            [b'[', ..] => return self.get_array_class_id(type_name, loader, protection_domain),
            [b'L', .., b';'] if descriptor.len() > 2 => self
                .interner
                .get(&descriptor[1..descriptor.len() - 1])
                .and_then(|name| self.get_class_id(loader, name)),
            _ => FieldKind::from_descriptor(descriptor)
                .filter(|kind| kind.is_primitive())
                .and_then(|kind| self.get_primitive_class_id(kind)),
        };

        resolved.ok_or_else(|| build_exception!(NoClassDefFoundError, type_sym: type_name))
    }
}
