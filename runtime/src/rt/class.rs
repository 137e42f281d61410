use crate::heap::HeapRef;
use crate::keys::ClassId;
use crate::rt::constant_pool::RuntimeConstantPool;
use crate::Symbol;
use lasso::ThreadedRodeo;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;

/// What a class loader hands to [`MethodArea::define_class`].
///
/// `instance_slot_count` covers the slots of every superclass as well: a
/// subclass lays its own fields out after the inherited ones.
///
/// [`MethodArea::define_class`]: crate::heap::method_area::MethodArea::define_class
pub struct ClassDefinition {
    pub name: String,
    pub super_id: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub defining_loader: Option<HeapRef>,
    pub protection_domain: Option<HeapRef>,
    pub cp: RuntimeConstantPool,
    pub instance_slot_count: usize,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_id: None,
            interfaces: Vec::new(),
            defining_loader: None,
            protection_domain: None,
            cp: RuntimeConstantPool::empty(),
            instance_slot_count: 0,
        }
    }

    pub fn extends(mut self, super_id: ClassId) -> Self {
        self.super_id = Some(super_id);
        self
    }

    pub fn implements(mut self, interface: ClassId) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn loaded_by(mut self, loader: HeapRef, protection_domain: Option<HeapRef>) -> Self {
        self.defining_loader = Some(loader);
        self.protection_domain = protection_domain;
        self
    }

    pub fn with_cp(mut self, cp: RuntimeConstantPool) -> Self {
        self.cp = cp;
        self
    }

    pub fn with_slots(mut self, instance_slot_count: usize) -> Self {
        self.instance_slot_count = instance_slot_count;
        self
    }
}

pub struct InstanceClass {
    id: ClassId,
    name: Symbol,
    super_class: Option<Arc<InstanceClass>>,
    interfaces: HashSet<ClassId>,
    defining_loader: Option<HeapRef>,
    protection_domain: Option<HeapRef>,
    pub cp: RuntimeConstantPool,
    instance_slot_count: usize,
    interner: Arc<ThreadedRodeo>,
}

impl InstanceClass {
    pub(crate) fn new(
        id: ClassId,
        name: Symbol,
        super_class: Option<Arc<InstanceClass>>,
        definition: ClassDefinition,
        interner: Arc<ThreadedRodeo>,
    ) -> Self {
        Self {
            id,
            name,
            super_class,
            interfaces: definition.interfaces.into_iter().collect(),
            defining_loader: definition.defining_loader,
            protection_domain: definition.protection_domain,
            cp: definition.cp,
            instance_slot_count: definition.instance_slot_count,
            interner,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> Symbol {
        self.name
    }

    pub fn name_as_string(&self) -> &str {
        self.interner.resolve(&self.name)
    }

    pub fn super_class(&self) -> Option<&Arc<InstanceClass>> {
        self.super_class.as_ref()
    }

    pub fn defining_loader(&self) -> Option<HeapRef> {
        self.defining_loader
    }

    pub fn protection_domain(&self) -> Option<HeapRef> {
        self.protection_domain
    }

    pub fn instance_slot_count(&self) -> usize {
        self.instance_slot_count
    }

    pub fn interner(&self) -> &ThreadedRodeo {
        &self.interner
    }

    /// Whether an instance of this class is also an instance of `other`:
    /// `other` is this class, one of its superclasses, or an interface
    /// declared anywhere along the superclass chain.
    pub fn is_subclass_of(&self, other: ClassId) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.id == other || class.interfaces.contains(&other) {
                return true;
            }
            current = class.super_class.as_deref();
        }
        false
    }
}

impl std::fmt::Debug for InstanceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceClass")
            .field("id", &self.id)
            .field("name", &self.name_as_string())
            .field("instance_slot_count", &self.instance_slot_count)
            .finish()
    }
}

impl Display for InstanceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name_as_string())
    }
}
