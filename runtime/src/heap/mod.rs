use crate::error::JvmError;
use crate::heap::slots::SlotTable;
use crate::keys::ClassId;
use crate::rt::class::InstanceClass;
use std::sync::Arc;

pub mod method_area;
pub mod slots;

/// Address of an object on the heap. Addresses start at 1, so 0 can stand
/// for null inside a reference slot.
pub type HeapRef = usize;

/// A guest object.
///
/// Foreign instances are proxies for objects owned by another runtime: they
/// have a class but no managed field storage.
#[derive(Debug)]
pub struct Instance {
    class: Arc<InstanceClass>,
    storage: Option<SlotTable>,
}

impl Instance {
    pub fn new(class: Arc<InstanceClass>) -> Self {
        let storage = SlotTable::new(class.instance_slot_count());
        Self {
            class,
            storage: Some(storage),
        }
    }

    pub fn new_foreign(class: Arc<InstanceClass>) -> Self {
        Self {
            class,
            storage: None,
        }
    }

    pub fn class(&self) -> &Arc<InstanceClass> {
        &self.class
    }

    pub fn class_id(&self) -> ClassId {
        self.class.id()
    }

    pub fn is_foreign(&self) -> bool {
        self.storage.is_none()
    }

    pub fn slots(&self) -> Result<&SlotTable, JvmError> {
        self.storage.as_ref().ok_or_else(|| {
            JvmError::InvalidOperation(format!(
                "Field access on foreign object of class {}",
                self.class.name_as_string()
            ))
        })
    }
}

pub struct Heap {
    instances: Vec<Arc<Instance>>,
}

impl Heap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, instance: Instance) -> HeapRef {
        self.instances.push(Arc::new(instance));
        self.instances.len()
    }

    pub fn alloc_instance(&mut self, class: Arc<InstanceClass>) -> HeapRef {
        self.push(Instance::new(class))
    }

    pub fn alloc_foreign(&mut self, class: Arc<InstanceClass>) -> HeapRef {
        self.push(Instance::new_foreign(class))
    }

    pub fn get(&self, addr: HeapRef) -> Result<&Arc<Instance>, JvmError> {
        addr.checked_sub(1)
            .and_then(|idx| self.instances.get(idx))
            .ok_or(JvmError::WrongHeapAddress(addr))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
