#![allow(dead_code)]

use lagertha_fieldref::heap::method_area::MethodArea;
use lagertha_fieldref::rt::class::{ClassDefinition, InstanceClass};
use lagertha_fieldref::rt::constant_pool::{RuntimeConstant, RuntimeConstantPool};
use lagertha_fieldref::rt::field::attribute::FieldAttribute;
use lagertha_fieldref::rt::field::flags::FieldFlags;
use lagertha_fieldref::{Field, Heap, Instance, LinkedField};
use lasso::ThreadedRodeo;
use rstest::fixture;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const POINT_SLOTS: usize = 12;

pub const GENERIC_SIGNATURE: &str = "Ljava/util/List<Ljava/lang/String;>;";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A method area with a handful of linked classes and a heap to allocate
/// their instances in.
///
/// `demo/Point` declares one field of every kind plus a volatile int, a
/// generic list and a hidden reference. `demo/Point3D` extends it with one
/// more int. `demo/Other` is unrelated to both.
pub struct World {
    pub interner: Arc<ThreadedRodeo>,
    pub method_area: MethodArea,
    pub heap: Heap,
    pub object: Arc<InstanceClass>,
    pub string: Arc<InstanceClass>,
    pub list: Arc<InstanceClass>,
    pub point: Arc<InstanceClass>,
    pub point3d: Arc<InstanceClass>,
    pub other: Arc<InstanceClass>,
}

impl World {
    pub fn new() -> Self {
        init_tracing();
        let interner = Arc::new(ThreadedRodeo::new());
        let method_area = MethodArea::new(interner.clone());

        let object = method_area
            .define_class(ClassDefinition::new("java/lang/Object"))
            .unwrap();
        let string = method_area
            .define_class(ClassDefinition::new("java/lang/String").extends(object.id()))
            .unwrap();
        let list = method_area
            .define_class(ClassDefinition::new("java/util/List"))
            .unwrap();
        let point = method_area
            .define_class(
                ClassDefinition::new("demo/Point")
                    .extends(object.id())
                    .with_cp(RuntimeConstantPool::new(vec![
                        RuntimeConstant::Unused,
                        RuntimeConstant::utf8(GENERIC_SIGNATURE),
                    ]))
                    .with_slots(POINT_SLOTS),
            )
            .unwrap();
        let point3d = method_area
            .define_class(
                ClassDefinition::new("demo/Point3D")
                    .extends(point.id())
                    .with_slots(POINT_SLOTS + 1),
            )
            .unwrap();
        let other = method_area
            .define_class(
                ClassDefinition::new("demo/Other")
                    .extends(object.id())
                    .with_slots(1),
            )
            .unwrap();

        let linked = |name: &str, desc: &str, slot: usize, flags: u16| {
            LinkedField::from_descriptor(name, desc, slot, FieldFlags::new(flags), &interner)
                .unwrap()
        };

        let declared = vec![
            linked("flag", "Z", 0, FieldFlags::PUBLIC),
            linked("b", "B", 1, 0),
            linked("s", "S", 2, 0),
            linked("c", "C", 3, 0),
            // 0x0100 is not a field modifier and must not be reported
            linked("i", "I", 4, FieldFlags::PUBLIC | 0x0100),
            linked("f", "F", 5, 0),
            linked("l", "J", 6, 0),
            linked("d", "D", 7, 0),
            linked(
                "name",
                "Ljava/lang/String;",
                8,
                FieldFlags::PRIVATE | FieldFlags::FINAL,
            ),
            linked(
                "counter",
                "I",
                9,
                FieldFlags::PRIVATE | FieldFlags::VOLATILE,
            ),
            linked("generic", "Ljava/util/List;", 11, FieldFlags::PRIVATE).with_attributes(
                vec![FieldAttribute::Signature { signature_index: 1 }],
            ),
        ];
        let hidden = vec![linked(
            "vmtarget",
            "Ljava/lang/Object;",
            10,
            FieldFlags::PRIVATE | FieldFlags::SYNTHETIC,
        )];
        method_area
            .link_fields(&point.id(), declared, hidden)
            .unwrap();
        method_area
            .link_fields(
                &point3d.id(),
                vec![linked("z", "I", POINT_SLOTS, 0)],
                Vec::new(),
            )
            .unwrap();
        method_area
            .link_fields(&other.id(), vec![linked("x", "I", 0, 0)], Vec::new())
            .unwrap();
        tracing::debug!("test world ready");

        Self {
            interner,
            method_area,
            heap: Heap::with_capacity(16),
            object,
            string,
            list,
            point,
            point3d,
            other,
        }
    }

    /// A declared field of `demo/Point` or `demo/Point3D`.
    pub fn field(&self, name: &str) -> Arc<Field> {
        [self.point.id(), self.point3d.id()]
            .iter()
            .flat_map(|id| self.method_area.declared_fields(id))
            .find(|field| field.name_as_string() == name)
            .unwrap_or_else(|| panic!("no field {name}"))
    }

    pub fn hidden_field(&self) -> Arc<Field> {
        let name = self.interner.get("vmtarget").unwrap();
        self.method_area
            .lookup_hidden_field(&self.point.id(), name)
            .unwrap()
    }

    pub fn new_instance(&mut self, class: &Arc<InstanceClass>) -> Arc<Instance> {
        let addr = self.heap.alloc_instance(class.clone());
        self.heap.get(addr).unwrap().clone()
    }

    pub fn new_point(&mut self) -> Arc<Instance> {
        let point = self.point.clone();
        self.new_instance(&point)
    }

    pub fn new_foreign_point(&mut self) -> Arc<Instance> {
        let addr = self.heap.alloc_foreign(self.point.clone());
        self.heap.get(addr).unwrap().clone()
    }
}

#[fixture]
pub fn world() -> World {
    World::new()
}
