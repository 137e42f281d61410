mod common;

use common::{World, world};
use lagertha_fieldref::error::JavaExceptionKind;
use lagertha_fieldref::rt::class::ClassDefinition;
use lagertha_fieldref::rt::JvmClass;
use lagertha_fieldref::rt::field::flags::FieldFlags;
use lagertha_fieldref::{
    ClassId, Field, FieldKind, HeapRef, JvmError, LinkedField, MethodArea, Symbol, TypeRegistry,
    build_exception,
};
use rstest::rstest;
use std::sync::{Arc, Barrier};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Delegates to the method area and counts how often it is asked.
struct CountingRegistry<'a> {
    inner: &'a MethodArea,
    calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl<'a> CountingRegistry<'a> {
    fn new(inner: &'a MethodArea) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TypeRegistry for CountingRegistry<'_> {
    fn resolve(
        &self,
        type_name: Symbol,
        loader: Option<HeapRef>,
        protection_domain: Option<HeapRef>,
    ) -> Result<ClassId, JvmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // widen the window in which other threads pile up on the cell
        std::thread::sleep(Duration::from_millis(20));
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(build_exception!(LinkageError, "loader constraint violated"));
        }
        self.inner.resolve(type_name, loader, protection_domain)
    }
}

#[rstest]
fn resolves_reference_type_through_registry(world: World) {
    let class_id = world
        .field("name")
        .resolve_type_klass(&world.method_area)
        .unwrap();
    assert_eq!(class_id, world.string.id());
}

#[rstest]
#[case::int("i", "int")]
#[case::boolean("flag", "boolean")]
#[case::double("d", "double")]
fn resolves_primitive_type_to_primitive_class(
    world: World,
    #[case] field: &str,
    #[case] class_name: &str,
) {
    let class_id = world
        .field(field)
        .resolve_type_klass(&world.method_area)
        .unwrap();
    assert_eq!(world.method_area.get_class_name(&class_id).unwrap(), class_name);
}

/// Defines `class_name` with one slot per field and links `fields` in order.
fn link_class(world: &World, class_name: &str, fields: &[(&str, &str)]) -> Vec<Arc<Field>> {
    let class = world
        .method_area
        .define_class(ClassDefinition::new(class_name).with_slots(fields.len()))
        .unwrap();
    let linked = fields
        .iter()
        .enumerate()
        .map(|(slot, (name, desc))| {
            LinkedField::from_descriptor(name, desc, slot, FieldFlags::default(), &world.interner)
                .unwrap()
        })
        .collect();
    world
        .method_area
        .link_fields(&class.id(), linked, Vec::new())
        .unwrap()
}

fn component_of(world: &World, array: ClassId) -> ClassId {
    match world.method_area.get_class(&array).unwrap() {
        JvmClass::Array(class) => class.component,
        other => panic!("expected an array class, got {:?}", other),
    }
}

#[rstest]
fn array_types_resolve_to_array_classes(world: World) {
    let fields = link_class(
        &world,
        "demo/Arrays",
        &[
            ("ints", "[I"),
            ("more_ints", "[I"),
            ("names", "[Ljava/lang/String;"),
            ("grid", "[[I"),
        ],
    );
    let resolve = |idx: usize| fields[idx].resolve_type_klass(&world.method_area).unwrap();

    let ints = resolve(0);
    assert_eq!(resolve(1), ints);
    assert_eq!(world.method_area.get_class_name(&ints).unwrap(), "[I");
    assert_eq!(
        Some(component_of(&world, ints)),
        world.method_area.get_primitive_class_id(FieldKind::Int)
    );

    let names = resolve(2);
    assert_eq!(component_of(&world, names), world.string.id());

    let grid = resolve(3);
    assert_eq!(world.method_area.get_class_name(&grid).unwrap(), "[[I");
    assert_eq!(component_of(&world, grid), ints);
}

#[rstest]
fn array_of_missing_class_names_the_cause(world: World) {
    let fields = link_class(&world, "demo/BrokenArrays", &[("ghosts", "[Ldemo/Missing;")]);
    let err = fields[0].resolve_type_klass(&world.method_area).unwrap_err();
    assert_eq!(
        err.into_pretty_string(&world.interner),
        "java.lang.NoClassDefFoundError: [Ldemo/Missing;\n\
         Caused by: java.lang.NoClassDefFoundError: demo/Missing"
    );
}

#[rstest]
fn class_descriptor_never_names_a_primitive_class(world: World) {
    let fields = link_class(&world, "demo/Weird", &[("weird", "Lint;")]);
    let err = fields[0].resolve_type_klass(&world.method_area).unwrap_err();
    insta::assert_snapshot!(
        err.into_pretty_string(&world.interner),
        @"java.lang.NoClassDefFoundError: int"
    );
}

#[rstest]
fn resolution_is_memoized(world: World) {
    let registry = CountingRegistry::new(&world.method_area);
    let field = world.field("generic");

    let first = field.resolve_type_klass(&registry).unwrap();
    let second = field.resolve_type_klass(&registry).unwrap();
    assert_eq!(first, world.list.id());
    assert_eq!(first, second);
    assert_eq!(registry.calls(), 1);
}

#[rstest]
fn concurrent_resolution_happens_once(world: World) {
    const THREADS: usize = 8;

    let registry = CountingRegistry::new(&world.method_area);
    let field = world.field("name");
    let barrier = Barrier::new(THREADS);

    let resolved: Vec<ClassId> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    field.resolve_type_klass(&registry).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(registry.calls(), 1);
    assert!(resolved.iter().all(|id| *id == world.string.id()));
}

#[rstest]
fn failed_resolution_is_retried(world: World) {
    let registry = CountingRegistry::new(&world.method_area);
    registry.fail_next.store(true, Ordering::SeqCst);
    let field = world.field("name");

    let err = field.resolve_type_klass(&registry).unwrap_err();
    assert_eq!(err.java_exception_kind(), Some(JavaExceptionKind::LinkageError));

    assert_eq!(
        field.resolve_type_klass(&registry).unwrap(),
        world.string.id()
    );
    field.resolve_type_klass(&registry).unwrap();
    assert_eq!(registry.calls(), 2);
}

#[rstest]
fn unknown_type_is_no_class_def_found(world: World) {
    let broken = world
        .method_area
        .define_class(ClassDefinition::new("demo/Broken").with_slots(1))
        .unwrap();
    let ghost = LinkedField::from_descriptor(
        "ghost",
        "Ldemo/Missing;",
        0,
        FieldFlags::default(),
        &world.interner,
    )
    .unwrap();
    let fields = world
        .method_area
        .link_fields(&broken.id(), vec![ghost], Vec::new())
        .unwrap();

    let err = fields[0].resolve_type_klass(&world.method_area).unwrap_err();
    insta::assert_snapshot!(
        err.into_pretty_string(&world.interner),
        @"java.lang.NoClassDefFoundError: demo/Missing"
    );
}

#[rstest]
fn resolution_uses_the_holder_loader(world: World) {
    const LOADER: HeapRef = 100;
    const DOMAIN: HeapRef = 200;

    let loaded = world
        .method_area
        .define_class(ClassDefinition::new("demo/Loaded").loaded_by(LOADER, None))
        .unwrap();
    let holder = world
        .method_area
        .define_class(
            ClassDefinition::new("demo/Holder")
                .loaded_by(LOADER, Some(DOMAIN))
                .with_slots(2),
        )
        .unwrap();
    let bootstrap_holder = world
        .method_area
        .define_class(ClassDefinition::new("demo/BootstrapHolder").with_slots(1))
        .unwrap();

    let linked = |name: &str, desc: &str, slot: usize| {
        LinkedField::from_descriptor(name, desc, slot, FieldFlags::default(), &world.interner)
            .unwrap()
    };
    let holder_fields = world
        .method_area
        .link_fields(
            &holder.id(),
            vec![
                linked("loaded", "Ldemo/Loaded;", 0),
                linked("text", "Ljava/lang/String;", 1),
            ],
            Vec::new(),
        )
        .unwrap();
    let bootstrap_fields = world
        .method_area
        .link_fields(
            &bootstrap_holder.id(),
            vec![linked("loaded", "Ldemo/Loaded;", 0)],
            Vec::new(),
        )
        .unwrap();

    assert_eq!(
        holder_fields[0].resolve_type_klass(&world.method_area).unwrap(),
        loaded.id()
    );
    // falls back to the bootstrap loader
    assert_eq!(
        holder_fields[1].resolve_type_klass(&world.method_area).unwrap(),
        world.string.id()
    );
    let err = bootstrap_fields[0]
        .resolve_type_klass(&world.method_area)
        .unwrap_err();
    assert_eq!(
        err.java_exception_kind(),
        Some(JavaExceptionKind::NoClassDefFoundError)
    );
}

#[rstest]
#[should_panic(expected = "hidden field demo/Point.vmtarget: <hidden> has no declared type")]
fn hidden_field_has_no_type_to_resolve(world: World) {
    let _ = world.hidden_field().resolve_type_klass(&world.method_area);
}
