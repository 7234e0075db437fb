use super::*;
use tyg_bindings::{MethodBinding, TypeBinding, VariableBinding, VariableBindingId};
use tyg_common::SourceRange;

struct Fixture {
    store: BindingStore,
    object: TypeBindingId,
    string: TypeBindingId,
    int: TypeBindingId,
    list: TypeBindingId,
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `List<E> implements Collection<E>`, plus `Object`, `String` and `int`.
fn fixture() -> Fixture {
    init_logging();
    let store = BindingStore::new();
    let object = store.register_type(TypeBinding::class(
        store.intern("Object"),
        store.intern("Ljava/lang/Object;"),
    ));
    let string = store.register_type(TypeBinding::class(
        store.intern("String"),
        store.intern("Ljava/lang/String;"),
    ));
    let int = store.register_type(TypeBinding::primitive(store.intern("int")));

    let e_collection = store.type_parameter(
        store.intern("E"),
        store.intern("Ljava/util/Collection;:TE;"),
    );
    let collection = store.register_type(
        TypeBinding::interface(
            store.intern("Collection"),
            store.intern("Ljava/util/Collection;"),
        )
        .with_type_parameters(vec![e_collection]),
    );

    let e_list = store.type_parameter(store.intern("E"), store.intern("Ljava/util/List;:TE;"));
    let e_list_binding = store.type_param(e_list).unwrap().binding;
    let collection_of_e = store.parameterized(collection, vec![e_list_binding]);
    let list = store.register_type(
        TypeBinding::interface(store.intern("List"), store.intern("Ljava/util/List;"))
            .with_type_parameters(vec![e_list])
            .with_interfaces(vec![collection_of_e]),
    );

    Fixture {
        store,
        object,
        string,
        int,
        list,
    }
}

fn range(unit: u32, start: u32) -> CompilationUnitRange {
    CompilationUnitRange::new(CompilationUnitId(unit), SourceRange::new(start, start + 1))
}

fn local(store: &BindingStore, name: &str, ty: TypeBindingId) -> VariableBindingId {
    store.register_variable(VariableBinding {
        name: store.intern(name),
        key: store.intern(&format!("Vlocal:{name}")),
        ty,
        is_field: false,
    })
}

fn field(store: &BindingStore, name: &str, ty: TypeBindingId) -> VariableBindingId {
    store.register_variable(VariableBinding {
        name: store.intern(name),
        key: store.intern(&format!("Vfield:{name}")),
        ty,
        is_field: true,
    })
}

#[test]
fn test_variable_factory_interns_by_binding() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let list_of_string = f.store.parameterized(f.list, vec![f.string]);
    let names = local(&f.store, "names", list_of_string);

    let a = model.make_variable_variable(names).unwrap();
    let b = model.make_variable_variable(names).unwrap();
    assert_eq!(a, b, "same binding must intern to one variable");

    let delta = model.new_constraint_variables();
    assert_eq!(
        delta.iter().filter(|&&id| id == a).count(),
        1,
        "the unit delta lists a newly interned variable exactly once"
    );
}

#[test]
fn test_primitive_types_are_filtered() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let count = local(&f.store, "count", f.int);

    assert!(model.make_variable_variable(count).is_none());
    assert!(model.make_type_variable(f.int, range(1, 0)).is_none());
    assert!(model.make_independent_type_variable(f.int).is_none());
    assert!(model.make_plain_type_variable(f.int).is_none());
    assert!(model.new_constraint_variables().is_empty());
}

#[test]
fn test_subtype_constraint_dedup_and_used_in() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let raw_list = f.store.raw(f.list);
    let list_of_string = f.store.parameterized(f.list, vec![f.string]);

    let t = model.make_type_variable(raw_list, range(1, 10)).unwrap();
    let p = model.make_parameterized_type_variable(list_of_string).unwrap();

    model.create_subtype_constraint(Some(t), Some(p));
    model.create_subtype_constraint(Some(t), Some(p));

    let delta = model.new_type_constraints();
    assert_eq!(delta.len(), 1, "recreating a constraint must find the stored one");
    let c = delta[0];
    assert_eq!(model.used_in(t), &[c], "used-in registered exactly once");
    assert_eq!(model.used_in(p), &[c]);

    let stored = model.constraint(c).unwrap();
    assert_eq!((stored.left, stored.right), (t, p));
}

#[test]
fn test_vacuous_constraint_is_dropped() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let raw_list = f.store.raw(f.list);
    let t = model.make_type_variable(raw_list, range(1, 0)).unwrap();

    model.create_subtype_constraint(Some(t), Some(t));
    assert!(model.new_type_constraints().is_empty());
    assert!(model.used_in(t).is_empty());
}

#[test]
fn test_absent_operand_is_a_noop() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let raw_list = f.store.raw(f.list);
    let t = model.make_type_variable(raw_list, range(1, 0)).unwrap();

    model.create_subtype_constraint(None, Some(t));
    model.create_subtype_constraint(Some(t), None);
    model.create_subtype_constraint(None, None);
    assert!(model.new_type_constraints().is_empty());
}

#[test]
fn test_constraint_between_plain_nongeneric_types_is_dropped() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let s = model.make_plain_type_variable(f.string).unwrap();
    let o = model.make_type_variable(f.object, range(1, 0)).unwrap();

    model.create_subtype_constraint(Some(s), Some(o));
    assert!(
        model.new_type_constraints().is_empty(),
        "non-generic operands carry no type-argument information"
    );
    assert!(model.used_in(s).is_empty());
    assert!(model.used_in(o).is_empty());
}

#[test]
fn test_independent_operand_is_kept() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let s = model.make_plain_type_variable(f.string).unwrap();
    let ind = model.make_independent_type_variable(f.string).unwrap();

    model.create_subtype_constraint(Some(s), Some(ind));
    assert_eq!(model.new_type_constraints().len(), 1);
}

#[test]
fn test_add_equals_transitively_merges_classes() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let a = model.make_type_variable(f.string, range(1, 0)).unwrap();
    let b = model.make_type_variable(f.string, range(1, 10)).unwrap();
    let c = model.make_type_variable(f.string, range(1, 20)).unwrap();
    let d = model.make_type_variable(f.string, range(1, 30)).unwrap();

    model.add_equals(Some(a), Some(b));
    model.add_equals(Some(c), Some(d));
    model.add_equals(Some(b), Some(c));

    let reps = model.equivalence_representatives();
    assert_eq!(reps.len(), 1, "merged class leaves one live representative");
    let rep = model.representative(reps[0]).unwrap();
    assert_eq!(rep.len(), 4);
    for id in [a, b, c, d] {
        assert_eq!(
            model.variable(id).unwrap().representative(),
            Some(reps[0]),
            "back-pointers must be rewritten on merge"
        );
    }
}

#[test]
fn test_add_equals_extends_existing_class() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let a = model.make_type_variable(f.string, range(1, 0)).unwrap();
    let b = model.make_type_variable(f.string, range(1, 10)).unwrap();
    let c = model.make_type_variable(f.string, range(1, 20)).unwrap();
    let d = model.make_type_variable(f.string, range(1, 30)).unwrap();

    model.add_equals(Some(a), Some(b));
    model.add_equals(Some(c), Some(a));
    model.add_equals(Some(a), Some(d));

    let rep = model.variable(a).unwrap().representative().unwrap();
    assert_eq!(model.representative(rep).unwrap().len(), 4);
    assert_eq!(model.variable(c).unwrap().representative(), Some(rep));
    assert_eq!(model.variable(d).unwrap().representative(), Some(rep));
}

#[test]
fn test_add_equals_is_idempotent() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let a = model.make_type_variable(f.string, range(1, 0)).unwrap();
    let b = model.make_type_variable(f.string, range(1, 10)).unwrap();

    model.add_equals(Some(a), Some(b));
    model.add_equals(Some(a), Some(b));
    model.add_equals(Some(a), Some(a));
    model.add_equals(None, Some(a));
    model.add_equals(Some(b), None);

    let reps = model.equivalence_representatives();
    assert_eq!(reps.len(), 1);
    assert_eq!(model.representative(reps[0]).unwrap().len(), 2);
}

#[test]
fn test_begin_unit_prunes_unused_unit_scoped_variables() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let unused = model.make_type_variable(f.string, range(1, 0)).unwrap();
    let used = model.make_type_variable(f.string, range(1, 10)).unwrap();
    let ind = model.make_independent_type_variable(f.string).unwrap();
    model.create_subtype_constraint(Some(used), Some(ind));

    model.begin_unit();

    assert!(
        model.variable(unused).is_none(),
        "unreferenced unit-scoped variable must be pruned"
    );
    assert!(model.variable(used).is_some(), "constrained variable survives");
    assert!(
        model.variable(ind).is_some(),
        "independent variables are not unit-scoped"
    );
    assert!(model.new_type_constraints().is_empty(), "delta resets per unit");
    assert!(model.new_constraint_variables().is_empty());

    let again = model.make_type_variable(f.string, range(1, 0)).unwrap();
    assert_ne!(again, unused, "pruned identity re-interns as a fresh variable");
}

#[test]
fn test_element_variable_owners_survive_pruning() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let raw_list = f.store.raw(f.list);
    let t = model.make_type_variable(raw_list, range(2, 0)).unwrap();

    model.begin_unit();
    assert!(
        model.variable(t).is_some(),
        "variables carrying element variables must not be pruned"
    );
}

#[test]
fn test_declared_variable_scoping() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let unit = CompilationUnitId(7);
    let fld = field(&f.store, "cache", f.string);
    let loc = local(&f.store, "tmp", f.string);

    let fv = model.make_declared_variable_variable(fld, unit).unwrap();
    let lv = model.make_declared_variable_variable(loc, unit).unwrap();
    assert_eq!(model.variable(fv).unwrap().compilation_unit(), Some(unit));
    assert!(!model.variable(fv).unwrap().is_unit_scoped(), "fields are globally visible");
    assert!(model.variable(lv).unwrap().is_unit_scoped());

    model.begin_unit();
    assert!(model.variable(fv).is_some());
    assert!(model.variable(lv).is_none());
}

#[test]
fn test_method_factories() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let list_of_string = f.store.parameterized(f.list, vec![f.string]);
    let m = f.store.register_method(MethodBinding {
        name: f.store.intern("addAll"),
        key: f.store.intern("Ljava/util/List;.addAll"),
        declaring_class: f.list,
        parameter_types: vec![list_of_string, f.int],
        return_type: f.string,
        is_private: false,
    });

    let p0 = model.make_parameter_type_variable(m, 0).unwrap();
    assert!(model.make_parameter_type_variable(m, 1).is_none(), "primitive parameter");
    assert!(model.make_parameter_type_variable(m, 2).is_none(), "index out of range");
    assert_eq!(model.make_parameter_type_variable(m, 0).unwrap(), p0);

    let r = model.make_return_type_variable(m).unwrap();
    assert_ne!(p0, r);
    assert_eq!(model.make_return_type_variable(m).unwrap(), r);
}

#[test]
fn test_declared_parameter_scoping_follows_visibility() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let unit = CompilationUnitId(3);
    let helper = f.store.register_type(
        TypeBinding::class(f.store.intern("Helper"), f.store.intern("LHelper;")).local(),
    );

    let public_m = f.store.register_method(MethodBinding {
        name: f.store.intern("publish"),
        key: f.store.intern("Ljava/util/List;.publish"),
        declaring_class: f.list,
        parameter_types: vec![f.string],
        return_type: f.string,
        is_private: false,
    });
    let private_m = f.store.register_method(MethodBinding {
        name: f.store.intern("hide"),
        key: f.store.intern("Ljava/util/List;.hide"),
        declaring_class: f.list,
        parameter_types: vec![f.string],
        return_type: f.string,
        is_private: true,
    });
    let local_m = f.store.register_method(MethodBinding {
        name: f.store.intern("run"),
        key: f.store.intern("LHelper;.run"),
        declaring_class: helper,
        parameter_types: vec![f.string],
        return_type: f.string,
        is_private: false,
    });

    let pv = model.make_declared_parameter_type_variable(public_m, 0, unit).unwrap();
    assert!(!model.variable(pv).unwrap().is_unit_scoped());

    let prv = model.make_declared_parameter_type_variable(private_m, 0, unit).unwrap();
    assert!(model.variable(prv).unwrap().is_unit_scoped(), "private methods are unit-local");

    let lv = model.make_declared_parameter_type_variable(local_m, 0, unit).unwrap();
    assert!(model.variable(lv).unwrap().is_unit_scoped(), "local-class methods are unit-local");

    let rv = model.make_declared_return_type_variable(local_m, unit).unwrap();
    assert!(model.variable(rv).unwrap().is_unit_scoped());
    let rp = model.make_declared_return_type_variable(public_m, unit).unwrap();
    assert!(!model.variable(rp).unwrap().is_unit_scoped());
}

#[test]
fn test_labels_follow_toggle() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    model.set_store_labels(true);
    let list_of_string = f.store.parameterized(f.list, vec![f.string]);
    let names = local(&f.store, "names", list_of_string);

    let v = model.make_variable_variable(names).unwrap();
    assert_eq!(model.variable(v).unwrap().label(), Some("[names]"));

    let ind = model.make_independent_type_variable(f.string).unwrap();
    assert_eq!(model.variable(ind).unwrap().label(), Some("IndependentType(String)"));

    model.set_store_labels(false);
    let plain = model.make_type_variable(f.object, range(1, 0)).unwrap();
    assert_eq!(model.variable(plain).unwrap().label(), None);
}

#[test]
fn test_cast_variables_accumulate_without_interning() {
    let f = fixture();
    let mut model = ConstraintModel::new(&f.store);
    let raw_list = f.store.raw(f.list);
    let list_of_string = f.store.parameterized(f.list, vec![f.string]);
    let t = model.make_type_variable(raw_list, range(1, 0)).unwrap();

    let first = model.make_cast_variable(list_of_string, range(1, 4), t).unwrap();
    let second = model.make_cast_variable(list_of_string, range(1, 4), t).unwrap();
    assert_eq!((first, second), (0, 1), "casts are never interned");
    assert!(model.make_cast_variable(f.int, range(1, 8), t).is_none());

    model.begin_unit();
    let casts = model.cast_variables();
    assert_eq!(casts.len(), 2, "casts are never pruned");
    assert_eq!(casts[0].expression, t);
}
