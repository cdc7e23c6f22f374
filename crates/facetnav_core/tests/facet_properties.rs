use chrono::{TimeZone, Utc};
use facetnav_core::db::open_db_in_memory;
use facetnav_core::{
    DomainStore, Entity, Facet, FacetProperty, FacetPropertyType, FacetValue, ItemType, NavError,
    Namespace, NewItemValue, RepoError, SqliteDomainStore, Tag,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Tag `t1` with facet `facet` holding `text` (String) and `long` (Long),
/// assigned to root entity `e1`.
fn seed_t1(store: &SqliteDomainStore<'_>) -> (Tag, Entity) {
    let mut facet = Facet::new("facet");
    facet.add_property(FacetProperty::new("text", FacetPropertyType::String));
    facet.add_property(FacetProperty::new("long", FacetPropertyType::Long));
    let tag = Tag::with_facet("t1", facet);
    store.tags().upsert(&tag).unwrap();

    let root = store.categories().root().unwrap();
    let mut entity = Entity::new("e1", &root);
    entity.assign_tag(tag.id);
    store.entities().upsert(&entity).unwrap();
    (tag, entity)
}

fn stored(store: &SqliteDomainStore<'_>, entity: &Entity) -> Entity {
    store.entities().find_by_id(entity.id).unwrap().unwrap()
}

#[test]
fn mistyped_write_fails_and_leaves_values_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let (_, e1) = seed_t1(&store);
    let ns = Namespace::new(&store);

    let err = ns
        .set_properties("Entities\\e1", &[("t1.text", FacetValue::Long(42))])
        .unwrap_err();
    match err {
        NavError::TypeMismatch {
            property,
            expected,
            actual,
        } => {
            assert_eq!(property, "t1.text");
            assert_eq!(expected, FacetPropertyType::String);
            assert_eq!(actual, FacetPropertyType::Long);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(stored(&store, &e1).values.is_empty());

    // one bad value blocks the whole batch
    let err = ns
        .set_properties(
            "Entities\\e1",
            &[
                ("t1.long", FacetValue::Long(1)),
                ("t1.text", FacetValue::Bool(true)),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, NavError::TypeMismatch { .. }));
    assert!(stored(&store, &e1).values.is_empty());
}

#[test]
fn values_round_trip_through_entity_and_scoped_names() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let (_, e1) = seed_t1(&store);
    let ns = Namespace::new(&store);

    ns.set_properties(
        "Entities\\e1",
        &[
            ("T1.Text", FacetValue::from("hello")),
            ("t1.long", FacetValue::Long(42)),
            ("t1.unknown", FacetValue::Long(0)),
        ],
    )
    .unwrap();
    assert_eq!(stored(&store, &e1).values.len(), 2);

    let entity_level = ns
        .get_properties("Entities\\e1", &["t1.text", "t1.long"])
        .unwrap()
        .unwrap();
    assert_eq!(entity_level.len(), 2);
    assert_eq!(entity_level.value("t1.TEXT"), Some(&FacetValue::from("hello")));

    let scoped = ns.get_properties("Entities\\e1\\t1", &["text"]).unwrap().unwrap();
    assert_eq!(scoped.value("text"), Some(&FacetValue::from("hello")));

    let leaf = ns.get("Entities\\e1\\t1\\long").unwrap().unwrap();
    assert_eq!(leaf.item_type, ItemType::AssignedFacetProperty);
    assert_eq!(leaf.properties.value("Value"), Some(&FacetValue::Long(42)));
    assert_eq!(
        leaf.properties.value("ValueType"),
        Some(&FacetValue::from("Long"))
    );

    ns.clear_property("Entities\\e1", &["t1.text", "not-a-property"])
        .unwrap();
    let cleared = ns.get_properties("Entities\\e1", &["t1.text"]).unwrap().unwrap();
    assert!(cleared.get("t1.text").unwrap().is_absent());
    assert_eq!(stored(&store, &e1).values.len(), 1);
}

#[test]
fn assigned_facet_property_node_reads_and_writes_value() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let (tag, e1) = seed_t1(&store);
    let ns = Namespace::new(&store);

    ns.set_properties("Entities\\e1\\t1\\long", &[("value", FacetValue::Long(7))])
        .unwrap();
    let long_id = tag.facet.property("long").unwrap().id;
    assert_eq!(
        stored(&store, &e1).value(long_id),
        Some(&FacetValue::Long(7))
    );

    ns.clear_property("Entities\\e1\\t1\\long", &["Value"]).unwrap();
    assert!(stored(&store, &e1).values.is_empty());
}

#[test]
fn every_declared_type_survives_persistence() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let ns = Namespace::new(&store);
    ns.create("Tags\\all", "Tag", NewItemValue::None).unwrap();
    for value_type in FacetPropertyType::ALL {
        ns.new_item_property("Tags\\all", value_type.as_str(), value_type)
            .unwrap();
    }
    ns.create("Entities\\e1", "Entity", NewItemValue::None).unwrap();
    ns.create("Entities\\e1\\all", "AssignedTag", NewItemValue::None)
        .unwrap();

    let values = [
        ("String", FacetValue::from("text")),
        ("Long", FacetValue::Long(-5)),
        ("Double", FacetValue::Double(2.5)),
        ("Bool", FacetValue::Bool(true)),
        ("Guid", FacetValue::Guid(Uuid::new_v4())),
        ("Decimal", FacetValue::Decimal(Decimal::new(1999, 2))),
        (
            "DateTime",
            FacetValue::DateTime(Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap()),
        ),
    ];
    ns.set_properties("Entities\\e1\\all", &values).unwrap();

    let read = ns.get_properties("Entities\\e1\\all", &[]).unwrap().unwrap();
    for (name, value) in &values {
        assert_eq!(read.value(name), Some(value), "{name}");
    }
}

#[test]
fn property_verbs_need_a_facet_bearing_node() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let ns = Namespace::new(&store);
    ns.create("Entities\\c1", "Category", NewItemValue::None).unwrap();

    assert!(matches!(
        ns.set_properties("Entities\\c1", &[("Name", FacetValue::from("x"))])
            .unwrap_err(),
        NavError::NotSupported {
            item_type: ItemType::Category,
            ..
        }
    ));
    assert!(matches!(
        ns.clear_property("Entities\\nope", &["x"]).unwrap_err(),
        NavError::ItemNotFound(_)
    ));
}

#[test]
fn facet_property_item_verbs_on_tags() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let (tag, e1) = seed_t1(&store);
    let ns = Namespace::new(&store);
    ns.create("Tags\\t2", "Tag", NewItemValue::None).unwrap();
    ns.create("Tags\\t3", "Tag", NewItemValue::None).unwrap();
    ns.set_properties(
        "Entities\\e1",
        &[
            ("t1.text", FacetValue::from("hello")),
            ("t1.long", FacetValue::Long(1)),
        ],
    )
    .unwrap();
    let text_id = tag.facet.property("text").unwrap().id;

    // rename keeps identity, so stored values follow the new name
    ns.rename_item_property("Tags\\t1", "text", "title").unwrap();
    let read = ns.get_properties("Entities\\e1", &["t1.title"]).unwrap().unwrap();
    assert_eq!(read.value("t1.title"), Some(&FacetValue::from("hello")));
    assert!(matches!(
        ns.rename_item_property("Tags\\t1", "title", "LONG").unwrap_err(),
        NavError::NameConflict {
            item_type: ItemType::FacetProperty,
            ..
        }
    ));

    let copy = ns.copy_item_property("Tags\\t1", "title", "Tags\\t2").unwrap();
    assert_eq!(copy.item_type, ItemType::FacetProperty);
    let t2 = store.tags().find_by_name("t2").unwrap().unwrap();
    assert_ne!(t2.facet.property("title").unwrap().id, text_id);

    ns.move_item_property("Tags\\t1", "title", "Tags\\t3").unwrap();
    let t1 = store.tags().find_by_name("t1").unwrap().unwrap();
    let t3 = store.tags().find_by_name("t3").unwrap().unwrap();
    assert!(t1.facet.property("title").is_none());
    assert_eq!(t3.facet.property("title").unwrap().id, text_id);
    // e1 does not carry t3, so its value for the moved property is dropped
    assert!(stored(&store, &e1).value(text_id).is_none());

    ns.remove_item_property("Tags\\t1", "long").unwrap();
    assert!(stored(&store, &e1).values.is_empty());
    assert!(ns.get("Tags\\t1\\long").unwrap().is_none());

    assert!(matches!(
        ns.new_item_property("Entities\\e1", "x", FacetPropertyType::Bool)
            .unwrap_err(),
        NavError::NotSupported {
            item_type: ItemType::Entity,
            ..
        }
    ));
    assert!(matches!(
        ns.remove_item_property("Tags\\t1", "missing").unwrap_err(),
        NavError::ItemNotFound(_)
    ));
}

#[test]
fn facet_property_nodes_support_rename_copy_move_and_remove() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    seed_t1(&store);
    let ns = Namespace::new(&store);
    ns.create("Tags\\t2", "Tag", NewItemValue::None).unwrap();

    let renamed = ns.rename("Tags\\t1\\text", "label").unwrap();
    assert_eq!(renamed.name, "label");

    ns.copy("Tags\\t1\\label", Some("label-copy"), "Tags\\t1", false)
        .unwrap();
    ns.move_item("Tags\\t1\\long", None, "Tags\\t2").unwrap();
    ns.remove("Tags\\t1\\label-copy", false).unwrap();

    let t1: Vec<String> = ns
        .list("Tags\\t1")
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(t1, vec!["label".to_string()]);
    assert!(ns.get("Tags\\t2\\long").unwrap().is_some());

    let err = ns
        .create("Tags\\t2\\flag", "FacetProperty", NewItemValue::None)
        .unwrap_err();
    assert!(matches!(err, NavError::MissingValue(_)));
}

#[test]
fn non_finite_doubles_are_rejected_and_the_entity_stays_readable() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let (_, e1) = seed_t1(&store);
    let ns = Namespace::new(&store);
    ns.new_item_property("Tags\\t1", "ratio", FacetPropertyType::Double)
        .unwrap();
    ns.set_properties("Entities\\e1", &[("t1.ratio", FacetValue::Double(0.25))])
        .unwrap();

    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = ns
            .set_properties("Entities\\e1", &[("t1.ratio", FacetValue::Double(value))])
            .unwrap_err();
        assert!(matches!(err, NavError::InvalidValue { ref property, .. } if property == "t1.ratio"));

        let err = ns
            .set_properties("Entities\\e1\\t1\\ratio", &[("Value", FacetValue::Double(value))])
            .unwrap_err();
        assert!(matches!(err, NavError::InvalidValue { .. }));
    }

    let ratio = store
        .tags()
        .find_by_name("t1")
        .unwrap()
        .unwrap()
        .facet
        .property("ratio")
        .unwrap()
        .id;
    let mut direct = stored(&store, &e1);
    direct.values.insert(ratio, FacetValue::Double(f64::NAN));
    assert!(matches!(
        store.entities().upsert(&direct).unwrap_err(),
        RepoError::InvalidData(_)
    ));

    assert_eq!(stored(&store, &e1).value(ratio), Some(&FacetValue::Double(0.25)));
    assert!(ns.get("Entities\\e1").unwrap().is_some());
    assert_eq!(ns.list("Entities").unwrap().len(), 1);
    let read = ns
        .get_properties("Entities\\e1", &["t1.ratio"])
        .unwrap()
        .unwrap();
    assert_eq!(read.value("t1.ratio"), Some(&FacetValue::Double(0.25)));
}

#[test]
fn property_names_that_would_shadow_projected_keys_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    seed_t1(&store);
    let ns = Namespace::new(&store);

    for name in ["Name", "id", "Entity", "ItemType", "PropertyNames", "NewItemTypeNames", "b.c"] {
        let err = ns
            .new_item_property("Tags\\t1", name, FacetPropertyType::String)
            .unwrap_err();
        assert!(
            matches!(err, NavError::InvalidName(_)),
            "expected `{name}` to be rejected, got {err}"
        );
    }
    assert!(matches!(
        ns.rename_item_property("Tags\\t1", "text", "ItemType")
            .unwrap_err(),
        NavError::InvalidName(_)
    ));
    assert!(matches!(
        ns.rename("Tags\\t1\\text", "x.y").unwrap_err(),
        NavError::InvalidName(_)
    ));
    assert!(matches!(
        ns.create(
            "Tags\\t1\\NAME",
            "FacetProperty",
            NewItemValue::PropertyType(FacetPropertyType::String),
        )
        .unwrap_err(),
        NavError::InvalidName(_)
    ));

    let names: Vec<String> = ns
        .list("Tags\\t1")
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, vec!["text".to_string(), "long".to_string()]);

    ns.set_properties("Entities\\e1\\t1", &[("text", FacetValue::from("hello"))])
        .unwrap();
    let scoped = ns
        .get_properties("Entities\\e1\\t1", &["Name", "text"])
        .unwrap()
        .unwrap();
    assert_eq!(scoped.value("Name"), Some(&FacetValue::from("t1")));
    assert_eq!(scoped.value("text"), Some(&FacetValue::from("hello")));
}
