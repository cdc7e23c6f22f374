use facetnav_core::db::open_db_in_memory;
use facetnav_core::{
    ChangeAction, DomainStore, Entity, FacetPropertyType, Namespace, NewItemValue, RepoError,
    SqliteDomainStore, StoreChange, StoredKind,
};
use std::cell::RefCell;
use std::rc::Rc;

fn record(store: &SqliteDomainStore<'_>) -> Rc<RefCell<Vec<StoreChange>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |change| sink.borrow_mut().push(*change));
    seen
}

fn summary(changes: &[StoreChange]) -> Vec<(ChangeAction, StoredKind)> {
    changes
        .iter()
        .map(|change| (change.action, change.kind))
        .collect()
}

#[test]
fn writes_outside_a_scope_notify_immediately() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let seen = record(&store);
    let root = store.categories().root().unwrap();

    let mut entity = Entity::new("e1", &root);
    store.entities().upsert(&entity).unwrap();
    entity.name = "e1-renamed".to_string();
    store.entities().upsert(&entity).unwrap();
    store.entities().delete(entity.id).unwrap();

    assert_eq!(
        summary(&seen.borrow()),
        vec![
            (ChangeAction::Created, StoredKind::Entity),
            (ChangeAction::Updated, StoredKind::Entity),
            (ChangeAction::Deleted, StoredKind::Entity),
        ]
    );
    assert!(seen.borrow().iter().all(|change| change.id == entity.id));
}

#[test]
fn committed_verbs_deliver_their_changes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let ns = Namespace::new(&store);
    ns.create("Tags\\t1", "Tag", NewItemValue::None).unwrap();
    ns.create("Tags\\t2", "Tag", NewItemValue::None).unwrap();
    ns.new_item_property("Tags\\t1", "text", FacetPropertyType::String)
        .unwrap();
    let seen = record(&store);

    ns.move_item_property("Tags\\t1", "text", "Tags\\t2").unwrap();

    assert_eq!(
        summary(&seen.borrow()),
        vec![
            (ChangeAction::Updated, StoredKind::Tag),
            (ChangeAction::Updated, StoredKind::Tag),
        ]
    );
}

#[test]
fn rolled_back_scope_drops_its_changes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let seen = record(&store);
    let root = store.categories().root().unwrap();

    let result: Result<(), RepoError> = store.atomically(|| {
        store.entities().upsert(&Entity::new("e1", &root))?;
        store.entities().upsert(&Entity::new("E1", &root))?;
        Ok(())
    });

    assert!(matches!(
        result,
        Err(RepoError::DuplicateName {
            kind: StoredKind::Entity,
            ..
        })
    ));
    assert!(seen.borrow().is_empty());
    assert!(store.entities().find_by_category(root.id).unwrap().is_empty());
}

#[test]
fn nested_scopes_deliver_once_after_the_outer_commit() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let seen = record(&store);
    let root = store.categories().root().unwrap();

    let result: Result<(), RepoError> = store.atomically(|| {
        store.entities().upsert(&Entity::new("outer", &root))?;
        let inner: Result<(), RepoError> = store.atomically(|| {
            store.entities().upsert(&Entity::new("inner", &root))?;
            Err(RepoError::InvalidData("abandon inner".to_string()))
        });
        assert!(inner.is_err());
        assert!(seen.borrow().is_empty());
        Ok(())
    });
    result.unwrap();

    assert_eq!(
        summary(&seen.borrow()),
        vec![(ChangeAction::Created, StoredKind::Entity)]
    );
    let names: Vec<String> = store
        .entities()
        .find_by_category(root.id)
        .unwrap()
        .into_iter()
        .map(|entity| entity.name)
        .collect();
    assert_eq!(names, vec!["outer".to_string()]);
}

#[test]
fn failed_recursive_copy_notifies_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDomainStore::try_new(&conn).unwrap();
    let ns = Namespace::new(&store);
    ns.create("Entities\\src", "Category", NewItemValue::None)
        .unwrap();
    ns.create("Entities\\src\\e", "Entity", NewItemValue::None)
        .unwrap();
    ns.create("Entities\\dst", "Category", NewItemValue::None)
        .unwrap();
    conn.execute_batch(
        "CREATE TRIGGER fail_entity_copy
         BEFORE INSERT ON entities
         BEGIN
             SELECT RAISE(ABORT, 'forced entity copy failure');
         END;",
    )
    .unwrap();
    let seen = record(&store);

    assert!(ns.copy("Entities\\src", None, "Entities\\dst", true).is_err());

    assert!(seen.borrow().is_empty());
    assert!(ns.list("Entities\\dst").unwrap().is_empty());
}
