use ormlette::{attrs, Expr, Value};
use tests::models::*;
use tests::*;

use pretty_assertions::assert_eq;

#[test]
fn create_assigns_key_and_timestamps() {
    let (db, log) = setup_all();

    let mut user = User::named("jinzhu", 18);
    let res = db.create(&mut user);
    res.result().unwrap();

    assert!(user.id > 0);
    assert_eq!(res.rows_affected(), 1);
    assert_eq!(user.created_at, NOW);
    assert_eq!(user.updated_at, NOW);
    assert!(!db.new_record(&user));
    assert_eq!(log.count_prefix("INSERT INTO \"users\""), 1);

    let mut found = User::default();
    db.first(&mut found).result().unwrap();
    assert_eq!(found, user);
}

#[test]
fn create_collection_inserts_each_record() {
    let (db, _log) = setup_all();

    let mut users = vec![User::named("a", 1), User::named("b", 2), User::named("c", 3)];
    let res = db.create(&mut users);
    res.result().unwrap();

    assert_eq!(res.rows_affected(), 3);
    assert!(users.iter().all(|user| user.id > 0));

    let mut count = 0;
    db.model(&User::default()).count(&mut count).result().unwrap();
    assert_eq!(count, 3);
}

#[test]
fn first_last_find() {
    let (db, log) = setup_all();

    let mut users = vec![User::named("a", 30), User::named("b", 20), User::named("c", 10)];
    db.create(&mut users).result().unwrap();
    log.clear();

    let mut first = User::default();
    db.first(&mut first).result().unwrap();
    assert_eq!(first.name, "a");
    assert!(log.any_contains("ORDER BY \"users\".\"id\" ASC LIMIT 1"));

    let mut last = User::default();
    db.last(&mut last).result().unwrap();
    assert_eq!(last.name, "c");

    // caller orders come before the implicit key order
    let mut youngest = User::default();
    db.order("age").first(&mut youngest).result().unwrap();
    assert_eq!(youngest.name, "c");
    assert!(log.any_contains("ORDER BY age, \"users\".\"id\" ASC"));

    let mut all: Vec<User> = vec![];
    db.find(&mut all).result().unwrap();
    assert_eq!(all.len(), 3);

    let mut by_key = User::default();
    db.first_where(&mut by_key, users[1].id).result().unwrap();
    assert_eq!(by_key.name, "b");

    let mut found: Vec<User> = vec![];
    db.find_where(&mut found, ("age > ?", 15)).result().unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn missing_record_is_record_not_found() {
    let (db, _log) = setup_all();

    let mut user = User::default();
    let res = db.first(&mut user);
    assert!(res.record_not_found());
    assert!(res.error().unwrap().is_record_not_found());
    assert_eq!(user, User::default());

    // collections and optional records come back empty instead
    let mut users: Vec<User> = vec![];
    db.find(&mut users).result().unwrap();
    assert!(users.is_empty());

    let mut maybe: Option<User> = None;
    db.first(&mut maybe).result().unwrap();
    assert!(maybe.is_none());
}

#[test]
fn save_routes_on_primary_key() {
    let (db, log) = setup_all();

    let mut user = User::named("jinzhu", 18);
    db.save(&mut user).result().unwrap();
    assert!(user.id > 0);
    assert_eq!(log.count_prefix("INSERT"), 1);

    user.age = 19;
    let res = db.save(&mut user);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 1);
    assert_eq!(log.count_prefix("UPDATE \"users\""), 1);

    // a key set by hand is an update, even though no row exists yet
    let mut ghost = User {
        id: 999,
        ..User::named("ghost", 1)
    };
    let res = db.save(&mut ghost);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 0);
    assert_eq!(log.count_prefix("INSERT"), 1);

    let mut count = 0;
    db.model(&User::default()).count(&mut count).result().unwrap();
    assert_eq!(count, 1);
}

#[test]
fn updates_skip_unchanged_attributes() {
    let (db, log) = setup_all();

    let mut user = User::named("jinzhu", 18);
    db.create(&mut user).result().unwrap();
    log.clear();

    let res = db.updates(&mut user, attrs! { "name" => "jinzhu", "age" => 18 });
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 0);
    assert_eq!(log.count_prefix("UPDATE"), 0);

    let res = db.updates(&mut user, attrs! { "name" => "jinzhu 2", "age" => 18 });
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 1);
    assert_eq!(user.name, "jinzhu 2");

    let stmt = log.last().unwrap();
    assert!(stmt.sql.starts_with("UPDATE \"users\" SET \"name\" = ?1, \"updated_at\" = ?2"));
    assert_eq!(stmt.params[0], ormlette::Value::from("jinzhu 2"));

    let mut reloaded = User::default();
    db.first_where(&mut reloaded, user.id).result().unwrap();
    assert_eq!(reloaded.name, "jinzhu 2");
    assert_eq!(reloaded.age, 18);
}

#[test]
fn update_single_column() {
    let (db, _log) = setup_all();

    let mut user = User::named("jinzhu", 18);
    db.create(&mut user).result().unwrap();

    db.update(&mut user, "age", 30).result().unwrap();
    assert_eq!(user.age, 30);

    let mut ages: Vec<i64> = vec![];
    db.model(&User::default()).pluck("age", &mut ages).result().unwrap();
    assert_eq!(ages, vec![30]);
}

#[test]
fn primary_key_is_protected_in_updates() {
    let (db, log) = setup_all();

    let mut user = User::named("jinzhu", 18);
    db.create(&mut user).result().unwrap();
    let id = user.id;
    log.clear();

    db.updates(&mut user, attrs! { "id" => id + 100 }).result().unwrap();
    assert_eq!(user.id, id);
    assert_eq!(log.count_prefix("UPDATE"), 0);
}

#[test]
fn update_columns_skip_timestamps() {
    let (db, log) = setup_all();

    let mut user = User {
        updated_at: 1,
        created_at: 1,
        ..User::named("jinzhu", 18)
    };
    db.create(&mut user).result().unwrap();
    log.clear();

    db.update_column(&mut user, "name", "other").result().unwrap();
    assert_eq!(user.name, "other");
    assert_eq!(user.updated_at, 1);

    let stmt = log.last().unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE \"users\" SET \"name\" = ?1 WHERE \"users\".\"id\" = ?2"
    );
}

#[test]
fn update_all_matching_rows() {
    let (db, _log) = setup_all();

    let mut users = vec![User::named("a", 10), User::named("b", 20), User::named("c", 30)];
    db.create(&mut users).result().unwrap();

    let res = db
        .model(&User::default())
        .filter(("age >= ?", 20))
        .update_all(attrs! { "age" => 0 });
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 2);

    let mut count = 0;
    db.model(&User::default())
        .filter(attrs! { "age" => 0 })
        .count(&mut count)
        .result()
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn expressions_are_computed_by_the_database() {
    let (db, log) = setup_all();

    let mut user = User::named("jinzhu", 18);
    db.create(&mut user).result().unwrap();
    log.clear();

    db.update(&mut user, "age", Expr::new("age + ?", vec![Value::from(5)]))
        .result()
        .unwrap();
    assert!(log.last().unwrap().sql.starts_with("UPDATE \"users\" SET \"age\" = age + ?1, "));
    assert_eq!(user.age, 18);

    let mut reloaded = User::default();
    db.first_where(&mut reloaded, user.id).result().unwrap();
    assert_eq!(reloaded.age, 23);

    db.model(&User::default())
        .update_all(attrs! { "age" => Expr::new("age * 2", vec![]) })
        .result()
        .unwrap();

    let mut count = 0;
    db.model(&User::default())
        .filter(attrs! { "age" => Expr::new("? + ?", vec![Value::from(40), Value::from(6)]) })
        .count(&mut count)
        .result()
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn delete_records() {
    let (db, _log) = setup_all();

    let mut users = vec![User::named("a", 10), User::named("b", 20), User::named("c", 30)];
    db.create(&mut users).result().unwrap();

    let res = db.delete(&mut users[0]);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 1);

    let res = db.delete_where(&mut User::default(), attrs! { "age" => 20 });
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 1);

    let mut rest: Vec<User> = vec![];
    db.find(&mut rest).result().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name, "c");
}

#[test]
fn collections_are_restricted_to_their_keys() {
    let (db, _log) = setup_all();

    let mut users = vec![User::named("a", 10), User::named("b", 20), User::named("c", 30)];
    db.create(&mut users).result().unwrap();

    let mut some = users[..2].to_vec();
    let res = db.delete(&mut some);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 2);

    // an empty collection matches nothing
    let mut none: Vec<User> = vec![];
    let res = db.delete(&mut none);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 0);

    let mut count = 0;
    db.model(&User::default()).count(&mut count).result().unwrap();
    assert_eq!(count, 1);
}

#[test]
fn create_ignore_keeps_existing_rows() {
    let (db, log) = setup_all();

    let mut english = Language {
        code: "en".to_string(),
        ..Language::default()
    };
    db.create(&mut english).result().unwrap();

    let mut duplicate = Language {
        id: english.id,
        code: "en".to_string(),
    };
    let res = db.create_ignore(&mut duplicate);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 0);
    assert!(log.any_contains("INSERT OR IGNORE INTO \"languages\""));

    let res = db.create(&mut duplicate);
    assert!(res.error().is_some());
}
