use ormlette::{Operation, Value};
use tests::models::*;
use tests::*;

use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

#[test]
fn custom_step_runs_in_place() {
    let (mut db, _log) = setup_all();

    db.callback_mut()
        .create()
        .before("ormlette:create", "app:shout", |scope| {
            let result = scope.each_record_mut(|record| {
                let name = record.field("name").unwrap_or_default();
                let shouted = name.as_str().unwrap_or_default().to_uppercase();
                record.set_field("name", Value::from(shouted))
            });
            if let Err(err) = result {
                scope.err(err);
            }
        })
        .unwrap();

    let mut user = User::named("jinzhu", 1);
    db.create(&mut user).result().unwrap();
    assert_eq!(user.name, "JINZHU");

    let mut stored = User::default();
    db.first(&mut stored).result().unwrap();
    assert_eq!(stored.name, "JINZHU");
}

#[test]
fn steps_see_the_statement() {
    let (mut db, _log) = setup_all();

    let seen = Arc::new(Mutex::new(vec![]));
    let sink = seen.clone();
    db.callback_mut()
        .query()
        .after("ormlette:query", "app:capture", move |scope| {
            sink.lock().unwrap().push(scope.sql().to_string());
        })
        .unwrap();

    let mut users: Vec<User> = vec![];
    db.filter(("age > ?", 1)).find(&mut users).result().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        ["SELECT * FROM \"users\" WHERE ((age > ?1))"]
    );
}

#[test]
fn registration_errors() {
    let (mut db, _log) = setup_all();
    let callbacks = db.callback_mut();

    let err = callbacks
        .create()
        .register("ormlette:create", |_| {})
        .unwrap_err();
    assert!(err.is_invalid_callback());

    let err = callbacks
        .update()
        .before("app:missing", "app:new", |_| {})
        .unwrap_err();
    assert!(err.is_invalid_callback());

    assert!(callbacks.delete().remove("app:missing").unwrap_err().is_invalid_callback());
    assert!(!callbacks.update().contains("app:new"));
}

#[test]
fn changes_stay_on_their_handle() {
    let (db, _log) = setup_all();

    let mut custom = db.clone();
    custom
        .callback_mut()
        .create()
        .remove("ormlette:update_time_stamp")
        .unwrap();

    assert!(db
        .callbacks()
        .chain(Operation::Create)
        .contains("ormlette:update_time_stamp"));

    let mut plain = User::named("plain", 1);
    db.create(&mut plain).result().unwrap();
    assert_eq!(plain.created_at, NOW);

    // handles derived from the custom one keep its pipeline
    let mut untimed = User::named("untimed", 1);
    custom.filter("1 = 1").create(&mut untimed).result().unwrap();
    assert_eq!(untimed.created_at, 0);
}

#[test]
fn an_error_stops_the_chain() {
    let (mut db, log) = setup_all();

    let after_ran = Arc::new(Mutex::new(false));
    let flag = after_ran.clone();
    db.callback_mut()
        .create()
        .before("ormlette:create", "app:deny", |scope| {
            scope.err(ormlette_core::err!("creates are disabled"));
        })
        .unwrap()
        .register("app:after", move |_| *flag.lock().unwrap() = true)
        .unwrap();

    let mut user = User::named("jinzhu", 1);
    let res = db.create(&mut user);
    assert_eq!(res.error().unwrap().to_string(), "creates are disabled");
    assert_eq!(user.id, 0);
    assert_eq!(log.count_prefix("INSERT"), 0);
    assert!(!*after_ran.lock().unwrap());
}

#[test]
fn skip_left_stops_without_error() {
    let (mut db, log) = setup_all();

    db.callback_mut()
        .delete()
        .before("ormlette:delete", "app:keep", |scope| scope.skip_left())
        .unwrap();

    let mut user = User::named("jinzhu", 1);
    db.create(&mut user).result().unwrap();

    let res = db.delete(&mut user);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 0);
    assert_eq!(log.count_prefix("DELETE"), 0);
}

#[test]
fn replace_a_default_step() {
    let (mut db, _log) = setup_all();

    db.callback_mut()
        .delete()
        .replace("ormlette:delete", |scope| {
            let table = scope.quoted_table_name();
            let filter = match scope.where_sql() {
                Ok(filter) => filter,
                Err(err) => return scope.err(err),
            };
            scope.set_sql(format!("UPDATE {table} SET \"age\" = -1{filter}"));
            scope.exec();
        })
        .unwrap();

    let mut user = User::named("jinzhu", 1);
    db.create(&mut user).result().unwrap();
    db.delete(&mut user).result().unwrap();

    let mut stored = User::default();
    db.first(&mut stored).result().unwrap();
    assert_eq!(stored.age, -1);
}

#[test]
fn hooks_on_create() {
    let (db, _log) = setup_all();

    let mut account = Account {
        name: "main".to_string(),
        ..Account::default()
    };
    db.create(&mut account).result().unwrap();

    assert_eq!(
        account.calls,
        ["before_save", "before_create", "after_create", "after_save"]
    );
    assert_eq!(account.status, "active");

    let mut stored = Account::default();
    db.first(&mut stored).result().unwrap();
    assert_eq!(stored.status, "active");
    assert_eq!(stored.calls, ["after_find"]);
}

#[test]
fn hooks_on_update_and_delete() {
    let (db, _log) = setup_all();

    let mut account = Account {
        name: "main".to_string(),
        ..Account::default()
    };
    db.create(&mut account).result().unwrap();

    account.calls.clear();
    account.status = "closed".to_string();
    db.save(&mut account).result().unwrap();
    assert_eq!(
        account.calls,
        ["before_save", "before_update", "after_update", "after_save"]
    );

    account.calls.clear();
    db.update_column(&mut account, "status", "frozen").result().unwrap();
    assert!(account.calls.is_empty());

    db.delete(&mut account).result().unwrap();
    assert_eq!(account.calls, ["before_delete", "after_delete"]);
}

#[test]
fn hook_error_aborts_the_update() {
    let (db, log) = setup_all();

    let mut account = Account {
        name: "main".to_string(),
        ..Account::default()
    };
    db.create(&mut account).result().unwrap();
    log.clear();

    let res = db.updates(&mut account, ormlette::attrs! { "name" => "" });
    let err = res.error().unwrap();
    assert_eq!(err.to_string(), "account name can't be blank");
    assert_eq!(log.count_prefix("UPDATE"), 0);
    assert!(!account.calls.contains(&"after_update"));

    let mut stored = Account::default();
    db.first(&mut stored).result().unwrap();
    assert_eq!(stored.name, "main");
}

#[test]
fn after_find_runs_for_every_record() {
    let (db, _log) = setup_all();

    let mut accounts = vec![
        Account {
            name: "a".to_string(),
            ..Account::default()
        },
        Account {
            name: "b".to_string(),
            ..Account::default()
        },
    ];
    db.create(&mut accounts).result().unwrap();

    let mut loaded: Vec<Account> = vec![];
    db.find(&mut loaded).result().unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.iter().all(|account| account.calls == ["after_find"]));
}
