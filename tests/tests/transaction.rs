use ormlette::Db;
use tests::models::*;
use tests::*;

use pretty_assertions::assert_eq;

fn user_count(db: &Db) -> i64 {
    let mut count = 0;
    db.model(&User::default()).count(&mut count).result().unwrap();
    count
}

#[test]
fn rollback_discards_writes() {
    let (db, log) = setup_all();

    let tx = db.begin();
    tx.result().unwrap();
    tx.create(&mut User::named("jinzhu", 1)).result().unwrap();
    assert_eq!(user_count(&tx), 1);

    tx.rollback().result().unwrap();
    assert_eq!(user_count(&db), 0);
    assert!(log.count_prefix("INSERT") > 0);
}

#[test]
fn commit_keeps_writes() {
    let (db, _log) = setup_all();

    let tx = db.begin();
    let mut user = User::named("jinzhu", 1);
    tx.create(&mut user).result().unwrap();
    tx.commit().result().unwrap();

    assert_eq!(user_count(&db), 1);
}

#[test]
fn finishing_without_a_transaction() {
    let (db, _log) = setup_all();

    assert!(db.commit().error().unwrap().is_no_valid_transaction());
    assert!(db.rollback().error().unwrap().is_no_valid_transaction());
}

#[test]
fn nested_begin_is_rejected() {
    let (db, _log) = setup_all();

    let tx = db.begin();
    let nested = tx.begin();
    assert!(nested.error().unwrap().is_cant_start_transaction());

    tx.rollback().result().unwrap();
}

#[test]
fn transaction_commits_on_ok() {
    let (db, _log) = setup_all();

    let id = db
        .transaction(|tx| {
            let mut user = User::named("jinzhu", 1);
            tx.create(&mut user).result()?;
            tx.create(&mut User::named("other", 2)).result()?;
            Ok(user.id)
        })
        .unwrap();

    assert!(id > 0);
    assert_eq!(user_count(&db), 2);
}

#[test]
fn transaction_rolls_back_on_err() {
    let (db, _log) = setup_all();

    let err = db
        .transaction(|tx| {
            tx.create(&mut User::named("jinzhu", 1)).result()?;

            let mut duplicate = Language {
                code: "en".to_string(),
                ..Language::default()
            };
            tx.create(&mut duplicate).result()?;
            duplicate.id = 0;
            tx.create(&mut duplicate).result()?;
            Ok(())
        })
        .unwrap_err();

    assert!(err.is_driver_operation_failed());
    assert_eq!(user_count(&db), 0);

    let mut languages: Vec<Language> = vec![];
    db.find(&mut languages).result().unwrap();
    assert!(languages.is_empty());
}

#[test]
fn handle_is_usable_after_a_transaction() {
    let (db, _log) = setup_all();

    let tx = db.begin();
    tx.create(&mut User::named("in tx", 1)).result().unwrap();
    tx.commit().result().unwrap();

    let tx = db.begin();
    tx.result().unwrap();
    tx.create(&mut User::named("second tx", 1)).result().unwrap();
    tx.commit().result().unwrap();

    assert_eq!(user_count(&db), 2);
}

#[test]
fn writes_outside_a_transaction_survive_its_rollback() {
    let (db, _log) = setup_all();

    let tx = db.begin();
    tx.result().unwrap();
    db.create(&mut User::named("outside", 1)).result().unwrap();
    tx.rollback().result().unwrap();

    assert_eq!(user_count(&db), 1);
}

#[test]
fn finished_transactions_cannot_be_finished_again() {
    let (db, _log) = setup_all();

    let tx = db.begin();
    tx.create(&mut User::named("jinzhu", 1)).result().unwrap();
    tx.commit().result().unwrap();

    assert!(tx.commit().error().unwrap().is_no_valid_transaction());
    assert!(tx.rollback().error().unwrap().is_no_valid_transaction());
    assert!(tx.begin().error().unwrap().is_cant_start_transaction());
    assert_eq!(user_count(&db), 1);
}

#[test]
fn transactions_from_the_same_handle_are_independent() {
    let (db, _log) = setup_all();

    let first = db.begin();
    first.result().unwrap();
    let second = db.begin();
    second.result().unwrap();

    second.rollback().result().unwrap();
    first.rollback().result().unwrap();
    assert!(db.commit().error().unwrap().is_no_valid_transaction());
}
