use ormlette::Db;
use tests::models::*;
use tests::*;

use pretty_assertions::assert_eq;

fn note(db: &Db, body: &str) -> Note {
    let mut note = Note {
        body: body.to_string(),
        ..Note::default()
    };
    db.create(&mut note).result().unwrap();
    note
}

#[test]
fn delete_marks_the_row() {
    let (db, log) = setup_all();

    let mut first = note(&db, "first");
    note(&db, "second");
    log.clear();

    let res = db.delete(&mut first);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 1);
    assert_eq!(
        log.last().unwrap().sql,
        "UPDATE \"notes\" SET \"deleted_at\" = ?1 WHERE \"notes\".\"deleted_at\" IS NULL AND \"notes\".\"id\" = ?2"
    );

    let mut notes: Vec<Note> = vec![];
    db.find(&mut notes).result().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].body, "second");

    let mut count = 0;
    db.model(&Note::default()).count(&mut count).result().unwrap();
    assert_eq!(count, 1);

    let mut found = Note::default();
    assert!(db.first_where(&mut found, first.id).record_not_found());
}

#[test]
fn unscoped_sees_deleted_rows() {
    let (db, _log) = setup_all();

    let mut first = note(&db, "first");
    db.delete(&mut first).result().unwrap();

    let mut notes: Vec<Note> = vec![];
    db.unscoped().find(&mut notes).result().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].deleted_at, Some(NOW));
}

#[test]
fn deleting_twice_affects_nothing() {
    let (db, _log) = setup_all();

    let mut first = note(&db, "first");
    db.delete(&mut first).result().unwrap();

    let res = db.delete(&mut first);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 0);
}

#[test]
fn unscoped_delete_removes_the_row() {
    let (db, log) = setup_all();

    let mut first = note(&db, "first");
    db.delete(&mut first).result().unwrap();
    log.clear();

    let res = db.unscoped().delete(&mut first);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 1);
    assert_eq!(
        log.last().unwrap().sql,
        "DELETE FROM \"notes\" WHERE \"notes\".\"id\" = ?1"
    );

    let mut count = 0;
    db.unscoped()
        .model(&Note::default())
        .count(&mut count)
        .result()
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn updates_skip_deleted_rows() {
    let (db, _log) = setup_all();

    note(&db, "kept");
    let mut deleted = note(&db, "deleted");
    db.delete(&mut deleted).result().unwrap();

    let res = db
        .model(&Note::default())
        .update_all(ormlette::attrs! { "body" => "changed" });
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 1);

    let mut bodies: Vec<String> = vec![];
    db.unscoped()
        .model(&Note::default())
        .order("id")
        .pluck("body", &mut bodies)
        .result()
        .unwrap();
    assert_eq!(bodies, ["changed", "deleted"]);
}
