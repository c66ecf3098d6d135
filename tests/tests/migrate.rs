use ormlette::settings::TABLE_OPTIONS;
use ormlette::{attrs, Db, Record, Value};
use tests::models::*;
use tests::*;

use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Default, PartialEq, Record)]
#[table = "widgets"]
struct WidgetV1 {
    #[key]
    #[auto]
    id: i64,

    name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
#[table = "widgets"]
struct WidgetV2 {
    #[key]
    #[auto]
    id: i64,

    name: String,

    #[index]
    color: Option<String>,

    #[column("weight_kg")]
    weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct Gadget {
    #[key]
    #[auto(uuid)]
    id: String,

    #[column(type = "varchar(20)")]
    code: String,
}

fn has_index(db: &Db, name: &str) -> bool {
    let mut count = 0;
    db.table("sqlite_master")
        .filter(attrs! { "type" => "index", "name" => name })
        .count(&mut count)
        .result()
        .unwrap();
    count > 0
}

fn column_type(db: &Db, table: &str, column: &str) -> Option<Value> {
    let row = db
        .raw((
            format!("SELECT type FROM pragma_table_info('{table}') WHERE name = ?"),
            column,
        ))
        .row()
        .unwrap()?;
    row.get("type").cloned()
}

#[test]
fn create_and_drop_tables() {
    let db = setup();

    assert!(!db.has_table::<Gadget>());
    db.create_table::<Gadget>().result().unwrap();
    assert!(db.has_table::<Gadget>());

    let err = db.create_table::<Gadget>().error().cloned().unwrap();
    assert!(err.is_driver_operation_failed());

    db.drop_table::<Gadget>().result().unwrap();
    assert!(!db.has_table::<Gadget>());

    let err = db.drop_table::<Gadget>().error().cloned().unwrap();
    assert!(err.is_driver_operation_failed());

    db.drop_table_if_exists::<Gadget>().result().unwrap();
}

#[test]
fn create_table_statement() {
    let (db, log) = setup_logged();

    db.create_table::<WidgetV2>().result().unwrap();
    let sql = log.sql();
    assert!(sql[0].starts_with("CREATE TABLE \"widgets\" (\"id\" "));
    assert!(sql[0].contains("\"weight_kg\" "));
    assert!(has_index(&db, "idx_widgets_color"));
}

#[test]
fn declared_indexes_are_created() {
    let (db, _log) = setup_all();

    assert!(has_index(&db, "idx_users_name"));
    assert!(has_index(&db, "uix_users_email"));
    assert!(has_index(&db, "idx_posts_user_id"));
    assert!(has_index(&db, "uix_languages_code"));

    let mut first = User {
        email: Some("same@example.com".to_string()),
        ..User::named("a", 1)
    };
    db.create(&mut first).result().unwrap();
    let mut second = User {
        email: Some("same@example.com".to_string()),
        ..User::named("b", 1)
    };
    assert!(db.create(&mut second).error().is_some());
}

#[test]
fn auto_migrate_adds_missing_columns() {
    let (db, log) = setup_logged();

    db.auto_migrate::<WidgetV1>().result().unwrap();
    let mut old = WidgetV1 {
        name: "old".to_string(),
        ..WidgetV1::default()
    };
    db.create(&mut old).result().unwrap();
    log.clear();

    db.auto_migrate::<WidgetV2>().result().unwrap();
    assert_eq!(log.count_prefix("ALTER TABLE \"widgets\" ADD"), 2);
    assert_eq!(log.count_prefix("CREATE TABLE"), 0);
    assert!(has_index(&db, "idx_widgets_color"));

    // existing rows read the new columns as their zero values
    let mut widgets: Vec<WidgetV2> = vec![];
    db.find(&mut widgets).result().unwrap();
    assert_eq!(
        widgets,
        [WidgetV2 {
            id: old.id,
            name: "old".to_string(),
            color: None,
            weight: 0.0,
        }]
    );

    let mut new = WidgetV2 {
        name: "new".to_string(),
        color: Some("red".to_string()),
        weight: 1.5,
        ..WidgetV2::default()
    };
    db.create(&mut new).result().unwrap();

    let mut loaded = WidgetV2::default();
    db.first_where(&mut loaded, new.id).result().unwrap();
    assert_eq!(loaded, new);
}

#[test]
fn auto_migrate_is_idempotent() {
    let (db, log) = setup_logged();

    db.auto_migrate::<WidgetV2>().result().unwrap();
    log.clear();

    db.auto_migrate::<WidgetV2>().result().unwrap();
    assert_eq!(log.count_prefix("CREATE"), 0);
    assert_eq!(log.count_prefix("ALTER"), 0);
}

#[test]
fn custom_column_type_and_uuid_key() {
    let db = setup();
    db.auto_migrate::<Gadget>().result().unwrap();

    assert_eq!(
        column_type(&db, "gadgets", "code"),
        Some(Value::from("varchar(20)"))
    );

    let mut gadget = Gadget {
        code: "g-1".to_string(),
        ..Gadget::default()
    };
    db.create(&mut gadget).result().unwrap();
    assert_eq!(gadget.id.len(), 36);

    let mut loaded = Gadget::default();
    db.first(&mut loaded).result().unwrap();
    assert_eq!(loaded, gadget);
}

#[test]
fn table_options_are_appended() {
    let (db, log) = setup_logged();

    db.set(TABLE_OPTIONS, "WITHOUT ROWID".to_string())
        .create_table::<Gadget>()
        .result()
        .unwrap();
    assert!(log.sql()[0].ends_with(") WITHOUT ROWID"));
}

#[test]
fn add_and_remove_indexes() {
    let (db, _log) = setup_all();
    let users = db.model(&User::default());

    users.add_index("idx_users_age", &["age"]).result().unwrap();
    assert!(has_index(&db, "idx_users_age"));

    let err = users.add_index("idx_users_age", &["age"]).error().cloned().unwrap();
    assert!(err.to_string().contains("already exists"));

    users.remove_index("idx_users_age").result().unwrap();
    assert!(!has_index(&db, "idx_users_age"));

    users
        .add_unique_index("uix_users_name_age", &["name", "age"])
        .result()
        .unwrap();
    db.create(&mut User::named("a", 1)).result().unwrap();
    assert!(db.create(&mut User::named("a", 1)).error().is_some());
    db.create(&mut User::named("a", 2)).result().unwrap();
}

#[test]
fn drop_column() {
    let db = setup();
    db.auto_migrate::<WidgetV2>().result().unwrap();

    db.table("widgets").drop_column("weight_kg").result().unwrap();
    assert_eq!(column_type(&db, "widgets", "weight_kg"), None);
}

#[test]
fn sqlite_cannot_alter_columns_or_foreign_keys() {
    let (db, log) = setup_all();
    let posts = db.model(&Post::default());

    let err = posts.modify_column("title", "varchar(10)").error().cloned().unwrap();
    assert!(err.is_dialect_unsupported());

    let err = posts
        .add_foreign_key("user_id", "users(id)", "CASCADE", "CASCADE")
        .error()
        .cloned()
        .unwrap();
    assert!(err.is_dialect_unsupported());

    assert!(log.is_empty());
}

#[test]
fn migrations_need_a_model() {
    let (db, log) = setup_logged();

    let err = db.drop_column("anything").error().cloned().unwrap();
    assert_eq!(err.to_string(), "migrations need a model or a table");

    let err = db.add_index("idx_anything", &["a"]).error().cloned().unwrap();
    assert_eq!(err.to_string(), "migrations need a model or a table");
    assert!(log.is_empty());
}
