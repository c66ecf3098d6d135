use ormlette::settings::SAVE_ASSOCIATIONS;
use ormlette::{Condition, Db};
use tests::models::*;
use tests::*;

use pretty_assertions::assert_eq;

fn post(title: &str, comments: &[&str]) -> Post {
    Post {
        title: title.to_string(),
        comments: comments
            .iter()
            .map(|body| Comment {
                body: body.to_string(),
                ..Comment::default()
            })
            .collect(),
        ..Post::default()
    }
}

fn language(code: &str) -> Language {
    Language {
        code: code.to_string(),
        ..Language::default()
    }
}

/// A user with one record in every association.
fn full_user(name: &str) -> User {
    User {
        company: Some(Company {
            name: format!("{name} inc"),
            ..Company::default()
        }),
        posts: vec![post("first", &["nice", "meh"]), post("second", &[])],
        profile: Some(Profile {
            bio: format!("about {name}"),
            ..Profile::default()
        }),
        languages: vec![language(&format!("{name}-en")), language(&format!("{name}-fr"))],
        ..User::named(name, 30)
    }
}

fn count_table(db: &Db, table: &str) -> i64 {
    let mut count = 0;
    db.table(table).count(&mut count).result().unwrap();
    count
}

#[test]
fn create_saves_every_association() {
    let (db, _log) = setup_all();

    let mut user = full_user("jinzhu");
    db.create(&mut user).result().unwrap();
    assert!(user.id > 0);

    // belongs-to is saved first and its key copied onto the owner
    let company = user.company.as_ref().unwrap();
    assert!(company.id > 0);
    assert_eq!(user.company_id, Some(company.id));

    assert!(user.posts.iter().all(|post| post.id > 0 && post.user_id == user.id));
    let first = &user.posts[0];
    assert_eq!(first.comments.len(), 2);
    assert!(first.comments.iter().all(|comment| comment.post_id == first.id));

    assert_eq!(user.profile.as_ref().unwrap().user_id, user.id);
    assert!(user.languages.iter().all(|language| language.id > 0));

    assert_eq!(count_table(&db, "companies"), 1);
    assert_eq!(count_table(&db, "posts"), 2);
    assert_eq!(count_table(&db, "comments"), 2);
    assert_eq!(count_table(&db, "profiles"), 1);
    assert_eq!(count_table(&db, "languages"), 2);
    assert_eq!(count_table(&db, "user_languages"), 2);
}

#[test]
fn create_reports_only_the_owner_row() {
    let (db, _log) = setup_all();

    let mut user = full_user("jinzhu");
    let res = db.create(&mut user);
    res.result().unwrap();
    assert_eq!(res.rows_affected(), 1);
}

#[test]
fn blank_associations_are_skipped() {
    let (db, _log) = setup_all();

    let mut user = User {
        company: Some(Company::default()),
        posts: vec![Post::default()],
        ..User::named("jinzhu", 30)
    };
    db.create(&mut user).result().unwrap();

    assert_eq!(user.company_id, None);
    assert_eq!(count_table(&db, "companies"), 0);
    assert_eq!(count_table(&db, "posts"), 0);
}

#[test]
fn saving_again_does_not_duplicate_links() {
    let (db, _log) = setup_all();

    let mut user = full_user("jinzhu");
    db.create(&mut user).result().unwrap();

    user.posts.push(post("third", &["late"]));
    user.age = 31;
    db.save(&mut user).result().unwrap();

    assert!(user.posts[2].id > 0);
    assert_eq!(count_table(&db, "posts"), 3);
    assert_eq!(count_table(&db, "comments"), 3);
    assert_eq!(count_table(&db, "languages"), 2);
    assert_eq!(count_table(&db, "user_languages"), 2);
}

#[test]
fn association_saves_can_be_disabled() {
    let (db, _log) = setup_all();

    let mut user = full_user("jinzhu");
    db.set(SAVE_ASSOCIATIONS, false).create(&mut user).result().unwrap();

    assert!(user.id > 0);
    assert_eq!(user.company_id, None);
    assert_eq!(count_table(&db, "companies"), 0);
    assert_eq!(count_table(&db, "posts"), 0);
    assert_eq!(count_table(&db, "user_languages"), 0);
}

#[test]
fn update_column_skips_associations() {
    let (db, _log) = setup_all();

    let mut user = User::named("jinzhu", 30);
    db.create(&mut user).result().unwrap();

    user.posts.push(post("not saved", &[]));
    db.update_column(&mut user, "age", 40).result().unwrap();
    assert_eq!(count_table(&db, "posts"), 0);
}

#[test]
fn preload_every_kind() {
    let (db, log) = setup_all();

    let mut jinzhu = full_user("jinzhu");
    let mut other = full_user("other");
    db.create(&mut jinzhu).result().unwrap();
    db.create(&mut other).result().unwrap();
    log.clear();

    let mut users: Vec<User> = vec![];
    db.preload("company")
        .preload("posts")
        .preload("profile")
        .preload("languages")
        .order("id")
        .find(&mut users)
        .result()
        .unwrap();

    // one query for the users and one per association
    assert_eq!(log.count_prefix("SELECT"), 5);

    assert_eq!(users.len(), 2);
    for (loaded, saved) in users.iter().zip([&jinzhu, &other]) {
        assert_eq!(loaded.company.as_ref().unwrap().name, saved.company.as_ref().unwrap().name);
        assert_eq!(loaded.profile.as_ref().unwrap().bio, saved.profile.as_ref().unwrap().bio);

        let titles: Vec<_> = loaded.posts.iter().map(|post| post.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
        assert!(loaded.posts.iter().all(|post| post.comments.is_empty()));

        let mut codes: Vec<_> = loaded.languages.iter().map(|l| l.code.clone()).collect();
        codes.sort();
        let mut expected: Vec<_> = saved.languages.iter().map(|l| l.code.clone()).collect();
        expected.sort();
        assert_eq!(codes, expected);
    }
}

#[test]
fn preload_nested() {
    let (db, _log) = setup_all();

    let mut jinzhu = full_user("jinzhu");
    db.create(&mut jinzhu).result().unwrap();

    let mut user = User::default();
    db.preload("posts.comments").first(&mut user).result().unwrap();

    assert_eq!(user.posts.len(), 2);
    let bodies: Vec<_> = user.posts[0]
        .comments
        .iter()
        .map(|comment| comment.body.as_str())
        .collect();
    assert_eq!(bodies, ["nice", "meh"]);
    assert!(user.posts[1].comments.is_empty());
}

#[test]
fn preload_with_conditions() {
    let (db, _log) = setup_all();

    let mut jinzhu = full_user("jinzhu");
    db.create(&mut jinzhu).result().unwrap();

    let mut user = User::default();
    db.preload_with("posts", [Condition::from(("title = ?", "second"))])
        .first(&mut user)
        .result()
        .unwrap();

    assert_eq!(user.posts.len(), 1);
    assert_eq!(user.posts[0].title, "second");
}

#[test]
fn preload_without_matches_leaves_empty_associations() {
    let (db, _log) = setup_all();

    let mut plain = User::named("plain", 1);
    db.create(&mut plain).result().unwrap();

    let mut users: Vec<User> = vec![];
    db.preload("posts")
        .preload("company")
        .preload("languages")
        .find(&mut users)
        .result()
        .unwrap();
    assert!(users[0].posts.is_empty());
    assert!(users[0].company.is_none());
    assert!(users[0].languages.is_empty());
}

#[test]
fn preload_unknown_field() {
    let (db, _log) = setup_all();

    db.create(&mut User::named("jinzhu", 1)).result().unwrap();

    let mut users: Vec<User> = vec![];
    let res = db.preload("nope").find(&mut users);
    assert!(res.error().unwrap().is_invalid_association());

    let res = db.preload("name").find(&mut users);
    assert!(res.error().unwrap().is_invalid_association());
}

#[test]
fn related_loads_each_kind() {
    let (db, _log) = setup_all();

    let mut user = full_user("jinzhu");
    db.create(&mut user).result().unwrap();
    let mut other = full_user("other");
    db.create(&mut other).result().unwrap();

    let owner = db.model(&user);

    let mut posts: Vec<Post> = vec![];
    owner.related(&mut posts).result().unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|post| post.user_id == user.id));

    let mut company = Company::default();
    owner.related(&mut company).result().unwrap();
    assert_eq!(company.name, "jinzhu inc");

    let mut profile = Profile::default();
    owner.related(&mut profile).result().unwrap();
    assert_eq!(profile.bio, "about jinzhu");

    let mut languages: Vec<Language> = vec![];
    owner.related(&mut languages).result().unwrap();
    let mut codes: Vec<_> = languages.iter().map(|l| l.code.as_str()).collect();
    codes.sort();
    assert_eq!(codes, ["jinzhu-en", "jinzhu-fr"]);

    let mut comments: Vec<Comment> = vec![];
    db.model(&user.posts[0]).related(&mut comments).result().unwrap();
    assert_eq!(comments.len(), 2);
}

#[test]
fn related_without_association() {
    let (db, _log) = setup_all();

    let mut user = User::named("jinzhu", 1);
    db.create(&mut user).result().unwrap();

    let mut notes: Vec<Note> = vec![];
    let res = db.model(&user).related(&mut notes);
    assert!(res.error().unwrap().is_invalid_association());

    let res = db.related(&mut notes);
    assert!(res.error().unwrap().is_invalid_association());
}
