use ormlette::Db;
use tests::models::*;
use tests::*;

use pretty_assertions::assert_eq;

fn post(title: &str) -> Post {
    Post {
        title: title.to_string(),
        ..Post::default()
    }
}

fn language(code: &str) -> Language {
    Language {
        code: code.to_string(),
        ..Language::default()
    }
}

fn seeded(db: &Db) -> User {
    let mut user = User {
        posts: vec![post("a"), post("b")],
        profile: Some(Profile {
            bio: "bio".to_string(),
            ..Profile::default()
        }),
        languages: vec![language("en"), language("fr")],
        company: Some(Company {
            name: "acme".to_string(),
            ..Company::default()
        }),
        ..User::named("jinzhu", 18)
    };
    db.create(&mut user).result().unwrap();
    user
}

#[test]
fn find_and_count() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    let association = db.model(&user).association("posts");
    association.result().unwrap();
    assert_eq!(association.count().unwrap(), 2);

    let mut posts: Vec<Post> = vec![];
    association.find(&mut posts).result().unwrap();
    assert_eq!(posts.len(), 2);

    assert_eq!(db.model(&user).association("languages").count().unwrap(), 2);
    assert_eq!(db.model(&user).association("profile").count().unwrap(), 1);
    assert_eq!(db.model(&user).association("company").count().unwrap(), 1);

    let mut languages: Vec<Language> = vec![];
    db.model(&user)
        .association("languages")
        .find(&mut languages)
        .result()
        .unwrap();
    assert_eq!(languages.len(), 2);
}

#[test]
fn append_has_many() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    let mut extra = vec![post("c")];
    db.model(&user)
        .association("posts")
        .append(&mut extra)
        .result()
        .unwrap();

    assert!(extra[0].id > 0);
    assert_eq!(extra[0].user_id, user.id);
    assert_eq!(db.model(&user).association("posts").count().unwrap(), 3);
}

#[test]
fn append_many_to_many_links_existing_records() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    let mut other = User::named("other", 20);
    db.create(&mut other).result().unwrap();

    // link the languages of the first user, plus a new one
    let mut languages = user.languages.clone();
    languages.push(language("de"));
    db.model(&other)
        .association("languages")
        .append(&mut languages)
        .result()
        .unwrap();
    assert!(languages[2].id > 0);

    assert_eq!(db.model(&other).association("languages").count().unwrap(), 3);
    assert_eq!(db.model(&user).association("languages").count().unwrap(), 2);

    // appending again does not duplicate the links
    db.model(&other)
        .association("languages")
        .append(&mut languages)
        .result()
        .unwrap();
    assert_eq!(db.model(&other).association("languages").count().unwrap(), 3);
}

#[test]
fn replace_has_many() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    let mut replacement = vec![post("only")];
    db.model(&user)
        .association("posts")
        .replace(&mut replacement)
        .result()
        .unwrap();

    let mut posts: Vec<Post> = vec![];
    db.model(&user).association("posts").find(&mut posts).result().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "only");

    // the detached posts are kept, without an owner
    let mut all: Vec<Post> = vec![];
    db.find(&mut all).result().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.iter().filter(|post| post.user_id == 0).count(), 2);
}

#[test]
fn replace_many_to_many() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    let mut keep = vec![user.languages[1].clone(), language("de")];
    db.model(&user)
        .association("languages")
        .replace(&mut keep)
        .result()
        .unwrap();

    let mut languages: Vec<Language> = vec![];
    db.model(&user)
        .association("languages")
        .find(&mut languages)
        .result()
        .unwrap();
    let mut codes: Vec<_> = languages.iter().map(|l| l.code.as_str()).collect();
    codes.sort();
    assert_eq!(codes, ["de", "fr"]);

    let mut all: Vec<Language> = vec![];
    db.find(&mut all).result().unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn delete_detaches_only_the_given_records() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    db.model(&user)
        .association("languages")
        .delete(&user.languages[0])
        .result()
        .unwrap();
    assert_eq!(db.model(&user).association("languages").count().unwrap(), 1);

    db.model(&user)
        .association("posts")
        .delete(&user.posts)
        .result()
        .unwrap();
    assert_eq!(db.model(&user).association("posts").count().unwrap(), 0);

    let mut languages: Vec<Language> = vec![];
    db.find(&mut languages).result().unwrap();
    assert_eq!(languages.len(), 2);
}

#[test]
fn clear_detaches_everything() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    for name in ["posts", "profile", "languages"] {
        db.model(&user).association(name).clear().result().unwrap();
        assert_eq!(db.model(&user).association(name).count().unwrap(), 0, "{name}");
    }

    assert_eq!(db.model(&user).association("company").count().unwrap(), 1);
}

#[test]
fn belongs_to_is_read_only() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    let mut company = Company {
        name: "other".to_string(),
        ..Company::default()
    };
    let mut association = db.model(&user).association("company");
    association.append(&mut company);
    assert!(association.error().unwrap().is_invalid_association());
    assert_eq!(company.id, 0);

    let err = db
        .model(&user)
        .association("company")
        .clear()
        .result()
        .unwrap_err();
    assert!(err.is_invalid_association());
}

#[test]
fn resolution_errors() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    let no_model = db.association("posts");
    assert!(no_model.error().unwrap().is_invalid_association());

    let unsaved = db.model(&User::named("new", 1)).association("posts");
    assert!(unsaved.error().unwrap().is_invalid_association());
    assert!(unsaved.count().unwrap_err().is_invalid_association());

    let unknown = db.model(&user).association("nope");
    assert!(unknown.error().unwrap().is_invalid_association());

    let not_a_relation = db.model(&user).association("name");
    assert!(not_a_relation.error().unwrap().is_invalid_association());

    let mut posts: Vec<Post> = vec![];
    assert!(not_a_relation.find(&mut posts).error().unwrap().is_invalid_association());
}

#[test]
fn first_error_sticks() {
    let (db, _log) = setup_all();
    let user = seeded(&db);

    let mut association = db.model(&user).association("company");
    association.clear();
    let first = association.error().unwrap().clone();

    association.clear();
    assert!(association.error().unwrap().ptr_eq(&first));
}
