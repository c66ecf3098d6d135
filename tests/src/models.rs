//! Record types shared by the integration tests.

use ormlette::{Hooks, Record, Result};

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct User {
    #[key]
    #[auto]
    pub id: i64,

    #[index]
    pub name: String,

    pub age: i64,

    #[unique]
    pub email: Option<String>,

    pub company_id: Option<i64>,

    #[relation]
    pub company: Option<Company>,

    #[relation]
    pub posts: Vec<Post>,

    #[relation]
    pub profile: Option<Profile>,

    #[relation(many_to_many = "user_languages")]
    pub languages: Vec<Language>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn named(name: &str, age: i64) -> User {
        User {
            name: name.to_string(),
            age,
            ..User::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Company {
    #[key]
    #[auto]
    pub id: i64,

    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Post {
    #[key]
    #[auto]
    pub id: i64,

    #[index]
    pub user_id: i64,

    pub title: String,

    #[relation]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Comment {
    #[key]
    #[auto]
    pub id: i64,

    pub post_id: i64,

    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Profile {
    #[key]
    #[auto]
    pub id: i64,

    pub user_id: i64,

    pub bio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Language {
    #[key]
    #[auto]
    pub id: i64,

    #[unique]
    pub code: String,
}

/// Soft deleted through `deleted_at`.
#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Note {
    #[key]
    #[auto]
    pub id: i64,

    pub body: String,

    pub deleted_at: Option<i64>,
}

/// Implements every lifecycle hook and records the calls.
#[derive(Debug, Clone, Default, PartialEq, Record)]
#[hooks]
pub struct Account {
    #[key]
    #[auto]
    pub id: i64,

    pub name: String,

    pub status: String,

    #[skip]
    pub calls: Vec<&'static str>,
}

impl Hooks for Account {
    fn before_save(&mut self) -> Result<()> {
        self.calls.push("before_save");
        Ok(())
    }

    fn before_create(&mut self) -> Result<()> {
        self.calls.push("before_create");
        if self.status.is_empty() {
            self.status = "active".to_string();
        }
        Ok(())
    }

    fn after_create(&mut self) -> Result<()> {
        self.calls.push("after_create");
        Ok(())
    }

    fn after_save(&mut self) -> Result<()> {
        self.calls.push("after_save");
        Ok(())
    }

    fn before_update(&mut self) -> Result<()> {
        self.calls.push("before_update");
        if self.name.is_empty() {
            ormlette_core::bail!("account name can't be blank");
        }
        Ok(())
    }

    fn after_update(&mut self) -> Result<()> {
        self.calls.push("after_update");
        Ok(())
    }

    fn before_delete(&mut self) -> Result<()> {
        self.calls.push("before_delete");
        Ok(())
    }

    fn after_delete(&mut self) -> Result<()> {
        self.calls.push("after_delete");
        Ok(())
    }

    fn after_find(&mut self) -> Result<()> {
        self.calls.push("after_find");
        Ok(())
    }
}
