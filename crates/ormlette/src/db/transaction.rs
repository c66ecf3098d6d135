use super::Db;

use ormlette_core::{Error, Result};

impl Db {
    /// Starts a transaction. The returned handle runs every statement inside
    /// it until `commit` or `rollback`.
    pub fn begin(&self) -> Db {
        let mut db = self.clone();
        match self.conn.begin() {
            Ok(conn) => db.conn = conn,
            Err(err) => db.push_error(err),
        }
        db
    }

    pub fn commit(&self) -> Db {
        self.finish("commit", |db| db.conn.commit())
    }

    pub fn rollback(&self) -> Db {
        self.finish("rollback", |db| db.conn.rollback())
    }

    fn finish(&self, op: &'static str, end: impl FnOnce(&Db) -> Result<()>) -> Db {
        let mut db = self.clone();
        if !self.conn.is_transaction() {
            db.push_error(Error::no_valid_transaction());
            return db;
        }
        if let Err(err) = end(self) {
            db.push_error(err);
        }
        tracing::debug!(source = %self.shared.source, op, "transaction finished");
        db
    }

    /// Runs `f` in a transaction, committing when it returns `Ok` and rolling
    /// back otherwise.
    pub fn transaction<T>(&self, f: impl FnOnce(&Db) -> Result<T>) -> Result<T> {
        let tx = self.begin();
        tx.result()?;

        match f(&tx) {
            Ok(ret) => {
                tx.commit().result()?;
                Ok(ret)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().result() {
                    return Err(err.context(rollback));
                }
                Err(err)
            }
        }
    }
}
