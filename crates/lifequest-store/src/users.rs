//! User rows

use crate::{SqliteStore, StoreError};
use chrono::Utc;
use lifequest_domain::{User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, total_xp, current_level, xp_multiplier, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        total_xp: row.get(1)?,
        current_level: row.get(2)?,
        xp_multiplier: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub(crate) fn load_user(conn: &Connection, id: UserId) -> Result<Option<User>, StoreError> {
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id.value()],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub(crate) fn require_user(conn: &Connection, id: UserId) -> Result<User, StoreError> {
    load_user(conn, id)?.ok_or_else(|| StoreError::not_found("user", id))
}

impl SqliteStore {
    /// Create a user with no XP and the default multiplier
    pub fn create_user(&mut self) -> Result<User, StoreError> {
        let user = User {
            xp_multiplier: self.rules.default_multiplier,
            ..User::new(UserId(0), Utc::now())
        };

        self.conn.execute(
            "INSERT INTO users (total_xp, current_level, xp_multiplier, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.total_xp,
                user.current_level,
                user.xp_multiplier,
                user.created_at,
                user.updated_at,
            ],
        )?;

        let id = UserId(self.conn.last_insert_rowid());
        tracing::debug!(user = %id, "created user");
        Ok(User { id, ..user })
    }

    /// Get a user by ID
    pub fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        load_user(&self.conn, id)
    }

    /// Get a user by ID, failing with `NotFound`
    pub fn require_user(&self, id: UserId) -> Result<User, StoreError> {
        require_user(&self.conn, id)
    }

    /// The implicit single user: the oldest one, created on first use
    pub fn default_user(&mut self) -> Result<User, StoreError> {
        let existing = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users ORDER BY id LIMIT 1", USER_COLUMNS),
                [],
                user_from_row,
            )
            .optional()?;

        match existing {
            Some(user) => Ok(user),
            None => self.create_user(),
        }
    }

    /// Change the personal XP multiplier
    ///
    /// Only values from the allowed set are accepted.
    pub fn set_xp_multiplier(&mut self, id: UserId, multiplier: f64) -> Result<User, StoreError> {
        let multiplier = self.rules.check_multiplier(multiplier)?;

        let changed = self.conn.execute(
            "UPDATE users SET xp_multiplier = ?1, updated_at = ?2 WHERE id = ?3",
            params![multiplier, Utc::now(), id.value()],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("user", id));
        }

        tracing::info!(user = %id, multiplier, "xp multiplier changed");
        self.require_user(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifequest_domain::XpError;

    #[test]
    fn test_default_user_is_stable() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let first = store.default_user().unwrap();
        let second = store.default_user().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.total_xp, 0);
        assert_eq!(first.current_level, 1);
    }

    #[test]
    fn test_set_multiplier_validates() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let user = store.create_user().unwrap();

        let updated = store.set_xp_multiplier(user.id, 2.0).unwrap();
        assert_eq!(updated.xp_multiplier, 2.0);

        let err = store.set_xp_multiplier(user.id, 3.0).unwrap_err();
        assert!(matches!(err, StoreError::Xp(XpError::InvalidMultiplier(_))));
        assert_eq!(store.require_user(user.id).unwrap().xp_multiplier, 2.0);
    }

    #[test]
    fn test_missing_user() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        assert!(store.get_user(UserId(42)).unwrap().is_none());
        assert!(matches!(
            store.set_xp_multiplier(UserId(42), 1.0),
            Err(StoreError::NotFound(_))
        ));
    }
}
