//! User Storage
//! Mission: Persist staff accounts and their hashed credentials in SQLite

use crate::auth::models::{normalize_email, User, UserRole, UserStatus};
use crate::auth::password::hash_password;
use crate::db::{parse_timestamp, parse_uuid, Database};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{info, warn};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, password_hash, role, name, department, status, created_at, updated_at";

/// Fields needed to create an account; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub name: String,
    pub department: Option<String>,
}

/// User storage with SQLite backend
#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create the default admin user for initial setup when no admin exists
    pub async fn ensure_default_admin(
        &self,
        email: &str,
        password: &str,
        bcrypt_cost: u32,
    ) -> Result<Option<User>> {
        if self.count_by_role(UserRole::Admin)? > 0 {
            return Ok(None);
        }

        let password_hash = hash_password(password, bcrypt_cost).await?;
        let created = self.create_user(NewUser {
            email: email.to_string(),
            password_hash,
            role: UserRole::Admin,
            name: "Administrator".to_string(),
            department: None,
        })?;

        match created {
            Some(admin) => {
                info!("🔐 Default admin user created ({})", admin.email);
                Ok(Some(admin))
            }
            None => {
                warn!(
                    "Seed admin email {} is taken by a non-admin account; no admin seeded",
                    email
                );
                Ok(None)
            }
        }
    }

    /// Insert a new user. Returns `None` when the email is already registered.
    pub fn create_user(&self, new_user: NewUser) -> Result<Option<User>> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: normalize_email(&new_user.email),
            password_hash: new_user.password_hash,
            role: new_user.role,
            name: new_user.name.trim().to_string(),
            department: new_user.department,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let conn = self.db.conn();
        let inserted = conn.execute(
            "INSERT INTO users (id, email, password_hash, role, name, department, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(email) DO NOTHING",
            params![
                user.id.to_string(),
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.name,
                user.department,
                user.status.as_str(),
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert user")?;

        if inserted == 0 {
            return Ok(None);
        }

        info!("✅ Created user: {} ({})", user.email, user.role.as_str());
        Ok(Some(user))
    }

    /// Get user by email (case-insensitive)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.db.conn();
        conn.query_row(
            &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
            params![normalize_email(email)],
            user_from_row,
        )
        .optional()
        .context("Failed to look up user by email")
    }

    pub fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = self.db.conn();
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id.to_string()],
            user_from_row,
        )
        .optional()
        .context("Failed to look up user by id")
    }

    /// List all users, oldest first
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))?;

        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    pub fn count_by_role(&self, role: UserRole) -> Result<i64> {
        let conn = self.db.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?1",
            params![role.as_str()],
            |row| row.get(0),
        )
        .context("Failed to count users")
    }

    /// Persist every mutable field of `user`, refreshing `updated_at` first.
    /// Returns false when the user no longer exists.
    pub fn update_user(&self, user: &mut User) -> Result<bool> {
        user.touch();

        let conn = self.db.conn();
        let rows_affected = conn
            .execute(
                "UPDATE users
                 SET password_hash = ?2, role = ?3, name = ?4, department = ?5,
                     status = ?6, updated_at = ?7
                 WHERE id = ?1",
                params![
                    user.id.to_string(),
                    user.password_hash,
                    user.role.as_str(),
                    user.name,
                    user.department,
                    user.status.as_str(),
                    user.updated_at.to_rfc3339(),
                ],
            )
            .context("Failed to update user")?;

        Ok(rows_affected > 0)
    }

    /// Delete a user by ID, handing their candidates and clients to
    /// `new_owner` in the same transaction. Returns false when nothing was
    /// deleted.
    pub fn delete_user(&self, user_id: &Uuid, new_owner: &Uuid) -> Result<bool> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let rows_affected = tx
            .execute("DELETE FROM users WHERE id = ?1", params![user_id.to_string()])
            .context("Failed to delete user")?;

        if rows_affected > 0 {
            let now = Utc::now().to_rfc3339();
            let mut moved = 0;
            for table in ["candidates", "clients"] {
                moved += tx
                    .execute(
                        &format!(
                            "UPDATE {} SET owner_id = ?2, updated_at = ?3 WHERE owner_id = ?1",
                            table
                        ),
                        params![user_id.to_string(), new_owner.to_string(), now],
                    )
                    .with_context(|| format!("Failed to reassign {}", table))?;
            }
            info!(
                "🗑️  Deleted user: {} ({} records reassigned to {})",
                user_id, moved, new_owner
            );
        }
        tx.commit()?;

        Ok(rows_affected > 0)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(3)?;
    let status: String = row.get(6)?;

    Ok(User {
        id: parse_uuid(0, row.get(0)?)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        role: UserRole::parse(&role).unwrap_or(UserRole::Employee),
        name: row.get(4)?,
        department: row.get(5)?,
        status: UserStatus::parse(&status).unwrap_or(UserStatus::Inactive),
        created_at: parse_timestamp(7, row.get(7)?)?,
        updated_at: parse_timestamp(8, row.get(8)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use tempfile::NamedTempFile;

    fn create_test_store() -> UserStore {
        UserStore::new(Database::in_memory().unwrap())
    }

    fn new_user(email: &str, role: UserRole) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
            name: "Someone".to_string(),
            department: Some("Sales".to_string()),
        }
    }

    #[tokio::test]
    async fn test_default_admin_created_once() {
        let store = create_test_store();

        let admin = store
            .ensure_default_admin("admin@talentdesk.local", "admin12345", 4)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(verify_password("admin12345", &admin.password_hash)
            .await
            .unwrap());

        let again = store
            .ensure_default_admin("other@talentdesk.local", "admin12345", 4)
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(store.count_by_role(UserRole::Admin).unwrap(), 1);
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let store = create_test_store();

        let user = store
            .create_user(new_user("Recruiter@Example.com", UserRole::Employee))
            .unwrap()
            .unwrap();
        assert_eq!(user.email, "recruiter@example.com");
        assert_eq!(user.status, UserStatus::Active);

        let by_email = store
            .get_user_by_email("RECRUITER@example.com ")
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.department.as_deref(), Some("Sales"));

        let by_id = store.get_user_by_id(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, user.email);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = create_test_store();

        assert!(store
            .create_user(new_user("dup@example.com", UserRole::Employee))
            .unwrap()
            .is_some());
        assert!(store
            .create_user(new_user("DUP@example.com", UserRole::Admin))
            .unwrap()
            .is_none());
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_update_touches_timestamp() {
        let store = create_test_store();
        let mut user = store
            .create_user(new_user("jo@example.com", UserRole::Employee))
            .unwrap()
            .unwrap();
        let before = user.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(5));
        user.name = "Jo Renamed".to_string();
        user.status = UserStatus::Inactive;
        assert!(store.update_user(&mut user).unwrap());

        let stored = store.get_user_by_id(&user.id).unwrap().unwrap();
        assert_eq!(stored.name, "Jo Renamed");
        assert_eq!(stored.status, UserStatus::Inactive);
        assert!(stored.updated_at > before);
        assert_eq!(stored.created_at, user.created_at);
    }

    #[test]
    fn test_delete_user() {
        let store = create_test_store();
        let admin = Uuid::new_v4();
        let user = store
            .create_user(new_user("temp@example.com", UserRole::Employee))
            .unwrap()
            .unwrap();

        assert!(store.delete_user(&user.id, &admin).unwrap());
        assert!(store.get_user_by_email("temp@example.com").unwrap().is_none());
        assert!(!store.delete_user(&user.id, &admin).unwrap());
    }

    #[test]
    fn test_delete_user_reassigns_owned_records() {
        use crate::auth::models::Scope;
        use crate::clients::{Client, ClientStatus, ClientStore};

        let db = Database::in_memory().unwrap();
        let store = UserStore::new(db.clone());
        let clients = ClientStore::new(db);
        let admin = Uuid::new_v4();
        let leaver = store
            .create_user(new_user("leaver@example.com", UserRole::Employee))
            .unwrap()
            .unwrap();

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            company_name: "Acme".to_string(),
            contact_name: "Pat".to_string(),
            contact_email: "pat@acme.test".to_string(),
            phone: None,
            industry: None,
            status: ClientStatus::Active,
            notes: None,
            owner_id: leaver.id,
            created_at: now,
            updated_at: now,
        };
        clients.create(&client).unwrap();

        assert!(store.delete_user(&leaver.id, &admin).unwrap());

        let moved = clients
            .get(&client.id, &Scope::Owner(admin.to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(moved.owner_id, admin);
        assert!(moved.updated_at >= client.updated_at);
    }

    #[test]
    fn test_users_persist_on_disk() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let store = UserStore::new(Database::open(path).unwrap());
        store
            .create_user(new_user("kept@example.com", UserRole::Employee))
            .unwrap()
            .unwrap();
        drop(store);

        let reopened = UserStore::new(Database::open(path).unwrap());
        assert!(reopened
            .get_user_by_email("kept@example.com")
            .unwrap()
            .is_some());
    }
}
