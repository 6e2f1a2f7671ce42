use super::songs::require_text;
use super::{CatalogCache, CatalogError, CatalogResult};
use crate::catalog::User;
use crate::catalog_store::{NewUser, UserId, UserUpdate};
use tracing::info;

impl CatalogCache {
    pub fn get_user(&self, user_id: UserId) -> CatalogResult<User> {
        self.read()?
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| CatalogError::user_not_found(user_id))
    }

    /// Every user, ordered by id.
    pub fn get_all_users(&self) -> CatalogResult<Vec<User>> {
        let indexes = self.read()?;
        let mut users: Vec<User> = indexes.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    fn ensure_email_free(&self, email: &str, except: Option<UserId>) -> CatalogResult<()> {
        let indexes = self.read()?;
        let taken = indexes
            .users
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email.trim()));
        if taken {
            return Err(CatalogError::Conflict(format!("email {} already in use", email)));
        }
        Ok(())
    }

    pub fn add_user(&self, new_user: NewUser) -> CatalogResult<User> {
        let _writer = self.begin_write()?;
        require_text("name", &new_user.name)?;
        require_text("email", &new_user.email)?;
        self.ensure_email_free(&new_user.email, None)?;

        let row = self.durable("insert user", self.db.insert_user(&new_user))?;
        let user = User::from(row);
        self.apply().insert_user(user.clone());
        info!("Added user {} ({:?})", user.id, user.role);
        Ok(user)
    }

    pub fn update_user(&self, user_id: UserId, update: UserUpdate) -> CatalogResult<User> {
        let _writer = self.begin_write()?;
        let current = self.get_user(user_id)?;
        if let Some(name) = &update.name {
            require_text("name", name)?;
        }
        if let Some(email) = &update.email {
            require_text("email", email)?;
            self.ensure_email_free(email, Some(user_id))?;
        }
        if update.is_empty() {
            return Ok(current);
        }

        let row = self
            .durable("update user", self.db.update_user(user_id, &update))?
            .ok_or_else(|| CatalogError::user_not_found(user_id))?;
        let user = User::from(row);
        self.apply().insert_user(user.clone());
        info!("Updated user {}", user_id);
        Ok(user)
    }

    /// Deletes the user with their library, history and playback session.
    pub fn delete_user(&self, user_id: UserId) -> CatalogResult<User> {
        let _writer = self.begin_write()?;
        self.get_user(user_id)?;
        if !self.durable("delete user", self.db.delete_user(user_id))? {
            return Err(CatalogError::user_not_found(user_id));
        }
        let user = self
            .apply()
            .remove_user(user_id)
            .ok_or_else(|| CatalogError::user_not_found(user_id))?;
        info!("Deleted user {}", user_id);
        Ok(user)
    }
}
