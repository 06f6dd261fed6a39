use super::{apply, touch, MemoryStore};
use crate::models::{NewUser, UpdateProfileRequest, User, UserRecord};
use crate::repositories::UserStore;
use crate::{DentalError, DentalResult};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> DentalResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        let found = tables
            .users
            .values()
            .find(|record| record.user.email == email)
            .cloned();
        Ok(found)
    }

    async fn get(&self, id: i64) -> DentalResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn create(&self, new: &NewUser) -> DentalResult<User> {
        let mut tables = self.tables.write().await;
        let taken = tables.users.values().any(|record| {
            record.user.email == new.email.as_str()
                || (new.google_id.is_some() && record.google_id == new.google_id)
        });
        if taken {
            return Err(DentalError::conflict("User already exists"));
        }

        let now = Utc::now();
        let record = tables.users.insert_with(|id| UserRecord {
            user: User {
                id,
                email: new.email.as_str().to_owned(),
                first_name: new.first_name.as_str().to_owned(),
                last_name: new.last_name.as_str().to_owned(),
                role: new.role,
                phone: new.phone.clone(),
                created_at: now,
                updated_at: now,
            },
            password_hash: new.password_hash.clone(),
            google_id: new.google_id.clone(),
        });
        Ok(record.user)
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: &UpdateProfileRequest,
    ) -> DentalResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = patch.email.value() {
            let taken = tables
                .users
                .values()
                .any(|record| record.user.id != id && &record.user.email == email);
            if taken {
                return Err(DentalError::conflict("User already exists"));
            }
        }

        let Some(record) = tables.users.get_mut(id) else {
            return Ok(None);
        };
        let mut user = record.user.clone();
        apply("email", &patch.email, &mut user.email)?;
        apply("firstName", &patch.first_name, &mut user.first_name)?;
        apply("lastName", &patch.last_name, &mut user.last_name)?;
        apply("phone", &patch.phone, &mut user.phone)?;
        user.updated_at = touch(user.updated_at);

        record.user = user.clone();
        Ok(Some(user))
    }

    async fn set_password(&self, id: i64, password_hash: &str) -> DentalResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.users.get_mut(id) else {
            return Ok(false);
        };
        record.password_hash = Some(password_hash.to_owned());
        record.user.updated_at = touch(record.user.updated_at);
        Ok(true)
    }
}
