use super::{corrupt, map_write_error, PgStore};
use crate::models::{NewUser, UpdateProfileRequest, User, UserRecord};
use crate::repositories::update::{UpdateBuilder, TOUCH_UPDATED_AT};
use crate::repositories::UserStore;
use crate::{DentalError, DentalResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;

const USER_COLUMNS: &str = "id, email, password_hash, google_id, first_name, last_name, role, \
                            phone, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: Option<String>,
    google_id: Option<String>,
    first_name: String,
    last_name: String,
    role: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = DentalError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserRecord {
            user: User {
                id: row.id,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                role: row.role.parse().map_err(corrupt)?,
                phone: row.phone,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
            google_id: row.google_id,
        })
    }
}

fn map_user_write_error(err: sqlx::Error) -> DentalError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.kind(), ErrorKind::UniqueViolation) {
            return DentalError::conflict("User already exists");
        }
    }
    map_write_error(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> DentalResult<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn get(&self, id: i64) -> DentalResult<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, new: &NewUser) -> DentalResult<User> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, google_id, first_name, last_name, role, phone) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(new.email.as_str())
            .bind(new.password_hash.as_deref())
            .bind(new.google_id.as_deref())
            .bind(new.first_name.as_str())
            .bind(new.last_name.as_str())
            .bind(new.role.as_str())
            .bind(&new.phone)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_write_error)?;
        Ok(UserRecord::try_from(row)?.user)
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: &UpdateProfileRequest,
    ) -> DentalResult<Option<User>> {
        let mut update = UpdateBuilder::new("users");
        update
            .set("email", patch.email.clone())
            .set("first_name", patch.first_name.clone())
            .set("last_name", patch.last_name.clone())
            .set("phone", patch.phone.clone())
            .filter("id", id);

        let result = update
            .into_query_builder()
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_user_write_error)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(UserStore::get(self, id).await?.map(|record| record.user))
    }

    async fn set_password(&self, id: i64, password_hash: &str) -> DentalResult<bool> {
        let sql = format!("UPDATE users SET password_hash = $1, {TOUCH_UPDATED_AT} WHERE id = $2");
        let result = sqlx::query(&sql)
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
