use chrono::Utc;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, opt_text};
use crate::store::LeadStore;

impl LeadStore {
    /// Create or refresh the profile row for a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the upsert fails.
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        email: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let now = fmt_datetime(&Utc::now());
        self.db()
            .execute_with(
                "INSERT INTO profiles (id, email, full_name, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    email = COALESCE(excluded.email, profiles.email),
                    full_name = COALESCE(excluded.full_name, profiles.full_name),
                    updated_at = excluded.updated_at",
                || {
                    libsql::params_from_iter(vec![
                        libsql::Value::from(user_id),
                        opt_text(email),
                        opt_text(full_name),
                        libsql::Value::from(now.as_str()),
                    ])
                },
            )
            .await?;
        Ok(())
    }

    /// Email and full name on file for a user.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the user has no profile.
    pub async fn get_profile(
        &self,
        user_id: &str,
    ) -> Result<(Option<String>, Option<String>), DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT email, full_name FROM profiles WHERE id = ?1", || {
                [user_id]
            })
            .await?;
        let row = rows.next().await?.ok_or_else(|| DatabaseError::NotFound {
            entity: "profile",
            id: user_id.to_owned(),
        })?;
        Ok((
            crate::helpers::get_opt_string(&row, 0)?,
            crate::helpers::get_opt_string(&row, 1)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::store::LeadStore;

    #[tokio::test]
    async fn upsert_keeps_known_fields() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        store
            .upsert_profile("u1", Some("ada@analytical.io"), Some("Ada Lovelace"))
            .await
            .unwrap();
        store.upsert_profile("u1", None, None).await.unwrap();

        let (email, name) = store.get_profile("u1").await.unwrap();
        assert_eq!(email.as_deref(), Some("ada@analytical.io"));
        assert_eq!(name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let store = LeadStore::open_local(":memory:").await.unwrap();
        assert!(store.get_profile("nobody").await.is_err());
    }
}
