//! Building access code management.

use super::{db_err, CheckinStore};
use crate::error::{CheckinError, Result};
use crate::types::BuildingCode;
use chrono::Utc;
use serde::Deserialize;
use sqlx::QueryBuilder;

/// Payload for creating a building code.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBuildingCode {
    /// Display name, e.g. "Main Entrance"
    pub name: String,
    /// Keypad code
    pub code: String,
    /// Sort order on guest-facing pages
    #[serde(default)]
    pub display_order: i64,
}

/// Partial update of a building code; absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBuildingCode {
    pub name: Option<String>,
    pub code: Option<String>,
    pub display_order: Option<i64>,
    pub is_active: Option<bool>,
}

impl CheckinStore {
    /// All building codes in display order.
    ///
    /// With `active_only`, inactive codes are filtered out (the guest
    /// view).
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on query failure.
    pub async fn list_building_codes(&self, active_only: bool) -> Result<Vec<BuildingCode>> {
        let sql = if active_only {
            "SELECT * FROM building_codes WHERE is_active = 1 ORDER BY display_order, id"
        } else {
            "SELECT * FROM building_codes ORDER BY display_order, id"
        };
        sqlx::query_as::<_, BuildingCode>(sql)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)
    }

    /// Create a building code.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Validation`] if name or code is empty.
    pub async fn create_building_code(&self, new: &NewBuildingCode) -> Result<BuildingCode> {
        if new.name.trim().is_empty() || new.code.trim().is_empty() {
            return Err(CheckinError::validation("Name and code are required"));
        }
        let result = sqlx::query(
            "INSERT INTO building_codes (name, code, display_order, is_active, created_at)
             VALUES (?, ?, ?, 1, ?)",
        )
        .bind(&new.name)
        .bind(&new.code)
        .bind(new.display_order)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        self.get_building_code(result.last_insert_rowid()).await
    }

    /// Look up a building code by id.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown ids.
    pub async fn get_building_code(&self, id: i64) -> Result<BuildingCode> {
        sqlx::query_as::<_, BuildingCode>("SELECT * FROM building_codes WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .ok_or_else(|| CheckinError::not_found("Building code"))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Validation`] for an empty update and
    /// [`CheckinError::NotFound`] for unknown ids.
    pub async fn update_building_code(
        &self,
        id: i64,
        update: &UpdateBuildingCode,
    ) -> Result<BuildingCode> {
        let mut builder = QueryBuilder::new("UPDATE building_codes SET ");
        let mut fields = builder.separated(", ");
        let mut touched = false;

        if let Some(name) = &update.name {
            fields.push("name = ");
            fields.push_bind_unseparated(name);
            touched = true;
        }
        if let Some(code) = &update.code {
            fields.push("code = ");
            fields.push_bind_unseparated(code);
            touched = true;
        }
        if let Some(order) = update.display_order {
            fields.push("display_order = ");
            fields.push_bind_unseparated(order);
            touched = true;
        }
        if let Some(active) = update.is_active {
            fields.push("is_active = ");
            fields.push_bind_unseparated(active);
            touched = true;
        }
        if !touched {
            return Err(CheckinError::validation("No fields to update"));
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        let result = builder.build().execute(self.pool()).await.map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CheckinError::not_found("Building code"));
        }
        self.get_building_code(id).await
    }

    /// Delete a building code.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown ids.
    pub async fn delete_building_code(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM building_codes WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CheckinError::not_found("Building code"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn store() -> CheckinStore {
        let store = CheckinStore::connect_in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn create_list_roundtrip() {
        let store = store().await;
        store
            .create_building_code(&NewBuildingCode {
                name: "Main Entrance".to_string(),
                code: "292929#".to_string(),
                display_order: 1,
            })
            .await
            .unwrap();
        store
            .create_building_code(&NewBuildingCode {
                name: "Parking Gate".to_string(),
                code: "1234#".to_string(),
                display_order: 2,
            })
            .await
            .unwrap();

        let all = store.list_building_codes(false).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Main Entrance");
        assert!(all[0].is_active);
    }

    #[tokio::test]
    async fn deactivated_code_is_hidden_from_guests() {
        let store = store().await;
        let code = store
            .create_building_code(&NewBuildingCode {
                name: "Main Entrance".to_string(),
                code: "292929#".to_string(),
                display_order: 1,
            })
            .await
            .unwrap();
        store
            .update_building_code(
                code.id,
                &UpdateBuildingCode {
                    is_active: Some(false),
                    ..UpdateBuildingCode::default()
                },
            )
            .await
            .unwrap();

        assert!(store.list_building_codes(true).await.unwrap().is_empty());
        assert_eq!(store.list_building_codes(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let store = store().await;
        let err = store
            .create_building_code(&NewBuildingCode {
                name: "  ".to_string(),
                code: "1#".to_string(),
                display_order: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckinError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let store = store().await;
        let err = store.delete_building_code(42).await.unwrap_err();
        assert!(matches!(err, CheckinError::NotFound { .. }));
    }
}
