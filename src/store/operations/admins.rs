use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    pub fn create_admin(&self, admin: &Admin) -> Result<(), StoreError> {
        let username_key = keys::admin_username_index_key(&admin.username);
        let cas_result = self
            .admins
            .compare_and_swap(
                username_key.as_bytes(),
                None::<&[u8]>,
                Some(admin.id.as_bytes().to_vec()),
            )
            .map_err(StoreError::Sled)?;

        if let Err(_current_value) = cas_result {
            return Err(StoreError::Conflict {
                entity: "admin_username".to_string(),
                key: admin.username.clone(),
            });
        }

        let key = keys::admin_key(&admin.id);
        let admin_bytes = Self::serialize(admin)?;
        if let Err(e) = self.admins.insert(key.as_bytes(), admin_bytes) {
            let _ = self.admins.remove(username_key.as_bytes());
            return Err(StoreError::Sled(e));
        }
        Ok(())
    }

    pub fn get_admin_by_id(&self, admin_id: &str) -> Result<Option<Admin>, StoreError> {
        let key = keys::admin_key(admin_id);
        match self.admins.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let index_key = keys::admin_username_index_key(username);
        let Some(admin_id_raw) = self.admins.get(index_key.as_bytes())? else {
            return Ok(None);
        };
        let admin_id = match String::from_utf8(admin_id_raw.to_vec()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid UTF-8 in admin username index");
                return Ok(None);
            }
        };
        self.get_admin_by_id(&admin_id)
    }

    pub fn update_admin_password(
        &self,
        admin_id: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut admin = self
            .get_admin_by_id(admin_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "admin".to_string(),
                key: admin_id.to_string(),
            })?;
        admin.password_hash = password_hash.to_string();
        admin.updated_at = Utc::now();
        let key = keys::admin_key(&admin.id);
        self.admins.insert(key.as_bytes(), Self::serialize(&admin)?)?;
        Ok(())
    }
}
