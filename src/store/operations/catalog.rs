use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    Number,
    MultipleChoice,
}

impl Default for QuestionType {
    fn default() -> Self {
        Self::Text
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A retail location where workers sell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailStore {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub is_required: bool,
    pub is_active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shared persistence contract of the admin-managed reference entities.
pub trait CatalogEntity: Serialize + DeserializeOwned {
    const ENTITY: &'static str;
    /// Rejects a second entity whose trimmed name matches an existing one.
    const UNIQUE_NAME: bool = false;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn is_active(&self) -> bool;
    fn tree(store: &Store) -> &sled::Tree;

    fn validate(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn require_name(entity: &str, name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation(format!("{entity} name required")));
    }
    Ok(())
}

impl CatalogEntity for Worker {
    const ENTITY: &'static str = "worker";
    const UNIQUE_NAME: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn tree(store: &Store) -> &sled::Tree {
        &store.workers
    }
    fn validate(&self) -> Result<(), StoreError> {
        require_name(Self::ENTITY, &self.name)
    }
}

impl CatalogEntity for RetailStore {
    const ENTITY: &'static str = "store";
    const UNIQUE_NAME: bool = true;

    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn tree(store: &Store) -> &sled::Tree {
        &store.stores
    }
    fn validate(&self) -> Result<(), StoreError> {
        require_name(Self::ENTITY, &self.name)
    }
}

impl CatalogEntity for Product {
    const ENTITY: &'static str = "product";

    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn tree(store: &Store) -> &sled::Tree {
        &store.products
    }
    fn validate(&self) -> Result<(), StoreError> {
        require_name(Self::ENTITY, &self.name)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(StoreError::Validation(
                "product price must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

impl CatalogEntity for Question {
    const ENTITY: &'static str = "question";

    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.text
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn tree(store: &Store) -> &sled::Tree {
        &store.questions
    }
    fn validate(&self) -> Result<(), StoreError> {
        if self.text.trim().is_empty() {
            return Err(StoreError::Validation("Question text required".to_string()));
        }
        if self.question_type == QuestionType::MultipleChoice
            && self.options.iter().filter(|o| !o.trim().is_empty()).count() < 2
        {
            return Err(StoreError::Validation(
                "Multiple choice needs at least 2 options".to_string(),
            ));
        }
        Ok(())
    }
}

impl Store {
    pub fn insert_catalog<T: CatalogEntity>(&self, entity: &T) -> Result<(), StoreError> {
        entity.validate()?;
        self.ensure_unique_name(entity)?;
        let key = keys::entity_key(entity.id());
        T::tree(self).insert(key.as_bytes(), Self::serialize(entity)?)?;
        Ok(())
    }

    /// Replaces an existing entity; fails with `NotFound` when the id is unknown.
    pub fn update_catalog<T: CatalogEntity>(&self, entity: &T) -> Result<(), StoreError> {
        entity.validate()?;
        let key = keys::entity_key(entity.id());
        if !T::tree(self).contains_key(key.as_bytes())? {
            return Err(StoreError::NotFound {
                entity: T::ENTITY.to_string(),
                key: entity.id().to_string(),
            });
        }
        self.ensure_unique_name(entity)?;
        T::tree(self).insert(key.as_bytes(), Self::serialize(entity)?)?;
        Ok(())
    }

    pub fn get_catalog<T: CatalogEntity>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let key = keys::entity_key(id);
        match T::tree(self).get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_catalog<T: CatalogEntity>(&self) -> Result<Vec<T>, StoreError> {
        let mut out = Vec::new();
        for item in T::tree(self).iter() {
            let (_, value) = item?;
            out.push(Self::deserialize::<T>(&value)?);
        }
        Ok(out)
    }

    pub fn list_active_catalog<T: CatalogEntity>(&self) -> Result<Vec<T>, StoreError> {
        Ok(self
            .list_catalog::<T>()?
            .into_iter()
            .filter(|e| e.is_active())
            .collect())
    }

    pub fn delete_catalog<T: CatalogEntity>(&self, id: &str) -> Result<bool, StoreError> {
        let key = keys::entity_key(id);
        Ok(T::tree(self).remove(key.as_bytes())?.is_some())
    }

    /// Names are compared after trimming; the entity itself is ignored so an
    /// update may keep its own name.
    fn ensure_unique_name<T: CatalogEntity>(&self, entity: &T) -> Result<(), StoreError> {
        if !T::UNIQUE_NAME {
            return Ok(());
        }
        let wanted = entity.name().trim();
        let taken = self
            .list_catalog::<T>()?
            .iter()
            .any(|e| e.id() != entity.id() && e.name().trim() == wanted);
        if taken {
            return Err(StoreError::Conflict {
                entity: format!("{}_name", T::ENTITY),
                key: wanted.to_string(),
            });
        }
        Ok(())
    }
}
