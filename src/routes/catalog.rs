//! Admin-managed reference data: workers, stores, products and questions.
//!
//! Every resource exposes the same five routes; the per-entity parts are the
//! request bodies and listing order, captured by [`CatalogResource`].

use std::cmp::Ordering;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::AdminAuthUser;
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::catalog::{
    CatalogEntity, Product, Question, QuestionType, RetailStore, Worker,
};

pub trait CatalogResource: CatalogEntity + Clone + Send + Sync + 'static {
    type Create: DeserializeOwned + Send + 'static;
    type Update: DeserializeOwned + Send + 'static;

    fn create(id: String, req: Self::Create, now: DateTime<Utc>) -> Self;
    fn apply(&mut self, patch: Self::Update, now: DateTime<Utc>);
    fn created_at(&self) -> DateTime<Utc>;

    /// Order of the public listing of active entities.
    fn public_order(a: &Self, b: &Self) -> Ordering {
        a.name().cmp(b.name())
    }

    /// Order of the admin listing of every entity.
    fn admin_order(a: &Self, b: &Self) -> Ordering {
        b.created_at().cmp(&a.created_at())
    }
}

pub fn workers_router() -> Router<AppState> {
    resource_router::<Worker>()
}

pub fn stores_router() -> Router<AppState> {
    resource_router::<RetailStore>()
}

pub fn products_router() -> Router<AppState> {
    resource_router::<Product>()
}

pub fn questions_router() -> Router<AppState> {
    resource_router::<Question>()
}

fn resource_router<T: CatalogResource>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active::<T>).post(create_entity::<T>))
        .route("/all", get(list_all::<T>))
        .route("/:id", put(update_entity::<T>).delete(delete_entity::<T>))
}

async fn list_active<T: CatalogResource>(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut items = state.store().list_active_catalog::<T>()?;
    items.sort_by(T::public_order);
    Ok(ok(items))
}

async fn list_all<T: CatalogResource>(
    _admin: AdminAuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut items = state.store().list_catalog::<T>()?;
    items.sort_by(T::admin_order);
    Ok(ok(items))
}

async fn create_entity<T: CatalogResource>(
    admin: AdminAuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<T::Create>,
) -> Result<impl IntoResponse, AppError> {
    let entity = T::create(uuid::Uuid::new_v4().to_string(), req, Utc::now());
    state.store().insert_catalog(&entity)?;
    tracing::info!(
        action = "catalog_create",
        entity = T::ENTITY,
        id = %entity.id(),
        admin = %admin.username,
        "Catalog entity created"
    );
    Ok(created(entity))
}

async fn update_entity<T: CatalogResource>(
    admin: AdminAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<T::Update>,
) -> Result<impl IntoResponse, AppError> {
    let mut entity = state
        .store()
        .get_catalog::<T>(&id)?
        .ok_or_else(|| AppError::not_found(&format!("{} not found", T::ENTITY)))?;
    entity.apply(patch, Utc::now());
    state.store().update_catalog(&entity)?;
    tracing::info!(
        action = "catalog_update",
        entity = T::ENTITY,
        id = %id,
        admin = %admin.username,
        "Catalog entity updated"
    );
    Ok(ok(entity))
}

async fn delete_entity<T: CatalogResource>(
    admin: AdminAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store().delete_catalog::<T>(&id)? {
        return Err(AppError::not_found(&format!("{} not found", T::ENTITY)));
    }
    tracing::info!(
        action = "catalog_delete",
        entity = T::ENTITY,
        id = %id,
        admin = %admin.username,
        "Catalog entity deleted"
    );
    Ok(ok(serde_json::json!({"deleted": true, "id": id})))
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn clean_options(options: Vec<String>) -> Vec<String> {
    options
        .into_iter()
        .map(trimmed)
        .filter(|o| !o.is_empty())
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedCreate {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedUpdate {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl CatalogResource for Worker {
    type Create = NamedCreate;
    type Update = NamedUpdate;

    fn create(id: String, req: NamedCreate, now: DateTime<Utc>) -> Self {
        Worker {
            id,
            name: trimmed(req.name),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: NamedUpdate, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = trimmed(name);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCreate {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

impl CatalogResource for RetailStore {
    type Create = StoreCreate;
    type Update = StoreUpdate;

    fn create(id: String, req: StoreCreate, now: DateTime<Utc>) -> Self {
        RetailStore {
            id,
            name: trimmed(req.name),
            location: req.location.map(trimmed).filter(|l| !l.is_empty()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: StoreUpdate, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = trimmed(name);
        }
        if let Some(location) = patch.location {
            self.location = Some(trimmed(location)).filter(|l| !l.is_empty());
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

impl CatalogResource for Product {
    type Create = ProductCreate;
    type Update = ProductUpdate;

    fn create(id: String, req: ProductCreate, now: DateTime<Utc>) -> Self {
        Product {
            id,
            name: trimmed(req.name),
            price: req.price,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: ProductUpdate, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = trimmed(name);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCreate {
    pub text: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionUpdate {
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub options: Option<Vec<String>>,
    pub is_required: Option<bool>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

impl CatalogResource for Question {
    type Create = QuestionCreate;
    type Update = QuestionUpdate;

    fn create(id: String, req: QuestionCreate, now: DateTime<Utc>) -> Self {
        Question {
            id,
            text: trimmed(req.text),
            question_type: req.question_type,
            options: clean_options(req.options),
            is_required: req.is_required,
            is_active: true,
            order: req.order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: QuestionUpdate, now: DateTime<Utc>) {
        if let Some(text) = patch.text {
            self.text = trimmed(text);
        }
        if let Some(question_type) = patch.question_type {
            self.question_type = question_type;
        }
        if let Some(options) = patch.options {
            self.options = clean_options(options);
        }
        if let Some(is_required) = patch.is_required {
            self.is_required = is_required;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        self.updated_at = now;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Questions are shown in display order everywhere.
    fn public_order(a: &Self, b: &Self) -> Ordering {
        a.order
            .cmp(&b.order)
            .then_with(|| a.created_at.cmp(&b.created_at))
    }

    fn admin_order(a: &Self, b: &Self) -> Ordering {
        Self::public_order(a, b)
    }
}
