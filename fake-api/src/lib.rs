//! In-process imitation of the public catalog APIs the harness is pointed at.
//!
//! # Design
//! Response shapes follow dummyjson: list routes wrap their items in
//! `{<name>, total, skip, limit}`, unknown ids answer 404 with a `message`
//! field, and deletes echo the removed product with `isDeleted: true`.
//! Products are mutable (create/update/delete); users, carts and posts are
//! read-only fixtures. Every call to `app()` starts from a fresh seed so
//! tests never observe each other's writes.
//!
//! A few diagnostic routes (`/echo`, `/slow`, `/health`) exist purely to let
//! client tests observe what went over the wire.

mod diagnostics;
mod seed;

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
}

#[derive(Deserialize)]
pub struct CreateProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
}

#[derive(Deserialize)]
pub struct UpdateProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub is_deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: u64,
    pub user_id: u64,
    pub products: Vec<CartLine>,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub user_id: u64,
    pub tags: Vec<String>,
}

/// All fixture data served by one router instance.
#[derive(Debug)]
pub struct Catalog {
    pub products: BTreeMap<u64, Product>,
    pub users: Vec<User>,
    pub carts: Vec<Cart>,
    pub posts: Vec<Post>,
    next_product_id: u64,
}

impl Catalog {
    pub fn seeded() -> Self {
        let products: BTreeMap<u64, Product> = seed::products()
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let next_product_id = products.keys().max().map_or(1, |max| max + 1);
        Self {
            products,
            users: seed::users(),
            carts: seed::carts(),
            posts: seed::posts(),
            next_product_id,
        }
    }

    fn categories(&self) -> Vec<Category> {
        let slugs: BTreeSet<&str> = self.products.values().map(|p| p.category.as_str()).collect();
        slugs
            .into_iter()
            .map(|slug| Category {
                slug: slug.to_string(),
                name: title_case(slug),
                url: format!("/products/category/{slug}"),
            })
            .collect()
    }
}

pub type Db = Arc<RwLock<Catalog>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Catalog::seeded()));
    Router::new()
        .route("/products", get(list_products))
        .route("/products/categories", get(list_categories))
        .route("/products/add", post(create_product))
        .route(
            "/products/{id}",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/carts", get(list_carts))
        .route("/carts/{id}", get(get_cart))
        .route("/carts/user/{id}", get(list_user_carts))
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
        .route("/echo", any(diagnostics::echo))
        .route("/slow", get(diagnostics::slow))
        .route("/health", get(diagnostics::health))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `limit`/`skip` query parameters accepted by every list route.
/// A `limit` of 0 means "everything after `skip`".
#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

const DEFAULT_PAGE_LIMIT: usize = 30;

fn page<T: Serialize + Clone>(key: &str, items: &[T], paging: &Paging) -> Json<Value> {
    let skip = paging.skip.unwrap_or(0).min(items.len());
    let limit = match paging.limit.unwrap_or(DEFAULT_PAGE_LIMIT) {
        0 => items.len() - skip,
        n => n,
    };
    let window: Vec<T> = items.iter().skip(skip).take(limit).cloned().collect();
    Json(json!({
        key: window,
        "total": items.len(),
        "skip": skip,
        "limit": window.len(),
    }))
}

/// dummyjson-style 404 body.
#[derive(Debug)]
pub struct NotFound {
    kind: &'static str,
    id: u64,
}

impl IntoResponse for NotFound {
    fn into_response(self) -> Response {
        let message = format!("{} with id '{}' not found", self.kind, self.id);
        (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
    }
}

async fn list_products(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Value> {
    let catalog = db.read().await;
    let products: Vec<Product> = catalog.products.values().cloned().collect();
    page("products", &products, &paging)
}

async fn list_categories(State(db): State<Db>) -> Json<Vec<Category>> {
    let catalog = db.read().await;
    Json(catalog.categories())
}

async fn get_product(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Product>, NotFound> {
    let catalog = db.read().await;
    catalog
        .products
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(NotFound { kind: "Product", id })
}

async fn create_product(
    State(db): State<Db>,
    Json(input): Json<CreateProduct>,
) -> (StatusCode, Json<Product>) {
    let mut catalog = db.write().await;
    let id = catalog.next_product_id;
    catalog.next_product_id += 1;
    let product = Product {
        id,
        title: input.title,
        description: input.description,
        price: input.price,
        category: input.category,
    };
    catalog.products.insert(id, product.clone());
    tracing::info!(id, "product created");
    (StatusCode::CREATED, Json(product))
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Product>, NotFound> {
    let mut catalog = db.write().await;
    let product = catalog
        .products
        .get_mut(&id)
        .ok_or(NotFound { kind: "Product", id })?;
    if let Some(title) = input.title {
        product.title = title;
    }
    if let Some(description) = input.description {
        product.description = description;
    }
    if let Some(price) = input.price {
        product.price = price;
    }
    if let Some(category) = input.category {
        product.category = category;
    }
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<DeletedProduct>, NotFound> {
    let mut catalog = db.write().await;
    let product = catalog
        .products
        .remove(&id)
        .ok_or(NotFound { kind: "Product", id })?;
    tracing::info!(id, "product deleted");
    Ok(Json(DeletedProduct {
        product,
        is_deleted: true,
    }))
}

async fn list_users(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Value> {
    let catalog = db.read().await;
    page("users", &catalog.users, &paging)
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, NotFound> {
    let catalog = db.read().await;
    catalog
        .users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or(NotFound { kind: "User", id })
}

async fn list_carts(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Value> {
    let catalog = db.read().await;
    page("carts", &catalog.carts, &paging)
}

async fn get_cart(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Cart>, NotFound> {
    let catalog = db.read().await;
    catalog
        .carts
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .map(Json)
        .ok_or(NotFound { kind: "Cart", id })
}

async fn list_user_carts(
    State(db): State<Db>,
    Path(user_id): Path<u64>,
    Query(paging): Query<Paging>,
) -> Json<Value> {
    let catalog = db.read().await;
    let carts: Vec<Cart> = catalog
        .carts
        .iter()
        .filter(|c| c.user_id == user_id)
        .cloned()
        .collect();
    page("carts", &carts, &paging)
}

async fn list_posts(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Value> {
    let catalog = db.read().await;
    page("posts", &catalog.posts, &paging)
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Post>, NotFound> {
    let catalog = db.read().await;
    catalog
        .posts
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or(NotFound { kind: "Post", id })
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
