//! Shared fixtures for repository tests.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;

pub async fn insert_user(pool: &PgPool, name: &str, role: &str) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    sqlx::query_scalar(
        "INSERT INTO users (full_name, email, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_category(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn insert_request(
    pool: &PgPool,
    title: &str,
    client_id: i64,
    professional_id: i64,
    category_id: Option<i64>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO service_requests (title, client_id, professional_id, category_id, address) \
         VALUES ($1, $2, $3, $4, 'Via Roma 1') RETURNING id",
    )
    .bind(title)
    .bind(client_id)
    .bind(professional_id)
    .bind(category_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// 15 October 2025 at `h:m` UTC.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 15, h, m, 0).unwrap()
}

/// A professional, a client and one request linking them.
pub struct Fixture {
    pub professional_id: i64,
    pub client_id: i64,
    pub request_id: i64,
}

pub async fn fixture(pool: &PgPool) -> Fixture {
    let professional_id = insert_user(pool, "Luca Bianchi", "professional").await;
    let client_id = insert_user(pool, "Mario Rossi", "client").await;
    let category_id = insert_category(pool, "Plumbing").await;
    let request_id = insert_request(
        pool,
        "Leaking sink",
        client_id,
        professional_id,
        Some(category_id),
    )
    .await;
    Fixture {
        professional_id,
        client_id,
        request_id,
    }
}
