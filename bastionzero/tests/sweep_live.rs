//! Removes objects left behind by acceptance runs against a live
//! organization. Run with `cargo test -- --ignored` and BASTIONZERO_API_SECRET
//! set; BASTIONZERO_HOST overrides the API endpoint.

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use bastionzero::api::{Client, DEFAULT_HOST};
use bastionzero::sweep::{self, TEST_PREFIX};

#[tokio::test]
#[ignore = "requires BASTIONZERO_API_SECRET and talks to a live organization"]
async fn sweep_acceptance_leftovers() {
    let secret = std::env::var("BASTIONZERO_API_SECRET").unwrap();
    let host = std::env::var("BASTIONZERO_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let client = Client::new(&host, &secret).unwrap();

    let deleted = sweep::run(&client, TEST_PREFIX).await.unwrap();
    println!("deleted {} objects prefixed {}", deleted, TEST_PREFIX);
}
