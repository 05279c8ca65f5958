// User account flows. These exercise the real store and need a PostgreSQL
// instance with schema.sql applied (DATABASE_URL in the environment), so
// they are ignored by default: cargo test -- --ignored

mod common;

use anyhow::Result;
use serde_json::json;

#[tokio::test]
#[ignore = "requires a PostgreSQL instance with schema.sql applied"]
async fn register_then_duplicate_register_fails() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let username = common::unique_username("dup");

    let token = common::register_user(&client, &server.base_url, &username).await?;
    assert!(!token.is_empty());

    let res = client
        .post(format!("{}/users/register", server.base_url))
        .json(&json!({ "username": username, "password": "hunter2" }))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false, "unexpected body: {}", body);
    assert_eq!(body["error"], "Username already exists, please login.");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance with schema.sql applied"]
async fn login_errors_do_not_reveal_which_part_was_wrong() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let username = common::unique_username("enum");

    common::register_user(&client, &server.base_url, &username).await?;

    let wrong_password = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "username": username, "password": "wrong-password" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    let unknown_user = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "username": common::unique_username("ghost"), "password": "hunter2" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    assert_eq!(wrong_password["success"], false);
    assert_eq!(unknown_user["success"], false);
    // Identical message for both failure modes
    assert_eq!(wrong_password["error"], "Incorrect username or password");
    assert_eq!(wrong_password["error"], unknown_user["error"]);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance with schema.sql applied"]
async fn login_returns_working_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let username = common::unique_username("login");

    common::register_user(&client, &server.base_url, &username).await?;

    let body = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "username": username, "password": "hunter2" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(body["success"], true, "unexpected body: {}", body);
    assert!(body["token"].as_str().is_some());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance with schema.sql applied"]
async fn token_endpoint_resolves_registered_user_without_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let username = common::unique_username("whoami");

    let token = common::register_user(&client, &server.base_url, &username).await?;

    let body = client
        .get(format!("{}/users/token", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    assert_eq!(body["success"], true, "unexpected body: {}", body);
    assert_eq!(body["user"]["username"], username.as_str());
    assert!(body["user"].get("password").is_none(), "password leaked: {}", body);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance with schema.sql applied"]
async fn register_validates_username_bounds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let body = client
        .post(format!("{}/users/register", server.base_url))
        .json(&json!({ "username": "ab", "password": "hunter2" }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Username must be between 3 and 20 characters long.");

    let body = client
        .post(format!("{}/users/register", server.base_url))
        .json(&json!({ "username": common::unique_username("nopw") }))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Password must be provided.");
    Ok(())
}
