/**
 * Smoke test for a running folio server
 * Checks health, validation and (optionally) a real send
 */

use serde_json::json;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url = std::env::var("TEST_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let really_send = std::env::var("SMOKE_SEND").map(|v| v == "true").unwrap_or(false);

    println!("🧪 Testing folio with base URL: {}", base_url);
    println!("{}", "=".repeat(80));

    let client = reqwest::Client::new();

    test_health(&client, &base_url).await?;
    test_validation(&client, &base_url).await?;
    if really_send {
        test_send(&client, &base_url).await?;
    } else {
        println!("\n  ⏭️  Skipping real send (set SMOKE_SEND=true to enable)");
    }

    println!("\n{}", "=".repeat(80));
    println!("✅ All checks passed!");
    Ok(())
}

/// GET /api/health answers with ok + env
async fn test_health(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn Error>> {
    println!("\n💓 TEST: Health");

    let response = client.get(format!("{}/api/health", base_url)).send().await?;
    if !response.status().is_success() {
        return Err(format!("❌ Health failed: {}", response.status()).into());
    }

    let body: serde_json::Value = response.json().await?;
    if body["ok"] != json!(true) {
        return Err(format!("❌ Unexpected health body: {}", body).into());
    }
    println!("  ✅ Healthy (env: {})", body["env"].as_str().unwrap_or("?"));
    Ok(())
}

/// A bad email is rejected with a field-level error
async fn test_validation(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn Error>> {
    println!("\n📋 TEST: Validation");

    let response = client
        .post(format!("{}/api/contact", base_url))
        .json(&json!({
            "name": "Al",
            "email": "not-an-email",
            "subject": "Hi",
            "message": "hello!"
        }))
        .send()
        .await?;

    if response.status() != reqwest::StatusCode::BAD_REQUEST {
        return Err(format!("❌ Expected 400, got {}", response.status()).into());
    }

    let body: serde_json::Value = response.json().await?;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .ok_or("Missing errors array")?
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();

    if fields == ["email"] {
        println!("  ✅ Email rejected");
        Ok(())
    } else {
        Err(format!("❌ Unexpected error fields: {:?}", fields).into())
    }
}

/// Sends one real message through the configured SMTP server
async fn test_send(client: &reqwest::Client, base_url: &str) -> Result<(), Box<dyn Error>> {
    println!("\n✉️  TEST: Send");

    let response = client
        .post(format!("{}/api/contact", base_url))
        .json(&json!({
            "name": "Smoke Test",
            "email": "smoke@example.com",
            "subject": "folio smoke test",
            "message": "If you can read this, the contact relay works."
        }))
        .send()
        .await?;

    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    if status.is_success() && body["message"] == json!("Sent") {
        println!("  ✅ Sent");
        Ok(())
    } else {
        Err(format!("❌ Send failed ({}): {}", status, body).into())
    }
}
