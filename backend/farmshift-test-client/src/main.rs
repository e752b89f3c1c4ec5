// src/main.rs

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::error::Error;

// Response types
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct Employee {
    employee_id: String,
    name: String,
    skills: Vec<String>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct Assignment {
    date: String,
    employee_id: String,
    task_type: String,
    start_time: String,
    end_time: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    message: String,
    count: usize,
    preview: bool,
    assignments: Vec<Assignment>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url = std::env::var("FARMSHIFT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let month = std::env::args().nth(1).unwrap_or_else(|| "2030-01".to_string());
    let client = Client::new();

    // Test 1: Health check
    println!("\n🔍 Testing health check endpoint...");
    let health_response = client
        .get(format!("{}/health", base_url))
        .send()
        .await?
        .json::<HealthResponse>()
        .await?;
    println!("Health check response: {:?}", health_response);

    // Test 2: Register an employee per built-in task
    println!("\n🔍 Creating employees...");
    for (name, skill) in [
        ("Milker", "milking"),
        ("Feeder", "feeding"),
        ("Cleaner", "cleaning"),
        ("Patroller", "patrol"),
    ] {
        let response = client
            .post(format!("{}/employees", base_url))
            .json(&json!({ "name": name, "skills": [skill] }))
            .send()
            .await?;
        if response.status() == StatusCode::CREATED {
            let employee = response.json::<Employee>().await?;
            println!(
                "Created {} ({}) skills={:?} status={}",
                employee.employee_id, employee.name, employee.skills, employee.status
            );
        } else {
            println!("Failed to create {}: {}", name, response.text().await?);
        }
    }

    // Test 3: Preview a month, nothing is written
    println!("\n🔍 Previewing generation for {}...", month);
    let preview = generate(&client, &base_url, &month, true).await?;
    println!("{} ({} shifts, preview={})", preview.message, preview.count, preview.preview);
    for a in preview.assignments.iter().take(5) {
        println!(
            "  {} {} {} {}-{}",
            a.date, a.employee_id, a.task_type, a.start_time, a.end_time
        );
    }

    let listed = list_month(&client, &base_url, &month).await?;
    println!("Stored shifts after preview: {}", listed);

    // Test 4: Commit the month
    println!("\n🔍 Generating {}...", month);
    let committed = generate(&client, &base_url, &month, false).await?;
    println!("{}", committed.message);

    let listed = list_month(&client, &base_url, &month).await?;
    println!("Stored shifts after generation: {}", listed);
    if listed != committed.count {
        println!("⚠️ Listed count differs from generated count");
    }

    // Test 5: Past months are refused
    println!("\n🔍 Requesting a past month...");
    let response = client
        .post(format!("{}/shifts/generate-monthly", base_url))
        .json(&json!({ "month": "2000-01" }))
        .send()
        .await?;
    println!("Past month status: {}", response.status());
    println!("Past month body: {}", response.text().await?);

    println!("\n✅ Testing complete!");

    Ok(())
}

async fn generate(
    client: &Client,
    base_url: &str,
    month: &str,
    preview: bool,
) -> Result<GenerateResponse, Box<dyn Error>> {
    let response = client
        .post(format!("{}/shifts/generate-monthly", base_url))
        .json(&json!({ "month": month, "preview": preview }))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(format!("generate-monthly failed: {}", response.text().await?).into());
    }
    Ok(response.json::<GenerateResponse>().await?)
}

async fn list_month(client: &Client, base_url: &str, month: &str) -> Result<usize, Box<dyn Error>> {
    let shifts = client
        .get(format!("{}/shifts/by-month/{}", base_url, month))
        .send()
        .await?
        .json::<Vec<serde_json::Value>>()
        .await?;
    Ok(shifts.len())
}
