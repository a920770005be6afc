//! Simple HTTP GET request example.
//!
//! Run with `cargo run --example simple_get -- https://httpbin.org/get`.

use requestninja::{Outcome, SettingsOverrides, URLRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/get".to_string());

    let mut request = URLRequest::new(url.as_str())?;
    request.set_header("Accept: application/json")?;

    println!("Sending request to {}...", url);
    let settings = SettingsOverrides::new().return_full_response(true);
    let outcome = request.get(Some(settings)).await?;

    if let Outcome::Full(response) = outcome {
        println!("Status: {}", response.status());
        println!("Headers:");
        for (name, value) in response.headers() {
            println!("  {}: {:?}", name, value);
        }
        println!("Body: {}", response.into_body().into_text());
    }

    Ok(())
}
