//! POST a JSON body and read the parsed response, once awaited and once
//! through a callback.

use requestninja::{SettingsOverrides, URLRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// The part of httpbin's reply this demo reads.
#[derive(Debug, Deserialize)]
struct Echo {
    json: Option<Value>,
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut request = URLRequest::new("http://httpbin.org/post")?;
    request.set_timeout(Duration::from_secs(10));

    let outcome = request.post_json(&json!({ "var1": 123 }), None).await?;
    if let Some(echo) = outcome.body().deserialize::<Echo>() {
        println!("{} saw JSON: {:?}", echo.url, echo.json);
    }

    let (tx, rx) = tokio::sync::oneshot::channel();
    request
        .post(
            Some(json!({ "var1": 123, "var2": "abc" }).into()),
            Some(SettingsOverrides::new().timeout_millis(5_000)),
        )
        .on_complete(move |result| {
            let _ = tx.send(result);
        });

    match rx.await? {
        Ok(outcome) => println!("Server saw form: {:?}", outcome.body().as_json().map(|b| &b["form"])),
        Err(e) => eprintln!("request failed: {}", e),
    }

    Ok(())
}
