use anyhow::{anyhow, Context, Result};
use console::style;
use std::path::Path;

pub fn execute(api_url: &str, content: &str, image: Option<&Path>) -> Result<()> {
    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(send_post(api_url, content, image));

    runtime.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}

async fn send_post(api_url: &str, content: &str, image: Option<&Path>) -> Result<()> {
    let client = reqwest::Client::new();

    let response = if let Some(path) = image {
        // Read the image up front so a bad path fails before any network call
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_mime(path).as_ref())?;
        let form = reqwest::multipart::Form::new()
            .text("content", content.to_string())
            .part("image", part);

        client
            .post(format!("{}/tweet", api_url))
            .multipart(form)
            .send()
            .await
    } else {
        client
            .post(format!("{}/cli/tweet", api_url))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
    }
    .with_context(|| format!("Failed to reach roost service at {}", api_url))?;

    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .unwrap_or_else(|_| serde_json::json!({}));

    if status.is_success() {
        let message = body["message"].as_str().unwrap_or("Posted");
        println!("{} {}", style("✅").green(), message);
        Ok(())
    } else {
        let error = body["error"].as_str().unwrap_or("Unknown server error");
        Err(anyhow!("Post failed: {}", error))
    }
}

/// Infer the multipart content type from the image extension
fn image_mime(path: &Path) -> mime::Mime {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
