use crate::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Deserialize)]
pub struct CliTweetRequest {
    content: Option<String>,
    #[serde(rename = "imagePath")]
    image_path: Option<String>,
}

/// Multipart endpoint: `content` text field plus optional `image` file.
/// The image is written to a temp file which is removed when the handler
/// returns, on success and failure alike.
pub async fn post_tweet(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut content: Option<String> = None;
    let mut upload: Option<NamedTempFile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Malformed multipart request: {}", e);
                return bad_request("Invalid multipart form data");
            }
        };

        let name = field.name().map(|name| name.to_string());
        match name.as_deref() {
            Some("content") => match field.text().await {
                Ok(text) => content = Some(text),
                Err(e) => {
                    tracing::error!("Failed to read content field: {}", e);
                    return bad_request("Invalid multipart form data");
                }
            },
            Some("image") => {
                let suffix = field
                    .file_name()
                    .and_then(|name| Path::new(name).extension())
                    .and_then(|ext| ext.to_str())
                    .map(|ext| format!(".{}", ext))
                    .unwrap_or_default();

                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!("Failed to read image field: {}", e);
                        return bad_request("Invalid multipart form data");
                    }
                };

                match save_upload(&state, &suffix, &bytes) {
                    Ok(file) => upload = Some(file),
                    Err(e) => {
                        tracing::error!("Failed to save uploaded image: {}", e);
                        return internal_error();
                    }
                }
            }
            _ => {}
        }
    }

    let content = match content.filter(|c| !c.trim().is_empty()) {
        Some(content) => content,
        None => return bad_request("Tweet content is required"),
    };

    let success = {
        let mut poster = state.poster.lock().await;
        poster
            .post_content(&content, upload.as_ref().map(|f| f.path()))
            .await
    };

    // `upload` drops here, removing the temp file on both outcomes
    respond(success)
}

pub async fn post_cli_tweet(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CliTweetRequest>,
) -> (StatusCode, Json<Value>) {
    let content = match request.content.filter(|c| !c.trim().is_empty()) {
        Some(content) => content,
        None => return bad_request("Tweet content is required"),
    };

    let image_path = request.image_path.map(std::path::PathBuf::from);
    let success = {
        let mut poster = state.poster.lock().await;
        poster.post_content(&content, image_path.as_deref()).await
    };

    respond(success)
}

fn save_upload(state: &AppState, suffix: &str, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(suffix)
        .tempfile_in(&state.upload_dir)?;
    file.write_all(bytes)?;
    tracing::debug!(path = %file.path().display(), "Saved uploaded image");
    Ok(file)
}

fn respond(success: bool) -> (StatusCode, Json<Value>) {
    if success {
        (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Tweet posted successfully",
            })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to post tweet" })),
        )
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}
