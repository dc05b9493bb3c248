use reqwest::header::HeaderMap;
use serde_json::Value;
use std::error::Error;

use crate::notellm::client_wrapper::ModelApiError;

/// POST a JSON payload to a model endpoint and decode the JSON reply.
///
/// Non-success statuses become a [`ModelApiError`] carrying the status and
/// response body; the caller is expected to log with provider context.
pub async fn post_json(
    http: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    payload: &Value,
) -> Result<Value, Box<dyn Error + Send + Sync>> {
    let response = http.post(url).headers(headers).json(payload).send().await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(Box::new(ModelApiError::new(format!(
            "status {}: {}",
            status.as_u16(),
            body
        ))));
    }

    let decoded: Value = serde_json::from_str(&body).map_err(|err| {
        Box::new(ModelApiError::new(format!(
            "invalid JSON response: {}",
            err
        ))) as Box<dyn Error + Send + Sync>
    })?;
    Ok(decoded)
}

/// Build a reqwest client with the crate-wide model-call timeout.
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .expect("Failed to build HTTP client")
}
