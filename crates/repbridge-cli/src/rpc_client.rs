// crates/repbridge-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs to the repbridge-daemon endpoint.

use repbridge_rpc::server::call_path;
use repbridge_rpc::{JsonRpcRequest, JsonRpcResponse};

/// Send a JSON-RPC call to the daemon and return the parsed envelope.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<JsonRpcResponse, Box<dyn std::error::Error>> {
    let request = JsonRpcRequest {
        method: method.to_string(),
        params,
    };

    let url = format!("{}{}", endpoint.trim_end_matches('/'), call_path());
    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&request).send().await?;

    let rpc_response: JsonRpcResponse = resp.json().await?;
    Ok(rpc_response)
}

/// Call and unwrap the envelope into its result, turning a failure into an
/// error that names the protocol kind and code.
pub async fn rpc_result(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let response = rpc_call(endpoint, method, params).await?;
    into_result(response)
}

fn into_result(response: JsonRpcResponse) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    if response.success {
        return Ok(response.result.unwrap_or(serde_json::Value::Null));
    }
    let message = response.error.unwrap_or_else(|| "unknown error".to_string());
    let err = match (response.error_kind, response.error_code) {
        (Some(kind), Some(code)) => format!("{} ({}): {}", kind, code, message),
        (Some(kind), None) => format!("{}: {}", kind, message),
        _ => message,
    };
    Err(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_names_kind_and_code() {
        let response = JsonRpcResponse {
            success: false,
            result: None,
            error: Some("Message has already been processed (replay)".to_string()),
            error_code: Some(6002),
            error_kind: Some("ReplayedMessage".to_string()),
        };
        let err = into_result(response).unwrap_err().to_string();
        assert!(err.starts_with("ReplayedMessage (6002): "));
    }

    #[test]
    fn test_success_yields_result() {
        let response = JsonRpcResponse::ok(serde_json::json!({ "paused": false }));
        assert_eq!(into_result(response).unwrap()["paused"], false);
    }
}
