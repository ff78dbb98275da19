// src/llm.rs

use crate::config::{LlmBackend, LlmSection};
use crate::model::BillRecord;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

const SYSTEM_PROMPT: &str =
    "You are a utility bill parsing assistant. Extract structured data from energy bills accurately.";

/// The instructions that precede the bill text in the user message.
const EXTRACTION_PROMPT: &str = r#"Extract the following information from this energy bill text. Return the data in JSON format.

For the bill summary, extract:
- Account number
- Billing period
- Previous balance
- Payment received
- Credit balance
- Current charges
- Total amount due

For the charges breakdown, extract all charges mentioned in the bill, such as:
- Electricity used (in kWh)
- Electricity delivery charges
- Non-bypassable charges
- Wildfire fund charge
- Electricity generation charges
- Electricity generation credit
- Baseline adjustment credit
- Other adjustments
- Minimum charge adjustment
- Taxes & fees
- NEM credits
- And any other charges mentioned

Format the response as a JSON object with two main sections:
1. "bill_summary" - containing the summary fields
2. "charges_breakdown" - an array of objects with "charge_type" and "amount" fields

Here's the bill text:"#;

/// Low temperature favors deterministic extraction.
const TEMPERATURE: f64 = 0.3;
/// Upper bound on completion length.
const MAX_TOKENS: u32 = 1000;
/// Truncate very long bills to stay within context limits.
const MAX_PROMPT_CHARS: usize = 12_000;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Resolved endpoint configuration ready to make API calls.
struct ResolvedEndpoint {
    base_url: String,
    model: String,
    api_key: String,
}

/// Resolve the LLM config section into a concrete endpoint.
fn resolve_endpoint(llm: &LlmSection) -> Result<ResolvedEndpoint, Box<dyn std::error::Error>> {
    match llm.backend {
        LlmBackend::Ollama => {
            info!(
                url = %llm.ollama.base_url,
                model = %llm.ollama.model,
                "Using Ollama (local) backend"
            );
            Ok(ResolvedEndpoint {
                base_url: llm.ollama.base_url.clone(),
                model: llm.ollama.model.clone(),
                api_key: "ollama".to_string(), // required by API but ignored
            })
        }
        LlmBackend::Remote => {
            let api_key = std::env::var("LLM_API_KEY")
                .map_err(|_| "LLM_API_KEY env var required for remote backend")?;
            info!(
                url = %llm.remote.base_url,
                model = %llm.remote.model,
                "Using remote API backend"
            );
            Ok(ResolvedEndpoint {
                base_url: llm.remote.base_url.clone(),
                model: llm.remote.model.clone(),
                api_key,
            })
        }
        LlmBackend::Heuristics => {
            Err("Heuristics backend selected — model extraction not available".into())
        }
    }
}

/// Check if the Ollama server is reachable.
async fn check_ollama_health(client: &Client, base_url: &str) -> bool {
    // Ollama's health endpoint is at the root (not under /v1)
    let health_url = base_url.trim_end_matches("/v1").trim_end_matches("/v1/");

    match client
        .get(health_url)
        .timeout(std::time::Duration::from_secs(3))
        .send()
        .await
    {
        Ok(resp) => {
            if resp.status().is_success() {
                info!("Ollama server is reachable");
                true
            } else {
                warn!(status = %resp.status(), "Ollama server returned non-OK status");
                false
            }
        }
        Err(e) => {
            warn!(error = %e, "Ollama server not reachable");
            false
        }
    }
}

/// Request one completion for the bill text.
async fn request_completion(
    client: &Client,
    endpoint: &ResolvedEndpoint,
    bill_text: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let text = match bill_text.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((i, _)) => &bill_text[..i],
        None => bill_text,
    };

    let request = ChatRequest {
        model: endpoint.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!("{EXTRACTION_PROMPT}\n{text}"),
            },
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };

    let url = format!("{}/chat/completions", endpoint.base_url);

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", endpoint.api_key))
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("LLM API error {status}: {body}").into());
    }

    let chat_response: ChatResponse = response.json().await?;
    let content = chat_response
        .choices
        .first()
        .map(|c| c.message.content.as_str())
        .ok_or("Empty response from LLM")?;

    Ok(content.to_string())
}

/// Extract a bill record from raw text via the model collaborator.
///
/// Never fails: endpoint-resolution, transport, and cancellation/timeout
/// failures all come back as a record with only `error` set, as does a
/// response with no recoverable JSON.
pub async fn extract_via_model(text: &str, llm: &LlmSection) -> BillRecord {
    let endpoint = match resolve_endpoint(llm) {
        Ok(e) => e,
        Err(e) => return BillRecord::from_error(e.to_string()),
    };

    let client = Client::new();
    if llm.backend == LlmBackend::Ollama && !check_ollama_health(&client, &endpoint.base_url).await
    {
        return BillRecord::from_error(format!(
            "Ollama is not running at {}. Start it with: ollama serve",
            endpoint.base_url
        ));
    }

    match request_completion(&client, &endpoint, text).await {
        Ok(content) => parse_model_response(&content),
        Err(e) => BillRecord::from_error(format!("Model invocation failed: {e}")),
    }
}

/// Parse a model response into a bill record.
///
/// Models may wrap the JSON in markdown fences or bury it in prose, so
/// recovery runs in escalating stages; the first successful parse wins.
pub fn parse_model_response(content: &str) -> BillRecord {
    match recover_json(content) {
        Some(value) => BillRecord::from_model_value(&value),
        None => {
            warn!(len = content.len(), "No parsable JSON in model response");
            BillRecord::from_error(
                "Failed to extract bill data: model response contained no parsable JSON object",
            )
        }
    }
}

/// The contents of a fenced json code block, if the response has one.
fn fenced_json(content: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)```json\s*(.*?)```").ok()?;
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// The outermost brace-delimited span, first `{` to last `}`.
fn brace_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&content[start..=end])
}

fn recover_json(content: &str) -> Option<Value> {
    if let Some(block) = fenced_json(content) {
        if let Ok(value) = serde_json::from_str(block) {
            return Some(value);
        }
    }
    if let Some(span) = brace_span(content) {
        if let Ok(value) = serde_json::from_str(span) {
            return Some(value);
        }
    }
    // Last resort: strip raw control characters from the best-guess
    // substring and retry once.
    let guess = fenced_json(content)
        .or_else(|| brace_span(content))
        .unwrap_or(content);
    let stripped: String = guess
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect();
    serde_json::from_str(&stripped).ok()
}
