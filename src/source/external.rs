use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::{RatingRequest, RatingSource, SourceError};
use crate::config::ScorerConfig;
use crate::scoring::{is_valid_rating, RatingVector, WeightTable};

/// Rates items by asking an OpenAI-compatible chat completions endpoint.
pub struct ExternalScorer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScorerReply {
    items: Vec<ReplyItem>,
}

#[derive(Debug, Deserialize)]
struct ReplyItem {
    ratings: HashMap<String, ReplyRating>,
}

#[derive(Debug, Deserialize)]
struct ReplyRating {
    score: Value,
    #[serde(default)]
    reason: Option<String>,
}

impl ExternalScorer {
    /// Build a scorer from config. Fails with `MissingCredential` when no API
    /// key is set, so callers can fall back before any network traffic.
    pub fn from_config(config: &ScorerConfig, timeout: Duration) -> Result<Self, SourceError> {
        let api_key = crate::credentials::get_api_key_from_env(&config.api_key_env)
            .ok_or_else(|| SourceError::MissingCredential(config.api_key_env.clone()))?;
        Self::new(&config.endpoint, &config.model, api_key, timeout)
    }

    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("decision-journal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    async fn request_once(&self, body: &Value) -> Result<String, SourceError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(format!("HTTP {}", status)));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::MalformedResponse(format!("not a chat completion: {}", e))
            }
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SourceError::MalformedResponse("reply had no content".to_string()))
    }
}

#[async_trait(?Send)]
impl RatingSource for ExternalScorer {
    fn name(&self) -> &str {
        &self.model
    }

    async fn rate(&mut self, request: &RatingRequest<'_>) -> Result<Vec<RatingVector>, SourceError> {
        let body = build_request_body(&self.model, request);

        // Retry strategy: exponential backoff, 3 attempts in total
        let retry_strategy = ExponentialBackoff::from_millis(200)
            .max_delay(Duration::from_secs(2))
            .take(2);

        let this: &ExternalScorer = self;
        let body = &body;
        let content = RetryIf::spawn(
            retry_strategy,
            move || async move {
                let result = this.request_once(body).await;
                if let Err(e) = &result {
                    tracing::debug!(error = %e, "scorer attempt failed");
                }
                result
            },
            |e: &SourceError| matches!(e, SourceError::Http(_) | SourceError::Timeout),
        )
        .await?;

        parse_scorer_reply(&content, request.weights, request.items.len())
    }
}

fn map_reqwest_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Http(e.to_string())
    }
}

fn system_prompt(weights: &WeightTable) -> String {
    let mut prompt = String::from(
        "You rate options for a personal decision journal. \
         Rate each item on every attribute with an integer from 1 (lowest) to 5 (highest).\n\
         Attributes:\n",
    );
    for attr in &weights.attributes {
        prompt.push_str(&format!("- {}: {}\n", attr.key, attr.question()));
    }
    prompt.push_str(
        "Reply with JSON only, in this shape, one entry in \"items\" per item and in the same order:\n\
         {\"items\":[{\"ratings\":{\"<attribute>\":{\"score\":3,\"reason\":\"short reason\"}}}]}",
    );
    prompt
}

fn user_prompt(request: &RatingRequest<'_>) -> String {
    let mut prompt = String::new();
    for (i, item) in request.items.iter().enumerate() {
        prompt.push_str(&format!("Item {}: {}\n", i + 1, item));
    }
    for (label, value) in &request.hints {
        prompt.push_str(&format!("{}: {}\n", label, value));
    }
    prompt
}

fn build_request_body(model: &str, request: &RatingRequest<'_>) -> Value {
    json!({
        "model": model,
        "temperature": 0,
        "response_format": { "type": "json_object" },
        "messages": [
            { "role": "system", "content": system_prompt(request.weights) },
            { "role": "user", "content": user_prompt(request) },
        ],
    })
}

/// Turn the assistant's JSON content into one rating vector per item.
///
/// Anything missing, out of range or not a whole number is rejected rather
/// than patched up.
pub fn parse_scorer_reply(
    content: &str,
    weights: &WeightTable,
    expected_items: usize,
) -> Result<Vec<RatingVector>, SourceError> {
    let reply: ScorerReply = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| SourceError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if reply.items.len() != expected_items {
        return Err(SourceError::MalformedResponse(format!(
            "expected {} rated items, got {}",
            expected_items,
            reply.items.len()
        )));
    }

    reply
        .items
        .into_iter()
        .map(|item| {
            let mut pairs = Vec::with_capacity(weights.attributes.len());
            let mut notes = Vec::new();
            for attr in &weights.attributes {
                let rating = item.ratings.get(&attr.key).ok_or_else(|| {
                    SourceError::MalformedResponse(format!("no rating for '{}'", attr.key))
                })?;
                let score = whole_rating(&rating.score).ok_or_else(|| {
                    SourceError::MalformedResponse(format!(
                        "rating for '{}' must be a whole number from 1 to 5, got {}",
                        attr.key, rating.score
                    ))
                })?;
                pairs.push((attr.key.clone(), score));
                if let Some(reason) = &rating.reason {
                    notes.push((attr.key.clone(), reason.clone()));
                }
            }

            let vector = RatingVector::new(pairs)
                .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;
            Ok(notes
                .into_iter()
                .fold(vector, |v, (key, note)| v.with_note(key, note)))
        })
        .collect()
}

fn whole_rating(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 {
                    return None;
                }
                f as i64
            }
        },
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    is_valid_rating(n).then_some(n as u8)
}

/// Some models wrap JSON in a markdown fence even when asked not to.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_item(urgency: &str) -> String {
        format!(
            r#"{{"ratings":{{"urgency":{{"score":{},"reason":"due soon"}},"importance":{{"score":4}},"long_term_value":{{"score":"2"}},"effort":{{"score":3.0}}}}}}"#,
            urgency
        )
    }

    #[test]
    fn test_parse_two_items() {
        let content = format!(r#"{{"items":[{},{}]}}"#, full_item("5"), full_item("1"));
        let vectors = parse_scorer_reply(&content, &WeightTable::comparison(), 2).unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].get("urgency"), Some(5));
        assert_eq!(vectors[0].note("urgency"), Some("due soon"));
        assert_eq!(vectors[0].get("long_term_value"), Some(2));
        assert_eq!(vectors[0].get("effort"), Some(3));
        assert_eq!(vectors[1].get("urgency"), Some(1));
        assert_eq!(vectors[1].note("importance"), None);
    }

    #[test]
    fn test_parse_accepts_fenced_json() {
        let content = format!("```json\n{{\"items\":[{}]}}\n```", full_item("3"));
        let vectors = parse_scorer_reply(&content, &WeightTable::comparison(), 1).unwrap();
        assert_eq!(vectors[0].get("urgency"), Some(3));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let content = format!(r#"{{"items":[{}]}}"#, full_item("0"));
        let err = parse_scorer_reply(&content, &WeightTable::comparison(), 1).unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_parse_rejects_fractional_score() {
        let content = format!(r#"{{"items":[{}]}}"#, full_item("2.5"));
        assert!(parse_scorer_reply(&content, &WeightTable::comparison(), 1).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_attribute() {
        let content = r#"{"items":[{"ratings":{"urgency":{"score":3}}}]}"#;
        let err = parse_scorer_reply(content, &WeightTable::comparison(), 1).unwrap_err();
        assert!(err.to_string().contains("importance"));
    }

    #[test]
    fn test_parse_rejects_wrong_item_count() {
        let content = format!(r#"{{"items":[{}]}}"#, full_item("3"));
        let err = parse_scorer_reply(&content, &WeightTable::comparison(), 2).unwrap_err();
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_scorer_reply("I think 4/5", &WeightTable::decision(), 1).unwrap_err();
        assert!(matches!(err, SourceError::MalformedResponse(_)));
    }

    #[test]
    fn test_request_body_lists_every_attribute() {
        let table = WeightTable::decision();
        let request = RatingRequest::new(&table, vec!["Move abroad".to_string()])
            .hint("Goal", "more sun");
        let body = build_request_body("m", &request);

        assert_eq!(body["model"], "m");
        let system = body["messages"][0]["content"].as_str().unwrap();
        for key in table.keys() {
            assert!(system.contains(&format!("- {}:", key)));
        }
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert_eq!(user, "Item 1: Move abroad\nGoal: more sun\n");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        let table = WeightTable::decision();
        let request = RatingRequest::new(&table, vec!["x".to_string()]);
        let mut scorer = ExternalScorer::new(
            "http://127.0.0.1:9",
            "m",
            "key".to_string(),
            Duration::from_millis(500),
        )
        .unwrap();

        let err = scorer.rate(&request).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
