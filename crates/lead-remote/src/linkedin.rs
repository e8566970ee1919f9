//! LinkedIn profile finder backed by a Gemini `generateContent` model.
//!
//! The model is asked for the single most likely profile URL; the first
//! `linkedin.com/in/` link in its reply is taken as the answer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use lead_config::LinkedinConfig;

use crate::error::RemoteError;
use crate::http::{build_client, check_response};
use crate::lookup::Lookup;

pub const NO_PROFILE_FOUND: &str = "No LinkedIn profile found";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct LinkedinClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LinkedinClient {
    /// # Errors
    ///
    /// Returns [`RemoteError::NotConfigured`] without an API key or model.
    pub fn new(config: &LinkedinConfig) -> Result<Self, RemoteError> {
        if !config.is_configured() {
            return Err(RemoteError::NotConfigured {
                service: "LinkedIn finder",
                hint: "LEADS_LINKEDIN__API_KEY",
            });
        }
        Ok(Self {
            http: build_client(REQUEST_TIMEOUT)?,
            endpoint: format!(
                "{}/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key.clone(),
        })
    }

    /// Best-guess profile URL for a person at a company.
    pub async fn find_linkedin_url(&self, name: &str, company: &str) -> Lookup<String> {
        let result = self.ask(&prompt(name, company)).await.map(|reply| {
            extract_profile_url(&reply).map_or_else(|| Lookup::not_found(NO_PROFILE_FOUND), Lookup::Found)
        });
        Lookup::settle("linkedin finder", result)
    }

    async fn ask(&self, prompt: &str) -> Result<String, RemoteError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 256,
            },
        };
        let url = format!("{}?key={}", self.endpoint, urlencoding::encode(&self.api_key));
        let resp = self.http.post(&url).json(&body).send().await?;
        let parsed: GenerateResponse = check_response(resp)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(parsed.text())
    }
}

fn prompt(name: &str, company: &str) -> String {
    format!(
        "Find the LinkedIn profile URL of {name} who works at {company}. \
         Reply with only the full https://www.linkedin.com/in/... URL of the most likely profile. \
         If no profile can be identified, reply with NONE.",
        name = name.trim(),
        company = company.trim(),
    )
}

/// First `linkedin.com/in/<handle>` link in `text`, normalized to `https://`.
#[must_use]
pub fn extract_profile_url(text: &str) -> Option<String> {
    const MARKER: &str = "linkedin.com/in/";
    let lower = text.to_ascii_lowercase();
    let at = lower.find(MARKER)?;

    let start = text[..at]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace() || matches!(c, '(' | '<' | '"' | '\'' | '['))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let end = text[at..]
        .find(|c: char| c.is_whitespace() || matches!(c, ')' | '>' | '"' | '\'' | ']' | ','))
        .map_or(text.len(), |i| at + i);
    let candidate = text[start..end].trim_end_matches(['.', ';']);

    let handle = &candidate[candidate.to_ascii_lowercase().find(MARKER)? + MARKER.len()..];
    if handle.trim_matches('/').is_empty() {
        return None;
    }

    let without_scheme = candidate
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    Some(format!("https://{without_scheme}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_bare_url() {
        assert_eq!(
            extract_profile_url("https://www.linkedin.com/in/ada-lovelace"),
            Some("https://www.linkedin.com/in/ada-lovelace".to_owned())
        );
    }

    #[test]
    fn extracts_from_prose_and_markdown() {
        assert_eq!(
            extract_profile_url("The profile is [here](https://linkedin.com/in/ada/)."),
            Some("https://linkedin.com/in/ada/".to_owned())
        );
        assert_eq!(
            extract_profile_url("Most likely: www.linkedin.com/in/grace-hopper."),
            Some("https://www.linkedin.com/in/grace-hopper".to_owned())
        );
        assert_eq!(
            extract_profile_url("see http://uk.linkedin.com/in/alan"),
            Some("https://uk.linkedin.com/in/alan".to_owned())
        );
    }

    #[test]
    fn no_profile() {
        assert_eq!(extract_profile_url("NONE"), None);
        assert_eq!(extract_profile_url("https://www.linkedin.com/company/acme"), None);
        assert_eq!(extract_profile_url("https://linkedin.com/in/"), None);
    }

    #[test]
    fn response_text_joins_parts() {
        let resp: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Answer:"}, {"text": "https://linkedin.com/in/ada"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(resp.text(), "Answer:\nhttps://linkedin.com/in/ada");
    }

    #[test]
    fn request_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt(" Ada ", "Analytical "),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 256,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);
        let text = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Ada who works at Analytical."));
    }

    #[test]
    fn endpoint_includes_model() {
        let client = LinkedinClient::new(&LinkedinConfig {
            api_key: "k".into(),
            ..LinkedinConfig::default()
        })
        .unwrap();
        assert!(client.endpoint.ends_with("/gemini-2.0-flash:generateContent"));
    }
}
