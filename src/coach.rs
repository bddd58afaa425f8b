//! Productivity tips from the Gemini text-generation API.
//!
//! Every public entry point returns a displayable string. Failures are
//! logged and replaced by a canned line.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::{
    sync::{mpsc::Sender, Arc},
    thread,
    time::Duration,
};
use tracing::{debug, info, warn};

use crate::{error::CoachError, tasks::Task, timer::Mode};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub const ADVICE_EMPTY: &str = "Keep pushing! Your potential is unlimited.";
pub const ADVICE_FAILED: &str = "Focus on the small wins. One task at a time.";
pub const REFLECTION_EMPTY: &str = "Great session! Ready for another?";
pub const REFLECTION_FAILED: &str = "Solid work. Take a breather.";

#[derive(Debug, Clone)]
pub struct CoachConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct Coach {
    client: Client,
    config: CoachConfig,
}

impl Coach {
    pub fn new(config: CoachConfig) -> Result<Self, CoachError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn is_available(&self) -> bool {
        self.config.enabled && self.config.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn advice(&self, tasks: &[Task], mode: Mode) -> String {
        let prompt = advice_prompt(tasks, mode);
        resolve(self.generate(&prompt, Some(0.7), Some(0.8)), ADVICE_EMPTY, ADVICE_FAILED)
    }

    pub fn reflection(&self, worked_on: &[Task], minutes: u32) -> String {
        let prompt = reflection_prompt(worked_on, minutes);
        resolve(self.generate(&prompt, None, None), REFLECTION_EMPTY, REFLECTION_FAILED)
    }

    fn generate(&self, prompt: &str, temperature: Option<f32>, top_p: Option<f32>) -> Result<String, CoachError> {
        if !self.config.enabled {
            return Err(CoachError::Disabled);
        }
        let api_key = self.config.api_key.as_deref().ok_or(CoachError::MissingApiKey)?;

        let request = GenerateRequest {
            contents: vec![Content { role: "user", parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { temperature, top_p },
        };
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        debug!(model = %self.config.model, "sending coach request");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(CoachError::Api { status: status.as_u16(), message });
        }

        let body: GenerateResponse = response.json()?;
        extract_text(&body).ok_or(CoachError::EmptyResponse)
    }
}

fn extract_text(body: &GenerateResponse) -> Option<String> {
    let text: String = body
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect();
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn resolve(result: Result<String, CoachError>, empty: &str, failed: &str) -> String {
    match result {
        Ok(text) => {
            info!(chars = text.len(), "coach reply received");
            text
        }
        Err(CoachError::EmptyResponse) => {
            warn!("coach reply had no text, using fallback");
            empty.to_string()
        }
        Err(e) => {
            warn!(error = %e, "coach request failed, using fallback");
            failed.to_string()
        }
    }
}

pub fn advice_prompt(tasks: &[Task], mode: Mode) -> String {
    let task_summary = if tasks.is_empty() {
        "No tasks listed yet.".to_string()
    } else {
        tasks
            .iter()
            .map(|t| format!("- {} ({})", t.title, if t.completed { "Done" } else { "Pending" }))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are an expert productivity coach.\n\
         Current state: User is in \"{}\" mode.\n\
         Tasks list:\n{}\n\n\
         Give a very short, punchy, and motivational tip (max 2 sentences) for the user to stay \
         focused or make the most of their break.\n\
         If they have no tasks, encourage them to define one clear goal.\n\
         Style: Professional but encouraging, like a high-end Linux performance tool.",
        mode.label(),
        task_summary
    )
}

pub fn reflection_prompt(worked_on: &[Task], minutes: u32) -> String {
    let summary = worked_on.iter().map(|t| t.title.as_str()).collect::<Vec<_>>().join(", ");
    let summary = if summary.is_empty() { "various tasks" } else { summary.as_str() };

    format!(
        "The user just finished a {} minute focus session.\n\
         They worked on: {}.\n\
         Write a brief \"performance review\" comment that acknowledges their effort and suggests \
         one tiny improvement for the next session.",
        minutes, summary
    )
}

// ============================================================================
// Background requests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachKind {
    Advice,
    Reflection,
}

#[derive(Debug, Clone)]
pub enum CoachRequest {
    Advice { tasks: Vec<Task>, mode: Mode },
    Reflection { worked_on: Vec<Task>, minutes: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoachReply {
    pub kind: CoachKind,
    pub text: String,
}

/// Run `request` on a worker thread and deliver the reply over `replies`.
pub fn spawn_request(coach: Arc<Coach>, request: CoachRequest, replies: Sender<CoachReply>) {
    thread::spawn(move || {
        let reply = match request {
            CoachRequest::Advice { tasks, mode } => CoachReply {
                kind: CoachKind::Advice,
                text: coach.advice(&tasks, mode),
            },
            CoachRequest::Reflection { worked_on, minutes } => CoachReply {
                kind: CoachKind::Reflection,
                text: coach.reflection(&worked_on, minutes),
            },
        };
        // The UI may have quit already.
        let _ = replies.send(reply);
    });
}
