//! Chat assistant session against the external generateContent endpoint.
//!
//! The session keeps two buffers: the visible transcript (bounded to the most
//! recent messages) and the rolling context history sent upstream, a
//! fixed-capacity deque that drops the oldest turn first. Requests are gated
//! by a hard timeout that aborts the in-flight call; failures of any kind
//! degrade to a canned in-conversation reply and are never retried
//! automatically.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::errors::AppError;

/// Hard cap on a single chat request.
pub const CHAT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Context turns kept for the upstream request.
pub const HISTORY_LIMIT: usize = 4;

/// Visible transcript bound; older messages are dropped.
pub const TRANSCRIPT_LIMIT: usize = 50;

/// Image attachments above this decoded size are rejected before sending.
pub const MAX_ATTACHMENT_BYTES: usize = 4 * 1024 * 1024;

const SYSTEM_PREAMBLE: &str = "You are Suraj Bhai, a caring AI tutor for the EduMaster platform. \
Respond in natural Hinglish (Hindi words in English letters). Be helpful, caring, and concise. \
Keep responses under 200 words for faster delivery.";

const GREETING: &str = "Namaste! Main Suraj Bhai hun 🙏\n\nHaan bolo, main aapki kaise help kar \
sakta hun? Main hamesha aapke liye ready hun!\n\n📚 Studies mein koi bhi doubt ho\n🔍 Koi bhi \
problem solve karni ho\n📝 Study tips chahiye hon\n💡 Koi bhi question ho\n\nAap ek baar apni \
problem ya issue ko bata kar to dekho, main puri koshish karunga aapki help karne ki!\n\nAchha \
aur batao, studies kaise chal rahi hai? 😊";

const ERROR_REPLY: &str = "Are yaar, mujhe kuch technical problem ho rahi hai 😅\n\nKoi baat \
nahi, aap phir se try kariye. Main yahi hun aapki help ke liye! 🙏";

const TIMEOUT_REPLY: &str = "Response time zyada ho gaya, phir se try kariye! 🔄\n\nMain jaldi \
jawab dene ki koshish kar raha hun.";

const API_ERROR_REPLY: &str = "API mein kuch issue hai, thoda wait karke phir try kariye! ⏳";

/// Who produced a context turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// An inline image attachment, base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One part of a context turn: text, an inline image, or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// One turn of upstream conversation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: i32,
    top_p: f32,
    max_output_tokens: i32,
    stop_sequences: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 300,
            stop_sequences: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<ChatTurn>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// A message in the visible transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<InlineData>,
}

/// HTTP client for the generateContent endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    async fn generate(&self, contents: Vec<ChatTurn>) -> Result<String, AppError> {
        let request = GenerateRequest {
            contents,
            generation_config: GenerationConfig::default(),
            safety_settings: vec![SafetySetting {
                category: "HARM_CATEGORY_HARASSMENT".to_string(),
                threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
            }],
        };

        let url = match &self.api_key {
            Some(key) => format!("{}?key={}", self.endpoint, key),
            None => self.endpoint.clone(),
        };

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Chat API returned {}",
                response.status()
            )));
        }

        let payload: GenerateResponse = response.json().await?;
        let text = payload
            .candidates
            .into_iter()
            .flatten()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
            .ok_or_else(|| AppError::Upstream("Malformed chat API response".to_string()))?;

        Ok(strip_bold(&text).trim().to_string())
    }
}

/// Remove `**bold**` markers the model tends to emit.
fn strip_bold(text: &str) -> String {
    text.replace("**", "")
}

fn canned_reply_for(err: &AppError) -> &'static str {
    match err {
        AppError::Upstream(message) if message.starts_with("Chat API returned") => API_ERROR_REPLY,
        _ => ERROR_REPLY,
    }
}

/// A single conversation with the assistant.
pub struct ChatSession {
    client: ChatClient,
    history: VecDeque<ChatTurn>,
    transcript: Vec<ChatMessage>,
    history_limit: usize,
    request_timeout: Duration,
    next_id: u64,
}

impl ChatSession {
    pub fn new(client: ChatClient) -> Self {
        Self::with_limits(client, HISTORY_LIMIT, CHAT_REQUEST_TIMEOUT)
    }

    pub fn with_limits(client: ChatClient, history_limit: usize, request_timeout: Duration) -> Self {
        let mut session = Self {
            client,
            history: VecDeque::new(),
            transcript: Vec::new(),
            history_limit,
            request_timeout,
            next_id: 0,
        };
        session.push_transcript(GREETING.to_string(), false, None);
        session
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Send a user message, optionally with an inline image, and return the
    /// assistant's transcript entry. Upstream failures and timeouts resolve to
    /// a canned reply rather than an error; only invalid input is an `Err`.
    pub async fn send(
        &mut self,
        text: &str,
        attachment: Option<InlineData>,
    ) -> Result<ChatMessage, AppError> {
        let text = text.trim();
        if text.is_empty() && attachment.is_none() {
            return Err(AppError::Validation("Message is required".to_string()));
        }

        if let Some(data) = &attachment {
            if !data.mime_type.starts_with("image/") {
                return Err(AppError::Validation(
                    "Only image attachments are supported".to_string(),
                ));
            }
            let bytes = BASE64.decode(&data.data).map_err(|_| {
                AppError::Validation("Attachment is not valid base64".to_string())
            })?;
            if bytes.len() > MAX_ATTACHMENT_BYTES {
                return Err(AppError::Validation(
                    "Image attachments must be smaller than 4 MiB".to_string(),
                ));
            }
        }

        self.push_transcript(text.to_string(), true, attachment.clone());

        let mut user_parts = vec![Part {
            text: Some(format!("{}\n\nUser query: {}", SYSTEM_PREAMBLE, text)),
            inline_data: None,
        }];
        if let Some(data) = attachment {
            user_parts.push(Part {
                text: None,
                inline_data: Some(data),
            });
        }

        let mut contents: Vec<ChatTurn> = self.history.iter().cloned().collect();
        contents.push(ChatTurn {
            role: Role::User,
            parts: user_parts,
        });

        let outcome =
            tokio::time::timeout(self.request_timeout, self.client.generate(contents)).await;

        let reply = match outcome {
            Ok(Ok(reply)) => {
                self.push_history(Role::User, text.to_string());
                self.push_history(Role::Model, reply.clone());
                reply
            }
            Ok(Err(err)) => {
                tracing::warn!("Chat request failed: {}", err);
                canned_reply_for(&err).to_string()
            }
            Err(_) => {
                tracing::warn!(
                    "Chat request did not settle within {:?}, dropping it",
                    self.request_timeout
                );
                TIMEOUT_REPLY.to_string()
            }
        };

        Ok(self.push_transcript(reply, false, None))
    }

    fn push_history(&mut self, role: Role, text: String) {
        self.history.push_back(ChatTurn {
            role,
            parts: vec![Part {
                text: Some(text),
                inline_data: None,
            }],
        });
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    fn push_transcript(
        &mut self,
        text: String,
        is_user: bool,
        attachment: Option<InlineData>,
    ) -> ChatMessage {
        let message = ChatMessage {
            id: format!("m{}", self.next_id),
            text,
            is_user,
            timestamp: Utc::now().to_rfc3339(),
            attachment,
        };
        self.next_id += 1;
        self.transcript.push(message.clone());
        while self.transcript.len() > TRANSCRIPT_LIMIT {
            self.transcript.remove(0);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Upstream {
        hits: Arc<AtomicUsize>,
        bodies: Arc<Mutex<Vec<Value>>>,
        delay: Duration,
        status: u16,
        reply: String,
    }

    impl Upstream {
        fn new(delay: Duration, status: u16, reply: &str) -> Self {
            Self {
                hits: Arc::new(AtomicUsize::new(0)),
                bodies: Arc::new(Mutex::new(Vec::new())),
                delay,
                status,
                reply: reply.to_string(),
            }
        }

        fn body(&self, index: usize) -> Value {
            self.bodies.lock().unwrap()[index].clone()
        }
    }

    async fn generate_stub(
        State(upstream): State<Upstream>,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        upstream.hits.fetch_add(1, Ordering::SeqCst);
        upstream.bodies.lock().unwrap().push(body);
        tokio::time::sleep(upstream.delay).await;

        if upstream.status != 200 {
            let status = StatusCode::from_u16(upstream.status).unwrap();
            return (status, Json(json!({"error": {"message": "boom"}}))).into_response();
        }

        Json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": upstream.reply.clone()}]
                }
            }]
        }))
        .into_response()
    }

    async fn spawn_upstream(upstream: Upstream) -> String {
        let app = Router::new()
            .route("/generate", post(generate_stub))
            .with_state(upstream);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/generate", addr)
    }

    fn session_for(url: String, timeout: Duration) -> ChatSession {
        let client = ChatClient::new(url, Some("test-key".to_string()));
        ChatSession::with_limits(client, HISTORY_LIMIT, timeout)
    }

    #[tokio::test]
    async fn test_first_send_carries_no_history() {
        let upstream = Upstream::new(Duration::ZERO, 200, "Bilkul, main **madad** karunga!");
        let url = spawn_upstream(upstream.clone()).await;
        let mut session = session_for(url, Duration::from_secs(2));

        let reply = session.send("hello", None).await.unwrap();

        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
        let contents = upstream.body(0)["contents"].as_array().unwrap().len();
        assert_eq!(contents, 1);
        assert_eq!(reply.text, "Bilkul, main madad karunga!");
        // greeting + user + bot
        assert_eq!(session.transcript().len(), 3);
        assert_eq!(session.history_len(), 2);
    }

    #[tokio::test]
    async fn test_history_is_capped_with_oldest_dropped() {
        let upstream = Upstream::new(Duration::ZERO, 200, "Samajh gaya!");
        let url = spawn_upstream(upstream.clone()).await;
        let mut session = session_for(url, Duration::from_secs(2));

        for i in 1..=6 {
            session.send(&format!("message {}", i), None).await.unwrap();
        }

        assert_eq!(upstream.hits.load(Ordering::SeqCst), 6);
        let sixth = upstream.body(5);
        let contents = sixth["contents"].as_array().unwrap();
        assert_eq!(contents.len(), HISTORY_LIMIT + 1);

        let serialized = sixth.to_string();
        assert!(!serialized.contains("message 1"));
        assert!(serialized.contains("message 4"));
        assert!(serialized.contains("message 5"));
    }

    #[tokio::test]
    async fn test_timeout_appends_canned_reply_exactly_once() {
        let upstream = Upstream::new(Duration::from_millis(500), 200, "too late");
        let url = spawn_upstream(upstream.clone()).await;
        let mut session = session_for(url, Duration::from_millis(50));

        let reply = session.send("hello", None).await.unwrap();
        assert_eq!(reply.text, TIMEOUT_REPLY);
        assert_eq!(session.transcript().len(), 3);
        // history is only recorded on success
        assert_eq!(session.history_len(), 0);

        // Let the aborted upstream call run to completion; nothing may be
        // appended after the fact.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(session.transcript().len(), 3);
        let timeout_replies = session
            .transcript()
            .iter()
            .filter(|message| message.text == TIMEOUT_REPLY)
            .count();
        assert_eq!(timeout_replies, 1);
    }

    #[tokio::test]
    async fn test_upstream_error_yields_api_canned_reply() {
        let upstream = Upstream::new(Duration::ZERO, 500, "");
        let url = spawn_upstream(upstream.clone()).await;
        let mut session = session_for(url, Duration::from_secs(2));

        let reply = session.send("hello", None).await.unwrap();
        assert_eq!(reply.text, API_ERROR_REPLY);
        assert_eq!(session.history_len(), 0);
    }

    #[tokio::test]
    async fn test_rejects_oversized_attachment() {
        let mut session = session_for("http://127.0.0.1:9/generate".to_string(), Duration::ZERO);

        let oversized = BASE64.encode(vec![0u8; MAX_ATTACHMENT_BYTES + 1]);
        let attachment = InlineData {
            mime_type: "image/png".to_string(),
            data: oversized,
        };

        let err = session.send("dekho", Some(attachment)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // rejected before anything was appended; only the greeting remains
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_non_image_attachment() {
        let mut session = session_for("http://127.0.0.1:9/generate".to_string(), Duration::ZERO);

        let attachment = InlineData {
            mime_type: "application/pdf".to_string(),
            data: BASE64.encode(b"notes"),
        };

        let err = session.send("dekho", Some(attachment)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rejects_empty_message() {
        let mut session = session_for("http://127.0.0.1:9/generate".to_string(), Duration::ZERO);
        let err = session.send("   ", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_strip_bold() {
        assert_eq!(strip_bold("padho **roz** thoda"), "padho roz thoda");
        assert_eq!(strip_bold("no markers"), "no markers");
    }
}
