//! Conversation-aware question answering over the vector index.
//!
//! The chain mirrors a history-aware retrieval setup: when a session has
//! prior turns, the latest question is first reformulated into a standalone
//! one, the standalone question is embedded and matched against the index,
//! and the answer is generated from the retrieved context plus the session
//! history. Both the question and the answer are appended to the session.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::time::Duration;

use crate::config::{ChatConfig, Config};
use crate::embedding::{self, Embedder};
use crate::models::{ChatTurn, VectorMatch};
use crate::session::{InMemorySessionStore, SessionStore};
use crate::vector_store::{self, VectorIndex};

/// REPL exit tokens, matched case-insensitively.
const EXIT_TOKENS: [&str; 3] = ["exit", "quit", "q"];

const ANSWER_PROMPT: &str = "You are an assistant chatbot helping a student with academic guidance. \
Answer using only the retrieved context below: course details, units ('U'), minor programmes, \
handout contents, timetable entries, and campus information. When asked about a course, give its \
number, title, and units; for timetable queries give course number, name, section, instructor, \
room, and hours; for exams give both midsem and compre timings. Quote policies verbatim from \
handouts. Do not invent information that is not present in the context.";

const REFORMULATE_PROMPT: &str = "Given a chat history and the latest user question which might \
reference context in the chat history, formulate a standalone question which can be understood \
without the chat history. Do NOT answer the question, just reformulate it if needed and otherwise \
return it as is.";

/// Chat completion capability: full prompt in, answer text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String>;
}

/// Create the configured chat model. Requires `OPENAI_API_KEY` for the
/// OpenAI provider.
pub fn create_chat_model(config: &ChatConfig) -> Result<Box<dyn ChatModel>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiChat::new(config)?)),
        other => bail!("Unknown chat provider: {}", other),
    }
}

/// Chat model using the OpenAI `/v1/chat/completions` endpoint.
pub struct OpenAiChat {
    model: String,
    temperature: f64,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiChat {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String> {
        let messages: Vec<serde_json::Value> = turns
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": turn.role.as_str(),
                    "content": turn.content,
                })
            })
            .collect();

        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages,
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("OpenAI chat API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid chat response: missing message content"))
    }
}

/// The conversational retrieval chain over injected capabilities.
pub struct ChatEngine {
    model: Box<dyn ChatModel>,
    embedder: Box<dyn Embedder>,
    index: Box<dyn VectorIndex>,
    sessions: Box<dyn SessionStore>,
    top_k: usize,
}

impl ChatEngine {
    pub fn new(
        model: Box<dyn ChatModel>,
        embedder: Box<dyn Embedder>,
        index: Box<dyn VectorIndex>,
        sessions: Box<dyn SessionStore>,
        top_k: usize,
    ) -> Self {
        Self {
            model,
            embedder,
            index,
            sessions,
            top_k,
        }
    }

    /// Build an engine from config with an in-memory session store.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            create_chat_model(&config.chat)?,
            embedding::create_embedder(&config.embedding)?,
            vector_store::create_index(&config.vector_store)?,
            Box::new(InMemorySessionStore::new()),
            config.chat.top_k,
        ))
    }

    /// Answer one user turn within a session.
    pub async fn answer(&self, input: &str, session_id: &str) -> Result<String> {
        let history = self.sessions.history(session_id);

        // A fresh session has nothing to resolve references against.
        let standalone = if history.is_empty() {
            input.to_string()
        } else {
            self.reformulate(&history, input).await?
        };

        let query_vec = embedding::embed_query(self.embedder.as_ref(), &standalone)
            .await
            .context("embedding the query failed")?;
        let matches = self
            .index
            .query(&query_vec, self.top_k)
            .await
            .context("vector search failed")?;

        let mut turns = vec![ChatTurn::system(format!(
            "{}\n\nContext:\n{}",
            ANSWER_PROMPT,
            stuff_context(&matches)
        ))];
        turns.extend(history.iter().cloned());
        turns.push(ChatTurn::user(input));

        let answer = self
            .model
            .complete(&turns)
            .await
            .context("answer generation failed")?;

        self.sessions.append(session_id, ChatTurn::user(input));
        self.sessions
            .append(session_id, ChatTurn::assistant(answer.clone()));

        Ok(answer)
    }

    async fn reformulate(&self, history: &[ChatTurn], input: &str) -> Result<String> {
        let mut turns = vec![ChatTurn::system(REFORMULATE_PROMPT)];
        turns.extend(history.iter().cloned());
        turns.push(ChatTurn::user(input));
        self.model
            .complete(&turns)
            .await
            .context("query reformulation failed")
    }
}

fn stuff_context(matches: &[VectorMatch]) -> String {
    matches
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn is_exit_token(input: &str) -> bool {
    EXIT_TOKENS.contains(&input.trim().to_lowercase().as_str())
}

/// REPL: read a line per turn, forward it to the chain, print the answer.
pub async fn run_chat(config: &Config, session_id: &str) -> Result<()> {
    let engine = ChatEngine::from_config(config)?;
    let stdin = std::io::stdin();

    loop {
        print!("You| ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_token(input) {
            println!("Ending the conversation. Goodbye!");
            break;
        }

        match engine.answer(input, session_id).await {
            Ok(answer) => println!("{}", answer),
            Err(e) => eprintln!("Error: {:#}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every prompt and replays canned responses in order.
    struct FakeModel {
        calls: Mutex<Vec<Vec<ChatTurn>>>,
        responses: Mutex<Vec<String>>,
    }

    impl FakeModel {
        fn new(responses: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn call(&self, i: usize) -> Vec<ChatTurn> {
            self.calls.lock().unwrap()[i].clone()
        }
    }

    #[async_trait]
    impl ChatModel for &FakeModel {
        async fn complete(&self, turns: &[ChatTurn]) -> Result<String> {
            self.calls.lock().unwrap().push(turns.to_vec());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| "out of responses".to_string()))
        }
    }

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        fn model_name(&self) -> &str {
            "fake"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }
    }

    struct FakeIndex;

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn upsert(&self, _records: &[crate::models::VectorRecord]) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<VectorMatch>> {
            Ok(vec![VectorMatch {
                id: "course_0_chunk_0".to_string(),
                score: 0.9,
                text: "CS101 has 4 units".to_string(),
            }])
        }
    }

    fn engine_with(model: &'static FakeModel) -> ChatEngine {
        ChatEngine::new(
            Box::new(model),
            Box::new(FakeEmbedder),
            Box::new(FakeIndex),
            Box::new(InMemorySessionStore::new()),
            8,
        )
    }

    fn leak_model(responses: &[&str]) -> &'static FakeModel {
        Box::leak(Box::new(FakeModel::new(responses)))
    }

    #[tokio::test]
    async fn test_fresh_session_skips_reformulation() {
        let model = leak_model(&["CS101 is Intro."]);
        let engine = engine_with(model);

        let answer = engine.answer("what is CS101?", "s1").await.unwrap();
        assert_eq!(answer, "CS101 is Intro.");
        // Only the answer completion, no reformulation call.
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retrieved_context_reaches_answer_prompt() {
        let model = leak_model(&["answer"]);
        let engine = engine_with(model);

        engine.answer("units of CS101?", "s1").await.unwrap();
        let prompt = model.call(0);
        assert!(prompt[0].content.contains("CS101 has 4 units"));
        assert_eq!(prompt.last().unwrap().content, "units of CS101?");
    }

    #[tokio::test]
    async fn test_second_turn_reformulates_with_history() {
        let model = leak_model(&["It has 4 units.", "How many units does CS101 have?", "Four."]);
        let engine = engine_with(model);

        engine.answer("tell me about CS101", "s1").await.unwrap();
        engine.answer("how many units?", "s1").await.unwrap();

        // Turn 1: answer. Turn 2: reformulation + answer.
        assert_eq!(model.call_count(), 3);
        let reformulation = model.call(1);
        assert!(reformulation[0].content.contains("standalone question"));
        assert!(reformulation
            .iter()
            .any(|t| t.content.contains("tell me about CS101")));
    }

    #[tokio::test]
    async fn test_both_turns_recorded_in_session() {
        let model = leak_model(&["the answer"]);
        let engine = engine_with(model);

        engine.answer("a question", "s1").await.unwrap();
        let history = engine.sessions.history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "a question");
        assert_eq!(history[1].content, "the answer");
    }

    #[test]
    fn test_exit_tokens_case_insensitive() {
        for token in ["exit", "QUIT", "q", "Q", " Exit "] {
            assert!(is_exit_token(token), "{token} should exit");
        }
        assert!(!is_exit_token("quit please"));
        assert!(!is_exit_token("what is CS101?"));
    }
}
