//! Azure AI Foundry Agents REST client.
//!
//! Speaks the thread/message/run protocol: a run is started on a thread,
//! polled while the platform works, and whenever it stops with
//! `requires_action` the requested function tools are executed locally and
//! their outputs submitted back.

use crate::core::tools::ToolRegistry;
use crate::core::{AgentDefinition, AgentRuntime, ToolSpec};
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const DEFAULT_API_VERSION: &str = "2025-05-01";

#[derive(Debug, Clone)]
pub struct FoundrySettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub poll_interval: Duration,
    pub run_timeout: Duration,
    pub request_timeout: Duration,
}

impl FoundrySettings {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            poll_interval: Duration::from_millis(500),
            run_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(60),
        }
    }
}

pub struct FoundryAgentClient {
    client: Client,
    settings: FoundrySettings,
    // 以 agent 名稱快取平台上建立的 assistant id
    assistants: Mutex<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct IdObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
    #[serde(default)]
    required_action: Option<RequiredAction>,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputs {
    #[serde(default)]
    tool_calls: Vec<ToolCallObject>,
}

#[derive(Debug, Deserialize)]
struct ToolCallObject {
    id: String,
    #[serde(default)]
    function: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct RunError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    role: String,
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
}

fn function_definitions(specs: &[ToolSpec]) -> Vec<Value> {
    specs
        .iter()
        .map(|spec| {
            json!({
                "type": "function",
                "function": {
                    "name": spec.name,
                    "description": spec.description,
                    "parameters": spec.parameters,
                }
            })
        })
        .collect()
}

impl FoundryAgentClient {
    pub fn new(settings: FoundrySettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(AgentError::AgentNotConfigured {
                message: "AZURE_AI_API_KEY is empty".to_string(),
            });
        }

        let client = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            client,
            settings,
            assistants: Mutex::new(HashMap::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.endpoint.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .query(&[("api-version", self.settings.api_version.as_str())])
            .bearer_auth(&self.settings.api_key)
    }

    fn post(&self, path: &str, body: &Value) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .query(&[("api-version", self.settings.api_version.as_str())])
            .bearer_auth(&self.settings.api_key)
            .json(body)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Agent platform returned {}: {}", status, body);
            return Err(AgentError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Returns the platform agent to run: the configured one, or one created
    /// on first use from the definition and cached by name.
    async fn ensure_assistant(&self, definition: &AgentDefinition, tools: &ToolRegistry) -> Result<String> {
        if let Some(agent_id) = &definition.agent_id {
            return Ok(agent_id.clone());
        }

        let mut assistants = self.assistants.lock().await;
        if let Some(id) = assistants.get(&definition.name) {
            return Ok(id.clone());
        }

        let body = json!({
            "name": definition.name,
            "model": definition.model,
            "instructions": definition.instructions,
            "tools": function_definitions(&tools.specs()),
        });
        let created: IdObject = self.send(self.post("assistants", &body)).await?;
        tracing::info!("Created agent {} ({})", definition.name, created.id);

        assistants.insert(definition.name.clone(), created.id.clone());
        Ok(created.id)
    }

    async fn execute_tool_calls(&self, calls: Vec<ToolCallObject>, tools: &ToolRegistry) -> Vec<Value> {
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            let output = match call.function {
                Some(function) => {
                    let arguments = if function.arguments.trim().is_empty() {
                        Value::Null
                    } else {
                        serde_json::from_str(&function.arguments)
                            .unwrap_or(Value::String(function.arguments.clone()))
                    };
                    match tools.dispatch(&function.name, arguments).await {
                        Ok(output) => output,
                        Err(e) => {
                            tracing::warn!("Tool {} failed: {}", function.name, e);
                            json!({ "error": e.to_string() }).to_string()
                        }
                    }
                }
                None => json!({ "error": "Unsupported tool call type" }).to_string(),
            };
            outputs.push(json!({ "tool_call_id": call.id, "output": output }));
        }
        outputs
    }

    async fn latest_assistant_text(&self, thread_id: &str) -> Result<String> {
        let messages: MessageList = self
            .send(
                self.get(&format!("threads/{}/messages", thread_id))
                    .query(&[("order", "desc")]),
            )
            .await?;

        messages
            .data
            .into_iter()
            .filter(|m| m.role == "assistant")
            .find_map(|m| {
                m.content
                    .into_iter()
                    .filter_map(|c| c.text.map(|t| t.value))
                    .last()
            })
            .ok_or_else(|| AgentError::EmptyAgentResponse {
                thread_id: thread_id.to_string(),
            })
    }
}

#[async_trait]
impl AgentRuntime for FoundryAgentClient {
    async fn create_thread(&self) -> Result<String> {
        let thread: IdObject = self.send(self.post("threads", &json!({}))).await?;
        tracing::debug!("Created thread {}", thread.id);
        Ok(thread.id)
    }

    async fn run_thread(
        &self,
        thread_id: &str,
        definition: &AgentDefinition,
        user_message: &str,
        tools: &ToolRegistry,
    ) -> Result<String> {
        let assistant_id = self.ensure_assistant(definition, tools).await?;

        let _: IdObject = self
            .send(self.post(
                &format!("threads/{}/messages", thread_id),
                &json!({ "role": "user", "content": user_message }),
            ))
            .await?;

        let mut run_body = json!({ "assistant_id": assistant_id });
        if !tools.is_empty() {
            run_body["tools"] = Value::Array(function_definitions(&tools.specs()));
        }
        let mut run: RunObject = self
            .send(self.post(&format!("threads/{}/runs", thread_id), &run_body))
            .await?;

        let deadline = Instant::now() + self.settings.run_timeout;
        loop {
            tracing::debug!("Run {} status: {}", run.id, run.status);
            match run.status.as_str() {
                "completed" => break,
                "requires_action" => {
                    let calls = run
                        .required_action
                        .take()
                        .map(|action| action.submit_tool_outputs.tool_calls)
                        .unwrap_or_default();
                    let outputs = self.execute_tool_calls(calls, tools).await;
                    run = self
                        .send(self.post(
                            &format!("threads/{}/runs/{}/submit_tool_outputs", thread_id, run.id),
                            &json!({ "tool_outputs": outputs }),
                        ))
                        .await?;
                }
                "queued" | "in_progress" | "cancelling" => {
                    tokio::time::sleep(self.settings.poll_interval).await;
                    run = self
                        .send(self.get(&format!("threads/{}/runs/{}", thread_id, run.id)))
                        .await?;
                }
                status => {
                    let message = run
                        .last_error
                        .as_ref()
                        .map(|e| {
                            format!(
                                "{}: {}",
                                e.code.as_deref().unwrap_or("error"),
                                e.message.as_deref().unwrap_or("no details")
                            )
                        })
                        .unwrap_or_else(|| "no details".to_string());
                    return Err(AgentError::AgentRunFailed {
                        run_id: run.id,
                        status: status.to_string(),
                        message,
                    });
                }
            }

            if Instant::now() > deadline {
                return Err(AgentError::AgentRunFailed {
                    run_id: run.id,
                    status: run.status,
                    message: format!("run exceeded {:?}", self.settings.run_timeout),
                });
            }
        }

        self.latest_assistant_text(thread_id).await
    }
}
