use std::future::Future;
use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use tokio::time::timeout;

use crate::error::AIError;
use crate::prompt::Prompt;
use crate::settings::Settings;

/// Text in, narrative out. The only operation in a turn that may suspend.
pub trait Narrator: Send + Sync {
    fn narrate(&self, prompt: &Prompt) -> impl Future<Output = Result<String, AIError>> + Send;
}

/// Chat-completions narrator for any OpenAI compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAINarrator {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    timeout: Duration,
}

impl OpenAINarrator {
    pub fn new(settings: &Settings) -> Result<Self, AIError> {
        let api_key = settings.api_key.as_ref().ok_or(AIError::MissingApiKey)?;
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(settings.base_url.trim_end_matches('/'));

        Ok(Self {
            client: Client::with_config(config),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            timeout: Duration::from_secs(settings.request_timeout_secs),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    // Asynchronously validate the API key against the endpoint's model list.
    pub async fn validate_api_key(&self) -> Result<(), AIError> {
        timeout(self.timeout, self.client.models().list())
            .await?
            .map(|_| ())
            .map_err(classify)
    }

    #[allow(deprecated)]
    async fn complete(&self, prompt: &Prompt) -> Result<String, AIError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .top_p(self.top_p)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(prompt.system.as_str())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt.user.as_str())
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = timeout(self.timeout, self.client.chat().create(request))
            .await?
            .map_err(classify)?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(AIError::EmptyReply);
        }
        Ok(reply)
    }
}

impl Narrator for OpenAINarrator {
    async fn narrate(&self, prompt: &Prompt) -> Result<String, AIError> {
        log_prompt(&self.model, prompt);
        match self.complete(prompt).await {
            Ok(reply) => {
                log::debug!("Received reply:\n{reply}");
                Ok(reply)
            }
            Err(e) => {
                log::error!("Error calling model {}: {e}", self.model);
                Err(e)
            }
        }
    }
}

fn classify(error: OpenAIError) -> AIError {
    match error {
        OpenAIError::Reqwest(e) => AIError::Transport(e.to_string()),
        OpenAIError::ApiError(api) => {
            let text = format!("{} {}", api.r#type.as_deref().unwrap_or(""), api.message);
            let lower = text.to_lowercase();
            if lower.contains("rate") || lower.contains("quota") || lower.contains("429") {
                AIError::RateLimited(api.message)
            } else if lower.contains("auth")
                || lower.contains("api key")
                || lower.contains("api_key")
                || lower.contains("401")
            {
                AIError::Authentication(api.message)
            } else {
                AIError::Transport(api.message)
            }
        }
        other => AIError::OpenAI(other),
    }
}

// Long prompts only log their head and tail.
fn log_prompt(model: &str, prompt: &Prompt) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("Sending prompt of {} chars to {model}", prompt.len());
    let text = format!("{}\n{}", prompt.system, prompt.user);
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() > 20 {
        log::debug!(
            "{}\n...\n{}",
            lines[..10].join("\n"),
            lines[lines.len() - 10..].join("\n")
        );
    } else {
        log::debug!("{text}");
    }
}
