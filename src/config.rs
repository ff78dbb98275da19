use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmSection,
}

/// Which extraction strategy the pipeline runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Local Ollama server with an OpenAI-compatible API
    Ollama,
    /// Remote OpenAI-compatible API, key from LLM_API_KEY
    Remote,
    /// No model at all — pattern rules only
    Heuristics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    pub backend: LlmBackend,
    #[serde(default)]
    pub ollama: OllamaEndpoint,
    #[serde(default)]
    pub remote: RemoteEndpoint,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Heuristics,
            ollama: OllamaEndpoint::default(),
            remote: RemoteEndpoint::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaEndpoint {
    pub base_url: String,
    pub model: String,
}

impl Default for OllamaEndpoint {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "qwen3:8b".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEndpoint {
    pub base_url: String,
    pub model: String,
}

impl Default for RemoteEndpoint {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
