use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "prompt-gateway")]
#[command(about = "Streaming prompt generator backed by an OpenAI-compatible API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Prompt template document, re-read on every request
    #[arg(short, long, default_value = "templates/prompt.md")]
    pub template: PathBuf,

    // Minimum gap between accepted generate requests, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub cooldown_ms: u64,
}

// Upstream provider settings, taken from the environment
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ProviderConfig {
    // OPENAI_API_KEY is required; base URL and model fall back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        let base_url =
            env::var("OPENAI_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url: normalize_base_url(&base_url),
            model,
        })
    }
}

// Request paths are joined with '/', so strip any trailing one here
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
