use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: String,
    pub api_token: String,
    pub data_path: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub reminder_cron: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")?;
        let api_token = env::var("API_TOKEN")?;
        let data_path =
            env::var("DATA_PATH").unwrap_or_else(|_| "recovery-tracker.json".to_string());
        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|key| !key.is_empty());
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        let gemini_api_url = env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let reminder_cron = env::var("REMINDER_CRON").unwrap_or_else(|_| "0 0 7 * * *".to_string());

        Ok(Self {
            port,
            api_token,
            data_path: PathBuf::from(data_path),
            gemini_api_key,
            gemini_model,
            gemini_api_url,
            reminder_cron,
        })
    }
}
