//! Configuration model.

use serde::{Deserialize, Serialize};

/// Main configuration structure for sqlchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// MySQL connection defaults
    #[serde(default)]
    pub mysql: MysqlConfig,

    /// LLM provider credentials and request settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop limits
    #[serde(default)]
    pub agent: AgentConfig,

    /// CSV loader defaults
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Origins allowed to make credentialed cross-origin requests
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_server_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// MySQL connection defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MysqlConfig {
    /// Login user
    #[serde(default)]
    pub user: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Server host
    #[serde(default = "default_mysql_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database (schema) name
    #[serde(default = "default_mysql_database")]
    pub database: String,
}

fn default_mysql_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_mysql_port() -> u16 {
    3306
}

fn default_mysql_database() -> String {
    "company_db".to_string()
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            host: default_mysql_host(),
            port: default_mysql_port(),
            database: default_mysql_database(),
        }
    }
}

/// LLM provider credentials and request settings
///
/// Credentials are optional here; a missing one only becomes an error when
/// the provider that needs it is selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// OpenAI API key (`OPENAI_API_KEY`)
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Groq API key (`GROQ_API_KEY`)
    #[serde(default)]
    pub groq_api_key: Option<String>,

    /// OpenRouter API key (`OPENROUTER_API_KEY`)
    #[serde(default)]
    pub openrouter_api_key: Option<String>,

    /// GitHub Models token (`GITHUB_PAT`)
    #[serde(default)]
    pub github_pat: Option<String>,

    /// Provider used when a connect request names none
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Per-request timeout for chat completions, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "openai".to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            groq_api_key: None,
            openrouter_api_key: None,
            github_pat: None,
            default_provider: default_provider(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Agent loop limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AgentConfig {
    /// Maximum LLM calls spent on one question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Row limit the agent is asked to apply to its queries
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Example rows shown per table in schema descriptions
    #[serde(default = "default_sample_rows")]
    pub sample_rows: u32,
}

const fn default_max_iterations() -> u32 {
    15
}

const fn default_top_k() -> u32 {
    10
}

const fn default_sample_rows() -> u32 {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            top_k: default_top_k(),
            sample_rows: default_sample_rows(),
        }
    }
}

/// CSV loader defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoaderConfig {
    /// Directory scanned for CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Output file for the SQLite loader
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_sqlite_path() -> String {
    "mydata.db".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
