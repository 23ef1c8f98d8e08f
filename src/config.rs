use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::output::{Language, ReportOptions, ReportStyle};
use crate::roster::HeaderSpec;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub headers: HeadersConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadersConfig {
    #[serde(default = "default_start_header")]
    pub start: String,
    #[serde(default = "default_end_header")]
    pub end: String,
    #[serde(default = "default_participant_header")]
    pub participant: String,
    #[serde(default = "default_function_header")]
    pub function: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub style: ReportStyle,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

/// Per-run values from the command line or a request; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_header: Option<String>,
    pub end_header: Option<String>,
    pub participant_header: Option<String>,
    pub function_header: Option<String>,
    pub style: Option<ReportStyle>,
    pub language: Option<Language>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/site-staff-diff/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    /// Blank header overrides fall back to the configured substring.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        if let Some(start) = non_blank(overrides.start_header) {
            self.headers.start = start;
        }
        if let Some(end) = non_blank(overrides.end_header) {
            self.headers.end = end;
        }
        if let Some(participant) = non_blank(overrides.participant_header) {
            self.headers.participant = participant;
        }
        if let Some(function) = non_blank(overrides.function_header) {
            self.headers.function = function;
        }
        if let Some(style) = overrides.style {
            self.report.style = style;
        }
        if let Some(language) = overrides.language {
            self.report.language = language;
        }
    }

    pub fn header_spec(&self) -> HeaderSpec {
        HeaderSpec {
            start: self.headers.start.clone(),
            end: self.headers.end.clone(),
            participant: self.headers.participant.clone(),
            function: self.headers.function.clone(),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            style: self.report.style,
            language: self.report.language,
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"# Substrings searched for in the first row of the roster sheet.
[headers]
start = "Beginn (Datum)"
end = "Ende (Datum)"
participant = "Beteiligte"
function = "Funktion"

[report]
# plain | markdown
style = "plain"
# en | de
language = "en"

[server]
host = "127.0.0.1"
port = 8501
max_upload_mb = 20
"#;
        template.to_string()
    }
}

impl Default for HeadersConfig {
    fn default() -> Self {
        let spec = HeaderSpec::default();
        Self {
            start: spec.start,
            end: spec.end,
            participant: spec.participant,
            function: spec.function,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_start_header() -> String {
    HeaderSpec::default().start
}

fn default_end_header() -> String {
    HeaderSpec::default().end
}

fn default_participant_header() -> String {
    HeaderSpec::default().participant
}

fn default_function_header() -> String {
    HeaderSpec::default().function
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_upload_mb() -> usize {
    20
}
