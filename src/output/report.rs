use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::{ChangeEvent, Direction};

const DISPLAY_DATE: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStyle {
    #[default]
    Plain,
    Markdown,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    De,
}

#[derive(Debug, Error)]
#[error("unknown report style: {0} (expected plain or markdown)")]
pub struct ReportStyleParseError(pub String);

impl FromStr for ReportStyle {
    type Err = ReportStyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(Self::Plain),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(ReportStyleParseError(s.to_string())),
        }
    }
}

impl Display for ReportStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown report language: {0} (expected en or de)")]
pub struct LanguageParseError(pub String);

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "de" | "german" | "deutsch" => Ok(Self::De),
            _ => Err(LanguageParseError(s.to_string())),
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::De => write!(f, "de"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportOptions {
    #[serde(default)]
    pub style: ReportStyle,
    #[serde(default)]
    pub language: Language,
}

impl Language {
    fn joined_heading(&self, cutoff: &str) -> String {
        match self {
            Self::En => format!(
                "Since the last monitoring visit on {cutoff}, the following people joined the study team:"
            ),
            Self::De => {
                format!("Seit der letzten MV am {cutoff} sind folgende Personen NEU im Studienteam:")
            }
        }
    }

    fn left_heading(&self, cutoff: &str) -> String {
        match self {
            Self::En => format!(
                "Since the last monitoring visit on {cutoff}, the following people left the study team:"
            ),
            Self::De => format!(
                "Seit der letzten MV am {cutoff} haben folgende Personen das Studienteam VERLASSEN:"
            ),
        }
    }

    fn preposition(&self, direction: Direction) -> &'static str {
        match (self, direction) {
            (Self::En, Direction::Joined) => "since",
            (Self::En, Direction::Left) => "on",
            (Self::De, Direction::Joined) => "seit",
            (Self::De, Direction::Left) => "am",
        }
    }
}

/// Both headings are always present; an empty list just has no entries.
pub fn render_report(
    cutoff_text: &str,
    joined: &[ChangeEvent],
    left: &[ChangeEvent],
    options: &ReportOptions,
) -> String {
    let language = options.language;
    let mut out = String::new();

    push_heading(&mut out, &language.joined_heading(cutoff_text), options.style);
    for event in joined {
        push_entry(&mut out, event, language.preposition(Direction::Joined), options.style);
    }
    out.push('\n');
    push_heading(&mut out, &language.left_heading(cutoff_text), options.style);
    for event in left {
        push_entry(&mut out, event, language.preposition(Direction::Left), options.style);
    }
    out
}

fn push_heading(out: &mut String, heading: &str, style: ReportStyle) {
    match style {
        ReportStyle::Plain => out.push_str(heading),
        ReportStyle::Markdown => out.push_str(&format!("**{heading}**")),
    }
    out.push_str("\n\n");
}

fn push_entry(out: &mut String, event: &ChangeEvent, preposition: &str, style: ReportStyle) {
    let date = event.date.format(DISPLAY_DATE);
    let line = match style {
        ReportStyle::Plain => format!(
            "- {} ({}) {preposition} {date}\n",
            event.participant, event.function
        ),
        ReportStyle::Markdown => format!(
            "- **{}** ({}) {preposition} {date}\n",
            event.participant, event.function
        ),
    };
    out.push_str(&line);
}
