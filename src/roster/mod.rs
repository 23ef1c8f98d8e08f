pub mod changes;
pub mod date;
pub mod headers;

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use thiserror::Error;

pub use changes::{compute_changes, ChangeEvent, ChangeSet, Direction};
pub use date::{parse_cell_date, parse_cutoff, Cutoff};
pub use headers::{resolve_columns, ColumnMap, HeaderSpec};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => write!(f, "{s}"),
            // whole numbers print without a fractional part, as spreadsheets show them
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Error(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    StartDate,
    EndDate,
    Participant,
    Function,
}

impl Role {
    /// Order in which a single header cell is tested against the roles.
    pub const PRIORITY: [Role; 4] = [
        Role::StartDate,
        Role::Participant,
        Role::Function,
        Role::EndDate,
    ];
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::StartDate => "start date",
            Self::EndDate => "end date",
            Self::Participant => "participant",
            Self::Function => "function",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub role: Role,
    pub pattern: String,
}

impl Display for MissingColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (header containing '{}')", self.role, self.pattern)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RosterError {
    #[error("invalid cutoff date '{0}': expected DD.MM.YYYY")]
    InvalidCutoff(String),
    #[error("required columns not found: {}", join_missing(.0))]
    MissingColumns(Vec<MissingColumn>),
}

impl RosterError {
    pub fn missing_roles(&self) -> Vec<Role> {
        match self {
            Self::MissingColumns(missing) => missing.iter().map(|m| m.role).collect(),
            Self::InvalidCutoff(_) => Vec::new(),
        }
    }
}

fn join_missing(missing: &[MissingColumn]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
