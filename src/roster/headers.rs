use std::collections::BTreeMap;

use crate::roster::{CellValue, MissingColumn, Role, RosterError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    pub start: String,
    pub end: String,
    pub participant: String,
    pub function: String,
}

impl HeaderSpec {
    pub fn pattern(&self, role: Role) -> &str {
        match role {
            Role::StartDate => &self.start,
            Role::EndDate => &self.end,
            Role::Participant => &self.participant,
            Role::Function => &self.function,
        }
    }

    /// First role, in priority order, whose substring occurs in `header`.
    fn claim(&self, header: &str) -> Option<Role> {
        Role::PRIORITY
            .into_iter()
            .find(|role| header.contains(self.pattern(*role)))
    }
}

impl Default for HeaderSpec {
    fn default() -> Self {
        Self {
            start: "Beginn (Datum)".to_string(),
            end: "Ende (Datum)".to_string(),
            participant: "Beteiligte".to_string(),
            function: "Funktion".to_string(),
        }
    }
}

/// Fully resolved 0-based column positions. Only built when every role matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub start: usize,
    pub end: usize,
    pub participant: usize,
    pub function: usize,
}

impl ColumnMap {
    pub fn column(&self, role: Role) -> usize {
        match role {
            Role::StartDate => self.start,
            Role::EndDate => self.end,
            Role::Participant => self.participant,
            Role::Function => self.function,
        }
    }

    // cells past the row's end read as empty
    pub fn cell<'a>(&self, row: &'a [CellValue], role: Role) -> &'a CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        row.get(self.column(role)).unwrap_or(EMPTY)
    }
}

pub fn resolve_columns(header: &[CellValue], spec: &HeaderSpec) -> Result<ColumnMap, RosterError> {
    let mut found: BTreeMap<Role, usize> = BTreeMap::new();
    for (idx, cell) in header.iter().enumerate() {
        let Some(text) = cell.as_text().filter(|t| !t.is_empty()) else {
            continue;
        };
        if let Some(role) = spec.claim(text) {
            found.entry(role).or_insert(idx);
        }
    }

    let missing: Vec<MissingColumn> = Role::PRIORITY
        .into_iter()
        .filter(|role| !found.contains_key(role))
        .map(|role| MissingColumn {
            role,
            pattern: spec.pattern(role).to_string(),
        })
        .collect();
    if !missing.is_empty() {
        return Err(RosterError::MissingColumns(missing));
    }

    Ok(ColumnMap {
        start: found[&Role::StartDate],
        end: found[&Role::EndDate],
        participant: found[&Role::Participant],
        function: found[&Role::Function],
    })
}
