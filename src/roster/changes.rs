use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::roster::date::{parse_cell_date, Cutoff};
use crate::roster::headers::ColumnMap;
use crate::roster::{CellValue, Role};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Joined,
    Left,
}

impl Direction {
    pub fn source_role(&self) -> Role {
        match self {
            Self::Joined => Role::StartDate,
            Self::Left => Role::EndDate,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChangeEvent {
    pub participant: String,
    pub function: String,
    pub date: NaiveDateTime,
    pub direction: Direction,
    /// 1-based sheet row the event was read from.
    pub row: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub joined: Vec<ChangeEvent>,
    pub left: Vec<ChangeEvent>,
    /// Non-empty date cells that no accepted format could read.
    pub unparseable: usize,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty()
    }
}

pub fn compute_changes<R>(rows: &[R], columns: &ColumnMap, cutoff: &Cutoff) -> ChangeSet
where
    R: AsRef<[CellValue]>,
{
    let (joined, skipped_start) = scan(rows, columns, cutoff, Direction::Joined);
    let (left, skipped_end) = scan(rows, columns, cutoff, Direction::Left);
    let unparseable = skipped_start + skipped_end;
    if unparseable > 0 {
        debug!("{unparseable} date cells could not be parsed and were skipped");
    }
    ChangeSet {
        joined,
        left,
        unparseable,
    }
}

fn scan<R>(
    rows: &[R],
    columns: &ColumnMap,
    cutoff: &Cutoff,
    direction: Direction,
) -> (Vec<ChangeEvent>, usize)
where
    R: AsRef<[CellValue]>,
{
    let mut events = Vec::new();
    let mut skipped = 0;
    for (idx, row) in rows.iter().enumerate() {
        let cells = row.as_ref();
        let raw = columns.cell(cells, direction.source_role());
        if raw.is_empty() {
            continue;
        }
        let Some(date) = parse_cell_date(raw) else {
            skipped += 1;
            continue;
        };
        if !cutoff.is_before(&date) {
            continue;
        }
        events.push(ChangeEvent {
            participant: columns.cell(cells, Role::Participant).to_string(),
            function: columns.cell(cells, Role::Function).to_string(),
            date,
            direction,
            row: idx + 2,
        });
    }
    (events, skipped)
}
