use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use std::fmt;

/// One parsed access-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub address: String,
    /// Local wall clock when the line was parsed.
    pub received_at: DateTime<Local>,
    /// Timestamp written in the line itself, when it is in common log format.
    pub logged_at: Option<DateTime<FixedOffset>>,
    pub method: String,
    pub path: String,
    /// First segment of `path`, without query string.
    pub section: String,
    pub protocol: String,
    pub status: u16,
    pub bytes: u64,
    pub referer: String,
    pub user_agent: String,
}

/// The dimensions every bucket is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Address,
    Section,
    Status,
    Referer,
    UserAgent,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Address,
        Dimension::Section,
        Dimension::Status,
        Dimension::Referer,
        Dimension::UserAgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Address => "address",
            Dimension::Section => "section",
            Dimension::Status => "status",
            Dimension::Referer => "referer",
            Dimension::UserAgent => "user_agent",
        }
    }

    /// The label an event contributes to this dimension.
    pub fn label(self, event: &Event) -> String {
        match self {
            Dimension::Address => event.address.clone(),
            Dimension::Section => event.section.clone(),
            Dimension::Status => event.status.to_string(),
            Dimension::Referer => event.referer.clone(),
            Dimension::UserAgent => event.user_agent.clone(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCount {
    pub label: String,
    pub count: u64,
}

impl RankedCount {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Counts sorted by count, highest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedList(Vec<RankedCount>);

impl RankedList {
    /// Rank `counts` by count, descending. The sort is stable, so equal counts
    /// keep the order they were given in.
    pub fn from_counts(mut counts: Vec<RankedCount>) -> Self {
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Self(counts)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedCount> {
        self.0.iter()
    }

    /// The `n` highest entries (fewer if the list is shorter).
    pub fn top(&self, n: usize) -> &[RankedCount] {
        &self.0[..n.min(self.0.len())]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|c| c.count).sum()
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a RankedCount;
    type IntoIter = std::slice::Iter<'a, RankedCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Immutable summary of one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub closed_at: DateTime<Local>,
    pub addresses: RankedList,
    pub sections: RankedList,
    pub statuses: RankedList,
    pub referers: RankedList,
    pub user_agents: RankedList,
    pub bytes: u64,
    pub hits: u64,
}

impl Bucket {
    /// A bucket for a window that saw no traffic.
    pub fn empty(closed_at: DateTime<Local>) -> Self {
        Self {
            closed_at,
            addresses: RankedList::default(),
            sections: RankedList::default(),
            statuses: RankedList::default(),
            referers: RankedList::default(),
            user_agents: RankedList::default(),
            bytes: 0,
            hits: 0,
        }
    }

    pub fn ranked(&self, dimension: Dimension) -> &RankedList {
        match dimension {
            Dimension::Address => &self.addresses,
            Dimension::Section => &self.sections,
            Dimension::Status => &self.statuses,
            Dimension::Referer => &self.referers,
            Dimension::UserAgent => &self.user_agents,
        }
    }
}
