use crate::pipeline::types::{Bucket, Dimension, Event, RankedCount, RankedList};
use ahash::AHashMap;
use chrono::{DateTime, Local};

/// label -> count, remembering first-seen order so ranking ties are deterministic.
#[derive(Debug, Default)]
struct Tally {
    index: AHashMap<String, usize>,
    counts: Vec<RankedCount>,
}

impl Tally {
    fn bump(&mut self, label: String) {
        if let Some(&i) = self.index.get(&label) {
            self.counts[i].count += 1;
            return;
        }

        self.index.insert(label.clone(), self.counts.len());
        self.counts.push(RankedCount::new(label, 1));
    }

    fn into_ranked(self) -> RankedList {
        RankedList::from_counts(self.counts)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    addresses: Tally,
    sections: Tally,
    statuses: Tally,
    referers: Tally,
    user_agents: Tally,
    bytes: u64,
    hits: u64,
}

impl Accumulator {
    fn tally_mut(&mut self, dimension: Dimension) -> &mut Tally {
        match dimension {
            Dimension::Address => &mut self.addresses,
            Dimension::Section => &mut self.sections,
            Dimension::Status => &mut self.statuses,
            Dimension::Referer => &mut self.referers,
            Dimension::UserAgent => &mut self.user_agents,
        }
    }
}

/// Folds events of the current window into frequency tallies.
///
/// `flush` takes `&mut self`, so it can never interleave with `record`.
#[derive(Debug, Default)]
pub struct WindowAggregator {
    current: Accumulator,
}

impl WindowAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &Event) {
        for dimension in Dimension::ALL {
            self.current.tally_mut(dimension).bump(dimension.label(event));
        }
        self.current.bytes = self.current.bytes.saturating_add(event.bytes);
        self.current.hits += 1;
    }

    /// Hits recorded since the last flush.
    pub fn pending_hits(&self) -> u64 {
        self.current.hits
    }

    /// Close the current window: rank every tally, build the bucket and start
    /// a fresh accumulator.
    pub fn flush(&mut self, closed_at: DateTime<Local>) -> Bucket {
        let window = std::mem::take(&mut self.current);

        Bucket {
            closed_at,
            addresses: window.addresses.into_ranked(),
            sections: window.sections.into_ranked(),
            statuses: window.statuses.into_ranked(),
            referers: window.referers.into_ranked(),
            user_agents: window.user_agents.into_ranked(),
            bytes: window.bytes,
            hits: window.hits,
        }
    }
}
