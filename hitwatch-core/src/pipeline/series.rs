use crate::pipeline::error::EmptySeries;
use crate::pipeline::types::Bucket;
use std::sync::Arc;

/// Append-only history of buckets, oldest first.
///
/// Owned by the aggregation task; other tasks only ever see values derived from it.
#[derive(Debug, Default)]
pub struct TimeSeries {
    buckets: Vec<Arc<Bucket>>,
    total_hits: u64,
    total_bytes: u64,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only mutator. Bucket timestamps must not go backwards.
    pub fn append(&mut self, bucket: Bucket) -> Arc<Bucket> {
        debug_assert!(
            self.buckets
                .last()
                .is_none_or(|last| last.closed_at <= bucket.closed_at),
            "bucket appended out of order"
        );

        self.total_hits = self.total_hits.saturating_add(bucket.hits);
        self.total_bytes = self.total_bytes.saturating_add(bucket.bytes);

        let bucket = Arc::new(bucket);
        self.buckets.push(bucket.clone());
        bucket
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Bucket>> {
        self.buckets.iter()
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn last(&self) -> Result<&Arc<Bucket>, EmptySeries> {
        self.buckets.last().ok_or(EmptySeries)
    }

    /// The last `min(n, len)` buckets, oldest first.
    pub fn recent(&self, n: usize) -> &[Arc<Bucket>] {
        let start = self.buckets.len().saturating_sub(n);
        &self.buckets[start..]
    }

    /// Mean hits over the last `min(n, len)` buckets.
    pub fn average_hits(&self, n: usize) -> Result<f64, EmptySeries> {
        self.average_by(n, |b| b.hits)
    }

    /// Mean bytes over the last `min(n, len)` buckets.
    pub fn average_bytes(&self, n: usize) -> Result<f64, EmptySeries> {
        self.average_by(n, |b| b.bytes)
    }

    fn average_by(&self, n: usize, value: impl Fn(&Bucket) -> u64) -> Result<f64, EmptySeries> {
        if self.buckets.is_empty() {
            return Err(EmptySeries);
        }

        // A zero-width window is treated as "latest bucket only".
        let window = self.recent(n.max(1));
        let sum: u64 = window.iter().map(|b| value(b)).sum();

        Ok(sum as f64 / window.len() as f64)
    }
}
