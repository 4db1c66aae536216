use crate::domain::ml::prediction::Prediction;

pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Fixed ring of the most recent predictions, kept for diagnostics only.
///
/// Slots are allocated up front. The write index only grows; the slot it
/// lands on is `index % capacity`, so once the ring has filled every write
/// overwrites the oldest entry.
#[derive(Debug, Clone)]
pub struct PredictionCache {
    slots: Vec<Option<Prediction>>,
    write_index: u64,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            write_index: 0,
        }
    }

    pub fn record(&mut self, prediction: Prediction) {
        let slot = (self.write_index % self.slots.len() as u64) as usize;
        self.slots[slot] = Some(prediction);
        self.write_index += 1;
    }

    /// Retained predictions, newest first.
    pub fn recent(&self) -> Vec<&Prediction> {
        let cap = self.slots.len() as u64;
        let held = self.write_index.min(cap);

        (1..=held)
            .filter_map(|back| {
                let slot = ((self.write_index - back) % cap) as usize;
                self.slots[slot].as_ref()
            })
            .collect()
    }

    pub fn latest(&self) -> Option<&Prediction> {
        if self.write_index == 0 {
            return None;
        }
        let slot = ((self.write_index - 1) % self.slots.len() as u64) as usize;
        self.slots[slot].as_ref()
    }

    pub fn len(&self) -> usize {
        (self.write_index as usize).min(self.slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.write_index == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of predictions ever recorded, including overwritten ones.
    pub fn total_recorded(&self) -> u64 {
        self.write_index
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.write_index = 0;
    }
}

impl Default for PredictionCache {
    fn default() -> Self {
        Self::new()
    }
}
