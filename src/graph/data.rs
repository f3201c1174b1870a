//! src/graph/data.rs
//!
//! Append-only sample storage for one channel.
//!
//! Retention is unbounded: a session keeps every sample until the channel is
//! reset or replaced by a bulk load.

/// One point of a channel. `index` is the sample's position in the store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub index: u32,
    pub value: f64,
}

impl Sample {
    pub fn x(&self) -> f64 {
        self.index as f64
    }
}

#[derive(Debug, Default, Clone)]
pub struct SeriesStore {
    samples: Vec<Sample>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, assigning the next sequential index.
    ///
    /// Maintains invariant: `samples[n].index == n`.
    pub fn push(&mut self, value: f64) -> Sample {
        let sample = Sample {
            index: self.samples.len() as u32,
            value,
        };
        self.samples.push(sample);
        sample
    }

    /// Drop every sample; the next push gets index 0 again.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Swap in a whole new sequence, regenerating indices `0..n`.
    pub fn replace<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = f64>,
    {
        self.samples = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Sample {
                index: i as u32,
                value,
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Samples whose x lies in `[min, max]`.
    pub fn visible(&self, min: f64, max: f64) -> impl Iterator<Item = &Sample> {
        // x == index, so the slice bounds follow directly from the range
        let start = min.max(0.0).ceil() as usize;
        let end = if max < 0.0 {
            0
        } else {
            (max.floor() as usize).saturating_add(1).min(self.samples.len())
        };
        self.samples[start.min(end)..end].iter()
    }

    /// (min, max) over every value, `None` when empty.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut it = self.samples.iter().map(|s| s.value);
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// `(x, y)` pairs for chart widgets.
    pub fn points(&self, min: f64, max: f64) -> Vec<(f64, f64)> {
        self.visible(min, max).map(|s| (s.x(), s.value)).collect()
    }
}
