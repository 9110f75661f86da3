use serde::{Deserialize, Serialize};

/// Named, record-indexed column of optional values.
///
/// `None` marks a record without a value (indicator warm-up, gaps).
/// Search helpers assume the non-null values are sorted ascending, which holds
/// for date columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSeries<T> {
    name: String,
    values: Vec<Option<T>>,
}

/// Inclusive min/max over the non-null values of a range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialOrd> DataSeries<T> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_values(name: impl Into<String>, values: Vec<Option<T>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[Option<T>] {
        &self.values
    }

    /// Value at `index`; out-of-range and null both give `None`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<T> {
        self.values.get(index).copied().flatten()
    }

    #[must_use]
    pub fn first_value(&self) -> Option<T> {
        self.values.first().copied().flatten()
    }

    #[must_use]
    pub fn last_value(&self) -> Option<T> {
        self.values.last().copied().flatten()
    }

    pub fn push(&mut self, value: Option<T>) {
        self.values.push(value);
    }

    /// No-op on an empty series.
    /// Inserts `values` before the first record, keeping their order.
    pub fn prepend(&mut self, values: impl IntoIterator<Item = Option<T>>) {
        let tail = std::mem::take(&mut self.values);
        self.values.extend(values);
        self.values.extend(tail);
    }

    pub fn update_last(&mut self, value: Option<T>) {
        if let Some(last) = self.values.last_mut() {
            *last = value;
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Drops the oldest values so at most `max_len` remain. Returns how many
    /// were removed.
    pub fn trim(&mut self, max_len: usize) -> usize {
        let overhead = self.values.len().saturating_sub(max_len);
        if overhead > 0 {
            self.values.drain(..overhead);
        }
        overhead
    }

    /// Min/max of non-null values in `[start, start + count)`.
    ///
    /// An out-of-range `start` restarts from 0, mirroring how visible ranges
    /// can temporarily run ahead of the data.
    #[must_use]
    pub fn min_max(&self, start: usize, count: usize) -> Option<MinMax<T>> {
        let len = self.values.len();
        if len == 0 || count == 0 {
            return None;
        }
        let start = if start >= len { 0 } else { start };
        let end = start.saturating_add(count).min(len);

        let mut result: Option<MinMax<T>> = None;
        for value in self.values[start..end].iter().flatten() {
            result = Some(match result {
                None => MinMax {
                    min: *value,
                    max: *value,
                },
                Some(acc) => MinMax {
                    min: if *value < acc.min { *value } else { acc.min },
                    max: if *value > acc.max { *value } else { acc.max },
                },
            });
        }
        result
    }

    /// Binary search over the sorted values.
    ///
    /// `Ok(index)` on an exact hit, otherwise `Err(insertion_index)`.
    pub fn binary_index_of(&self, search: T) -> Result<usize, usize> {
        let mut low = 0usize;
        let mut high = self.values.len();
        while low < high {
            let mid = low + (high - low) / 2;
            match self.values[mid] {
                Some(value) if value < search => low = mid + 1,
                Some(value) if value > search => high = mid,
                Some(_) => return Ok(mid),
                // Nulls sort first.
                None => low = mid + 1,
            }
        }
        Err(low)
    }

    /// Index of the greatest value `<= search`; `-1` when every value is
    /// greater or the series is empty.
    #[must_use]
    pub fn floor_index(&self, search: T) -> isize {
        match self.binary_index_of(search) {
            Ok(index) => index as isize,
            Err(insertion) => insertion as isize - 1,
        }
    }

    /// Index of the smallest value `>= search`; `len()` when every value is
    /// smaller.
    #[must_use]
    pub fn ceil_index(&self, search: T) -> usize {
        match self.binary_index_of(search) {
            Ok(index) | Err(index) => index,
        }
    }

    /// Nearest non-null index at or before `index`, falling back to 0.
    #[must_use]
    pub fn left_nearest_value_index(&self, index: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let start = index.min(self.values.len() - 1);
        (0..=start)
            .rev()
            .find(|&i| self.values[i].is_some())
            .unwrap_or(0)
    }

    /// Nearest non-null index at or after `index`, falling back to the last
    /// index.
    #[must_use]
    pub fn right_nearest_value_index(&self, index: usize) -> usize {
        let last = self.values.len().saturating_sub(1);
        (index..self.values.len())
            .find(|&i| self.values[i].is_some())
            .unwrap_or(last)
    }

    /// Index of the first non-null value.
    #[must_use]
    pub fn first_value_index(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }

    /// Counts non-null values inside `[low, high]`.
    #[must_use]
    pub fn items_between(&self, low: T, high: T) -> usize {
        self.values
            .iter()
            .flatten()
            .filter(|value| **value >= low && **value <= high)
            .count()
    }
}
