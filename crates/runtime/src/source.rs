use std::{future::Future, sync::Arc};

use grid_core::{Dataset, InputRow, RowError};

use crate::events::LiveTag;

/// Everything the engine needs for one tick, as produced by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct TickInput {
    pub row: InputRow,
    pub forward_price: Option<f64>,
    pub live: Option<LiveTag>,
}

impl TickInput {
    pub fn replay(row: InputRow) -> Self {
        Self {
            row,
            forward_price: None,
            live: None,
        }
    }
}

/// Produces aligned inputs one at a time. `None` means the source is exhausted.
pub trait InputSource {
    fn next_input(&mut self) -> impl Future<Output = Option<Result<TickInput, RowError>>> + Send;
}

/// Deterministic pass over the recorded rows, start to `min_length()`.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    dataset: Arc<Dataset>,
    next_row: usize,
}

impl ReplaySource {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            next_row: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.dataset.min_length().saturating_sub(self.next_row)
    }
}

impl Iterator for ReplaySource {
    type Item = Result<TickInput, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_row >= self.dataset.min_length() {
            return None;
        }
        let row = self.next_row;
        self.next_row += 1;
        Some(self.dataset.input_row(row).map(TickInput::replay))
    }
}

impl InputSource for ReplaySource {
    async fn next_input(&mut self) -> Option<Result<TickInput, RowError>> {
        self.next()
    }
}
