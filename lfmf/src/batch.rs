//! Many requests at once.
//!
//! Requests are independent, so a batch is a map. Each row's failure is its
//! own: it shows up as that row's status code and never stops the batch.

use crate::record::{InputRecord, OutputRecord};
use crate::trace::Silent;
use crate::{predict_with, Options};

/// How a batch is spread over threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// One row after the other, on the calling thread.
    Sequential,

    /// On rayon's pool, when built with the `parallel` feature; sequential
    /// otherwise.
    Parallel,
}

impl Default for Dispatch {
    fn default() -> Self {
        Dispatch::Parallel
    }
}

/// Predicts a batch of rows. Output rows match input rows, in order.
pub fn predict_batch(records: &[InputRecord], options: &Options, dispatch: Dispatch) -> Vec<OutputRecord> {
    tracing::debug!(rows = records.len(), ?dispatch, "predicting batch");

    match dispatch {
        Dispatch::Sequential => records.iter().map(|record| predict_row(record, options)).collect(),
        Dispatch::Parallel => parallel(records, options),
    }
}

fn predict_row(record: &InputRecord, options: &Options) -> OutputRecord {
    predict_with(record, options, &mut Silent).into()
}

#[cfg(feature = "parallel")]
fn parallel(records: &[InputRecord], options: &Options) -> Vec<OutputRecord> {
    use rayon::prelude::*;

    records.par_iter().map(|record| predict_row(record, options)).collect()
}

#[cfg(not(feature = "parallel"))]
fn parallel(records: &[InputRecord], options: &Options) -> Vec<OutputRecord> {
    records.iter().map(|record| predict_row(record, options)).collect()
}
