//! Time-bucketed cache in front of a precession model.
//!
//! This is an approximation layer: every query falling in the same
//! `bucket_seconds`-wide TDB interval gets the CIP coordinates of the first
//! query computed in that interval. With the default one-hour bucket the
//! error stays below about 0.1 mas, which is far cheaper than re-evaluating
//! the full series per query but is not exact.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::FrameError;
use crate::precession::{CipCoordinates, PrecessionModel};
use crate::tidal::TidalArguments;

pub const DEFAULT_BUCKET_SECONDS: u32 = 3_600;
pub const DEFAULT_CAPACITY: usize = 4_096;

/// Memoising decorator over any [`PrecessionModel`].
#[derive(Debug)]
pub struct PrecessionCache {
    model: Arc<dyn PrecessionModel>,
    bucket_ms: i64,
    capacity: usize,
    entries: Mutex<HashMap<i64, CipCoordinates>>,
}

impl PrecessionCache {
    pub fn new(model: Arc<dyn PrecessionModel>, bucket_seconds: u32, capacity: usize) -> Self {
        Self {
            model,
            bucket_ms: i64::from(bucket_seconds.max(1)) * 1_000,
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_defaults(model: Arc<dyn PrecessionModel>) -> Self {
        Self::new(model, DEFAULT_BUCKET_SECONDS, DEFAULT_CAPACITY)
    }

    pub fn inner(&self) -> &Arc<dyn PrecessionModel> {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PrecessionModel for PrecessionCache {
    fn name(&self) -> &'static str {
        "bucketed-cache"
    }

    fn cip(&self, args: &TidalArguments) -> Result<CipCoordinates, FrameError> {
        let bucket = args.tdb().millis().div_euclid(self.bucket_ms);
        if let Some(hit) = self.entries.lock().get(&bucket) {
            trace!(bucket, "precession cache hit");
            return Ok(*hit);
        }

        let cip = self.model.cip(args)?;
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            debug!(capacity = self.capacity, "precession cache full, clearing");
            entries.clear();
        }
        Ok(*entries.entry(bucket).or_insert(cip))
    }
}
