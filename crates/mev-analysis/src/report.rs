//! Join and aggregation pipeline for block-level MEV reports.
//!
//! Left-joins MEV samples onto the validator directory, scales raw values
//! into millions, and derives the per-block series and the top-N list that
//! the charts are drawn from.

use std::collections::{HashMap, HashSet};

use eyre::{Context, Result};
use mev_data::{HeightRange, MevSample, MevSampleSource, ValidatorInfo, ValidatorSource};
use serde::Serialize;
use tracing::{info, warn};

/// Raw value units per displayed unit ("MEV value ($)" is in millions).
pub const VALUE_SCALE: f64 = 1_000_000.0;

/// Number of blocks kept by the top-N view.
pub const DEFAULT_TOP_N: usize = 15;

/// One MEV sample with its proposer resolved against the validator directory.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JoinedRecord {
    pub height: u64,
    /// Raw value as reported by the observatory.
    pub value: f64,
    /// `value / 10^6`.
    pub scaled_value: f64,
    pub proposer: Option<String>,
    /// `None` when no validator matches the proposer.
    pub moniker: Option<String>,
}

/// One bar of an aggregate view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarPoint {
    pub height: u64,
    pub scaled_value: f64,
    pub moniker: Option<String>,
}

impl From<&JoinedRecord> for BarPoint {
    fn from(record: &JoinedRecord) -> Self {
        Self {
            height: record.height,
            scaled_value: record.scaled_value,
            moniker: record.moniker.clone(),
        }
    }
}

/// Aggregated statistics over the joined records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportStats {
    pub block_count: usize,
    pub total_scaled_value: f64,
    /// Mean per record; 0 when empty.
    pub mean_scaled_value: f64,
    pub max_scaled_value: Option<f64>,
    pub distinct_proposers: usize,
    /// Records whose proposer matched no validator.
    pub unmatched_records: usize,
}

/// Everything rendered for a non-empty height window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MevReport {
    pub range: HeightRange,
    pub records: Vec<JoinedRecord>,
    pub per_block: Vec<BarPoint>,
    pub top: Vec<BarPoint>,
    pub stats: ReportStats,
}

/// Result of running the pipeline for one window.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// The observatory returned no samples; nothing was joined.
    NoData { range: HeightRange },
    Report(MevReport),
}

/// Converts a raw value into millions.
pub fn scale_value(value: f64) -> f64 {
    value / VALUE_SCALE
}

/// Left-joins `samples` onto `validators` on `proposer == pubkey`.
///
/// Every sample yields exactly one record, in input order. Duplicate pubkeys
/// in the directory resolve to their first occurrence.
pub fn join_validators(samples: &[MevSample], validators: &[ValidatorInfo]) -> Vec<JoinedRecord> {
    let mut monikers: HashMap<&str, &str> = HashMap::with_capacity(validators.len());
    for validator in validators {
        monikers
            .entry(validator.pubkey.as_str())
            .or_insert(validator.moniker.as_str());
    }

    samples
        .iter()
        .map(|sample| JoinedRecord {
            height: sample.height,
            value: sample.value,
            scaled_value: scale_value(sample.value),
            proposer: sample.proposer.clone(),
            moniker: sample
                .proposer
                .as_deref()
                .and_then(|proposer| monikers.get(proposer))
                .map(|moniker| moniker.to_string()),
        })
        .collect()
}

/// One bar per record, ordered by height. Repeated heights stay adjacent in
/// input order.
pub fn per_block_view(records: &[JoinedRecord]) -> Vec<BarPoint> {
    let mut points: Vec<BarPoint> = records.iter().map(BarPoint::from).collect();
    points.sort_by_key(|point| point.height);
    points
}

/// The `n` records with the largest scaled value, descending. Ties keep
/// input order.
pub fn top_n(records: &[JoinedRecord], n: usize) -> Vec<BarPoint> {
    let mut points: Vec<BarPoint> = records.iter().map(BarPoint::from).collect();
    points.sort_by(|a, b| b.scaled_value.total_cmp(&a.scaled_value));
    points.truncate(n);
    points
}

pub fn compute_report_stats(records: &[JoinedRecord]) -> ReportStats {
    let block_count = records.len();
    let total_scaled_value = records.iter().map(|r| r.scaled_value).sum::<f64>();

    let mean_scaled_value = if block_count == 0 {
        0.0
    } else {
        total_scaled_value / block_count as f64
    };

    let max_scaled_value = records
        .iter()
        .map(|r| r.scaled_value)
        .max_by(|a, b| a.total_cmp(b));

    let distinct_proposers = records
        .iter()
        .filter_map(|r| r.proposer.as_deref())
        .collect::<HashSet<_>>()
        .len();

    let unmatched_records = records.iter().filter(|r| r.moniker.is_none()).count();

    ReportStats {
        block_count,
        total_scaled_value,
        mean_scaled_value,
        max_scaled_value,
        distinct_proposers,
        unmatched_records,
    }
}

/// Assembles the report from already-fetched data.
pub fn assemble_report(
    range: HeightRange,
    samples: &[MevSample],
    validators: &[ValidatorInfo],
    top: usize,
) -> ReportOutcome {
    if samples.is_empty() {
        return ReportOutcome::NoData { range };
    }

    let records = join_validators(samples, validators);
    let per_block = per_block_view(&records);
    let top = top_n(&records, top);
    let stats = compute_report_stats(&records);

    ReportOutcome::Report(MevReport {
        range,
        records,
        per_block,
        top,
        stats,
    })
}

/// Runs the full pipeline for one window with the default top-N size.
///
/// See [`build_report_with_top`].
pub async fn build_report<M, V>(range: HeightRange, mev: &M, validators: &V) -> Result<ReportOutcome>
where
    M: MevSampleSource + ?Sized,
    V: ValidatorSource + ?Sized,
{
    build_report_with_top(range, mev, validators, DEFAULT_TOP_N).await
}

/// Fetches samples, then (only if any exist) the validator directory, and
/// joins them.
///
/// # Errors
/// Returns error if either fetch fails. An empty window is not an error; it
/// yields [`ReportOutcome::NoData`] without touching `validators`.
#[tracing::instrument(skip_all, fields(range = %range, top = top))]
pub async fn build_report_with_top<M, V>(
    range: HeightRange,
    mev: &M,
    validators: &V,
    top: usize,
) -> Result<ReportOutcome>
where
    M: MevSampleSource + ?Sized,
    V: ValidatorSource + ?Sized,
{
    if range.is_inverted() {
        warn!(
            from_height = range.from_height,
            to_height = range.to_height,
            "initial height is above final height; expecting no samples"
        );
    }

    let samples = mev
        .fetch_mev_samples(range)
        .await
        .wrap_err_with(|| format!("failed to fetch MEV samples for {range}"))?;

    if samples.is_empty() {
        info!("no MEV samples in range");
        return Ok(ReportOutcome::NoData { range });
    }

    let directory = validators
        .fetch_validators()
        .await
        .wrap_err("failed to fetch validator directory")?;

    let outcome = assemble_report(range, &samples, &directory, top);
    if let ReportOutcome::Report(report) = &outcome {
        info!(
            records = report.stats.block_count,
            unmatched = report.stats.unmatched_records,
            "report assembled"
        );
    }

    Ok(outcome)
}
