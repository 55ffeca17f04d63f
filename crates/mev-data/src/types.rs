//! Type definitions for observatory MEV and validator data.
//!
//! Raw wire rows (`Raw*`) are deserialized leniently and then validated into
//! the typed records via `TryFrom`, so a malformed payload surfaces as a
//! [`SchemaError`] naming the offending element instead of a coerced zero.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Inclusive block-height window for a single query.
///
/// No ordering is enforced between the two bounds; an inverted window is
/// passed to the observatory as-is and is expected to yield no samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightRange {
    /// First block height (inclusive).
    pub from_height: u64,
    /// Last block height (inclusive).
    pub to_height: u64,
}

impl HeightRange {
    pub fn new(from_height: u64, to_height: u64) -> Self {
        Self {
            from_height,
            to_height,
        }
    }

    /// True when `from_height > to_height`.
    pub fn is_inverted(&self) -> bool {
        self.from_height > self.to_height
    }
}

impl std::fmt::Display for HeightRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.from_height, self.to_height)
    }
}

/// One observed block's MEV extraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MevSample {
    /// Block height.
    pub height: u64,
    /// Raw extracted value in native units (nonnegative, finite).
    pub value: f64,
    /// Proposer public key, if the observatory reported one.
    pub proposer: Option<String>,
}

/// One validator's identity mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    /// Consensus public key; join key against [`MevSample::proposer`].
    pub pubkey: String,
    /// Human-readable display name.
    pub moniker: String,
}

/// `GET /api/v1/raw_mev` response body.
#[derive(Debug, Default, Deserialize)]
pub struct RawMevResponse {
    #[serde(default)]
    pub datapoints: Option<Vec<RawMevDatapoint>>,
}

/// A datapoint as sent by the observatory. Extra fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawMevDatapoint {
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub proposer: Option<String>,
}

/// `GET /api/v1/validator` response body.
#[derive(Debug, Default, Deserialize)]
pub struct RawValidatorResponse {
    #[serde(default)]
    pub validators: Option<Vec<RawValidator>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawValidator {
    #[serde(default)]
    pub pubkey: Option<String>,
    #[serde(default)]
    pub moniker: Option<String>,
}

const DATAPOINT: &str = "datapoint";
const VALIDATOR: &str = "validator";

impl TryFrom<(usize, RawMevDatapoint)> for MevSample {
    type Error = SchemaError;

    fn try_from((index, raw): (usize, RawMevDatapoint)) -> Result<Self, Self::Error> {
        let height = match raw.height {
            None | Some(Value::Null) => {
                return Err(SchemaError::missing(DATAPOINT, index, "height"))
            }
            Some(v) => parse_height(&v)
                .ok_or_else(|| SchemaError::invalid(DATAPOINT, index, "height", &v))?,
        };

        let value = match raw.value {
            None | Some(Value::Null) => {
                return Err(SchemaError::missing(DATAPOINT, index, "value"))
            }
            Some(v) => parse_value(&v)
                .ok_or_else(|| SchemaError::invalid(DATAPOINT, index, "value", &v))?,
        };

        Ok(Self {
            height,
            value,
            proposer: raw.proposer,
        })
    }
}

impl TryFrom<(usize, RawValidator)> for ValidatorInfo {
    type Error = SchemaError;

    fn try_from((index, raw): (usize, RawValidator)) -> Result<Self, Self::Error> {
        let pubkey = raw
            .pubkey
            .ok_or_else(|| SchemaError::missing(VALIDATOR, index, "pubkey"))?;
        let moniker = raw
            .moniker
            .ok_or_else(|| SchemaError::missing(VALIDATOR, index, "moniker"))?;

        Ok(Self { pubkey, moniker })
    }
}

/// Validates every datapoint in order, failing on the first bad one.
pub fn parse_datapoints(response: RawMevResponse) -> Result<Vec<MevSample>, SchemaError> {
    response
        .datapoints
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(MevSample::try_from)
        .collect()
}

/// Validates every validator entry in order, failing on the first bad one.
pub fn parse_validators(
    response: RawValidatorResponse,
) -> Result<Vec<ValidatorInfo>, SchemaError> {
    response
        .validators
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(ValidatorInfo::try_from)
        .collect()
}

/// Heights arrive as JSON integers, whole floats (`100.0`) or decimal strings.
fn parse_height(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole_height)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn whole_height(h: f64) -> Option<u64> {
    (h.is_finite() && h >= 0.0 && h.fract() == 0.0 && h <= u64::MAX as f64).then_some(h as u64)
}

/// Values arrive as JSON numbers or numeric strings; must be finite and >= 0.
fn parse_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}
