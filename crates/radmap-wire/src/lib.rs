//! # Radmap Wire
//!
//! The untrusted-wire boundary. This crate defines the JSON shapes
//! arriving from the pub/sub transport and the REST backend, validates
//! and decodes them into the trusted `radmap-core` model, and builds the
//! REST paths/queries the fetch layer hits. Malformed pub/sub payloads
//! are dropped here and never reach the store.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use radmap_core::{AlertTier, DeviceStateStore, TelemetrySample};
use radmap_history::{RawBucket, Timeframe};

// --- Wire Shapes ---

/// JSON shape of one inbound telemetry message. Also matches the
/// DeviceRecord-shaped entries of the locations response (whose extra
/// fields, like a server-side timestamp, are ignored — ingestion time is
/// stamped locally).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub device_mac: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub msv: Option<f64>,
    pub cpm: Option<u32>,
    pub battery_percent: Option<u8>,
    pub ews_level: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct HistoryBucketWire {
    bucket_time: DateTime<Utc>,
    avg_msv: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

// --- Errors ---

/// Why an inbound payload was rejected before reaching the store.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("payload has no device identifier")]
    MissingDeviceId,
}

// --- Endpoint Builders ---

pub fn latest_path(device_mac: &str) -> String {
    format!("/api/v1/telemetry/latest/{device_mac}")
}

pub fn locations_path() -> String {
    "/api/v1/telemetry/locations".to_string()
}

/// History endpoint with the bucket interval and lookback window for the
/// selected timeframe. The interval value is percent-encoded (it contains
/// a space).
pub fn history_path(device_mac: &str, timeframe: Timeframe) -> String {
    format!(
        "/api/v1/telemetry/history/{device_mac}?interval={}&hours_behind={}",
        timeframe.interval().replace(' ', "%20"),
        timeframe.hours_behind()
    )
}

/// Topic carrying live telemetry on the pub/sub connection.
pub const TELEMETRY_TOPIC: &str = "iot/radiation/telemetry";

// --- Decoding ---

impl InboundMessage {
    fn into_sample(self) -> Result<TelemetrySample, WireError> {
        if self.device_mac.is_empty() {
            return Err(WireError::MissingDeviceId);
        }
        Ok(TelemetrySample {
            device_id: self.device_mac,
            latitude: self.latitude,
            longitude: self.longitude,
            radiation_level: self.msv,
            count_rate: self.cpm,
            battery_percent: self.battery_percent,
            alert_tier: self.ews_level.map(AlertTier::from_wire),
        })
    }
}

/// Decode one pub/sub payload into a validated sample.
pub fn decode_telemetry(payload: &[u8]) -> Result<TelemetrySample, WireError> {
    let message: InboundMessage = serde_json::from_slice(payload)?;
    message.into_sample()
}

/// Decode-and-push one pub/sub payload.
///
/// Malformed payloads are dropped silently (the stream continues); the
/// return value reports whether the payload was applied.
pub fn ingest(store: &mut DeviceStateStore, payload: &[u8]) -> bool {
    match decode_telemetry(payload) {
        Ok(sample) => {
            store.push(sample);
            true
        }
        Err(err) => {
            debug!(error = %err, "dropping inbound payload");
            false
        }
    }
}

/// Parse a history response body into raw buckets, preserving order.
pub fn parse_history_response(body: &str) -> Result<Vec<RawBucket>> {
    let envelope: DataEnvelope<HistoryBucketWire> =
        serde_json::from_str(body).context("invalid history response body")?;
    Ok(envelope
        .data
        .into_iter()
        .map(|bucket| RawBucket {
            bucket_time: bucket.bucket_time,
            avg_msv: bucket.avg_msv,
        })
        .collect())
}

/// Seed the store from the startup locations response. Entries without a
/// device identifier are skipped; returns how many were applied.
pub fn seed_from_locations(store: &mut DeviceStateStore, body: &str) -> Result<usize> {
    let envelope: DataEnvelope<InboundMessage> =
        serde_json::from_str(body).context("invalid locations response body")?;
    let mut seeded = 0;
    for entry in envelope.data {
        match entry.into_sample() {
            Ok(sample) => {
                store.push(sample);
                seeded += 1;
            }
            Err(err) => debug!(error = %err, "skipping locations entry"),
        }
    }
    Ok(seeded)
}

// --- Fetch Ordering ---

/// Last-request-wins guard for in-flight history fetches.
///
/// Switching timeframe issues a new generation; a completion callback
/// holding a stale token must discard its result, so a slow older
/// response never clobbers a faster newer one.
#[derive(Debug, Default)]
pub struct FetchGuard {
    generation: AtomicU64,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, invalidating every earlier token.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a fetch begun with `token` is still the latest.
    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }
}
