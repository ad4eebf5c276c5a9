use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordinal early-warning severity of a device's current dose rate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AlertTier {
    #[default]
    Safe = 0,
    Warning = 1,
    Danger = 2,
}

impl AlertTier {
    /// Map a wire-level `ews_level` integer to a tier.
    ///
    /// Anything other than 1 or 2 (including out-of-range values) is
    /// treated as `Safe`.
    pub fn from_wire(level: i64) -> Self {
        match level {
            1 => AlertTier::Warning,
            2 => AlertTier::Danger,
            _ => AlertTier::Safe,
        }
    }
}

/// One decoded telemetry update for one device.
///
/// Every field except `device_id` is optional: an absent field means
/// "unchanged" and is preserved from the prior record when the store
/// merges this sample. Validation of the untrusted wire shape happens
/// upstream, so a sample reaching the store always carries a non-empty
/// `device_id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TelemetrySample {
    /// Stable hardware identifier (a MAC address in practice). Never empty.
    pub device_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Dose rate in µSv/h.
    pub radiation_level: Option<f64>,
    /// Counts per minute.
    pub count_rate: Option<u32>,
    pub battery_percent: Option<u8>,
    pub alert_tier: Option<AlertTier>,
}

impl TelemetrySample {
    /// Convenience constructor for a sample carrying only an identity.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Self::default()
        }
    }
}

/// The store's merged, current-state view of one device.
///
/// Numeric measurements default to zero and the tier to `Safe` until a
/// sample reports them; coordinates stay absent until first reported.
/// `observed_at` is the ingestion time of the most recent merge, never a
/// timestamp trusted from the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub device_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radiation_level: f64,
    pub count_rate: u32,
    pub battery_percent: Option<u8>,
    pub alert_tier: AlertTier,
    pub observed_at: DateTime<Utc>,
}

impl DeviceRecord {
    /// Build a fresh record from a first-seen sample, applying defaults
    /// for every absent field.
    pub(crate) fn from_sample(sample: TelemetrySample, observed_at: DateTime<Utc>) -> Self {
        Self {
            device_id: sample.device_id,
            latitude: sample.latitude,
            longitude: sample.longitude,
            radiation_level: sample.radiation_level.unwrap_or(0.0),
            count_rate: sample.count_rate.unwrap_or(0),
            battery_percent: sample.battery_percent,
            alert_tier: sample.alert_tier.unwrap_or_default(),
            observed_at,
        }
    }

    /// Field-level merge: every present field of `sample` overwrites, every
    /// absent field retains its prior value. `observed_at` always advances
    /// to the ingestion time (last-arrived-wins).
    pub(crate) fn merge(&mut self, sample: TelemetrySample, observed_at: DateTime<Utc>) {
        debug_assert_eq!(self.device_id, sample.device_id);
        if let Some(lat) = sample.latitude {
            self.latitude = Some(lat);
        }
        if let Some(lon) = sample.longitude {
            self.longitude = Some(lon);
        }
        if let Some(msv) = sample.radiation_level {
            self.radiation_level = msv;
        }
        if let Some(cpm) = sample.count_rate {
            self.count_rate = cpm;
        }
        if let Some(batt) = sample.battery_percent {
            self.battery_percent = Some(batt);
        }
        if let Some(tier) = sample.alert_tier {
            self.alert_tier = tier;
        }
        self.observed_at = observed_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_tier_from_wire_maps_known_levels() {
        assert_eq!(AlertTier::from_wire(0), AlertTier::Safe);
        assert_eq!(AlertTier::from_wire(1), AlertTier::Warning);
        assert_eq!(AlertTier::from_wire(2), AlertTier::Danger);
    }

    #[test]
    fn alert_tier_from_wire_defaults_unknown_to_safe() {
        assert_eq!(AlertTier::from_wire(-1), AlertTier::Safe);
        assert_eq!(AlertTier::from_wire(3), AlertTier::Safe);
        assert_eq!(AlertTier::from_wire(99), AlertTier::Safe);
    }

    #[test]
    fn record_from_sample_applies_defaults() {
        let now = Utc::now();
        let record = DeviceRecord::from_sample(TelemetrySample::new("AA:BB"), now);
        assert_eq!(record.device_id, "AA:BB");
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
        assert_eq!(record.radiation_level, 0.0);
        assert_eq!(record.count_rate, 0);
        assert_eq!(record.battery_percent, None);
        assert_eq!(record.alert_tier, AlertTier::Safe);
        assert_eq!(record.observed_at, now);
    }

    #[test]
    fn merge_overwrites_present_and_keeps_absent() {
        let t0 = Utc::now();
        let mut record = DeviceRecord::from_sample(
            TelemetrySample {
                radiation_level: Some(0.5),
                count_rate: Some(30),
                ..TelemetrySample::new("AA:BB")
            },
            t0,
        );

        let t1 = t0 + chrono::Duration::seconds(1);
        record.merge(
            TelemetrySample {
                count_rate: Some(45),
                ..TelemetrySample::new("AA:BB")
            },
            t1,
        );

        assert_eq!(record.radiation_level, 0.5);
        assert_eq!(record.count_rate, 45);
        assert_eq!(record.observed_at, t1);
    }
}
