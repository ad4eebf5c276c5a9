use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::sample::{DeviceRecord, TelemetrySample};
use crate::window::RollingWindow;

/// Single source of truth for the current state of every known device.
///
/// Updates arrive unordered and possibly duplicated from the pub/sub
/// transport; `push` reconciles them into at most one record per device
/// id via field-level merge. The store does not reorder: the last sample
/// to *arrive* wins, and `observed_at` always advances to ingestion time.
///
/// First-appearance insertion order is preserved so `all()` snapshots are
/// stable for list rendering.
///
/// The store is single-threaded by design (`&mut self` everywhere); a
/// multi-threaded composition must serialize `push`, `focus` and snapshot
/// reads behind one mutex so no reader observes a record mid-merge.
#[derive(Debug, Default)]
pub struct DeviceStateStore {
    records: HashMap<String, DeviceRecord>,
    order: Vec<String>,
    focused: Option<String>,
    window: RollingWindow,
}

impl DeviceStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile one sample, stamping it with the current wall clock.
    ///
    /// Precondition: `sample.device_id` is non-empty. The wire boundary
    /// rejects identity-less payloads before they get here.
    pub fn push(&mut self, sample: TelemetrySample) {
        self.push_at(sample, Utc::now());
    }

    /// Reconcile one sample with an explicit ingestion timestamp.
    pub fn push_at(&mut self, sample: TelemetrySample, now: DateTime<Utc>) {
        debug_assert!(!sample.device_id.is_empty(), "sample without device id");

        let device_id = sample.device_id.clone();
        match self.records.get_mut(&device_id) {
            Some(record) => record.merge(sample, now),
            None => {
                self.order.push(device_id.clone());
                let record = DeviceRecord::from_sample(sample, now);
                self.records.insert(device_id.clone(), record);
            }
        }

        // Feed the strip chart with the post-merge value, so a partial
        // update without a dose rate still records the current level.
        if self.focused.as_deref() == Some(device_id.as_str()) {
            if let Some(record) = self.records.get(&device_id) {
                self.window.append(record.radiation_level);
            }
        }
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceRecord> {
        self.records.get(device_id)
    }

    /// Snapshot of all records in first-appearance order.
    pub fn all(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mark a device so its future pushes also feed the rolling window.
    ///
    /// At most one device is focused at a time; focusing always resets the
    /// window to all zeros, synchronously, so no values from a previous
    /// focus leak into the new strip chart.
    pub fn focus(&mut self, device_id: impl Into<String>) {
        self.focused = Some(device_id.into());
        self.window.reset();
    }

    pub fn unfocus(&mut self) {
        self.focused = None;
        self.window.reset();
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Read access to the focused device's strip-chart window.
    pub fn window(&self) -> &RollingWindow {
        &self.window
    }
}
