//! # Radmap Viewport
//!
//! Derives the initial map viewport from the set of known device
//! positions: the midpoint of the coordinate extrema plus fit-to bounds,
//! with degenerate and empty inputs collapsing to a single center point.
//! Runs once against the store's startup snapshot; pure and O(n).

use serde::{Deserialize, Serialize};

use radmap_core::DeviceRecord;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Fit-to rectangle for the initial camera.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub northeast: GeoPoint,
    pub southwest: GeoPoint,
}

/// Initial camera placement. `bounds` is absent when there is nothing to
/// fit: no known positions, or a single degenerate point.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub bounds: Option<Bounds>,
}

/// Fallback center when no device has reported a position yet.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    longitude: 106.8166,
    latitude: -6.2000,
};

/// Compute the viewport for a set of `(longitude, latitude)` positions.
///
/// Single pass over four running extrema; no rounding, full float
/// precision retained.
pub fn viewport_for<I>(positions: I) -> Viewport
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut extrema: Option<(f64, f64, f64, f64)> = None;
    for (lon, lat) in positions {
        extrema = Some(match extrema {
            None => (lon, lon, lat, lat),
            Some((min_lon, max_lon, min_lat, max_lat)) => (
                min_lon.min(lon),
                max_lon.max(lon),
                min_lat.min(lat),
                max_lat.max(lat),
            ),
        });
    }

    let Some((min_lon, max_lon, min_lat, max_lat)) = extrema else {
        return Viewport {
            center: DEFAULT_CENTER,
            bounds: None,
        };
    };

    if min_lon == max_lon && min_lat == max_lat {
        return Viewport {
            center: GeoPoint {
                longitude: min_lon,
                latitude: min_lat,
            },
            bounds: None,
        };
    }

    Viewport {
        center: GeoPoint {
            longitude: (min_lon + max_lon) / 2.0,
            latitude: (min_lat + max_lat) / 2.0,
        },
        bounds: Some(Bounds {
            northeast: GeoPoint {
                longitude: max_lon,
                latitude: max_lat,
            },
            southwest: GeoPoint {
                longitude: min_lon,
                latitude: min_lat,
            },
        }),
    }
}

/// Viewport for a store snapshot, skipping devices that have never
/// reported a position.
pub fn viewport_for_records<'a, I>(records: I) -> Viewport
where
    I: IntoIterator<Item = &'a DeviceRecord>,
{
    viewport_for(
        records
            .into_iter()
            .filter_map(|r| Some((r.longitude?, r.latitude?))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn two_points_yield_midpoint_and_bounds() {
        let viewport = viewport_for(vec![(106.8169, -6.2005), (106.8180, -6.2010)]);

        assert_relative_eq!(viewport.center.longitude, 106.81745);
        assert_relative_eq!(viewport.center.latitude, -6.20075);

        let bounds = viewport.bounds.unwrap();
        assert_eq!(bounds.northeast.longitude, 106.8180);
        assert_eq!(bounds.northeast.latitude, -6.2005);
        assert_eq!(bounds.southwest.longitude, 106.8169);
        assert_eq!(bounds.southwest.latitude, -6.2010);
    }

    #[test]
    fn degenerate_point_set_has_no_bounds() {
        let viewport = viewport_for(vec![(106.8, -6.2), (106.8, -6.2)]);
        assert_eq!(viewport.center.longitude, 106.8);
        assert_eq!(viewport.center.latitude, -6.2);
        assert_eq!(viewport.bounds, None);
    }

    #[test]
    fn empty_input_falls_back_to_default_center() {
        let viewport = viewport_for(std::iter::empty());
        assert_eq!(viewport.center, DEFAULT_CENTER);
        assert_eq!(viewport.bounds, None);
    }

    #[test]
    fn records_without_coordinates_are_skipped() {
        use chrono::Utc;
        use radmap_core::{AlertTier, DeviceRecord};

        let located = DeviceRecord {
            device_id: "AA".to_string(),
            latitude: Some(-6.2),
            longitude: Some(106.8),
            radiation_level: 0.1,
            count_rate: 20,
            battery_percent: Some(90),
            alert_tier: AlertTier::Safe,
            observed_at: Utc::now(),
        };
        let unlocated = DeviceRecord {
            device_id: "BB".to_string(),
            latitude: None,
            longitude: None,
            ..located.clone()
        };

        let viewport = viewport_for_records([&located, &unlocated]);
        assert_eq!(viewport.center.longitude, 106.8);
        assert_eq!(viewport.center.latitude, -6.2);
        assert_eq!(viewport.bounds, None);
    }

    #[test]
    fn no_located_records_fall_back_to_default() {
        let viewport = viewport_for_records(std::iter::empty());
        assert_eq!(viewport.center, DEFAULT_CENTER);
    }
}
