//! Conversions between the `{lat, lng}` object clients send and the
//! `"(<lng>, <lat>)"` point string kept in storage.

use serde_json::Value;

use crate::models::LatLng;

/// Shown on the map when a stored report has no usable point.
pub const FALLBACK_POINT: LatLng = LatLng { lat: 40.7829, lng: -73.9654 };

/// Accepts `{lat, lng}` with numeric or numeric-string members. Anything
/// else yields `None`.
pub fn from_request(value: &Value) -> Option<LatLng> {
    let obj = value.as_object()?;
    let lat = number(obj.get("lat")?)?;
    let lng = number(obj.get("lng")?)?;
    Some(LatLng { lat, lng })
}

fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

pub fn encode_point(p: LatLng) -> String {
    format!("({}, {})", p.lng, p.lat)
}

pub fn decode_point(raw: &str) -> Option<LatLng> {
    let inner = raw.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (lng, lat) = inner.split_once(',')?;
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    Some(LatLng { lat, lng })
}
