use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::models::{ActiveReport, ActiveReportsResponse, ContactInfo, LatLng};

pub const DEMO_SOURCE: &str = "demo_data";
pub const DEMO_MESSAGE: &str = "Using demo data - database connection unavailable";

/// Memoizes the demo listing for a fixed time-to-live.
///
/// Concurrent misses may both rebuild; the last writer wins, which is fine
/// because the content depends only on the build time.
pub struct DemoCache {
    ttl: Duration,
    slot: Mutex<Option<(DateTime<Utc>, Arc<ActiveReportsResponse>)>>,
}

impl DemoCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: Mutex::new(None) }
    }

    pub fn get_or_refresh(&self, now: DateTime<Utc>) -> Arc<ActiveReportsResponse> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((built_at, payload)) = slot.as_ref() {
            let age = now.signed_duration_since(*built_at).to_std();
            if matches!(age, Ok(age) if age < self.ttl) {
                return payload.clone();
            }
        }

        tracing::debug!("rebuilding demo reports");
        let payload = Arc::new(demo_payload(now));
        *slot = Some((now, payload.clone()));
        payload
    }
}

pub fn demo_payload(now: DateTime<Utc>) -> ActiveReportsResponse {
    let reports = demo_reports(now);
    ActiveReportsResponse {
        success: true,
        total: reports.len(),
        reports,
        source: Some(DEMO_SOURCE.to_string()),
        message: Some(DEMO_MESSAGE.to_string()),
    }
}

fn demo_reports(now: DateTime<Utc>) -> Vec<ActiveReport> {
    let at = |hours_ago: i64| (now - chrono::Duration::hours(hours_ago)).to_rfc3339();
    let contact = |n: &str, suffix: &str, phone: &str| ContactInfo {
        name: Some(format!("Demo Reporter{}", n)),
        email: Some(format!("demo{}@rescueradar.com", suffix)),
        phone: Some(phone.to_string()),
    };

    vec![
        ActiveReport {
            id: "demo-001".to_string(),
            description: "Injured stray dog found in Central Park. Appears to have a leg injury and is limping. The dog seems friendly but scared.".to_string(),
            location: "Central Park, Manhattan, New York, NY".to_string(),
            coordinates: LatLng { lat: 40.7829, lng: -73.9654 },
            urgency_level: "high".to_string(),
            animal_type: Some("dog".to_string()),
            situation_type: Some("injury".to_string()),
            created_at: at(0),
            contact_info: contact("", "", "+1-555-0123"),
            image_url: Some("/placeholder.jpg".to_string()),
            ai_analysis: Some(json!({"severity": "high", "confidence": 0.85})),
        },
        ActiveReport {
            id: "demo-002".to_string(),
            description: "Cat stuck in tree for over 24 hours. Owner reports the cat has not eaten and appears weak.".to_string(),
            location: "Brooklyn Bridge Park, Brooklyn, NY".to_string(),
            coordinates: LatLng { lat: 40.7023, lng: -73.9969 },
            urgency_level: "normal".to_string(),
            animal_type: Some("cat".to_string()),
            situation_type: Some("rescue".to_string()),
            created_at: at(2),
            contact_info: contact(" 2", "2", "+1-555-0124"),
            image_url: Some("/placeholder.jpg".to_string()),
            ai_analysis: Some(json!({"severity": "medium", "confidence": 0.75})),
        },
        ActiveReport {
            id: "demo-003".to_string(),
            description: "Abandoned puppies found in cardboard box near Times Square. Approximately 6-8 weeks old, need immediate care.".to_string(),
            location: "Times Square, Manhattan, NY".to_string(),
            coordinates: LatLng { lat: 40.7580, lng: -73.9855 },
            urgency_level: "high".to_string(),
            animal_type: Some("dog".to_string()),
            situation_type: Some("abandonment".to_string()),
            created_at: at(1),
            contact_info: contact(" 3", "3", "+1-555-0125"),
            image_url: Some("/placeholder.jpg".to_string()),
            ai_analysis: Some(json!({"severity": "high", "confidence": 0.92})),
        },
        ActiveReport {
            id: "demo-004".to_string(),
            description: "Lost bird (parrot) spotted in Prospect Park. Appears to be domestic and may be someones pet.".to_string(),
            location: "Prospect Park, Brooklyn, NY".to_string(),
            coordinates: LatLng { lat: 40.6602, lng: -73.9690 },
            urgency_level: "normal".to_string(),
            animal_type: Some("bird".to_string()),
            situation_type: Some("lost_pet".to_string()),
            created_at: at(4),
            contact_info: contact(" 4", "4", "+1-555-0126"),
            image_url: Some("/placeholder.jpg".to_string()),
            ai_analysis: Some(json!({"severity": "low", "confidence": 0.68})),
        },
    ]
}
