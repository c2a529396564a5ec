use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

/// Meters to statute miles.
pub const METERS_TO_MILES: f64 = 0.000621371;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_at: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Summary activity as returned by the activity list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    pub start_date: DateTime<Utc>,
    /// Wall-clock start in the activity's own timezone, tagged as UTC by the API.
    #[serde(default)]
    pub start_date_local: Option<DateTime<Utc>>,
    /// Meters.
    #[serde(default, deserialize_with = "null_as_default")]
    pub distance: f64,
    #[serde(default)]
    pub gear_id: Option<String>,
}

impl Activity {
    /// Calendar day the activity started on, as the athlete saw it.
    pub fn local_date(&self) -> NaiveDate {
        self.start_date_local
            .unwrap_or(self.start_date)
            .date_naive()
    }

    pub fn distance_miles(&self) -> f64 {
        self.distance * METERS_TO_MILES
    }

    pub fn has_gear(&self) -> bool {
        self.gear_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Total distance in the athlete's preferred unit.
    #[serde(default, deserialize_with = "null_as_default")]
    pub converted_distance: f64,
}

/// Only the parts of the athlete profile the workflows read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Athlete {
    #[serde(default, deserialize_with = "null_as_default")]
    pub shoes: Vec<GearItem>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single-field change applied through the activity update endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityUpdate {
    Gear(String),
    Name(String),
    Description(String),
    SportType(String),
    Commute(bool),
    Trainer(bool),
    HideFromHome(bool),
}

impl ActivityUpdate {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Gear(_) => "gear_id",
            Self::Name(_) => "name",
            Self::Description(_) => "description",
            Self::SportType(_) => "sport_type",
            Self::Commute(_) => "commute",
            Self::Trainer(_) => "trainer",
            Self::HideFromHome(_) => "hide_from_home",
        }
    }

    pub fn to_body(&self) -> serde_json::Value {
        let value = match self {
            Self::Gear(value)
            | Self::Name(value)
            | Self::Description(value)
            | Self::SportType(value) => json!(value),
            Self::Commute(flag) | Self::Trainer(flag) | Self::HideFromHome(flag) => json!(flag),
        };
        let mut body = serde_json::Map::new();
        body.insert(self.field().to_string(), value);
        serde_json::Value::Object(body)
    }
}
