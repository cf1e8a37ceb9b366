// Collaborator entity types
//
// Read-only views of the CRUD side of the application (profiles, photos,
// trips, destinations). Only the fields feed rendering needs are carried.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Thumbnail filename of the current profile picture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_thumbnail: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Uploaded photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub thumbnail_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_public: bool,
}

/// One stop of a trip, in visiting order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStop {
    pub position: i32,
    pub destination_id: i64,
    pub destination_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure: Option<DateTime<Utc>>,
}

/// Trip with its ordered stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub user_id: i64,
    pub is_public: bool,
    pub stops: Vec<TripStop>,
}

impl Trip {
    pub fn first_stop(&self) -> Option<&TripStop> {
        self.stops.first()
    }

    pub fn last_stop(&self) -> Option<&TripStop> {
        self.stops.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_display_name() {
        let profile = Profile {
            user_id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            profile_photo_thumbnail: None,
        };
        assert_eq!(profile.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_trip_serializes_camel_case() {
        let trip = Trip {
            id: 3,
            user_id: 1,
            is_public: true,
            stops: vec![TripStop {
                position: 0,
                destination_id: 9,
                destination_name: "Akaroa".to_string(),
                arrival: None,
                departure: None,
            }],
        };
        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["stops"][0]["destinationName"], "Akaroa");
        assert!(json["stops"][0].get("arrival").is_none());
    }
}
