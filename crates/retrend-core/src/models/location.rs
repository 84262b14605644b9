use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOCATION;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

impl LocationAddress {
    /// "area, city, state" with empty parts skipped
    pub fn display_name(&self) -> String {
        [&self.area, &self.city, &self.state]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Listing feed filter saved under the `userLocation` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPreference {
    pub name: String,
    #[serde(default)]
    pub address: LocationAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl LocationPreference {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: LocationAddress::default(),
            coordinates: None,
        }
    }

    pub fn from_address(address: LocationAddress, coordinates: Option<Coordinates>) -> Self {
        let name = address.display_name();
        let name = if name.is_empty() {
            DEFAULT_LOCATION.to_string()
        } else {
            name
        };
        Self {
            name,
            address,
            coordinates,
        }
    }
}

impl Default for LocationPreference {
    fn default() -> Self {
        Self::named(DEFAULT_LOCATION)
    }
}
