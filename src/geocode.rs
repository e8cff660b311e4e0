//! Reverse geocoding of GPS coordinates to place names.
//!
//! The pipeline only ever talks to the [`ReverseGeocoder`] trait; the
//! production implementation is [`NominatimGeocoder`] over blocking HTTPS.
//! Failures are categorized so the caption layer can degrade precisely:
//!
//! | Failure | Caption behavior |
//! |---|---|
//! | timeout / service unavailable / transport | coordinate string `"{lat:.4}, {lon:.4}"` |
//! | anything else | location line omitted entirely |
//!
//! The HTTP client timeout is fixed at 10 seconds and is the only bound a
//! lookup can stall the surrounding pipeline for.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Fixed lookup timeout; also bounds how long one image can stall the run.
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("geocoding timed out: {0}")]
    Timeout(String),
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
    #[error("geocoding transport failure: {0}")]
    Transport(String),
    #[error("unexpected geocoding failure: {0}")]
    Other(String),
}

/// Structured address returned by a successful reverse lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    /// Full formatted address, comma-delimited, most specific part first.
    pub display_name: String,
}

impl Address {
    /// Shortest useful label: city, then town, then village, then the first
    /// comma-delimited segment of the full address.
    pub fn place_label(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
            .or_else(|| {
                self.display_name
                    .split(',')
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
            })
    }
}

/// External collaborator resolving coordinates to an address.
pub trait ReverseGeocoder {
    fn reverse(&self, lat: f64, lon: f64) -> Result<Address, GeocodeError>;
}

/// Resolve a place label for the caption, applying the degradation ladder.
///
/// Never returns an error: recoverable failures become the coordinate-string
/// fallback, unexpected ones drop the location line.
pub fn resolve_place(geocoder: &dyn ReverseGeocoder, lat: f64, lon: f64) -> Option<String> {
    match geocoder.reverse(lat, lon) {
        Ok(address) => address.place_label(),
        Err(err @ (GeocodeError::Timeout(_)
        | GeocodeError::Unavailable(_)
        | GeocodeError::Transport(_))) => {
            log::warn!("{err}; falling back to coordinates");
            Some(format!("{lat:.4}, {lon:.4}"))
        }
        Err(err) => {
            log::warn!("{err}; omitting location from caption");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
}

/// Reverse geocoder backed by the Nominatim HTTP API.
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self, GeocodeError> {
        Self::with_endpoint("https://nominatim.openstreetmap.org/reverse")
    }

    /// Point at a different endpoint (local instance, test server).
    pub fn with_endpoint(endpoint: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(GEOCODE_TIMEOUT)
            .user_agent(concat!("frameprep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeocodeError::Other(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn categorize(err: reqwest::Error) -> GeocodeError {
        if err.is_timeout() {
            GeocodeError::Timeout(err.to_string())
        } else if err.is_connect() {
            GeocodeError::Unavailable(err.to_string())
        } else {
            GeocodeError::Transport(err.to_string())
        }
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn reverse(&self, lat: f64, lon: f64) -> Result<Address, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2"),
                ("lat", &lat.to_string()),
                ("lon", &lon.to_string()),
                ("accept-language", "en"),
            ])
            .send()
            .map_err(Self::categorize)?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(GeocodeError::Unavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(GeocodeError::Other(format!("HTTP {status}")));
        }

        let body = response.text().map_err(Self::categorize)?;
        let parsed: NominatimResponse = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::Other(format!("malformed response: {e}")))?;

        let address = parsed.address.unwrap_or(NominatimAddress {
            city: None,
            town: None,
            village: None,
        });
        Ok(Address {
            city: address.city,
            town: address.town,
            village: address.village,
            display_name: parsed.display_name.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Scripted geocoder for pipeline and caption tests.
    pub enum MockGeocoder {
        Succeed(Address),
        Fail(fn(String) -> GeocodeError),
    }

    impl ReverseGeocoder for MockGeocoder {
        fn reverse(&self, _lat: f64, _lon: f64) -> Result<Address, GeocodeError> {
            match self {
                MockGeocoder::Succeed(address) => Ok(address.clone()),
                MockGeocoder::Fail(make) => Err(make("mock failure".to_string())),
            }
        }
    }

    #[test]
    fn place_label_prefers_city() {
        let address = Address {
            city: Some("Pittsburgh".to_string()),
            town: Some("Shadyside".to_string()),
            village: None,
            display_name: "5000 Forbes Ave, Pittsburgh, PA".to_string(),
        };
        assert_eq!(address.place_label(), Some("Pittsburgh".to_string()));
    }

    #[test]
    fn place_label_falls_through_town_then_village() {
        let address = Address {
            city: None,
            town: Some("Machynlleth".to_string()),
            village: Some("Derwenlas".to_string()),
            display_name: String::new(),
        };
        assert_eq!(address.place_label(), Some("Machynlleth".to_string()));

        let address = Address {
            town: None,
            ..address
        };
        assert_eq!(address.place_label(), Some("Derwenlas".to_string()));
    }

    #[test]
    fn place_label_uses_first_display_segment() {
        let address = Address {
            city: None,
            town: None,
            village: None,
            display_name: "Gare du Nord, Paris, France".to_string(),
        };
        assert_eq!(address.place_label(), Some("Gare du Nord".to_string()));
    }

    #[test]
    fn place_label_none_when_nothing_available() {
        assert_eq!(Address::default().place_label(), None);
    }

    #[test]
    fn timeout_falls_back_to_coordinate_string() {
        let geocoder = MockGeocoder::Fail(GeocodeError::Timeout);
        assert_eq!(
            resolve_place(&geocoder, 12.34, 56.78),
            Some("12.3400, 56.7800".to_string())
        );
    }

    #[test]
    fn unavailable_and_transport_fall_back_to_coordinate_string() {
        for make in [GeocodeError::Unavailable, GeocodeError::Transport] {
            let geocoder = MockGeocoder::Fail(make);
            assert_eq!(
                resolve_place(&geocoder, -33.8688, 151.2093),
                Some("-33.8688, 151.2093".to_string())
            );
        }
    }

    #[test]
    fn unexpected_failure_omits_location() {
        let geocoder = MockGeocoder::Fail(GeocodeError::Other);
        assert_eq!(resolve_place(&geocoder, 1.0, 2.0), None);
    }

    #[test]
    fn success_uses_place_label() {
        let geocoder = MockGeocoder::Succeed(Address {
            city: Some("Kyoto".to_string()),
            ..Default::default()
        });
        assert_eq!(resolve_place(&geocoder, 35.0, 135.7), Some("Kyoto".to_string()));
    }

    #[test]
    fn nominatim_response_parses_partial_address() {
        let parsed: NominatimResponse = serde_json::from_str(
            r#"{"display_name": "Somewhere, Earth", "address": {"town": "Somewhere"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.address.unwrap().town, Some("Somewhere".to_string()));
        assert_eq!(parsed.display_name, Some("Somewhere, Earth".to_string()));
    }
}
