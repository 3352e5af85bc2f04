use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::EnvironmentConfig;
use crate::utils::errors::ApiResult;

#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodingRequest {
    pub address: String,
}

/// Resultado de geocoding. Nunca es un error: un fallo se expresa con `success = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResponse {
    pub success: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub formatted_address: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl GeocodingResponse {
    fn found(latitude: f64, longitude: f64, formatted_address: Option<String>) -> Self {
        Self {
            success: true,
            latitude: Some(latitude),
            longitude: Some(longitude),
            formatted_address,
            message: Some("Geocoding successful".to_string()),
            error: None,
        }
    }

    fn not_found(message: &str) -> Self {
        Self {
            success: false,
            latitude: None,
            longitude: None,
            formatted_address: None,
            message: Some(message.to_string()),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            latitude: None,
            longitude: None,
            formatted_address: None,
            message: None,
            error: Some(error),
        }
    }
}

/// Lugar de Nominatim; `lat`/`lon` vienen como strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: Option<String>,
    lon: Option<String>,
    display_name: Option<String>,
    error: Option<String>,
}

impl NominatimPlace {
    fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.as_deref()?.trim().parse::<f64>().ok()?;
        let lon = self.lon.as_deref()?.trim().parse::<f64>().ok()?;
        Some((lat, lon))
    }
}

/// Interpretar la respuesta de `/search` (lista de lugares, el primero es el más relevante)
fn parse_search(body: &str) -> GeocodingResponse {
    let places: Vec<NominatimPlace> = match serde_json::from_str(body) {
        Ok(places) => places,
        Err(e) => return GeocodingResponse::failed(format!("Failed to parse geocoding response: {}", e)),
    };

    places
        .into_iter()
        .find_map(|place| {
            place
                .coordinates()
                .map(|(lat, lon)| GeocodingResponse::found(lat, lon, place.display_name))
        })
        .unwrap_or_else(|| GeocodingResponse::not_found("No coordinates found for this address"))
}

/// Interpretar la respuesta de `/reverse` (un único lugar, o `{ "error": ... }`)
fn parse_reverse(body: &str, latitude: f64, longitude: f64) -> GeocodingResponse {
    let place: NominatimPlace = match serde_json::from_str(body) {
        Ok(place) => place,
        Err(e) => return GeocodingResponse::failed(format!("Failed to parse geocoding response: {}", e)),
    };

    if let Some(error) = place.error {
        return GeocodingResponse::not_found(&error);
    }
    match place.display_name {
        Some(address) if !address.trim().is_empty() => {
            GeocodingResponse::found(latitude, longitude, Some(address))
        }
        _ => GeocodingResponse::not_found("No address found for these coordinates"),
    }
}

/// Geocoding directo e inverso contra un servicio compatible con Nominatim
pub struct GeocodingService {
    base_url: String,
    client: reqwest::Client,
}

impl GeocodingService {
    pub fn new(config: &EnvironmentConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs.min(10)))
            .user_agent("RoadsideAssist/1.0")
            .build()?;

        Ok(Self::with_client(client, config.geocoding_base_url.clone()))
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub async fn geocode_address(&self, address: &str) -> GeocodingResponse {
        let address = address.trim();
        if address.is_empty() {
            return GeocodingResponse::not_found("Empty address");
        }
        log::info!("🗺️ Geocoding address: {}", address);

        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(address)
        );

        match self.fetch(&url).await {
            Ok(body) => {
                let response = parse_search(&body);
                if response.success {
                    log::info!(
                        "✅ Geocoding successful: {} -> ({:?}, {:?})",
                        address,
                        response.latitude,
                        response.longitude
                    );
                } else {
                    log::warn!("⚠️ No coordinates found for address: {}", address);
                }
                response
            }
            Err(error) => GeocodingResponse::failed(error),
        }
    }

    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> GeocodingResponse {
        log::info!("🗺️ Reverse geocoding ({}, {})", latitude, longitude);
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json",
            self.base_url, latitude, longitude
        );

        match self.fetch(&url).await {
            Ok(body) => parse_reverse(&body, latitude, longitude),
            Err(error) => GeocodingResponse::failed(error),
        }
    }

    pub async fn batch_geocode(&self, addresses: &[String]) -> Vec<GeocodingResponse> {
        log::info!("🗺️ Batch geocoding {} addresses", addresses.len());
        let mut results = Vec::with_capacity(addresses.len());

        // Lotes pequeños con pausa entre ellos: Nominatim limita la tasa
        for chunk in addresses.chunks(5) {
            let chunk_results =
                futures::future::join_all(chunk.iter().map(|address| self.geocode_address(address))).await;
            results.extend(chunk_results);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        log::info!("✅ Batch geocoding completed: {} results", results.len());
        results
    }

    async fn fetch(&self, url: &str) -> Result<String, String> {
        log::debug!("🌐 Making request to: {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            log::error!("❌ Geocoding request failed: {}", e);
            format!("Geocoding request failed: {}", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Geocoding failed with status {}: {}", status, error_text);
            return Err(format!("Geocoding failed: {}", status));
        }

        response
            .text()
            .await
            .map_err(|e| format!("Failed to read geocoding response: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_takes_first_place_with_coordinates() {
        let body = r#"[
            {"lat": "x", "lon": "1", "display_name": "broken"},
            {"lat": "18.5204", "lon": "73.8567", "display_name": "Pune, Maharashtra, India"}
        ]"#;
        let response = parse_search(body);
        assert!(response.success);
        assert_eq!(response.latitude, Some(18.5204));
        assert_eq!(response.longitude, Some(73.8567));
        assert_eq!(response.formatted_address.as_deref(), Some("Pune, Maharashtra, India"));
    }

    #[test]
    fn test_parse_search_without_results() {
        let response = parse_search("[]");
        assert!(!response.success);
        assert!(response.error.is_none());

        let garbage = parse_search("<html>");
        assert!(!garbage.success);
        assert!(garbage.error.is_some());
    }

    #[test]
    fn test_parse_reverse() {
        let ok = parse_reverse(r#"{"display_name": "MG Road, Bengaluru"}"#, 12.97, 77.59);
        assert!(ok.success);
        assert_eq!(ok.formatted_address.as_deref(), Some("MG Road, Bengaluru"));

        let missing = parse_reverse(r#"{"error": "Unable to geocode"}"#, 0.0, 0.0);
        assert!(!missing.success);
        assert_eq!(missing.message.as_deref(), Some("Unable to geocode"));
    }
}
