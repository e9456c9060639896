//! Image labelling through an external vision API
//!
//! [`GoogleVision`] asks Google Cloud Vision for label detection and object
//! localization in one request and flattens the answer to plain names.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::VisionConfig;
use crate::{http, Error, Result};

/// Labels and objects detected in an image
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisionResponse {
    /// Labels detected in the image
    pub labels: Vec<String>,
    /// Objects detected in the image
    pub objects: Vec<String>,
}

impl VisionResponse {
    /// Labels followed by objects.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().chain(&self.objects).map(String::as_str)
    }

    /// Returns `true` if nothing was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.objects.is_empty()
    }
}

/// Trait for image analysis backends
pub trait ImageAnalyzer {
    /// Detect labels and objects in encoded image bytes (JPEG, PNG, ...).
    fn analyze(&self, image: &[u8]) -> Result<VisionResponse>;
}

/// Google Cloud Vision `images:annotate` client
pub struct GoogleVision {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageAnnotations>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageAnnotations {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<ObjectAnnotation>,
    error: Option<Status>,
}

#[derive(Deserialize)]
struct LabelAnnotation {
    description: String,
}

#[derive(Deserialize)]
struct ObjectAnnotation {
    name: String,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

impl GoogleVision {
    /// Create a client from config. Fails if no API key is set.
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = http::client(config.timeout())
            .map_err(|e| Error::Config(format!("cannot build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }
}

impl ImageAnalyzer for GoogleVision {
    fn analyze(&self, image: &[u8]) -> Result<VisionResponse> {
        if image.is_empty() {
            return Err(Error::InvalidInput("image is empty".to_string()));
        }

        let request = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())]);
        let response: AnnotateResponse =
            http::send_json(request, &annotate_request(image)).map_err(Error::Vision)?;

        let vision = flatten(response)?;
        tracing::debug!(
            labels = vision.labels.len(),
            objects = vision.objects.len(),
            "image analyzed"
        );
        Ok(vision)
    }
}

fn annotate_request(image: &[u8]) -> Value {
    json!({
        "requests": [{
            "image": { "content": STANDARD.encode(image) },
            "features": [
                { "type": "LABEL_DETECTION" },
                { "type": "OBJECT_LOCALIZATION" }
            ]
        }]
    })
}

fn flatten(response: AnnotateResponse) -> Result<VisionResponse> {
    let annotations = response
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| Error::Vision("response contained no results".to_string()))?;

    if let Some(status) = annotations.error {
        return Err(Error::Vision(status.message));
    }

    Ok(VisionResponse {
        labels: annotations
            .label_annotations
            .into_iter()
            .map(|l| l.description)
            .collect(),
        objects: annotations
            .localized_object_annotations
            .into_iter()
            .map(|o| o.name)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<VisionResponse> {
        flatten(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_request_body() {
        let body = annotate_request(b"hi");
        assert_eq!(body["requests"][0]["image"]["content"], "aGk=");
        assert_eq!(body["requests"][0]["features"][0]["type"], "LABEL_DETECTION");
        assert_eq!(body["requests"][0]["features"][1]["type"], "OBJECT_LOCALIZATION");
    }

    #[test]
    fn test_parse_labels_and_objects() {
        let json = r#"{"responses": [{
            "labelAnnotations": [
                {"mid": "/m/0bt9lr", "description": "Dog", "score": 0.97},
                {"mid": "/m/01z5f", "description": "Canidae", "score": 0.93}
            ],
            "localizedObjectAnnotations": [
                {"mid": "/m/0bt9lr", "name": "Dog", "score": 0.9, "boundingPoly": {}}
            ]
        }]}"#;
        let vision = parse(json).unwrap();

        assert_eq!(vision.labels, ["Dog", "Canidae"]);
        assert_eq!(vision.objects, ["Dog"]);
        assert_eq!(vision.tags().collect::<Vec<_>>(), ["Dog", "Canidae", "Dog"]);
    }

    #[test]
    fn test_parse_missing_sections() {
        let vision = parse(r#"{"responses": [{}]}"#).unwrap();
        assert!(vision.is_empty());
    }

    #[test]
    fn test_parse_no_results() {
        assert!(matches!(parse(r#"{}"#), Err(Error::Vision(_))));
    }

    #[test]
    fn test_parse_error_status() {
        let json = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;
        let err = parse(json).unwrap_err();
        assert!(matches!(err, Error::Vision(m) if m == "Bad image data."));
    }

    #[test]
    fn test_empty_image_rejected() {
        let config = VisionConfig {
            api_key: Some("g-test".to_string()),
            ..VisionConfig::default()
        };
        let vision = GoogleVision::new(&config).unwrap();
        assert!(matches!(vision.analyze(&[]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(
            GoogleVision::new(&VisionConfig::default()),
            Err(Error::Config(_))
        ));
    }
}
