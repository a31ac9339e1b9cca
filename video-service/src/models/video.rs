use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use validator::Validate;

/// Body of `POST /generate-video`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VideoRequest {
    /// Concept to explain, e.g. "photosynthesis".
    #[validate(length(min = 1, message = "Query cannot be empty"))]
    pub query: String,
    /// Educational domain, e.g. "biology".
    #[validate(length(min = 1, message = "Sector cannot be empty"))]
    pub sector: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResponse {
    pub video_id: String,
    pub query: String,
    pub sector: String,
    pub video_path: String,
    pub metadata: HashMap<String, Value>,
    pub status: VideoStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_fail_validation() {
        let request = VideoRequest {
            query: String::new(),
            sector: String::new(),
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("query"));
        assert!(fields.contains_key("sector"));
    }

    #[test]
    fn populated_request_is_valid() {
        let request = VideoRequest {
            query: "photosynthesis".to_string(),
            sector: "biology".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(VideoStatus::Completed).unwrap(),
            "completed"
        );
    }
}
