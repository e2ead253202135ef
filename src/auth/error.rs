/// Wire envelope shared by every error surface, shaped per RFC 6749 §5.2.
#[derive(Debug, Clone)]
#[derive(serde::Serialize)]
pub struct ErrorResponse<K> {
    #[serde(rename = "error")]
    pub kind: K,
    #[serde(rename = "error_description")]
    pub description: Option<String>,
    #[serde(rename = "error_uri")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl<K> ErrorResponse<K> {
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            description: None,
            uri: None,
        }
    }

    pub fn described(kind: K, description: &str) -> Self {
        Self {
            kind,
            description: Some(description.to_string()),
            uri: None,
        }
    }
}
