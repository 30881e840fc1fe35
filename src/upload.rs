use crate::error::CaptureError;
use crate::record::Record;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// File extension requested from the signer for captured logs.
pub const LOG_EXTENSION: &str = ".log";

/// Body of the credential request sent to the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerRequest {
    /// Invocation start, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub auth_token: String,
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Signer response. Any field may be missing, which means "do not upload".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadCredential {
    #[serde(rename = "jwtAccess", default)]
    pub access_token: Option<String>,
    #[serde(rename = "signedRequest", default)]
    pub signed_request: Option<String>,
    #[serde(rename = "url", default)]
    pub public_url: Option<String>,
}

impl UploadCredential {
    /// Signed upload URL, if the signer granted a usable one.
    pub fn upload_url(&self) -> Option<&str> {
        self.signed_request.as_deref().filter(|url| !url.is_empty())
    }
}

/// Issues short-lived upload credentials for an invocation.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn request_credential(&self, request: &SignerRequest) -> Result<UploadCredential, CaptureError>;
}

/// Stores a payload at a signed URL.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// PUT `body` to `url`. Any non-error response counts as success.
    async fn put(&self, url: &str, body: String) -> Result<(), CaptureError>;
}

/// Serialize records as newline-delimited JSON, one record per line.
pub fn ndjson_body(records: &[Record]) -> Result<String, CaptureError> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Severity, Timestamp};

    #[test]
    fn request_uses_camel_case_and_skips_missing_request_id() {
        let request = SignerRequest {
            timestamp: 42,
            auth_token: "t".to_string(),
            extension: LOG_EXTENSION.to_string(),
            request_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "timestamp": 42, "authToken": "t", "extension": ".log" }));
    }

    #[test]
    fn partial_signer_response_is_not_uploadable() {
        let credential: UploadCredential = serde_json::from_str(r#"{"jwtAccess":"X"}"#).unwrap();
        assert_eq!(credential.access_token.as_deref(), Some("X"));
        assert_eq!(credential.upload_url(), None);

        let credential: UploadCredential = serde_json::from_str(r#"{"signedRequest":""}"#).unwrap();
        assert_eq!(credential.upload_url(), None);

        let credential: UploadCredential = serde_json::from_str(
            r#"{"jwtAccess":"X","signedRequest":"https://up.example/","url":"https://pub.example/"}"#,
        )
        .unwrap();
        assert_eq!(credential.upload_url(), Some("https://up.example/"));
        assert_eq!(credential.public_url.as_deref(), Some("https://pub.example/"));
    }

    #[test]
    fn body_is_one_json_record_per_line() {
        let records = vec![
            Record { message: "a 1".into(), severity: Severity::Log, timestamp: Timestamp::EpochMillis(1) },
            Record { message: "b 2".into(), severity: Severity::Error, timestamp: Timestamp::EpochMillis(2) },
        ];
        let body = ndjson_body(&records).unwrap();
        assert_eq!(
            body,
            "{\"message\":\"a 1\",\"severity\":\"log\",\"timestamp\":1}\n{\"message\":\"b 2\",\"severity\":\"error\",\"timestamp\":2}"
        );
        assert_eq!(ndjson_body(&[]).unwrap(), "");
    }
}
