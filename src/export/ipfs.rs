use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use super::{ContentStore, TransportError, TransportResult};
use crate::config::IpfsConfig;

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Uploads through the IPFS HTTP API (`/api/v0/add`).
#[derive(Debug, Clone)]
pub struct IpfsClient {
    endpoint: String,
    client: Client,
}

impl IpfsClient {
    pub fn new(config: &IpfsConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("sketchlog/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    fn add_url(&self) -> String {
        format!("{}/api/v0/add", self.endpoint.trim_end_matches('/'))
    }
}

impl ContentStore for IpfsClient {
    fn put(&self, file_name: &str, bytes: &[u8]) -> TransportResult<String> {
        let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let url = self.add_url();
        tracing::debug!(%url, bytes = bytes.len(), "uploading to ipfs");

        let response = self.client.post(&url).multipart(form).send()?;
        let body = success_body(response)?;
        let hash = parse_add_response(&body)?;
        tracing::info!(%hash, "ipfs upload complete");
        Ok(hash)
    }
}

/// Reads the body, turning non-2xx replies into [`TransportError::Status`].
pub(super) fn success_body(response: Response) -> TransportResult<String> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// The node streams one JSON object per line; the last one names the upload.
fn parse_add_response(body: &str) -> TransportResult<String> {
    let line = body
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| TransportError::UnexpectedResponse("empty ipfs add response".into()))?;
    let response: AddResponse = serde_json::from_str(line)?;
    if response.hash.is_empty() {
        return Err(TransportError::UnexpectedResponse(
            "ipfs add response has an empty Hash".into(),
        ));
    }
    Ok(response.hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_url_joins_endpoint_without_double_slash() {
        let client = IpfsClient::new(&IpfsConfig {
            endpoint: "http://localhost:5001/".into(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(client.add_url(), "http://localhost:5001/api/v0/add");
    }

    #[test]
    fn parses_hash_from_add_response() {
        let body = r#"{"Name":"drawing.zip","Hash":"QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG","Size":"1024"}"#;
        assert_eq!(
            parse_add_response(body).unwrap(),
            "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
        );
    }

    #[test]
    fn uses_last_line_of_streamed_response() {
        let body = "{\"Name\":\"a\",\"Hash\":\"QmFirst\"}\n{\"Name\":\"b\",\"Hash\":\"QmLast\"}\n";
        assert_eq!(parse_add_response(body).unwrap(), "QmLast");
    }

    #[test]
    fn rejects_response_without_hash() {
        assert!(matches!(
            parse_add_response(r#"{"Name":"x"}"#),
            Err(TransportError::Json(_))
        ));
        assert!(matches!(
            parse_add_response("  \n"),
            Err(TransportError::UnexpectedResponse(_))
        ));
    }
}
