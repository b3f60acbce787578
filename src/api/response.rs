//! Status and body handling shared by every HTTP call.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::ClientError;

/// The `{success, data, message}` wrapper most endpoints answer with.
/// `success` is not consulted; the status code already says it.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Result<T, ClientError> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(ClientError::InvalidResponse(
                self.message
                    .unwrap_or_else(|| "response has no `data` field".to_owned()),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Returns the response unchanged on 2xx, or [`ClientError::Rejected`]
/// carrying the server's `message` when the body has one.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Checks the status, then decodes the JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let response = ensure_success(response).await?;
    let body = response.text().await?;
    decode(&body)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"success":false,"message":"invalid credentials"}"#).as_deref(),
            Some("invalid credentials")
        );
        assert_eq!(error_message(r#"{"success":false}"#), None);
        assert_eq!(error_message(r#"{"message":"  "}"#), None);
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn test_envelope_into_data() {
        let env: Envelope<Vec<u8>> = decode(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(env.into_data().unwrap(), vec![1, 2]);

        let env: Envelope<Vec<u8>> = decode(r#"{"success":false,"message":"gone"}"#).unwrap();
        assert_eq!(
            env.into_data().unwrap_err(),
            ClientError::InvalidResponse("gone".to_owned())
        );
    }

    #[test]
    fn test_decode_failure_is_invalid_response() {
        let err = decode::<Envelope<u8>>("not json").unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
