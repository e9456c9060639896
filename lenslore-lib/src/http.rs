//! Blocking JSON-over-HTTP plumbing shared by the API clients

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY: usize = 300;

/// Build a blocking client with the given request timeout.
pub(crate) fn client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
}

/// Send `body` as JSON and decode a JSON response.
///
/// Errors are plain strings so each client can wrap them in its own
/// error variant.
pub(crate) fn send_json<B, T>(request: RequestBuilder, body: &B) -> std::result::Result<T, String>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .map_err(|e| format!("request failed: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().unwrap_or_default();
        return Err(format!("{status}: {}", truncate(text.trim(), MAX_ERROR_BODY)));
    }

    response
        .json::<T>()
        .map_err(|e| format!("malformed response: {e}"))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("żółw", 2), "żó");
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("", 3), "");
    }
}
