//! Request helpers shared with the HTTP collaborator
//!
//! The HTTP client itself lives outside the framework. These helpers give it
//! the URL templating and the failure classification the error listener
//! expects to see.

use crate::errors::Exception;
use serde_json::Value;

/// Substitute `:name` segments of `pattern` with percent-encoded values
pub fn url<K, V, I>(pattern: &str, params: I) -> String
where
    K: AsRef<str>,
    V: ToString,
    I: IntoIterator<Item = (K, V)>,
{
    params.into_iter().fold(pattern.to_string(), |url, (name, value)| {
        let encoded = urlencoding::encode(&value.to_string()).into_owned();
        url.replace(&format!(":{}", name.as_ref()), &encoded)
    })
}

/// Turn a failed request into an exception.
///
/// `status` is `None` when no response arrived at all. Gateway failures (502,
/// 504) without a server-assigned error id count as connectivity problems.
pub fn classify_http_failure(request_url: &str, status: Option<u16>, body: Option<&Value>) -> Exception {
    let Some(status_code) = status else {
        return Exception::network(format!("Request failed - {}", request_url), request_url);
    };

    let field = |name: &str| {
        body.and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let error_id = field("id");
    let error_code = field("errorCode");
    let message = field("message")
        .unwrap_or_else(|| format!("Request failed ({}): {}", status_code, request_url));

    if error_id.is_none() && (status_code == 502 || status_code == 504) {
        return Exception::network(format!("Server error - {}", status_code), request_url);
    }

    Exception::api(
        message,
        status_code,
        request_url,
        body.cloned().unwrap_or(Value::Null),
        error_id,
        error_code,
    )
}
