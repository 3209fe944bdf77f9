use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, Response};

use crate::errors::{CustomResult, Error};

/// how requests reach the race server.
/// returns the response body, http level failures are errors.
pub trait Transport {
    fn post_form(&mut self, url: &str, form: &[(&str, String)], timeout: Duration) -> CustomResult<String>;
    fn get_query(&mut self, url: &str, query: &[(&str, String)], timeout: Duration) -> CustomResult<String>;
}

/// blocking reqwest client that keeps the race server's session cookie
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> CustomResult<HttpTransport> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(transport_error)?;

        Ok(HttpTransport { client })
    }

    fn read_body(response: Response) -> CustomResult<String> {
        let response = response.error_for_status().map_err(transport_error)?;
        response.text().map_err(transport_error)
    }
}

impl Transport for HttpTransport {
    fn post_form(&mut self, url: &str, form: &[(&str, String)], timeout: Duration) -> CustomResult<String> {
        debug!(target:"race_api/transport:post_form", "POST {} action={}", url, action_name(form));
        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .form(form)
            .send()
            .map_err(transport_error)?;

        HttpTransport::read_body(response)
    }

    fn get_query(&mut self, url: &str, query: &[(&str, String)], timeout: Duration) -> CustomResult<String> {
        debug!(target:"race_api/transport:get_query", "GET {} query={}", url, action_name(query));
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .query(query)
            .send()
            .map_err(transport_error)?;

        HttpTransport::read_body(response)
    }
}

/// the action or query name of a request, used in log lines instead of the
/// full parameters since those can hold a password
pub fn action_name<'a>(params: &'a [(&str, String)]) -> &'a str {
    params
        .iter()
        .find(|(key, _)| *key == "action" || *key == "query")
        .map(|(_, value)| value.as_str())
        .unwrap_or("")
}

fn transport_error(error: reqwest::Error) -> Error {
    let message = if error.is_timeout() {
        format!("request timed out ({})", error)
    } else {
        error.to_string()
    };

    Error::TransportError { message }
}
