use std::fmt::{Display, Formatter};

/// Diagnostics captured when the control plane answers with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequestFailure {
    method: String,
    url: String,
    status: u16,
    response_body: String,
    request_body: Option<String>,
}

impl RemoteRequestFailure {
    /// Creates failure diagnostics for one control-plane call.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        response_body: impl Into<String>,
        request_body: Option<String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            status,
            response_body: response_body.into(),
            request_body,
        }
    }

    /// Returns the HTTP method that was sent.
    #[must_use]
    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Returns the request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the HTTP status returned by the control plane.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn response_body(&self) -> &str {
        self.response_body.as_str()
    }

    /// Returns the serialized request body, when the request carried one.
    #[must_use]
    pub fn request_body(&self) -> Option<&str> {
        self.request_body.as_deref()
    }
}

impl Display for RemoteRequestFailure {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{} {} returned status {}: {}",
            self.method, self.url, self.status, self.response_body
        )?;

        if let Some(request_body) = &self.request_body {
            write!(formatter, " (request body: {request_body})")?;
        }

        Ok(())
    }
}
