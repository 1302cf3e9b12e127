use soxguard_core::{AppError, AppResult};
use url::Url;

/// Public Azure Resource Manager endpoint.
pub const AZURE_PUBLIC_ENDPOINT: &str = "https://management.azure.com";

/// Resource-management control plane that governance requests target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPlaneEndpoint {
    base_url: Url,
    host: String,
    audience: String,
}

impl ControlPlaneEndpoint {
    /// Creates an endpoint from a base URL and an optional token audience.
    ///
    /// The audience defaults to the base URL without a trailing slash.
    pub fn new(base_url: &str, audience: Option<&str>) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid control plane URL '{base_url}': {error}"))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "control plane URL '{base_url}' cannot be used as a base"
            )));
        }

        let host = match (base_url.host_str(), base_url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => {
                return Err(AppError::Validation(format!(
                    "control plane URL '{base_url}' has no host"
                )));
            }
        };

        let audience = audience
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| base_url.as_str())
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            base_url,
            host,
            audience,
        })
    }

    /// Returns the public Azure Resource Manager endpoint.
    pub fn azure_public() -> AppResult<Self> {
        Self::new(AZURE_PUBLIC_ENDPOINT, None)
    }

    /// Returns the value sent in the `Host` header.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Returns the token audience.
    #[must_use]
    pub fn audience(&self) -> &str {
        self.audience.as_str()
    }

    /// Returns the single scope requested from the token provider.
    #[must_use]
    pub fn token_scope(&self) -> String {
        format!("{}/.default", self.audience)
    }

    /// Builds an absolute URL from path segments and an `api-version` query.
    ///
    /// Each segment is percent-encoded on its own, so identifiers cannot
    /// inject extra path components or query parameters.
    pub fn resource_url(&self, segments: &[&str], api_version: &str) -> AppResult<String> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!(
                    "control plane URL '{}' cannot carry path segments",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", api_version);

        Ok(url.into())
    }

    /// Resolves a server-provided link (such as `nextLink`) against this endpoint.
    ///
    /// Links pointing at another origin are rejected so the bearer token is
    /// only ever sent to this control plane.
    pub fn resolve_link(&self, link: &str) -> AppResult<String> {
        let resolved = self
            .base_url
            .join(link)
            .map_err(|error| AppError::Validation(format!("invalid link '{link}': {error}")))?;

        if resolved.origin() != self.base_url.origin() {
            return Err(AppError::Validation(format!(
                "link '{link}' leaves control plane host '{}'",
                self.host
            )));
        }

        Ok(resolved.into())
    }
}
