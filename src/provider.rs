//! Provider adapters that build login URLs and exchange authorization codes.
//!
//! Adapters are the crate's only contact with each provider's OAuth wire format.
//! [`ProviderSelector`] maps a [`ProviderKind`] onto a configured adapter; kinds
//! without OAuth (Gerrit, Codehub) fail dispatch with
//! [`Error::UnsupportedProvider`](crate::error::Error::UnsupportedProvider).

#[cfg(feature = "reqwest")] pub mod github;
#[cfg(feature = "reqwest")] pub mod gitlab;

#[cfg(feature = "reqwest")] pub use github::GitHubAdapter;
#[cfg(feature = "reqwest")] pub use gitlab::GitLabAdapter;

// self
use crate::{
	_prelude::*,
	host::{ProviderKind, Secret},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by [`ProviderAdapter::exchange`].
pub type ExchangeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenPair, ExchangeError>> + 'a + Send>>;

/// Access/refresh pair produced by a successful authorization-code exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
	/// Bearer token for provider API calls.
	pub access_token: String,
	/// Rotation secret, when the provider issues one.
	pub refresh_token: Option<String>,
}

/// Query parameters the provider appends when redirecting to the callback endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackQuery {
	/// Authorization code to exchange.
	pub code: Option<String>,
	/// OAuth error code when the provider denied the authorization.
	pub error: Option<String>,
	/// Human-readable denial detail.
	pub error_description: Option<String>,
}
impl CallbackQuery {
	/// Builds a successful callback carrying an authorization code.
	pub fn with_code(code: impl Into<String>) -> Self {
		Self { code: Some(code.into()), ..Self::default() }
	}

	/// Extracts the recognized parameters from an inbound callback URL.
	pub fn from_url(url: &Url) -> Self {
		let mut query = Self::default();

		for (key, value) in url.query_pairs() {
			match key.as_ref() {
				"code" => query.code = Some(value.into_owned()),
				"error" => query.error = Some(value.into_owned()),
				"error_description" => query.error_description = Some(value.into_owned()),
				_ => {},
			}
		}

		query
	}

	/// Returns the authorization code, surfacing provider denials first.
	pub fn authorized_code(&self) -> Result<&str, ExchangeError> {
		if let Some(error) = &self.error {
			return Err(ExchangeError::Denied {
				error: error.clone(),
				description: self.error_description.clone(),
			});
		}

		self.code.as_deref().ok_or(ExchangeError::MissingCode)
	}
}

/// Connection material handed to the selector when instantiating an adapter.
#[derive(Clone, Debug)]
pub struct AdapterConfig {
	/// Callback URL the provider must redirect back to.
	pub callback_url: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// Base address of the provider instance.
	pub address: Url,
}

/// Per-provider implementation of login-URL construction and code exchange.
pub trait ProviderAdapter
where
	Self: Send + Sync,
{
	/// Builds the provider's authorize URL, embedding the opaque state parameter the
	/// provider must echo back unchanged.
	fn login_url(&self, state: &str) -> Url;

	/// Exchanges the inbound authorization callback for an access/refresh pair.
	fn exchange<'a>(&'a self, callback: &'a CallbackQuery) -> ExchangeFuture<'a>;
}

/// Maps a provider kind onto a configured adapter instance. Pure dispatch, no side
/// effects.
pub trait ProviderSelector
where
	Self: Send + Sync,
{
	/// Resolves the adapter for `kind`, configured with the provided material.
	fn resolve(&self, kind: ProviderKind, config: AdapterConfig) -> Result<Box<dyn ProviderAdapter>>;
}

/// Selector covering the built-in reqwest-backed adapters.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct DefaultProviderSelector {
	client: ReqwestClient,
}
#[cfg(feature = "reqwest")]
impl DefaultProviderSelector {
	/// Creates a selector with a stock reqwest client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a selector that reuses the caller's reqwest client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client }
	}
}
#[cfg(feature = "reqwest")]
impl ProviderSelector for DefaultProviderSelector {
	fn resolve(&self, kind: ProviderKind, config: AdapterConfig) -> Result<Box<dyn ProviderAdapter>> {
		match kind {
			ProviderKind::GitHub => Ok(Box::new(GitHubAdapter::new(self.client.clone(), config))),
			ProviderKind::GitLab => Ok(Box::new(GitLabAdapter::new(self.client.clone(), config))),
			kind => Err(Error::UnsupportedProvider { kind }),
		}
	}
}

/// Failures raised during the authorization-code exchange.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// Callback carried neither a code nor an error parameter.
	#[error("Authorization callback is missing the code parameter.")]
	MissingCode,
	/// Provider denied the authorization or rejected the grant.
	#[error("Provider denied the authorization: {error}.")]
	Denied {
		/// OAuth error code (e.g. `access_denied`, `invalid_grant`).
		error: String,
		/// Provider-supplied detail, when present.
		description: Option<String>,
	},
	/// Token endpoint answered with a non-success status and no OAuth error body.
	#[error("Token endpoint returned status {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
	},
	/// Token endpoint returned a success status without an access token.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token endpoint returned malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl ExchangeError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ExchangeError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}

/// Wire shape shared by the GitHub and GitLab token endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
	access_token: Option<String>,
	refresh_token: Option<String>,
	error: Option<String>,
	error_description: Option<String>,
}

/// Normalizes a token-endpoint response body into a [`TokenPair`].
///
/// GitHub reports denials inside a 200 body, GitLab via 4xx statuses; both paths
/// fold into [`ExchangeError::Denied`] when an OAuth error field is present.
pub(crate) fn parse_token_response(status: u16, body: &[u8]) -> Result<TokenPair, ExchangeError> {
	let success = (200..300).contains(&status);
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let parsed: TokenResponse = match serde_path_to_error::deserialize(&mut deserializer) {
		Ok(parsed) => parsed,
		Err(_) if !success => return Err(ExchangeError::Rejected { status }),
		Err(source) => return Err(ExchangeError::ResponseParse { source }),
	};

	if let Some(error) = parsed.error {
		return Err(ExchangeError::Denied { error, description: parsed.error_description });
	}
	if !success {
		return Err(ExchangeError::Rejected { status });
	}

	match parsed.access_token {
		Some(access_token) => Ok(TokenPair { access_token, refresh_token: parsed.refresh_token }),
		None => Err(ExchangeError::MissingAccessToken),
	}
}
