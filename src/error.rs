//! Directory-level error types shared across lifecycle, state, and callback handling.

// self
use crate::{_prelude::*, host::ProviderKind};

/// Directory-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical directory error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure, including missing records.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Correlation-state token could not be decoded.
	#[error(transparent)]
	State(#[from] crate::state::StateError),
	/// Provider rejected or botched the authorization-code exchange.
	#[error(transparent)]
	Exchange(#[from] crate::provider::ExchangeError),

	/// Provider kind has no OAuth adapter.
	#[error("Provider `{kind}` does not support OAuth authorization.")]
	UnsupportedProvider {
		/// The kind that failed dispatch.
		kind: ProviderKind,
	},
	/// Caller-supplied redirect URI cannot be parsed or lacks a host.
	#[error("Redirect URI is invalid.")]
	MalformedRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
