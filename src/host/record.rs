//! Code-host record model, registration payloads, and provider-specific defaulting.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	host::{ProviderKind, Secret},
	provider::TokenPair,
};

/// Store-assigned sequential identifier for a code-host record.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CodeHostId(i64);
impl CodeHostId {
	/// Placeholder carried by records that have not been persisted yet; the store
	/// replaces it with the next sequence value on insert.
	pub const UNASSIGNED: Self = Self(0);

	/// Wraps a raw identifier value.
	pub const fn new(value: i64) -> Self {
		Self(value)
	}

	/// Returns the raw identifier value.
	pub const fn value(self) -> i64 {
		self.0
	}

	pub(crate) const fn next(self) -> Self {
		Self(self.0 + 1)
	}
}
impl Display for CodeHostId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl From<i64> for CodeHostId {
	fn from(value: i64) -> Self {
		Self(value)
	}
}

/// Authorization readiness of a code host.
///
/// The wire values (`"1"`, `"2"`) match the original directory API, where `"2"`
/// marks a host as pre-authorized or already through its OAuth exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
	/// OAuth has not completed yet.
	#[default]
	#[serde(rename = "1")]
	Pending,
	/// Usable without any further authorization step.
	#[serde(rename = "2")]
	Ready,
}
impl Readiness {
	/// Returns the wire value for this flag.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "1",
			Self::Ready => "2",
		}
	}
}

/// Caller-supplied payload for registering a new code host.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCodeHost {
	/// Provider kind the host speaks.
	#[serde(rename = "type")]
	pub kind: ProviderKind,
	/// Base address of the provider instance (e.g. `https://gitlab.example.com`).
	pub address: Url,
	/// Account name for basic-credential providers.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Account password for basic-credential providers.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub password: Option<Secret>,
	/// OAuth application (client) identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub application_id: Option<String>,
	/// OAuth client secret.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<Secret>,
}
impl NewCodeHost {
	/// Starts a registration payload for the provided kind and address.
	pub fn new(kind: ProviderKind, address: Url) -> Self {
		Self {
			kind,
			address,
			username: None,
			password: None,
			application_id: None,
			client_secret: None,
		}
	}

	/// Attaches basic credentials (Gerrit-style providers).
	pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
		self.username = Some(username.into());
		self.password = Some(Secret::new(password));

		self
	}

	/// Attaches an OAuth application id + client secret (GitHub/GitLab-style providers).
	pub fn with_oauth_app(
		mut self,
		application_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.application_id = Some(application_id.into());
		self.client_secret = Some(Secret::new(client_secret));

		self
	}

	/// Applies provider defaulting and stamps timestamps; the id is a placeholder
	/// until the store assigns the real sequence value.
	///
	/// Gerrit hosts never go through OAuth: their access token is always the basic
	/// `username:password` pair in base64 and they start out ready. Codehub hosts
	/// start out ready with no token derivation.
	pub(crate) fn into_record(self, id: CodeHostId, now: OffsetDateTime) -> CodeHostRecord {
		let access_token = match self.kind {
			ProviderKind::Gerrit => {
				let username = self.username.as_deref().unwrap_or_default();
				let password = self.password.as_ref().map(Secret::expose).unwrap_or_default();

				Some(Secret::new(STANDARD.encode(format!("{username}:{password}"))))
			},
			_ => None,
		};
		let is_ready =
			if self.kind.pre_authorized() { Readiness::Ready } else { Readiness::Pending };

		CodeHostRecord {
			id,
			kind: self.kind,
			address: self.address,
			username: self.username,
			password: self.password,
			application_id: self.application_id,
			client_secret: self.client_secret,
			access_token,
			refresh_token: None,
			is_ready,
			created_at: now,
			updated_at: now,
		}
	}
}

/// One configured code-hosting integration, exclusively owned by the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodeHostRecord {
	/// Store-assigned identifier.
	pub id: CodeHostId,
	/// Provider kind the host speaks.
	#[serde(rename = "type")]
	pub kind: ProviderKind,
	/// Base address of the provider instance.
	pub address: Url,
	/// Account name for basic-credential providers.
	pub username: Option<String>,
	/// Account password for basic-credential providers.
	pub password: Option<Secret>,
	/// OAuth application (client) identifier.
	pub application_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<Secret>,
	/// Current access token, if any.
	pub access_token: Option<Secret>,
	/// Current refresh token, if any.
	pub refresh_token: Option<Secret>,
	/// Authorization readiness flag.
	pub is_ready: Readiness,
	/// Creation instant as a unix timestamp.
	#[serde(with = "time::serde::timestamp")]
	pub created_at: OffsetDateTime,
	/// Last-mutation instant as a unix timestamp.
	#[serde(with = "time::serde::timestamp")]
	pub updated_at: OffsetDateTime,
}
impl CodeHostRecord {
	/// Installs a freshly exchanged token pair and bumps the update timestamp.
	pub fn apply_tokens(&mut self, pair: TokenPair, now: OffsetDateTime) {
		self.access_token = Some(Secret::new(pair.access_token));
		self.refresh_token = pair.refresh_token.map(Secret::new);
		self.updated_at = now;
	}
}
