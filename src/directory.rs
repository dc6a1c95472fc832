//! Directory facade: record lifecycle plus the OAuth session-correlation flows.
//!
//! [`Directory::begin_auth`] seals caller context into the opaque `state` parameter
//! and hands back the provider login URL; [`Directory::resolve_callback`] unseals it
//! on the way back, exchanges the code, persists tokens, and always redirects the
//! end user somewhere, folding every post-decode failure into the redirect itself.

// self
use crate::{
	_prelude::*,
	crypto::StateCipher,
	host::{CodeHostId, CodeHostRecord, NewCodeHost, Secret},
	provider::{AdapterConfig, CallbackQuery, ProviderSelector},
	state::{CorrelationState, StateCodec},
	store::{CodeHostStore, ListFilter},
};

/// Fixed path the OAuth provider redirects back to, relative to the caller's host.
pub const CALLBACK_PATH: &str = "/api/directory/codehosts/callback";

/// Coordinates code-host records, provider adapters, and the correlation-state
/// round trip.
///
/// The directory owns the store, the selector, and the state codec so the flow
/// methods can focus on sequencing. Requests are independent; the only shared
/// state is the cipher key (read-only) and whatever the store synchronizes itself.
pub struct Directory {
	store: Arc<dyn CodeHostStore>,
	selector: Arc<dyn ProviderSelector>,
	codec: StateCodec,
}
impl Directory {
	/// Creates a directory over the provided store, selector, and startup cipher.
	pub fn new(
		store: Arc<dyn CodeHostStore>,
		selector: Arc<dyn ProviderSelector>,
		cipher: StateCipher,
	) -> Self {
		Self { store, selector, codec: StateCodec::new(cipher) }
	}

	/// Registers a code host, applying provider defaulting; the store assigns the id.
	pub async fn register(&self, new: NewCodeHost) -> Result<CodeHostRecord> {
		let now = OffsetDateTime::now_utc();
		let record = self.store.add(new.into_record(CodeHostId::UNASSIGNED, now)).await?;

		tracing::info!(id = %record.id, kind = %record.kind, "registered code host");

		Ok(record)
	}

	/// Lists registered code hosts matching the filter.
	pub async fn list(&self, filter: &ListFilter) -> Result<Vec<CodeHostRecord>> {
		Ok(self.store.list(filter).await?)
	}

	/// Fetches a code host by id.
	pub async fn get(&self, id: CodeHostId) -> Result<CodeHostRecord> {
		Ok(self.store.get_by_id(id).await?)
	}

	/// Replaces the caller-editable fields of an existing code host.
	pub async fn update(&self, mut record: CodeHostRecord) -> Result<CodeHostRecord> {
		record.updated_at = OffsetDateTime::now_utc();

		Ok(self.store.update_fields(record).await?)
	}

	/// Deletes a code host by id.
	pub async fn delete(&self, id: CodeHostId) -> Result<()> {
		self.store.delete_by_id(id).await?;
		tracing::info!(%id, "deleted code host");

		Ok(())
	}

	/// Begins the OAuth flow for a registered code host and returns the provider
	/// login URL the end user should be sent to.
	///
	/// `redirect_uri` is the caller's ultimate destination; its scheme and host also
	/// anchor the fixed-path callback URL the provider redirects back to. Every
	/// failure here propagates to the programmatic caller since no browser is
	/// involved yet.
	pub async fn begin_auth(&self, redirect_uri: &str, id: CodeHostId) -> Result<Url> {
		let record = self.store.get_by_id(id).await?;
		let redirect = parse_redirect(redirect_uri)?;
		let callback_url = callback_url_for(&redirect);
		let adapter = self.selector.resolve(record.kind, adapter_config(&record, callback_url))?;
		let state = CorrelationState::new(record.id, redirect_uri);
		let token = self.codec.encode(&state)?;

		tracing::debug!(id = %record.id, kind = %record.kind, "initiating authorization");

		Ok(adapter.login_url(&token))
	}

	/// Completes the OAuth flow from the provider's callback and returns the URL the
	/// HTTP layer should redirect the end user to.
	///
	/// Once the state token decodes and its stored redirect parses, this never fails:
	/// lookup, dispatch, exchange, and persistence errors all become an
	/// `err=<message>` query parameter on the caller's redirect, and success becomes
	/// `success=true`. Only a failure before the redirect target is known (an
	/// undecryptable or malformed state token, or an unparseable stored redirect)
	/// surfaces as a hard error.
	pub async fn resolve_callback(&self, state_token: &str, callback: &CallbackQuery) -> Result<Url> {
		let state = self.codec.decode(state_token)?;
		let redirect = parse_redirect(&state.redirect_url)?;
		let outcome = self.exchange_and_persist(&state, &redirect, callback).await;

		if let Err(err) = &outcome {
			tracing::warn!(
				id = %state.code_host_id,
				error = %err,
				"authorization callback failed; folding into redirect",
			);
		}

		Ok(finish_redirect(redirect, outcome))
	}

	async fn exchange_and_persist(
		&self,
		state: &CorrelationState,
		redirect: &Url,
		callback: &CallbackQuery,
	) -> Result<()> {
		let mut record = self.store.get_by_id(state.code_host_id).await?;
		let callback_url = callback_url_for(redirect);
		let adapter = self.selector.resolve(record.kind, adapter_config(&record, callback_url))?;
		let pair = adapter.exchange(callback).await?;

		record.apply_tokens(pair, OffsetDateTime::now_utc());
		self.store.update_tokens(record).await?;

		Ok(())
	}
}
impl Debug for Directory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Directory").field("codec", &self.codec).finish_non_exhaustive()
	}
}

fn parse_redirect(redirect_uri: &str) -> Result<Url> {
	let redirect =
		Url::parse(redirect_uri).map_err(|source| Error::MalformedRedirect { source })?;

	if !redirect.has_host() {
		return Err(Error::MalformedRedirect { source: url::ParseError::EmptyHost });
	}

	Ok(redirect)
}

/// Derives `<scheme>://<host>[:port]` + the fixed callback path from the caller's
/// redirect target.
fn callback_url_for(redirect: &Url) -> Url {
	let mut callback = redirect.clone();

	callback.set_path(CALLBACK_PATH);
	callback.set_query(None);
	callback.set_fragment(None);

	callback
}

fn adapter_config(record: &CodeHostRecord, callback_url: Url) -> AdapterConfig {
	AdapterConfig {
		callback_url,
		client_id: record.application_id.clone().unwrap_or_default(),
		client_secret: record.client_secret.clone().unwrap_or_else(|| Secret::new("")),
		address: record.address.clone(),
	}
}

fn finish_redirect(mut redirect: Url, outcome: Result<()>) -> Url {
	// query_pairs_mut re-serializes on drop, so the appended pair survives into the
	// final string.
	match outcome {
		Ok(()) => {
			redirect.query_pairs_mut().append_pair("success", "true");
		},
		Err(err) => {
			redirect.query_pairs_mut().append_pair("err", &err.to_string());
		},
	}

	redirect
}
