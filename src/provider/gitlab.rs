//! GitLab adapter for the OAuth authorization-code flow.
//!
//! Works against gitlab.com and self-managed instances alike; the record's address
//! is the API base and the stock `/oauth/*` paths are appended.

// crates.io
use reqwest::header::ACCEPT;
// self
use crate::{
	_prelude::*,
	host::Secret,
	provider::{AdapterConfig, CallbackQuery, ExchangeFuture, ProviderAdapter, parse_token_response},
};

/// Adapter speaking GitLab's authorize and token endpoints.
#[derive(Clone, Debug)]
pub struct GitLabAdapter {
	client: ReqwestClient,
	authorize_url: Url,
	token_url: Url,
	callback_url: Url,
	client_id: String,
	client_secret: Secret,
}
impl GitLabAdapter {
	/// Configures an adapter against the instance at `config.address`.
	pub fn new(client: ReqwestClient, config: AdapterConfig) -> Self {
		let mut authorize_url = config.address.clone();
		let mut token_url = config.address;

		authorize_url.set_path("/oauth/authorize");
		token_url.set_path("/oauth/token");

		Self {
			client,
			authorize_url,
			token_url,
			callback_url: config.callback_url,
			client_id: config.client_id,
			client_secret: config.client_secret,
		}
	}
}
impl ProviderAdapter for GitLabAdapter {
	fn login_url(&self, state: &str) -> Url {
		let mut url = self.authorize_url.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", self.callback_url.as_str());
		pairs.append_pair("response_type", "code");
		pairs.append_pair("state", state);

		drop(pairs);

		url
	}

	fn exchange<'a>(&'a self, callback: &'a CallbackQuery) -> ExchangeFuture<'a> {
		Box::pin(async move {
			let code = callback.authorized_code()?;
			let form = [
				("grant_type", "authorization_code"),
				("client_id", self.client_id.as_str()),
				("client_secret", self.client_secret.expose()),
				("code", code),
				("redirect_uri", self.callback_url.as_str()),
			];
			let response = self
				.client
				.post(self.token_url.clone())
				.header(ACCEPT, "application/json")
				.form(&form)
				.send()
				.await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?;

			parse_token_response(status, &body)
		})
	}
}
