//! GitHub adapter for the OAuth web-application flow.
//!
//! Endpoints are derived from the record's address so GitHub Enterprise instances
//! work with their stock `/login/oauth/*` paths.

// crates.io
use reqwest::header::ACCEPT;
// self
use crate::{
	_prelude::*,
	host::Secret,
	provider::{AdapterConfig, CallbackQuery, ExchangeFuture, ProviderAdapter, parse_token_response},
};

/// Adapter speaking GitHub's authorize and access-token endpoints.
#[derive(Clone, Debug)]
pub struct GitHubAdapter {
	client: ReqwestClient,
	authorize_url: Url,
	token_url: Url,
	callback_url: Url,
	client_id: String,
	client_secret: Secret,
}
impl GitHubAdapter {
	/// Configures an adapter against the instance at `config.address`.
	pub fn new(client: ReqwestClient, config: AdapterConfig) -> Self {
		let mut authorize_url = config.address.clone();
		let mut token_url = config.address;

		authorize_url.set_path("/login/oauth/authorize");
		token_url.set_path("/login/oauth/access_token");

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
impl ProviderAdapter for GitHubAdapter {
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
			// GitHub answers in form-encoding unless JSON is requested explicitly.
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

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn adapter() -> GitHubAdapter {
		GitHubAdapter::new(
			ReqwestClient::new(),
			AdapterConfig {
				callback_url: Url::parse(
					"https://ci.example.com/api/directory/codehosts/callback",
				)
				.expect("Callback fixture should parse."),
				client_id: "app-id".into(),
				client_secret: Secret::new("app-secret"),
				address: Url::parse("https://github.com").expect("Address fixture should parse."),
			},
		)
	}

	#[test]
	fn login_url_embeds_state_and_callback() {
		let url = adapter().login_url("opaque-state");

		assert_eq!(url.host_str(), Some("github.com"));
		assert_eq!(url.path(), "/login/oauth/authorize");

		let pairs: Vec<_> = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();

		assert!(pairs.contains(&("client_id".into(), "app-id".into())));
		assert!(pairs.contains(&("state".into(), "opaque-state".into())));
		assert!(pairs.contains(&(
			"redirect_uri".into(),
			"https://ci.example.com/api/directory/codehosts/callback".into(),
		)));
	}

	#[test]
	fn enterprise_addresses_keep_stock_paths() {
		let mut config = AdapterConfig {
			callback_url: Url::parse("https://ci.example.com/cb")
				.expect("Callback fixture should parse."),
			client_id: "id".into(),
			client_secret: Secret::new("secret"),
			address: Url::parse("https://ghe.internal.example.com")
				.expect("Enterprise address fixture should parse."),
		};

		config.address.set_port(Some(8443)).expect("Setting a port should succeed.");

		let url = GitHubAdapter::new(ReqwestClient::new(), config).login_url("s");

		assert_eq!(url.host_str(), Some("ghe.internal.example.com"));
		assert_eq!(url.port(), Some(8443));
		assert_eq!(url.path(), "/login/oauth/authorize");
	}
}
