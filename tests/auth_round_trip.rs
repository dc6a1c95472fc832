//! End-to-end correlation-state round trip against scripted provider adapters.

// std
use std::sync::Arc;
// crates.io
use url::Url;
// self
use codehost_directory::{
	crypto::{CipherError, StateCipher},
	directory::{CALLBACK_PATH, Directory},
	error::Error,
	host::{CodeHostId, NewCodeHost, ProviderKind, Secret},
	provider::{
		AdapterConfig, CallbackQuery, ExchangeError, ExchangeFuture, ProviderAdapter,
		ProviderSelector, TokenPair,
	},
	state::StateError,
	store::{CodeHostStore, MemoryStore},
};

#[derive(Clone, Copy)]
enum Script {
	Succeed,
	Deny,
}

struct ScriptedAdapter {
	script: Script,
	callback_url: Url,
}
impl ProviderAdapter for ScriptedAdapter {
	fn login_url(&self, state: &str) -> Url {
		let mut url = Url::parse("https://provider.test/oauth/authorize")
			.expect("Scripted authorize URL should parse.");

		url.query_pairs_mut()
			.append_pair("redirect_uri", self.callback_url.as_str())
			.append_pair("state", state);

		url
	}

	fn exchange<'a>(&'a self, callback: &'a CallbackQuery) -> ExchangeFuture<'a> {
		let script = self.script;

		Box::pin(async move {
			callback.authorized_code()?;

			match script {
				Script::Succeed => Ok(TokenPair {
					access_token: "scripted-access".into(),
					refresh_token: Some("scripted-refresh".into()),
				}),
				Script::Deny =>
					Err(ExchangeError::Denied { error: "access_denied".into(), description: None }),
			}
		})
	}
}

struct ScriptedSelector(Script);
impl ProviderSelector for ScriptedSelector {
	fn resolve(
		&self,
		kind: ProviderKind,
		config: AdapterConfig,
	) -> Result<Box<dyn ProviderAdapter>, Error> {
		match kind {
			ProviderKind::GitHub | ProviderKind::GitLab =>
				Ok(Box::new(ScriptedAdapter { script: self.0, callback_url: config.callback_url })),
			kind => Err(Error::UnsupportedProvider { kind }),
		}
	}
}

fn cipher() -> StateCipher {
	StateCipher::new(&[7; StateCipher::KEY_LEN])
}

fn build_directory(script: Script) -> (Directory, Arc<MemoryStore>) {
	let backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CodeHostStore> = backend.clone();
	let directory = Directory::new(store, Arc::new(ScriptedSelector(script)), cipher());

	(directory, backend)
}

async fn register_github(directory: &Directory) -> CodeHostId {
	let new = NewCodeHost::new(
		ProviderKind::GitHub,
		Url::parse("https://github.com").expect("Address fixture should parse."),
	)
	.with_oauth_app("app-id", "app-secret");

	directory.register(new).await.expect("Registration should succeed.").id
}

fn state_param(login_url: &Url) -> String {
	login_url
		.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Login URL should embed a state parameter.")
}

#[tokio::test]
async fn login_url_embeds_state_and_fixed_callback_path() {
	let (directory, _) = build_directory(Script::Succeed);
	let id = register_github(&directory).await;
	let login_url = directory
		.begin_auth("https://app.example.com/done", id)
		.await
		.expect("Authorization initiation should succeed.");
	let redirect_uri = login_url
		.query_pairs()
		.find(|(key, _)| key == "redirect_uri")
		.map(|(_, value)| value.into_owned())
		.expect("Login URL should embed the callback redirect.");

	assert_eq!(redirect_uri, format!("https://app.example.com{CALLBACK_PATH}"));
	assert!(!state_param(&login_url).is_empty());
}

#[tokio::test]
async fn successful_callback_persists_tokens_and_redirects_with_success() {
	let (directory, _) = build_directory(Script::Succeed);
	let id = register_github(&directory).await;
	let login_url = directory
		.begin_auth("https://app.example.com/done", id)
		.await
		.expect("Authorization initiation should succeed.");
	let state = state_param(&login_url);
	let redirect = directory
		.resolve_callback(&state, &CallbackQuery::with_code("auth-code"))
		.await
		.expect("Callback with a decodable state should never hard-fail.");

	assert_eq!(redirect.as_str(), "https://app.example.com/done?success=true");

	let record = directory.get(id).await.expect("Record should still exist.");

	assert_eq!(record.access_token.as_ref().map(Secret::expose), Some("scripted-access"));
	assert_eq!(record.refresh_token.as_ref().map(Secret::expose), Some("scripted-refresh"));
}

#[tokio::test]
async fn denied_exchange_folds_into_the_redirect() {
	let (directory, _) = build_directory(Script::Deny);
	let id = register_github(&directory).await;
	let login_url = directory
		.begin_auth("https://app.example.com/done", id)
		.await
		.expect("Authorization initiation should succeed.");
	let state = state_param(&login_url);
	let redirect = directory
		.resolve_callback(&state, &CallbackQuery::with_code("auth-code"))
		.await
		.expect("Denied exchanges still produce a redirect.");
	let (key, value) = redirect
		.query_pairs()
		.next()
		.expect("Failure redirect should carry a query parameter.");

	assert_eq!(redirect.path(), "/done");
	assert_eq!(key, "err");
	assert!(value.contains("access_denied"));

	let record = directory.get(id).await.expect("Record should still exist.");

	assert!(record.access_token.is_none(), "Failed exchanges must not persist tokens.");
}

#[tokio::test]
async fn state_outlives_the_directory_instance_that_minted_it() {
	// Same key, different process stand-in: callbacks may land on another replica.
	let (first, _) = build_directory(Script::Succeed);
	let id = register_github(&first).await;
	let login_url = first
		.begin_auth("https://app.example.com/done", id)
		.await
		.expect("Authorization initiation should succeed.");
	let state = state_param(&login_url);
	let backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CodeHostStore> = backend.clone();
	let second = Directory::new(store, Arc::new(ScriptedSelector(Script::Succeed)), cipher());
	let redirect = second
		.resolve_callback(&state, &CallbackQuery::with_code("auth-code"))
		.await
		.expect("Replica should decode state minted elsewhere.");

	// The replica's store has no such record, so the failure folds into the redirect.
	assert!(redirect.as_str().starts_with("https://app.example.com/done?err="));
	assert!(redirect.as_str().contains("not+found"));
}

#[tokio::test]
async fn begin_auth_fails_fast_for_unknown_and_unsupported_hosts() {
	let (directory, _) = build_directory(Script::Succeed);
	let err = directory
		.begin_auth("https://app.example.com/done", CodeHostId::new(404))
		.await
		.expect_err("Unknown id should fail initiation.");

	assert!(matches!(err, Error::Store(_)));
	assert!(err.to_string().contains("was not found"));

	let gerrit = NewCodeHost::new(
		ProviderKind::Gerrit,
		Url::parse("https://gerrit.example.com").expect("Address fixture should parse."),
	)
	.with_basic_auth("reviewer", "s3cret");
	let id = directory.register(gerrit).await.expect("Registration should succeed.").id;
	let err = directory
		.begin_auth("https://app.example.com/done", id)
		.await
		.expect_err("Gerrit hosts never go through OAuth.");

	assert!(matches!(err, Error::UnsupportedProvider { kind: ProviderKind::Gerrit }));
}

#[tokio::test]
async fn undecryptable_state_is_a_hard_error_not_a_redirect() {
	let (directory, _) = build_directory(Script::Succeed);
	let err = directory
		.resolve_callback("forged-or-corrupted", &CallbackQuery::with_code("auth-code"))
		.await
		.expect_err("Without a decodable state there is nowhere to redirect.");

	assert!(matches!(err, Error::State(StateError::Cipher(CipherError::Decrypt))));
}
