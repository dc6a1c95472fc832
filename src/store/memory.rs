//! Thread-safe in-memory [`CodeHostStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	host::{CodeHostId, CodeHostRecord},
	store::{CodeHostStore, ListFilter, Registry, StoreFuture},
};

/// Keeps records in-process; the id sequence lives inside the registry lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Registry>>);
impl CodeHostStore for MemoryStore {
	fn add(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord> {
		let registry = self.0.clone();

		Box::pin(async move { Ok(registry.write().assign(record)) })
	}

	fn list<'a>(&'a self, filter: &'a ListFilter) -> StoreFuture<'a, Vec<CodeHostRecord>> {
		let registry = self.0.clone();

		Box::pin(async move { Ok(registry.read().list(filter)) })
	}

	fn get_by_id(&self, id: CodeHostId) -> StoreFuture<'_, CodeHostRecord> {
		let registry = self.0.clone();

		Box::pin(async move { registry.read().get(id) })
	}

	fn update_fields(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord> {
		let registry = self.0.clone();

		Box::pin(async move { registry.write().update_fields(record) })
	}

	fn update_tokens(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord> {
		let registry = self.0.clone();

		Box::pin(async move { registry.write().update_tokens(record) })
	}

	fn delete_by_id(&self, id: CodeHostId) -> StoreFuture<'_, ()> {
		let registry = self.0.clone();

		Box::pin(async move { registry.write().remove(id) })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::{
		host::{NewCodeHost, ProviderKind, Secret},
		provider::TokenPair,
		store::StoreError,
	};

	fn new_host(kind: ProviderKind) -> CodeHostRecord {
		NewCodeHost::new(
			kind,
			Url::parse("https://git.example.com").expect("Address fixture should parse."),
		)
		.into_record(CodeHostId::UNASSIGNED, datetime!(2025-06-01 00:00 UTC))
	}

	#[tokio::test]
	async fn add_assigns_sequential_ids() {
		let store = MemoryStore::default();
		let first = store.add(new_host(ProviderKind::GitHub)).await.expect("First add should succeed.");
		let second =
			store.add(new_host(ProviderKind::GitLab)).await.expect("Second add should succeed.");

		assert_eq!(first.id, CodeHostId::new(1));
		assert_eq!(second.id, CodeHostId::new(2));
	}

	#[tokio::test]
	async fn deleted_records_are_gone() {
		let store = MemoryStore::default();
		let record =
			store.add(new_host(ProviderKind::GitHub)).await.expect("Add should succeed.");

		store.delete_by_id(record.id).await.expect("Delete should succeed.");

		assert!(matches!(
			store.get_by_id(record.id).await,
			Err(StoreError::NotFound { id }) if id == record.id,
		));
		assert_eq!(
			store.delete_by_id(record.id).await,
			Err(StoreError::NotFound { id: record.id }),
		);
	}

	#[tokio::test]
	async fn update_tokens_touches_only_token_fields() {
		let store = MemoryStore::default();
		let mut record =
			store.add(new_host(ProviderKind::GitLab)).await.expect("Add should succeed.");

		record.apply_tokens(
			TokenPair { access_token: "fresh".into(), refresh_token: None },
			datetime!(2025-06-02 00:00 UTC),
		);
		record.username = Some("should-not-stick".into());

		let updated =
			store.update_tokens(record.clone()).await.expect("Token update should succeed.");

		assert_eq!(updated.access_token.as_ref().map(Secret::expose), Some("fresh"));
		assert_eq!(updated.username, None);
		assert_eq!(updated.updated_at, datetime!(2025-06-02 00:00 UTC));
	}

	#[tokio::test]
	async fn update_on_missing_record_fails() {
		let store = MemoryStore::default();
		let mut record = new_host(ProviderKind::GitHub);

		record.id = CodeHostId::new(99);

		assert!(matches!(
			store.update_fields(record.clone()).await,
			Err(StoreError::NotFound { .. }),
		));
		assert!(matches!(store.update_tokens(record).await, Err(StoreError::NotFound { .. })));
	}
}
