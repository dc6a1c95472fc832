//! Storage contracts and built-in stores for code-host records.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	host::{CodeHostId, CodeHostRecord, ProviderKind},
};

/// Future type returned by [`CodeHostStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for code-host records.
///
/// Identifier assignment belongs to the store: [`add`](CodeHostStore::add) replaces
/// the incoming record's id with the next sequence value under the store's own
/// synchronization, so concurrent registrations never collide.
pub trait CodeHostStore
where
	Self: Send + Sync,
{
	/// Persists a new record, assigning its identifier, and returns the stored copy.
	fn add(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord>;

	/// Lists records matching the provided filter.
	fn list<'a>(&'a self, filter: &'a ListFilter) -> StoreFuture<'a, Vec<CodeHostRecord>>;

	/// Fetches a record by id, failing with [`StoreError::NotFound`] when absent.
	fn get_by_id(&self, id: CodeHostId) -> StoreFuture<'_, CodeHostRecord>;

	/// Replaces the caller-editable fields of an existing record, keeping its
	/// creation timestamp.
	fn update_fields(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord>;

	/// Replaces only the token fields and update timestamp of an existing record.
	fn update_tokens(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord>;

	/// Deletes a record by id, failing with [`StoreError::NotFound`] when absent.
	fn delete_by_id(&self, id: CodeHostId) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CodeHostStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// No record exists for the requested id.
	#[error("Code host {id} was not found.")]
	NotFound {
		/// The missing identifier.
		id: CodeHostId,
	},
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Optional criteria applied by [`CodeHostStore::list`].
#[derive(Clone, Debug, Default)]
pub struct ListFilter {
	/// Match on the provider instance address.
	pub address: Option<Url>,
	/// Match on the registered account name.
	pub owner: Option<String>,
	/// Match on the provider kind.
	pub source: Option<ProviderKind>,
}
impl ListFilter {
	/// Restricts results to the provided address.
	pub fn with_address(mut self, address: Url) -> Self {
		self.address = Some(address);

		self
	}

	/// Restricts results to the provided account name.
	pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
		self.owner = Some(owner.into());

		self
	}

	/// Restricts results to the provided provider kind.
	pub fn with_source(mut self, source: ProviderKind) -> Self {
		self.source = Some(source);

		self
	}

	/// Returns `true` when the record satisfies every populated criterion.
	pub fn matches(&self, record: &CodeHostRecord) -> bool {
		if self.address.as_ref().is_some_and(|address| record.address != *address) {
			return false;
		}
		if self.owner.as_deref().is_some_and(|owner| record.username.as_deref() != Some(owner)) {
			return false;
		}
		if self.source.is_some_and(|source| record.kind != source) {
			return false;
		}

		true
	}
}

/// Record map plus the id sequence, shared by the built-in backends.
///
/// The sequence only moves forward, so identifiers are never reused within a
/// store's lifetime even after the highest record is deleted.
#[derive(Clone, Debug)]
pub(crate) struct Registry {
	records: BTreeMap<CodeHostId, CodeHostRecord>,
	next_id: CodeHostId,
}
impl Registry {
	pub(crate) fn from_records(records: impl IntoIterator<Item = CodeHostRecord>) -> Self {
		let records: BTreeMap<_, _> = records.into_iter().map(|r| (r.id, r)).collect();
		let next_id = records.keys().next_back().copied().unwrap_or_default().next();

		Self { records, next_id }
	}

	pub(crate) fn assign(&mut self, mut record: CodeHostRecord) -> CodeHostRecord {
		record.id = self.next_id;
		self.next_id = self.next_id.next();
		self.records.insert(record.id, record.clone());

		record
	}

	pub(crate) fn get(&self, id: CodeHostId) -> Result<CodeHostRecord, StoreError> {
		self.records.get(&id).cloned().ok_or(StoreError::NotFound { id })
	}

	pub(crate) fn list(&self, filter: &ListFilter) -> Vec<CodeHostRecord> {
		self.records.values().filter(|record| filter.matches(record)).cloned().collect()
	}

	pub(crate) fn update_fields(
		&mut self,
		mut record: CodeHostRecord,
	) -> Result<CodeHostRecord, StoreError> {
		let existing =
			self.records.get_mut(&record.id).ok_or(StoreError::NotFound { id: record.id })?;

		record.created_at = existing.created_at;
		*existing = record.clone();

		Ok(record)
	}

	pub(crate) fn update_tokens(
		&mut self,
		record: CodeHostRecord,
	) -> Result<CodeHostRecord, StoreError> {
		let existing =
			self.records.get_mut(&record.id).ok_or(StoreError::NotFound { id: record.id })?;

		existing.access_token = record.access_token;
		existing.refresh_token = record.refresh_token;
		existing.updated_at = record.updated_at;

		Ok(existing.clone())
	}

	pub(crate) fn remove(&mut self, id: CodeHostId) -> Result<(), StoreError> {
		self.records.remove(&id).map(|_| ()).ok_or(StoreError::NotFound { id })
	}

	pub(crate) fn snapshot(&self) -> Vec<&CodeHostRecord> {
		self.records.values().collect()
	}
}
impl Default for Registry {
	fn default() -> Self {
		Self { records: BTreeMap::new(), next_id: CodeHostId::new(1) }
	}
}
