//! Simple file-backed [`CodeHostStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	host::{CodeHostId, CodeHostRecord},
	store::{CodeHostStore, ListFilter, Registry, StoreError, StoreFuture},
};

/// Persists the full record set to a JSON snapshot after each mutation.
///
/// The id sequence resumes past the highest id found in the snapshot on open.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Registry>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let records = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(Registry::from_records(records))) })
	}

	fn load_snapshot(path: &Path) -> Result<Vec<CodeHostRecord>, StoreError> {
		if !path.exists() {
			return Ok(Vec::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Vec::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, registry: &Registry) -> Result<(), StoreError> {
		let serialized =
			serde_json::to_vec_pretty(&registry.snapshot()).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CodeHostStore for FileStore {
	fn add(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let stored = guard.assign(record);

			self.persist_locked(&guard)?;

			Ok(stored)
		})
	}

	fn list<'a>(&'a self, filter: &'a ListFilter) -> StoreFuture<'a, Vec<CodeHostRecord>> {
		Box::pin(async move { Ok(self.inner.read().list(filter)) })
	}

	fn get_by_id(&self, id: CodeHostId) -> StoreFuture<'_, CodeHostRecord> {
		Box::pin(async move { self.inner.read().get(id) })
	}

	fn update_fields(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let updated = guard.update_fields(record)?;

			self.persist_locked(&guard)?;

			Ok(updated)
		})
	}

	fn update_tokens(&self, record: CodeHostRecord) -> StoreFuture<'_, CodeHostRecord> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let updated = guard.update_tokens(record)?;

			self.persist_locked(&guard)?;

			Ok(updated)
		})
	}

	fn delete_by_id(&self, id: CodeHostId) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.remove(id)?;
			self.persist_locked(&guard)?;

			Ok(())
		})
	}
}
