//! Code-host directory for CI/CD platforms. Registers GitHub, GitLab, and Gerrit
//! integrations and brokers the OAuth authorization-code round trip, carrying caller
//! context across the redirect inside an encrypted correlation-state token.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod crypto;
pub mod directory;
pub mod error;
pub mod host;
pub mod provider;
pub mod state;
pub mod store;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
