//! Correlation state carried through the provider round trip as an opaque token.
//!
//! The payload is never persisted server-side; it lives only inside the sealed
//! `state` parameter the provider echoes back, which keeps callback handling
//! stateless across restarts and replicas.

// self
use crate::{_prelude::*, crypto::{CipherError, StateCipher}, host::CodeHostId};

/// Ephemeral caller context that must survive the OAuth redirect round trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationState {
	/// Record that initiated the flow.
	pub code_host_id: CodeHostId,
	/// Final destination for the end user once authorization completes.
	pub redirect_url: String,
}
impl CorrelationState {
	/// Builds state for the provided record and caller destination.
	pub fn new(code_host_id: CodeHostId, redirect_url: impl Into<String>) -> Self {
		Self { code_host_id, redirect_url: redirect_url.into() }
	}
}

/// Serializes correlation state to canonical JSON and seals it with the
/// process-wide cipher.
pub struct StateCodec {
	cipher: StateCipher,
}
impl StateCodec {
	/// Creates a codec around the startup-constructed cipher.
	pub fn new(cipher: StateCipher) -> Self {
		Self { cipher }
	}

	/// Produces the opaque, URL-embeddable token for a state value.
	pub fn encode(&self, state: &CorrelationState) -> Result<String, StateError> {
		let payload = serde_json::to_vec(state).map_err(StateError::Serialize)?;

		Ok(self.cipher.seal(&payload)?)
	}

	/// Recovers state from a token previously produced by [`StateCodec::encode`].
	///
	/// Decryption failure and payload-parse failure are distinct terminal errors;
	/// neither yields a usable redirect target.
	pub fn decode(&self, token: &str) -> Result<CorrelationState, StateError> {
		let payload = self.cipher.open(token)?;
		let mut deserializer = serde_json::Deserializer::from_slice(&payload);

		serde_path_to_error::deserialize(&mut deserializer).map_err(StateError::Malformed)
	}
}
impl Debug for StateCodec {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StateCodec(..)")
	}
}

/// Failures raised while encoding or decoding correlation state.
#[derive(Debug, ThisError)]
pub enum StateError {
	/// State could not be serialized to its canonical byte form.
	#[error("State payload could not be serialized.")]
	Serialize(#[source] serde_json::Error),
	/// Token failed decryption (forged, truncated, or wrong key).
	#[error(transparent)]
	Cipher(#[from] CipherError),
	/// Decrypted bytes did not parse as correlation state.
	#[error("State payload is malformed.")]
	Malformed(#[source] serde_path_to_error::Error<serde_json::Error>),
}
