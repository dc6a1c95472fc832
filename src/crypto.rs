//! AES-256-GCM cipher that seals correlation state for the OAuth round trip.
//!
//! The state parameter must cross the provider's authorization server and the end
//! user's browser without being readable or forgeable, so it is encrypted rather
//! than merely encoded. The random nonce is prepended to the ciphertext and the
//! whole sealed blob travels as URL-safe base64.

// crates.io
use aes_gcm::{
	Aes256Gcm, Key, Nonce,
	aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{
	Engine as _,
	engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
// self
use crate::_prelude::*;

/// Symmetric cipher keyed by the process-wide secret, constructed once at startup.
#[derive(Clone)]
pub struct StateCipher(Aes256Gcm);
impl StateCipher {
	/// Required key length in bytes (256 bits).
	pub const KEY_LEN: usize = 32;
	const NONCE_LEN: usize = 12;

	/// Creates a cipher from a raw 32-byte key.
	pub fn new(key: &[u8; Self::KEY_LEN]) -> Self {
		Self(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)))
	}

	/// Loads the key from its base64 configuration form.
	pub fn from_base64(encoded: &str) -> Result<Self, CipherError> {
		let bytes = STANDARD.decode(encoded).map_err(|_| CipherError::KeyEncoding)?;
		let key: [u8; Self::KEY_LEN] =
			bytes.as_slice().try_into().map_err(|_| CipherError::KeyLength)?;

		Ok(Self::new(&key))
	}

	/// Encrypts the plaintext under a fresh random nonce and returns a
	/// transport-safe token.
	pub fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
		let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
		let ciphertext = self.0.encrypt(&nonce, plaintext).map_err(|_| CipherError::Encrypt)?;
		let mut sealed = nonce.to_vec();

		sealed.extend_from_slice(&ciphertext);

		Ok(URL_SAFE_NO_PAD.encode(sealed))
	}

	/// Decrypts a token produced by [`StateCipher::seal`].
	///
	/// Any tampering, truncation, or key mismatch surfaces as [`CipherError::Decrypt`];
	/// GCM authentication leaves no partially-decrypted output to leak.
	pub fn open(&self, token: &str) -> Result<Vec<u8>, CipherError> {
		let sealed = URL_SAFE_NO_PAD.decode(token).map_err(|_| CipherError::Decrypt)?;

		if sealed.len() <= Self::NONCE_LEN {
			return Err(CipherError::Decrypt);
		}

		let (nonce, ciphertext) = sealed.split_at(Self::NONCE_LEN);

		self.0.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| CipherError::Decrypt)
	}
}
impl Debug for StateCipher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StateCipher(..)")
	}
}

/// Failures raised while loading the key or transforming payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum CipherError {
	/// Configured key is not valid base64.
	#[error("Cipher key is not valid base64.")]
	KeyEncoding,
	/// Configured key is not exactly 32 bytes.
	#[error("Cipher key must be 32 bytes (256 bits).")]
	KeyLength,
	/// Plaintext could not be encrypted.
	#[error("State payload could not be encrypted.")]
	Encrypt,
	/// Token failed authentication or decryption.
	#[error("State token could not be decrypted.")]
	Decrypt,
}
