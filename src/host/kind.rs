//! Enumerated provider kinds a code host can be registered as.

// self
use crate::_prelude::*;

/// Supported code-hosting provider kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	/// GitHub or GitHub Enterprise.
	GitHub,
	/// GitLab, hosted or self-managed.
	GitLab,
	/// Gerrit review servers; authenticated with basic credentials, never OAuth.
	Gerrit,
	/// CodeHub; pre-authorized, never OAuth.
	Codehub,
}
impl ProviderKind {
	/// Returns the wire identifier used in stored records and API payloads.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::GitHub => "github",
			Self::GitLab => "gitlab",
			Self::Gerrit => "gerrit",
			Self::Codehub => "codehub",
		}
	}

	/// Kinds that are usable immediately after registration without an OAuth flow.
	pub fn pre_authorized(self) -> bool {
		matches!(self, Self::Gerrit | Self::Codehub)
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProviderKind {
	type Err = UnknownProviderKind;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"github" => Ok(Self::GitHub),
			"gitlab" => Ok(Self::GitLab),
			"gerrit" => Ok(Self::Gerrit),
			"codehub" => Ok(Self::Codehub),
			_ => Err(UnknownProviderKind { value: s.to_owned() }),
		}
	}
}

/// Error returned when a provider-kind string is not part of the enumeration.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown provider kind: {value}.")]
pub struct UnknownProviderKind {
	/// The rejected input.
	pub value: String,
}
