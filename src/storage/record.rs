//! The persisted configuration record.
//!
//! Field names on disk follow the JSON layout the dit client has always
//! written, so existing `~/.ditconfig` files keep loading.

use crate::crypto::password::{Kdf, SALT_LENGTH};
use crate::error::{DitConfigError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Length of a `0x`-prefixed, 20-byte hex address.
pub const ADDRESS_LENGTH: usize = 42;

/// Currency label of the live network.
pub const LIVE_CURRENCY: &str = "xDai";

/// Currency label of the demo network.
pub const DEMO_CURRENCY: &str = "xDit";

/// Address of the shared demo account.
pub const DEMO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Private key of the shared demo account. Public knowledge, never funded on
/// the live network.
pub const DEMO_PRIVATE_KEY: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Whether a record runs against the live network or the demo network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMode {
    Live,
    Demo,
}

impl AccountMode {
    pub fn from_demo_flag(demo: bool) -> Self {
        if demo {
            AccountMode::Demo
        } else {
            AccountMode::Live
        }
    }

    pub fn is_demo(self) -> bool {
        self == AccountMode::Demo
    }

    pub fn currency(self) -> &'static str {
        match self {
            AccountMode::Live => LIVE_CURRENCY,
            AccountMode::Demo => DEMO_CURRENCY,
        }
    }
}

/// Root object of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRecord {
    /// Coordinator contract endpoint.
    #[serde(rename = "dit_coordinator")]
    pub coordinator: String,

    /// Voting contract.
    pub knw_voting: String,

    /// Knowledge token contract.
    pub knw_token: String,

    /// Dit token contract.
    pub dit_token: String,

    pub currency: String,

    #[serde(rename = "demo_mode_active")]
    pub demo_mode: bool,

    #[serde(rename = "ethereum_keys")]
    pub keys: KeyMaterial,

    #[serde(deserialize_with = "null_as_default")]
    pub repositories: Vec<RepositoryEntry>,
}

impl ConfigRecord {
    /// A fresh record for `mode` holding `keys`, with no repositories and
    /// empty network identifiers.
    pub fn new(mode: AccountMode, keys: KeyMaterial) -> Self {
        Self {
            currency: mode.currency().to_string(),
            demo_mode: mode.is_demo(),
            keys,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> AccountMode {
        AccountMode::from_demo_flag(self.demo_mode)
    }

    pub fn address(&self) -> &str {
        &self.keys.address
    }

    /// Structural check run after every load.
    pub fn validate(&self) -> Result<()> {
        let len = self.keys.address.len();
        if len != ADDRESS_LENGTH {
            return Err(DitConfigError::ValidationError(format!(
                "Invalid config file: address must be {} characters, got {}",
                ADDRESS_LENGTH, len
            )));
        }
        Ok(())
    }

    pub fn repository(&self, name: &str) -> Option<&RepositoryEntry> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    pub fn repository_mut(&mut self, name: &str) -> Option<&mut RepositoryEntry> {
        self.repositories.iter_mut().find(|repo| repo.name == name)
    }

    /// Append a repository and return it for further editing.
    pub fn add_repository(&mut self, entry: RepositoryEntry) -> &mut RepositoryEntry {
        self.repositories.push(entry);
        let last = self.repositories.len() - 1;
        &mut self.repositories[last]
    }
}

/// The account identity. Only the encrypted form of the private key is held.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMaterial {
    /// Hex of `nonce ‖ ciphertext ‖ tag`.
    #[serde(rename = "private_key")]
    pub encrypted_private_key: String,

    pub address: String,

    /// Key derivation used for `encrypted_private_key`. Absent means the
    /// unsalted SHA-256 derivation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
}

impl KeyMaterial {
    /// Build key material from an encrypted blob and the derivation used for it.
    pub fn new(address: impl Into<String>, encrypted: &[u8], kdf: &Kdf) -> Self {
        Self {
            encrypted_private_key: hex::encode(encrypted),
            address: address.into(),
            kdf: KdfParams::from_kdf(kdf),
        }
    }

    /// Decode the hex-encoded encrypted private key.
    pub fn encrypted_bytes(&self) -> Result<Vec<u8>> {
        Ok(hex::decode(&self.encrypted_private_key)?)
    }

    pub fn kdf(&self) -> Result<Kdf> {
        match &self.kdf {
            None => Ok(Kdf::Sha256),
            Some(params) => params.to_kdf(),
        }
    }
}

/// Serialized form of a [`Kdf`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum KdfParams {
    Sha256,
    Argon2id {
        /// Hex-encoded salt.
        salt: String,
    },
}

impl KdfParams {
    /// `None` for the default SHA-256 derivation, which is stored implicitly.
    pub fn from_kdf(kdf: &Kdf) -> Option<Self> {
        match kdf {
            Kdf::Sha256 => None,
            Kdf::Argon2id { salt } => Some(KdfParams::Argon2id {
                salt: hex::encode(salt),
            }),
        }
    }

    pub fn to_kdf(&self) -> Result<Kdf> {
        match self {
            KdfParams::Sha256 => Ok(Kdf::Sha256),
            KdfParams::Argon2id { salt } => {
                let bytes = hex::decode(salt)?;
                let salt: [u8; SALT_LENGTH] = bytes.try_into().map_err(|v: Vec<u8>| {
                    DitConfigError::ValidationError(format!(
                        "KDF salt must be {} bytes, got {}",
                        SALT_LENGTH,
                        v.len()
                    ))
                })?;
                Ok(Kdf::Argon2id { salt })
            }
        }
    }
}

/// A tracked repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryEntry {
    pub name: String,

    pub provider: String,

    #[serde(deserialize_with = "null_as_default")]
    pub knowledge_labels: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub active_votes: Vec<ActiveVote>,
}

impl RepositoryEntry {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            ..Self::default()
        }
    }

    /// Add a knowledge label, keeping labels unique and in insertion order.
    pub fn add_knowledge_label(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.knowledge_labels.contains(&label) {
            return false;
        }
        self.knowledge_labels.push(label);
        true
    }

    pub fn vote(&self, id: i64) -> Option<&ActiveVote> {
        self.active_votes.iter().find(|vote| vote.id == id)
    }

    pub fn vote_mut(&mut self, id: i64) -> Option<&mut ActiveVote> {
        self.active_votes.iter_mut().find(|vote| vote.id == id)
    }

    /// Votes that have not been resolved yet.
    pub fn pending_votes(&self) -> impl Iterator<Item = &ActiveVote> {
        self.active_votes.iter().filter(|vote| !vote.resolved)
    }
}

/// An in-flight commit-reveal vote on a knowledge label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveVote {
    pub id: i64,

    pub knw_vote_id: i64,

    pub knowledge_label: String,

    pub choice: i64,

    pub salt: i64,

    pub num_tokens: i64,

    pub num_votes: i64,

    pub num_knw: i64,

    /// End of the commit phase (Unix seconds).
    pub commit_end: i64,

    /// End of the reveal phase (Unix seconds).
    pub reveal_end: i64,

    pub resolved: bool,

    /// Simulated choices, demo mode only.
    #[serde(deserialize_with = "null_as_default")]
    pub demo_choices: Vec<i64>,

    /// Simulated salts, demo mode only.
    #[serde(deserialize_with = "null_as_default")]
    pub demo_salts: Vec<i64>,
}

// Older writers emit `null` for empty lists.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keys() -> KeyMaterial {
        KeyMaterial {
            encrypted_private_key: "00ff".to_string(),
            address: DEMO_ADDRESS.to_string(),
            kdf: None,
        }
    }

    #[test]
    fn test_account_mode_currency() {
        assert_eq!(AccountMode::Live.currency(), "xDai");
        assert_eq!(AccountMode::Demo.currency(), "xDit");
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = ConfigRecord::new(AccountMode::Demo, sample_keys());

        assert!(record.demo_mode);
        assert_eq!(record.currency, DEMO_CURRENCY);
        assert_eq!(record.mode(), AccountMode::Demo);
        assert!(record.repositories.is_empty());
        assert!(record.coordinator.is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_address() {
        let mut record = ConfigRecord::new(AccountMode::Live, sample_keys());
        record.keys.address = "0x1234".to_string();

        match record.validate() {
            Err(DitConfigError::ValidationError(msg)) => assert!(msg.contains("42")),
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let record = ConfigRecord::new(AccountMode::Live, sample_keys());
        let value = serde_json::to_value(&record).unwrap();

        for field in [
            "dit_coordinator",
            "knw_voting",
            "knw_token",
            "dit_token",
            "currency",
            "demo_mode_active",
            "ethereum_keys",
            "repositories",
        ] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["ethereum_keys"]["private_key"], "00ff");
        assert_eq!(value["ethereum_keys"]["address"], DEMO_ADDRESS);
        assert!(value["ethereum_keys"].get("kdf").is_none());
    }

    #[test]
    fn test_null_lists_load_as_empty() {
        let json = r#"{
            "dit_coordinator": "0xabc",
            "knw_voting": "",
            "knw_token": "",
            "dit_token": "",
            "currency": "xDai",
            "demo_mode_active": false,
            "ethereum_keys": {"private_key": "00", "address": "0x0000000000000000000000000000000000000000"},
            "repositories": [{
                "name": "github.com/ditcraft/demo",
                "provider": "github",
                "knowledge_labels": null,
                "active_votes": [{
                    "id": 1, "knw_vote_id": 7, "knowledge_label": "Rust",
                    "choice": 1, "salt": 42, "num_tokens": 10, "num_votes": 1,
                    "num_knw": 3, "commit_end": 1700000000, "reveal_end": 1700000600,
                    "resolved": false, "demo_choices": null, "demo_salts": null
                }]
            }]
        }"#;

        let record: ConfigRecord = serde_json::from_str(json).unwrap();
        let repo = record.repository("github.com/ditcraft/demo").unwrap();

        assert!(repo.knowledge_labels.is_empty());
        assert_eq!(repo.active_votes.len(), 1);
        assert!(repo.active_votes[0].demo_choices.is_empty());
        assert_eq!(repo.vote(1).unwrap().knw_vote_id, 7);
    }

    #[test]
    fn test_null_repositories_load_as_empty() {
        let json = r#"{"ethereum_keys": {"private_key": "", "address": ""}, "repositories": null}"#;
        let record: ConfigRecord = serde_json::from_str(json).unwrap();
        assert!(record.repositories.is_empty());
    }

    #[test]
    fn test_kdf_params_roundtrip() {
        let kdf = Kdf::Argon2id { salt: [7u8; 32] };
        let keys = KeyMaterial::new(DEMO_ADDRESS, &[1, 2, 3], &kdf);

        let json = serde_json::to_string(&keys).unwrap();
        assert!(json.contains(r#""algorithm":"argon2id""#));

        let parsed: KeyMaterial = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kdf().unwrap(), kdf);
        assert_eq!(parsed.encrypted_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_kdf_defaults_to_sha256() {
        assert_eq!(sample_keys().kdf().unwrap(), Kdf::Sha256);
    }

    #[test]
    fn test_kdf_short_salt_rejected() {
        let keys = KeyMaterial {
            kdf: Some(KdfParams::Argon2id {
                salt: "abcd".to_string(),
            }),
            ..sample_keys()
        };
        assert!(matches!(
            keys.kdf(),
            Err(DitConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_encrypted_bytes_bad_hex() {
        let keys = KeyMaterial {
            encrypted_private_key: "not hex".to_string(),
            ..sample_keys()
        };
        assert!(matches!(
            keys.encrypted_bytes(),
            Err(DitConfigError::DecodeError(_))
        ));
    }

    #[test]
    fn test_repository_helpers() {
        let mut record = ConfigRecord::new(AccountMode::Live, sample_keys());
        let repo = record.add_repository(RepositoryEntry::new("ditcraft/client", "github"));

        assert!(repo.add_knowledge_label("Go"));
        assert!(repo.add_knowledge_label("Rust"));
        assert!(!repo.add_knowledge_label("Go"));

        repo.active_votes.push(ActiveVote {
            id: 1,
            ..ActiveVote::default()
        });
        repo.active_votes.push(ActiveVote {
            id: 2,
            resolved: true,
            ..ActiveVote::default()
        });

        let repo = record.repository_mut("ditcraft/client").unwrap();
        repo.vote_mut(1).unwrap().choice = 1;

        let repo = record.repository("ditcraft/client").unwrap();
        assert_eq!(repo.knowledge_labels, vec!["Go", "Rust"]);
        assert_eq!(repo.vote(1).unwrap().choice, 1);
        assert_eq!(repo.pending_votes().count(), 1);
        assert!(record.repository("missing").is_none());
    }
}
