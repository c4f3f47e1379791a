//! Config store: locates, loads, creates and persists the config record.
//!
//! The store owns the single in-memory [`ConfigRecord`] of the process. Field
//! edits made through [`ConfigStore::record_mut`] stay in memory until the next
//! [`ConfigStore::save`]. The plaintext private key is only produced by
//! [`ConfigStore::unlock_private_key`] and is never kept in the record.

use crate::crypto::encryption::{decrypt_private_key, encrypt_private_key};
use crate::crypto::password::Kdf;
use crate::error::{DitConfigError, Result};
use crate::storage::provider::{
    AccountSetup, GeneratedKey, KeypairProvider, PasswordPrompt, PasswordPurpose,
};
use crate::storage::record::{
    AccountMode, ConfigRecord, KeyMaterial, DEMO_ADDRESS, DEMO_PRIVATE_KEY,
};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Default config filename inside the user's home directory.
pub const CONFIG_FILENAME: &str = ".ditconfig";

/// Resolve the per-user config path (`~/.ditconfig`).
pub fn default_config_path() -> Result<PathBuf> {
    let path = dirs::home_dir()
        .map(|home| home.join(CONFIG_FILENAME))
        .ok_or(DitConfigError::ConfigDirError)?;
    debug!(path = %path.display(), "Resolved config path");
    Ok(path)
}

/// Key derivation applied to a newly created record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KdfChoice {
    /// Unsalted SHA-256 of the password.
    #[default]
    Sha256,
    /// Argon2id with a random per-record salt.
    Argon2id,
}

/// Options for [`ConfigStore::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub kdf: KdfChoice,
}

/// Owner of the config record and its file.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    record: ConfigRecord,
}

impl ConfigStore {
    /// Load the record stored at `path`.
    ///
    /// Fails with `NotFoundError` if the file does not exist, which tells the
    /// caller to run setup first.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ditconfig::storage::store::ConfigStore;
    ///
    /// let store = ConfigStore::load("/home/alice/.ditconfig").unwrap();
    /// println!("{}", store.record().address());
    /// ```
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let record = read_record(&path)?;
        Ok(Self { path, record })
    }

    /// Load the record from the default per-user path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path()?)
    }

    /// Check whether a config file exists at `path`.
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Create a fresh record, encrypt its private key and write it to `path`.
    ///
    /// The password is read twice from `prompt`; a mismatch or an empty
    /// password fails with `ValidationError` before anything is written.
    pub fn create(
        path: impl Into<PathBuf>,
        setup: AccountSetup,
        provider: &dyn KeypairProvider,
        prompt: &mut dyn PasswordPrompt,
        options: &CreateOptions,
    ) -> Result<Self> {
        let path = path.into();
        let mode = AccountMode::from_demo_flag(setup.is_demo());

        let account = match &setup {
            AccountSetup::Demo => demo_account(),
            AccountSetup::Generate => provider.generate()?,
            AccountSetup::Import(private_key_hex) => provider.import(private_key_hex)?,
        };

        let password = read_confirmed_password(prompt)?;

        let kdf = match options.kdf {
            KdfChoice::Sha256 => Kdf::Sha256,
            KdfChoice::Argon2id => Kdf::argon2id()?,
        };
        let encrypted = encrypt_private_key(account.private_key_hex.as_bytes(), &password, &kdf)?;

        let record = ConfigRecord::new(mode, KeyMaterial::new(account.address, &encrypted, &kdf));
        record.validate()?;

        let store = Self { path, record };
        store.save()?;

        info!(
            address = %store.record.address(),
            demo = mode.is_demo(),
            "Created config record"
        );
        Ok(store)
    }

    /// [`ConfigStore::create`] at the default per-user path.
    pub fn create_default(
        setup: AccountSetup,
        provider: &dyn KeypairProvider,
        prompt: &mut dyn PasswordPrompt,
        options: &CreateOptions,
    ) -> Result<Self> {
        Self::create(default_config_path()?, setup, provider, prompt, options)
    }

    /// Re-read the file, replacing the in-memory record on success.
    pub fn reload(&mut self) -> Result<()> {
        self.record = read_record(&self.path)?;
        Ok(())
    }

    /// Write the in-memory record to disk.
    pub fn save(&self) -> Result<()> {
        write_record(&self.path, &self.record)?;
        debug!(path = %self.path.display(), "Saved config record");
        Ok(())
    }

    /// Decrypt the stored private key.
    ///
    /// The plaintext goes to the caller only; the record keeps the encrypted
    /// form. A wrong password fails with `AuthenticationError`.
    pub fn unlock_private_key(&self, password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let encrypted = self.record.keys.encrypted_bytes()?;
        let kdf = self.record.keys.kdf()?;
        decrypt_private_key(&encrypted, password, &kdf)
    }

    /// Read one password from `prompt` and unlock the private key with it.
    pub fn unlock_with_prompt(
        &self,
        prompt: &mut dyn PasswordPrompt,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let password = prompt.read_password(PasswordPurpose::Unlock)?;
        self.unlock_private_key(&password)
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut ConfigRecord {
        &mut self.record
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_record(self) -> ConfigRecord {
        self.record
    }
}

/// Read a new password and its confirmation from `prompt`.
pub fn read_confirmed_password(prompt: &mut dyn PasswordPrompt) -> Result<Zeroizing<Vec<u8>>> {
    let password = prompt.read_password(PasswordPurpose::New)?;
    let confirmation = prompt.read_password(PasswordPurpose::Confirm)?;

    if password.as_slice() != confirmation.as_slice() {
        return Err(DitConfigError::ValidationError(
            "Passwords do not match".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(DitConfigError::ValidationError(
            "Password must not be empty".to_string(),
        ));
    }

    Ok(password)
}

fn demo_account() -> GeneratedKey {
    GeneratedKey {
        address: DEMO_ADDRESS.to_string(),
        private_key_hex: Zeroizing::new(DEMO_PRIVATE_KEY.to_string()),
    }
}

fn read_record(path: &Path) -> Result<ConfigRecord> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(DitConfigError::NotFoundError(path.to_path_buf()));
        }
        Err(e) => return Err(DitConfigError::IoError(e)),
    };

    let record: ConfigRecord =
        serde_json::from_slice(&contents).map_err(DitConfigError::ParseError)?;

    if let Err(e) = record.validate() {
        warn!(path = %path.display(), "Config file failed validation");
        return Err(e);
    }

    debug!(path = %path.display(), repositories = record.repositories.len(), "Loaded config record");
    Ok(record)
}

// Temp file + fsync + rename, so a crash never leaves a half-written record.
fn write_record(path: &Path, record: &ConfigRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record).map_err(DitConfigError::SerializeError)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(path);
    match fs::remove_file(&temp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let written = write_private_file(&temp_path, json.as_bytes())
        .and_then(|()| fs::rename(&temp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

fn write_private_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    // Owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| CONFIG_FILENAME.into());
    name.push(".tmp");
    path.with_file_name(name)
}
