//! Durable storage for the credential and the UI language preference.
//!
//! The two are keyed independently on purpose: logout must destroy the
//! credential but keep the language, so a returning user still gets their
//! UI in the right language before they log back in.
//!
//! Storage sits behind a trait so the store can be built with a real
//! file-backed implementation in production and an in-memory one in tests,
//! without the store knowing the difference.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use nafas_api::Language;

use crate::credential::Credential;

/// Errors from the persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading or writing the backing store failed.
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    /// The stored payload could not be encoded or decoded.
    #[error("storage encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Backend that keeps the credential and language across restarts.
///
/// Methods are synchronous: payloads are tiny, and the store must be able
/// to restore state at startup before any async machinery runs.
pub trait CredentialPersistence: Send + Sync + 'static {
    /// Loads the saved credential, if any.
    fn load_credential(&self) -> Result<Option<Credential>, PersistError>;

    /// Saves (or overwrites) the credential.
    fn save_credential(&self, credential: &Credential) -> Result<(), PersistError>;

    /// Removes the saved credential. Must succeed when nothing is saved.
    fn clear_credential(&self) -> Result<(), PersistError>;

    /// Loads the saved language preference, if any.
    fn load_language(&self) -> Result<Option<Language>, PersistError>;

    /// Saves the language preference. Survives `clear_credential`.
    fn save_language(&self, language: Language) -> Result<(), PersistError>;
}

// ---------------------------------------------------------------------------
// File-backed persistence
// ---------------------------------------------------------------------------

const CREDENTIAL_FILE: &str = "credential.json";
const LANGUAGE_FILE: &str = "language.json";

/// Persistence backed by two JSON files in a directory.
#[derive(Debug)]
pub struct FilePersistence {
    dir: PathBuf,
}

impl FilePersistence {
    /// Opens (creating if needed) the storage directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        file: &str,
    ) -> Result<Option<T>, PersistError> {
        let path = self.dir.join(file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write_json<T: serde::Serialize>(&self, file: &str, value: &T) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(self.dir.join(file), bytes)?;
        Ok(())
    }
}

impl CredentialPersistence for FilePersistence {
    fn load_credential(&self) -> Result<Option<Credential>, PersistError> {
        self.read_json(CREDENTIAL_FILE)
    }

    fn save_credential(&self, credential: &Credential) -> Result<(), PersistError> {
        self.write_json(CREDENTIAL_FILE, credential)
    }

    fn clear_credential(&self) -> Result<(), PersistError> {
        match fs::remove_file(self.dir.join(CREDENTIAL_FILE)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn load_language(&self) -> Result<Option<Language>, PersistError> {
        self.read_json(LANGUAGE_FILE)
    }

    fn save_language(&self, language: Language) -> Result<(), PersistError> {
        self.write_json(LANGUAGE_FILE, &language)
    }
}

// ---------------------------------------------------------------------------
// In-memory persistence (tests, ephemeral sessions)
// ---------------------------------------------------------------------------

/// Persistence that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    credential: Mutex<Option<Credential>>,
    language: Mutex<Option<Language>>,
}

impl CredentialPersistence for MemoryPersistence {
    fn load_credential(&self) -> Result<Option<Credential>, PersistError> {
        Ok(self.credential.lock().expect("poisoned").clone())
    }

    fn save_credential(&self, credential: &Credential) -> Result<(), PersistError> {
        *self.credential.lock().expect("poisoned") = Some(credential.clone());
        Ok(())
    }

    fn clear_credential(&self) -> Result<(), PersistError> {
        *self.credential.lock().expect("poisoned") = None;
        Ok(())
    }

    fn load_language(&self) -> Result<Option<Language>, PersistError> {
        Ok(*self.language.lock().expect("poisoned"))
    }

    fn save_language(&self, language: Language) -> Result<(), PersistError> {
        *self.language.lock().expect("poisoned") = Some(language);
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
