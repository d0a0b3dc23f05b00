// src/keychain.rs
//!
//! Secret storage on top of the `keyring` crate.
//!
//! On systems without a usable OS keychain (for example headless Linux
//! with no secret-service daemon) a process-local in-memory store is
//! installed instead, so the client stays usable; secrets stored that way
//! do not survive the process.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, Once,
};

use keyring::credential::{Credential, CredentialApi, CredentialBuilderApi, CredentialPersistence};
use keyring::Error as KeyringError;

/// Service name for every keychain entry written by this client.
pub const KEYCHAIN_SERVICE_NAME: &str = "askdoc";

static PROBED: Once = Once::new();
static IN_MEMORY: AtomicBool = AtomicBool::new(false);

type SecretMap = Arc<Mutex<HashMap<(String, String), Vec<u8>>>>;

/// Make sure a keyring backend is usable, installing the in-memory
/// fallback when the OS keychain is absent or broken.
pub fn ensure_available() {
    if using_in_memory_fallback() {
        return;
    }
    if env_forces_in_memory() {
        install_in_memory();
        return;
    }
    PROBED.call_once(|| {
        if let Err(err) = probe() {
            tracing::warn!(
                error = %err,
                "system keychain unavailable; secrets will not persist between runs"
            );
            install_in_memory();
        }
    });
}

/// Switch to the in-memory store unconditionally. Used by tests.
pub fn force_in_memory_keyring() {
    install_in_memory();
}

pub fn using_in_memory_fallback() -> bool {
    IN_MEMORY.load(Ordering::SeqCst)
}

pub fn store_secret(id: &str, secret: &str) -> keyring::Result<()> {
    ensure_available();
    keyring::Entry::new(KEYCHAIN_SERVICE_NAME, id)?.set_password(secret)
}

pub fn load_secret(id: &str) -> keyring::Result<String> {
    ensure_available();
    keyring::Entry::new(KEYCHAIN_SERVICE_NAME, id)?.get_password()
}

pub fn delete_secret(id: &str) -> keyring::Result<()> {
    ensure_available();
    keyring::Entry::new(KEYCHAIN_SERVICE_NAME, id)?.delete_credential()
}

pub fn has_secret(id: &str) -> bool {
    load_secret(id).is_ok()
}

fn env_forces_in_memory() -> bool {
    std::env::var("ASKDOC_USE_IN_MEMORY_KEYCHAIN")
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(false)
}

fn probe() -> keyring::Result<()> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE_NAME, "__askdoc_probe__")?;
    entry.set_password("__probe__")?;
    let read_back = entry.get_password()?;
    if read_back != "__probe__" {
        return Err(KeyringError::BadEncoding(read_back.into_bytes()));
    }
    match entry.delete_credential() {
        Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
        Err(err) => Err(err),
    }
}

fn install_in_memory() {
    if !IN_MEMORY.swap(true, Ordering::SeqCst) {
        keyring::set_default_credential_builder(Box::new(MemoryBuilder::default()));
    }
}

#[derive(Default)]
struct MemoryBuilder {
    secrets: SecretMap,
}

struct MemoryCredential {
    key: (String, String),
    secrets: SecretMap,
}

impl CredentialBuilderApi for MemoryBuilder {
    fn build(
        &self,
        _target: Option<&str>,
        service: &str,
        user: &str,
    ) -> keyring::Result<Box<Credential>> {
        Ok(Box::new(MemoryCredential {
            key: (service.to_string(), user.to_string()),
            secrets: Arc::clone(&self.secrets),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn persistence(&self) -> CredentialPersistence {
        CredentialPersistence::ProcessOnly
    }
}

impl MemoryCredential {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), Vec<u8>>> {
        self.secrets.lock().expect("in-memory secret store poisoned")
    }
}

impl CredentialApi for MemoryCredential {
    fn set_secret(&self, secret: &[u8]) -> keyring::Result<()> {
        self.lock().insert(self.key.clone(), secret.to_vec());
        Ok(())
    }

    fn get_secret(&self) -> keyring::Result<Vec<u8>> {
        self.lock()
            .get(&self.key)
            .cloned()
            .ok_or(KeyringError::NoEntry)
    }

    fn delete_credential(&self) -> keyring::Result<()> {
        match self.lock().remove(&self.key) {
            Some(_) => Ok(()),
            None => Err(KeyringError::NoEntry),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
