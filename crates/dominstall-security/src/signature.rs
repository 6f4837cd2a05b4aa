use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::ed25519::TrustedKey;

const SIGNATURE_SIDECAR_EXTENSION: &str = ".sig";
const EXECUTABLE_EXTENSIONS: [&str; 4] = ["dll", "exe", "so", "dylib"];

/// Outcome of checking one payload file. Reported or used as a gate, never
/// fed back into install state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    Trusted { signer: String },
    Unsigned,
    Error(String),
}

impl SignatureStatus {
    /// Numeric status used in report lines: 0 trusted, 1 unsigned, 2 error.
    pub fn code(&self) -> u8 {
        match self {
            Self::Trusted { .. } => 0,
            Self::Unsigned => 1,
            Self::Error(_) => 2,
        }
    }
}

pub trait SignatureVerifier {
    fn verify(&self, path: &Path) -> SignatureStatus;
}

/// Checks `<file>.sig` (hex Ed25519 signature over the whole file) against a
/// configured key. No sidecar means unsigned.
#[derive(Debug, Clone, Default)]
pub struct Ed25519SidecarVerifier {
    trusted_key: Option<TrustedKey>,
}

impl Ed25519SidecarVerifier {
    pub fn new(trusted_key: Option<TrustedKey>) -> Self {
        Self { trusted_key }
    }
}

impl SignatureVerifier for Ed25519SidecarVerifier {
    fn verify(&self, path: &Path) -> SignatureStatus {
        let payload = match fs::read(path) {
            Ok(payload) => payload,
            Err(err) => return SignatureStatus::Error(format!("cannot open file: {err}")),
        };

        let sidecar = signature_sidecar_path(path);
        let signature_hex = match fs::read_to_string(&sidecar) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return SignatureStatus::Unsigned,
            Err(err) => {
                return SignatureStatus::Error(format!(
                    "cannot read signature {}: {err}",
                    sidecar.display()
                ))
            }
        };

        let Some(trusted_key) = &self.trusted_key else {
            return SignatureStatus::Error("no trusted signing key configured".to_string());
        };

        match trusted_key.verify_hex(&payload, &signature_hex) {
            Ok(true) => SignatureStatus::Trusted {
                signer: trusted_key.fingerprint().to_string(),
            },
            Ok(false) => {
                SignatureStatus::Error("the signature is present, but not trusted".to_string())
            }
            Err(err) => SignatureStatus::Error(format!("{err:#}")),
        }
    }
}

pub fn signature_sidecar_path(path: &Path) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(SIGNATURE_SIDECAR_EXTENSION);
    PathBuf::from(raw)
}

/// Binary payload files whose signature is worth reporting.
pub fn is_executable_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            EXECUTABLE_EXTENSIONS
                .iter()
                .any(|candidate| extension.eq_ignore_ascii_case(candidate))
        })
}
