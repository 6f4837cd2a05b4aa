mod checksum;
mod ed25519;
mod signature;

pub use checksum::sha256_hex;
pub use ed25519::TrustedKey;
pub use signature::{
    is_executable_path, signature_sidecar_path, Ed25519SidecarVerifier, SignatureStatus,
    SignatureVerifier,
};
