use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Malformed credential record: {0}")]
    MalformedRecord(String),

    #[error("Salt length {0} is not a supported AES key size (16 or 32)")]
    BadSaltLength(usize),
}
