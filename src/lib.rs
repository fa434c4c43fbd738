// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! This is the tpm2-pkcs11 encryption engine
//!
//! It drives PKCS#11 multi-part encrypt and decrypt operations
//! (init, update, final and the one-shot call) for keys that either live
//! in a TPM, and are handled by a TPM backend, or only carry RSA public
//! key material, and are handled in software.
//!
//! Operations can be bound to a [Session] slot or owned directly by the
//! caller as an [OpContext].

pub mod attribute;
pub mod config;
pub mod encryption;
pub mod error;
pub mod logger;
pub mod mechanism;
pub mod object;
pub mod pkcs11;
pub mod session;
pub mod token;
pub mod tpm;

mod rsa;

pub use encryption::{OpContext, OpKind};
pub use error::{Error, Result};
pub use session::Session;
pub use token::Token;

#[cfg(test)]
mod tests;
