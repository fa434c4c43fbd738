// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! The contract a TPM backend implements to run encryption operations
//! with TPM resident keys.
//!
//! The backend owns all TPM state for an operation: sessions, loaded
//! handles, buffered partial blocks. The operation layer only drives it
//! through [TpmOpData] and never looks inside. Dropping the boxed state
//! frees whatever the backend holds for the operation.

use std::fmt::Debug;

use crate::error::Result;
use crate::mechanism::Mechanism;
use crate::object::KeyObject;
use crate::pkcs11::*;

/// Factory for per-operation TPM state
pub trait TpmBackend: Debug + Send + Sync {
    /// Builds the state for one operation using `key` with `mech`.
    ///
    /// Fails with CKR_MECHANISM_INVALID if the mechanism can't be used
    /// with the key on this TPM.
    fn new_opdata(
        &self,
        mech: &Mechanism,
        key: &KeyObject,
    ) -> Result<Box<dyn TpmOpData>>;
}

/// Per-operation TPM state.
///
/// Every transform follows the output sizing convention: when `output`
/// is `None` or shorter than needed, nothing is written or consumed and
/// an [Error::buf_too_small](crate::error::Error::buf_too_small) with the
/// exact required length is returned. On success the number of bytes
/// written to `output` is returned.
pub trait TpmOpData: Debug + Send {
    fn encrypt(
        &mut self,
        class: CK_OBJECT_CLASS,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize>;

    fn decrypt(
        &mut self,
        class: CK_OBJECT_CLASS,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize>;

    /// Emits any data still buffered by encrypt calls
    fn final_encrypt(&mut self, output: Option<&mut [u8]>) -> Result<usize>;

    /// Emits any data still buffered by decrypt calls
    fn final_decrypt(&mut self, output: Option<&mut [u8]>) -> Result<usize>;

    /// Returns the state to how it was right after creation so the
    /// operation can be driven again from the start
    fn reset(&mut self);
}
