// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! Session bound operations.
//!
//! A session has one slot per operation kind; encrypt and decrypt are
//! tracked independently. The slot owns the [OpContext] and is cleared
//! as soon as the operation terminates.

use crate::encryption::{OpContext, OpKind};
use crate::error::Result;
use crate::mechanism::Mechanism;
use crate::pkcs11::*;
use crate::token::Token;

#[derive(Debug)]
pub struct Session {
    handle: CK_SESSION_HANDLE,
    encrypt: Option<OpContext>,
    decrypt: Option<OpContext>,
}

impl Session {
    pub fn new(handle: CK_SESSION_HANDLE) -> Session {
        Session {
            handle: handle,
            encrypt: None,
            decrypt: None,
        }
    }

    pub fn get_handle(&self) -> CK_SESSION_HANDLE {
        self.handle
    }

    fn slot(&self, kind: OpKind) -> &Option<OpContext> {
        match kind {
            OpKind::Encrypt => &self.encrypt,
            OpKind::Decrypt => &self.decrypt,
        }
    }

    fn slot_mut(&mut self, kind: OpKind) -> &mut Option<OpContext> {
        match kind {
            OpKind::Encrypt => &mut self.encrypt,
            OpKind::Decrypt => &mut self.decrypt,
        }
    }

    pub fn is_active(&self, kind: OpKind) -> bool {
        self.slot(kind).is_some()
    }

    /// Fetches the bound context and checks the key is still usable
    fn get_operation(&mut self, kind: OpKind) -> Result<&mut OpContext> {
        match self.slot_mut(kind) {
            Some(op) => {
                op.check_authenticated()?;
                Ok(op)
            }
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    /// Clears the slot if the last call terminated the operation
    fn reap(&mut self, kind: OpKind) {
        let slot = self.slot_mut(kind);
        if slot.as_ref().is_some_and(|op| op.is_finished()) {
            *slot = None;
        }
    }

    pub fn init(
        &mut self,
        token: &Token,
        kind: OpKind,
        mech: &Mechanism,
        key: CK_OBJECT_HANDLE,
    ) -> Result<()> {
        if self.is_active(kind) {
            log::debug!("Session {}: {} already active", self.handle, kind);
            return Err(CKR_OPERATION_ACTIVE)?;
        }
        let op = OpContext::new(token, kind, mech, key)?;
        *self.slot_mut(kind) = Some(op);
        Ok(())
    }

    pub fn update(
        &mut self,
        kind: OpKind,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        self.get_operation(kind)?.update(input, output)
    }

    pub fn finalize(
        &mut self,
        kind: OpKind,
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        let ret = self.get_operation(kind)?.finalize(output, false);
        self.reap(kind);
        ret
    }

    pub fn oneshot(
        &mut self,
        kind: OpKind,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        let ret = self.get_operation(kind)?.oneshot(input, output);
        self.reap(kind);
        ret
    }

    /// Marks the key of the active operation as authenticated after a
    /// context specific login
    pub fn login_context_specific(&mut self, kind: OpKind) -> Result<()> {
        match self.slot_mut(kind) {
            Some(op) => op.set_authenticated(),
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    /// Checks that the key bound to the active operation may be used
    pub fn tobject_authenticated(&self, kind: OpKind) -> Result<()> {
        match self.slot(kind) {
            Some(op) => op.check_authenticated(),
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    /// Tears down any operation of `kind`; calling it on an empty slot
    /// does nothing
    pub fn abandon(&mut self, kind: OpKind) {
        if let Some(mut op) = self.slot_mut(kind).take() {
            log::debug!("Session {}: abandoning {}", self.handle, kind);
            op.abort();
        }
    }

    pub fn close(&mut self) {
        self.abandon(OpKind::Encrypt);
        self.abandon(OpKind::Decrypt);
    }

    pub fn encrypt_init(
        &mut self,
        token: &Token,
        mech: &Mechanism,
        key: CK_OBJECT_HANDLE,
    ) -> Result<()> {
        self.init(token, OpKind::Encrypt, mech, key)
    }

    pub fn encrypt_update(
        &mut self,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        self.update(OpKind::Encrypt, input, output)
    }

    pub fn encrypt_final(&mut self, output: Option<&mut [u8]>) -> Result<usize> {
        self.finalize(OpKind::Encrypt, output)
    }

    pub fn encrypt(
        &mut self,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        self.oneshot(OpKind::Encrypt, input, output)
    }

    pub fn decrypt_init(
        &mut self,
        token: &Token,
        mech: &Mechanism,
        key: CK_OBJECT_HANDLE,
    ) -> Result<()> {
        self.init(token, OpKind::Decrypt, mech, key)
    }

    pub fn decrypt_update(
        &mut self,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        self.update(OpKind::Decrypt, input, output)
    }

    pub fn decrypt_final(&mut self, output: Option<&mut [u8]>) -> Result<usize> {
        self.finalize(OpKind::Decrypt, output)
    }

    pub fn decrypt(
        &mut self,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        self.oneshot(OpKind::Decrypt, input, output)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
