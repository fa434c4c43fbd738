// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! Multi-part encrypt and decrypt operations.
//!
//! An [OpContext] is created by `init`, advanced by any number of
//! `update` calls and ended by `finalize`, or driven in a single call
//! with `oneshot`. The backend is chosen once, at init: key objects
//! with a TPM public blob are handled by the token TPM backend, public
//! only objects by the software RSA code.
//!
//! Contexts can be owned by a caller directly or bound to a
//! [Session](crate::session::Session) slot; the termination rules are
//! the same either way.

use std::fmt;

use crate::error::{Error, Result};
use crate::mechanism::Mechanism;
use crate::object::KeyObject;
use crate::pkcs11::*;
use crate::rsa::RsaSoftwareOp;
use crate::token::{ObjectUse, Token};
use crate::tpm::TpmOpData;

/// The kind of operation a context performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Encrypt,
    Decrypt,
}

impl OpKind {
    /// The key usage attribute that must allow this operation
    pub fn usage(&self) -> CK_ATTRIBUTE_TYPE {
        match self {
            OpKind::Encrypt => CKA_ENCRYPT,
            OpKind::Decrypt => CKA_DECRYPT,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OpKind::Encrypt => write!(f, "encrypt"),
            OpKind::Decrypt => write!(f, "decrypt"),
        }
    }
}

#[derive(Debug)]
enum Backend {
    Software(RsaSoftwareOp),
    Tpm(Box<dyn TpmOpData>),
}

impl Backend {
    fn setup(
        token: &Token,
        mech: &Mechanism,
        key: &KeyObject,
    ) -> Result<Backend> {
        if key.tpm_pub_blob().is_some() {
            log::debug!("Using TPM backend");
            let tpm = token.get_tpm()?;
            return Ok(Backend::Tpm(tpm.new_opdata(mech, key)?));
        }
        let conf = &token.get_config().software;
        if !conf.enabled {
            log::error!("Software operations are disabled by configuration");
            return Err(CKR_KEY_FUNCTION_NOT_PERMITTED)?;
        }
        let op = RsaSoftwareOp::new(mech, key, conf)?;
        log::debug!(
            "Using software backend: mechanism {}, {} byte blocks",
            op.mechanism(),
            op.output_len()
        );
        Ok(Backend::Software(op))
    }
}

#[derive(Debug)]
struct ActiveOp {
    /* field order is drop order: backend state goes before the key
     * reference */
    backend: Backend,
    always_auth: bool,
    key: ObjectUse,
}

/// The state of one in-flight encrypt or decrypt operation
#[derive(Debug)]
pub struct OpContext {
    kind: OpKind,
    class: CK_OBJECT_CLASS,
    active: Option<ActiveOp>,
}

impl OpContext {
    /// Starts an operation of `kind` with key `handle` on `token`.
    ///
    /// The key object use count is held until the operation terminates;
    /// on any failure here it has already been given back.
    pub fn new(
        token: &Token,
        kind: OpKind,
        mech: &Mechanism,
        handle: CK_OBJECT_HANDLE,
    ) -> Result<OpContext> {
        log::trace!(
            "{} init: mechanism {} key {}",
            kind,
            mech.mechtype(),
            handle
        );
        let key = token.load_object(handle)?;
        let (class, always_auth, backend) = {
            let obj = key.object()?;
            token.mech_is_supported(&obj, mech, kind.usage())?;
            let backend = Backend::setup(token, mech, &obj)?;
            (obj.get_class(), obj.always_auth(), backend)
        };
        Ok(OpContext {
            kind: kind,
            class: class,
            active: Some(ActiveOp {
                backend: backend,
                always_auth: always_auth,
                key: key,
            }),
        })
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    /// Whether the operation has terminated, a finished context only
    /// returns CKR_OPERATION_NOT_INITIALIZED
    pub fn is_finished(&self) -> bool {
        self.active.is_none()
    }

    pub fn is_hardware(&self) -> bool {
        match self.active {
            Some(ActiveOp {
                backend: Backend::Tpm(_),
                ..
            }) => true,
            _ => false,
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveOp> {
        match self.active {
            Some(ref mut a) => Ok(a),
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    /// Checks the key can still be used: keys that always require
    /// authentication need a context specific login first
    pub fn check_authenticated(&self) -> Result<()> {
        match self.active {
            Some(ref a) => {
                if a.always_auth && !a.key.is_authenticated() {
                    Err(CKR_USER_NOT_LOGGED_IN)?
                } else {
                    Ok(())
                }
            }
            None => Err(CKR_OPERATION_NOT_INITIALIZED)?,
        }
    }

    pub fn set_authenticated(&mut self) -> Result<()> {
        self.active_mut()?.key.set_authenticated(true);
        Ok(())
    }

    /// Processes one part of the data.
    ///
    /// Never terminates the operation, even on failure.
    pub fn update(
        &mut self,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        let kind = self.kind;
        let class = self.class;
        let active = self.active_mut()?;
        match (&mut active.backend, kind) {
            (Backend::Software(op), OpKind::Encrypt) => {
                op.encrypt(input, output)
            }
            (Backend::Software(op), OpKind::Decrypt) => {
                op.decrypt(input, output)
            }
            (Backend::Tpm(op), OpKind::Encrypt) => {
                op.encrypt(class, input, output)
            }
            (Backend::Tpm(op), OpKind::Decrypt) => {
                op.decrypt(class, input, output)
            }
        }
    }

    /* runs the backend final stage, never terminates */
    fn final_stage(&mut self, output: Option<&mut [u8]>) -> Result<usize> {
        let kind = self.kind;
        match &mut self.active_mut()?.backend {
            Backend::Tpm(op) => match kind {
                OpKind::Encrypt => op.final_encrypt(output),
                OpKind::Decrypt => op.final_decrypt(output),
            },
            /* nothing is ever buffered in software */
            Backend::Software(_) => Ok(0),
        }
    }

    /// Brings TPM state back to how it was at init, so a one-shot call
    /// can be repeated from the start
    fn reset_backend(&mut self) {
        if let Some(ActiveOp {
            backend: Backend::Tpm(ref mut op),
            ..
        }) = self.active
        {
            op.reset();
        }
    }

    /// Emits whatever output remains and ends the operation.
    ///
    /// The operation stays alive when the output buffer is too small,
    /// and when this is the length query issued by a one-shot call.
    pub fn finalize(
        &mut self,
        output: Option<&mut [u8]>,
        oneshot: bool,
    ) -> Result<usize> {
        let query = output.is_none();
        let ret = self.final_stage(output);

        let keep = match ret {
            Err(ref e) => e.is_buf_too_small(),
            Ok(_) => oneshot && query,
        };
        if keep {
            if oneshot {
                self.reset_backend();
            }
            return ret;
        }

        let released = self.terminate();
        match ret {
            Ok(len) => {
                released?;
                Ok(len)
            }
            Err(e) => Err(e),
        }
    }

    /// Processes all the data in one call: an update with the whole
    /// output buffer followed by a final with what is left of it.
    ///
    /// When the update stage needs a larger buffer the final stage is only
    /// queried for its length, and the sum of both is reported.
    pub fn oneshot(
        &mut self,
        input: &[u8],
        mut output: Option<&mut [u8]>,
    ) -> Result<usize> {
        let upd = self.update(input, output.as_deref_mut());
        let (update_len, short) = match upd {
            Ok(len) => (len, false),
            Err(e) => match e.required_len() {
                Some(len) => (len, true),
                None => {
                    self.abort();
                    return Err(e);
                }
            },
        };

        let remaining = match output {
            Some(out) if !short => match out.get_mut(update_len..) {
                Some(r) => Some(r),
                None => {
                    self.abort();
                    return Err(CKR_GENERAL_ERROR)?;
                }
            },
            _ => None,
        };

        /* sizing only: the operation stays alive and a final stage that
         * fails here counts as 0 */
        if short {
            let final_len = match self.final_stage(None) {
                Ok(len) => len,
                Err(e) => e.required_len().unwrap_or(0),
            };
            self.reset_backend();
            return Err(Error::buf_too_small(update_len + final_len));
        }
        let ret = self.finalize(remaining, true);
        match ret {
            Ok(len) => Ok(update_len + len),
            Err(e) => match e.required_len() {
                Some(len) => Err(Error::buf_too_small(update_len + len)),
                None => Err(e),
            },
        }
    }

    /// Tears the operation down: backend state is freed, then the key is
    /// marked unauthenticated and its use count released, exactly once
    fn terminate(&mut self) -> Result<()> {
        let active = match self.active.take() {
            Some(a) => a,
            None => return Ok(()),
        };
        log::trace!("{} operation terminated", self.kind);
        let ActiveOp { backend, key, .. } = active;
        drop(backend);
        key.set_authenticated(false);
        key.release()
    }

    /// Abandons the operation, whatever state it is in
    pub fn abort(&mut self) {
        if let Err(e) = self.terminate() {
            log::error!("Failed to release key on {} abort: {}", self.kind, e);
        }
    }
}

impl Drop for OpContext {
    fn drop(&mut self) {
        self.abort();
    }
}
