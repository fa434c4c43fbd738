// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! The token holds the key objects available to sessions and the TPM
//! backend used for TPM resident objects.
//!
//! Every in-flight operation holds an [ObjectUse] on its key object. The
//! guard bumps the object use count when created and drops it exactly
//! once, either through [ObjectUse::release] or when the guard is dropped
//! on an abnormal exit path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

use crate::attribute::Attribute;
use crate::config::Config;
use crate::error::Result;
use crate::logger;
use crate::mechanism::Mechanism;
use crate::object::KeyObject;
use crate::pkcs11::*;
use crate::tpm::TpmBackend;

#[derive(Debug)]
struct TokenObject {
    handle: CK_OBJECT_HANDLE,
    object: RwLock<KeyObject>,
    users: Mutex<usize>,
    authenticated: AtomicBool,
}

impl TokenObject {
    fn user_increment(&self) -> Result<()> {
        let mut users = match self.users.lock() {
            Ok(u) => u,
            Err(_) => return Err(CKR_GENERAL_ERROR)?,
        };
        *users += 1;
        Ok(())
    }

    fn user_decrement(&self) -> Result<()> {
        let mut users = match self.users.lock() {
            Ok(u) => u,
            Err(_) => return Err(CKR_GENERAL_ERROR)?,
        };
        if *users == 0 {
            log::error!("Use count underflow on object {}", self.handle);
            return Err(CKR_GENERAL_ERROR)?;
        }
        *users -= 1;
        Ok(())
    }
}

/// A counted reference to a key object used by an operation
#[derive(Debug)]
pub struct ObjectUse {
    tobj: Option<Arc<TokenObject>>,
}

impl ObjectUse {
    fn tobj(&self) -> Result<&Arc<TokenObject>> {
        match self.tobj {
            Some(ref t) => Ok(t),
            None => Err(CKR_OBJECT_HANDLE_INVALID)?,
        }
    }

    pub fn handle(&self) -> CK_OBJECT_HANDLE {
        match self.tobj {
            Some(ref t) => t.handle,
            None => CK_INVALID_HANDLE,
        }
    }

    /// Read access to the object attributes
    pub fn object(&self) -> Result<RwLockReadGuard<'_, KeyObject>> {
        match self.tobj()?.object.read() {
            Ok(o) => Ok(o),
            Err(_) => Err(CKR_GENERAL_ERROR)?,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        match self.tobj {
            Some(ref t) => t.authenticated.load(Ordering::SeqCst),
            None => false,
        }
    }

    pub fn set_authenticated(&self, auth: bool) {
        if let Some(ref t) = self.tobj {
            t.authenticated.store(auth, Ordering::SeqCst);
        }
    }

    /// Drops the use count taken when the object was loaded and reports
    /// whether that worked
    pub fn release(mut self) -> Result<()> {
        match self.tobj.take() {
            Some(t) => t.user_decrement(),
            None => Ok(()),
        }
    }
}

impl Drop for ObjectUse {
    fn drop(&mut self) {
        if let Some(t) = self.tobj.take() {
            if let Err(e) = t.user_decrement() {
                log::error!("Failed to release object {}: {}", t.handle, e);
            }
        }
    }
}

#[derive(Debug)]
pub struct Token {
    config: Config,
    objects: HashMap<CK_OBJECT_HANDLE, Arc<TokenObject>>,
    next_handle: CK_OBJECT_HANDLE,
    tpm: Option<Box<dyn TpmBackend>>,
}

impl Token {
    /// A token with no TPM, only public-only objects can be used
    pub fn new(config: Config) -> Token {
        logger::log_init();
        Token {
            config: config,
            objects: HashMap::new(),
            next_handle: 1,
            tpm: None,
        }
    }

    pub fn with_tpm(config: Config, tpm: Box<dyn TpmBackend>) -> Token {
        let mut token = Token::new(config);
        token.tpm = Some(tpm);
        token
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_tpm(&self) -> Result<&dyn TpmBackend> {
        match self.tpm {
            Some(ref t) => Ok(t.as_ref()),
            None => {
                log::error!("Object requires a TPM but none is configured");
                Err(CKR_DEVICE_ERROR)?
            }
        }
    }

    pub fn add_object(&mut self, obj: KeyObject) -> CK_OBJECT_HANDLE {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.objects.insert(
            handle,
            Arc::new(TokenObject {
                handle: handle,
                object: RwLock::new(obj),
                users: Mutex::new(0),
                authenticated: AtomicBool::new(false),
            }),
        );
        handle
    }

    fn get_tobj(&self, handle: CK_OBJECT_HANDLE) -> Result<&Arc<TokenObject>> {
        match self.objects.get(&handle) {
            Some(t) => Ok(t),
            None => Err(CKR_KEY_HANDLE_INVALID)?,
        }
    }

    /// Replaces or adds attributes on a stored object.
    ///
    /// Operations already running on the object are not affected.
    pub fn update_object(
        &self,
        handle: CK_OBJECT_HANDLE,
        attrs: Vec<Attribute>,
    ) -> Result<()> {
        let tobj = self.get_tobj(handle)?;
        let mut obj = match tobj.object.write() {
            Ok(o) => o,
            Err(_) => return Err(CKR_GENERAL_ERROR)?,
        };
        for a in attrs {
            obj.set_attr(a)?;
        }
        Ok(())
    }

    /// Loads an object for use by an operation, the use count is held
    /// until the returned guard is released or dropped
    pub fn load_object(&self, handle: CK_OBJECT_HANDLE) -> Result<ObjectUse> {
        let tobj = self.get_tobj(handle)?;
        tobj.user_increment()?;
        Ok(ObjectUse {
            tobj: Some(tobj.clone()),
        })
    }

    pub fn use_count(&self, handle: CK_OBJECT_HANDLE) -> Result<usize> {
        match self.get_tobj(handle)?.users.lock() {
            Ok(u) => Ok(*u),
            Err(_) => Err(CKR_GENERAL_ERROR)?,
        }
    }

    /// Drops one use of the object without going through its guard
    #[cfg(test)]
    pub(crate) fn release_use(&self, handle: CK_OBJECT_HANDLE) -> Result<()> {
        self.get_tobj(handle)?.user_decrement()
    }

    /// Checks that the key can be used with the mechanism for the
    /// operation identified by the `usage` attribute (CKA_ENCRYPT,
    /// CKA_DECRYPT).
    ///
    /// Verifies that the mechanism is listed in the CKA_ALLOWED_MECHANISMS
    /// attribute if such attribute is present, otherwise allows everything.
    pub fn mech_is_supported(
        &self,
        key: &KeyObject,
        mech: &Mechanism,
        usage: CK_ATTRIBUTE_TYPE,
    ) -> Result<()> {
        match key.get_attr_as_ulong_array(CKA_ALLOWED_MECHANISMS) {
            Ok(allowed) => {
                if !allowed.contains(&mech.mechtype()) {
                    log::debug!(
                        "Mechanism {} not allowed for this key",
                        mech.mechtype()
                    );
                    return Err(CKR_MECHANISM_INVALID)?;
                }
            }
            Err(e) => {
                if !e.attr_not_found() {
                    return Err(e);
                }
            }
        }
        key.check_key_op(usage)
    }
}
