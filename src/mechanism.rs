// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

use crate::error::Result;
use crate::pkcs11::*;

/// An owned copy of a `CK_MECHANISM`: the mechanism type and its
/// optional parameter bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mechanism {
    mechtype: CK_MECHANISM_TYPE,
    params: Option<Vec<u8>>,
}

impl Mechanism {
    pub fn new(mechtype: CK_MECHANISM_TYPE) -> Mechanism {
        Mechanism {
            mechtype: mechtype,
            params: None,
        }
    }

    pub fn with_params(mechtype: CK_MECHANISM_TYPE, params: Vec<u8>) -> Mechanism {
        Mechanism {
            mechtype: mechtype,
            params: Some(params),
        }
    }

    /// Copies a mechanism received from a PKCS#11 caller
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a valid `CK_MECHANISM` whose
    /// `pParameter` is null or points to `ulParameterLen` readable bytes.
    pub unsafe fn from_ptr(ptr: *const CK_MECHANISM) -> Result<Mechanism> {
        if ptr.is_null() {
            return Err(CKR_ARGUMENTS_BAD)?;
        }
        let ck_mech = unsafe { &*ptr };
        let len = usize::try_from(ck_mech.ulParameterLen)?;
        let params = if ck_mech.pParameter.is_null() {
            if len != 0 {
                return Err(CKR_MECHANISM_PARAM_INVALID)?;
            }
            None
        } else {
            let p = ck_mech.pParameter as *const u8;
            Some(unsafe { std::slice::from_raw_parts(p, len) }.to_vec())
        };
        Ok(Mechanism {
            mechtype: ck_mech.mechanism,
            params: params,
        })
    }

    pub fn mechtype(&self) -> CK_MECHANISM_TYPE {
        self.mechtype
    }

    pub fn params(&self) -> Option<&[u8]> {
        self.params.as_deref()
    }
}
