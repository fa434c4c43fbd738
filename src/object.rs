// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! Key objects as held by the token.
//!
//! A key object is a class plus a list of typed attributes. Objects that
//! have a TPM resident counterpart carry the TPM public blob in the
//! [CKA_TPM2_PUB_BLOB] vendor attribute; objects without it only have
//! public key material and are handled in software.

use crate::attribute::{AttrType, Attribute};
use crate::error::{Error, Result};
use crate::pkcs11::*;

/// Helper macro that generates methods to retrieve attributes
/// values of a specific type from objects
macro_rules! attr_as_type {
    (make $name:ident; with $r:ty; $atype:ident; via $conv:ident) => {
        #[doc = concat!("Returns the value of the attribute as a `", stringify!($r), "`")]
        pub fn $name(&self, t: CK_ULONG) -> Result<$r> {
            for attr in &self.attributes {
                if attr.get_type() == t {
                    if attr.get_attrtype() != AttrType::$atype {
                        return Err(CKR_ATTRIBUTE_TYPE_INVALID)?;
                    }
                    return attr.$conv();
                }
            }
            Err(Error::not_found(t.to_string()))
        }
    };
}

#[derive(Debug, Clone)]
pub struct KeyObject {
    class: CK_OBJECT_CLASS,
    attributes: Vec<Attribute>,
}

impl Drop for KeyObject {
    fn drop(&mut self) {
        if self.class != CKO_PUBLIC_KEY {
            for a in self.attributes.iter_mut() {
                a.zeroize()
            }
        }
    }
}

impl KeyObject {
    pub fn new(class: CK_OBJECT_CLASS) -> KeyObject {
        KeyObject {
            class: class,
            attributes: vec![Attribute::from_ulong(CKA_CLASS, class)],
        }
    }

    /// Builds an object from a list of attributes, the list must
    /// contain a valid CKA_CLASS
    pub fn from_attributes(attrs: Vec<Attribute>) -> Result<KeyObject> {
        let class = match attrs.iter().find(|a| a.get_type() == CKA_CLASS) {
            Some(a) => a.to_ulong()?,
            None => return Err(CKR_TEMPLATE_INCOMPLETE)?,
        };
        Ok(KeyObject {
            class: class,
            attributes: attrs,
        })
    }

    pub fn get_class(&self) -> CK_OBJECT_CLASS {
        self.class
    }

    /// Adds or replaces an attribute; the class can't be changed
    pub fn set_attr(&mut self, a: Attribute) -> Result<()> {
        if a.get_type() == CKA_CLASS {
            return Err(CKR_ATTRIBUTE_READ_ONLY)?;
        }
        match self
            .attributes
            .iter()
            .position(|r| r.get_type() == a.get_type())
        {
            Some(idx) => self.attributes[idx] = a,
            None => self.attributes.push(a),
        }
        Ok(())
    }

    pub fn del_attr(&mut self, ck_type: CK_ULONG) {
        self.attributes.retain(|a| a.get_type() != ck_type);
    }

    attr_as_type! {make get_attr_as_bool; with bool; BoolType; via to_bool}
    attr_as_type! {make get_attr_as_ulong; with CK_ULONG; NumType; via to_ulong}
    attr_as_type! {make get_attr_as_bytes; with &Vec<u8>; BytesType; via to_bytes}
    attr_as_type! {make get_attr_as_ulong_array; with Vec<CK_ULONG>; UlongArrayType; via to_ulong_array}

    /// Returns the TPM public blob for TPM resident objects
    pub fn tpm_pub_blob(&self) -> Option<&[u8]> {
        match self.get_attr_as_bytes(CKA_TPM2_PUB_BLOB) {
            Ok(blob) if !blob.is_empty() => Some(blob.as_slice()),
            _ => None,
        }
    }

    /// Whether every use of the key requires a context specific login
    pub fn always_auth(&self) -> bool {
        self.get_attr_as_bool(CKA_ALWAYS_AUTHENTICATE)
            .unwrap_or(false)
    }

    /// Checks the key usage flag (CKA_ENCRYPT, CKA_DECRYPT, ...)
    ///
    /// A missing flag does not restrict the key, an explicit false does.
    pub fn check_key_op(&self, op: CK_ATTRIBUTE_TYPE) -> Result<()> {
        match self.get_attr_as_bool(op) {
            Ok(false) => Err(CKR_KEY_FUNCTION_NOT_PERMITTED)?,
            Ok(true) => Ok(()),
            Err(e) => {
                if e.attr_not_found() {
                    Ok(())
                } else {
                    Err(e)
                }
            }
        }
    }
}
