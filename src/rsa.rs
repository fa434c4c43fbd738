// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! Software RSA for key objects that only carry public key material.
//!
//! Only the public exponent is ever available here, so "encrypt" is a
//! PKCS#1 v1.5 (block type 2) public encryption and "decrypt" is the
//! recovery of a PKCS#1 v1.5 (block type 1) block produced with the
//! matching private key.

use crate::config::SoftwareConfig;
use crate::error::{Error, Result};
use crate::mechanism::Mechanism;
use crate::object::KeyObject;
use crate::pkcs11::*;

use openssl::bn::BigNum;
use openssl::pkey::Public;
use openssl::rsa::{Padding, Rsa};
use zeroize::Zeroizing;

/* 0x00 || BT || PS (at least 8 bytes) || 0x00 */
const PKCS1_PAD_OVERHEAD: usize = 11;

fn bn_from_attr(key: &KeyObject, attr: CK_ATTRIBUTE_TYPE) -> Result<BigNum> {
    let bytes = match key.get_attr_as_bytes(attr) {
        Ok(b) => b,
        Err(e) => {
            log::error!("Key object has no usable attribute {}: {}", attr, e);
            return Err(CKR_GENERAL_ERROR)?;
        }
    };
    match BigNum::from_slice(bytes) {
        Ok(bn) => Ok(bn),
        Err(e) => {
            log::error!("Failed to import attribute {}: {}", attr, e);
            Err(CKR_GENERAL_ERROR)?
        }
    }
}

/// Builds the OpenSSL public key from CKA_MODULUS and CKA_PUBLIC_EXPONENT
fn rsa_from_object(key: &KeyObject) -> Result<Rsa<Public>> {
    let n = bn_from_attr(key, CKA_MODULUS)?;
    let e = bn_from_attr(key, CKA_PUBLIC_EXPONENT)?;
    if n.num_bits() == 0 || e.num_bits() < 2 {
        log::error!("Invalid RSA public key");
        return Err(CKR_GENERAL_ERROR)?;
    }
    match Rsa::from_public_components(n, e) {
        Ok(rsa) => Ok(rsa),
        Err(e) => {
            log::error!("Failed to build RSA public key: {}", e);
            Err(CKR_GENERAL_ERROR)?
        }
    }
}

/// State of a software operation, fixed at init
#[derive(Debug)]
pub struct RsaSoftwareOp {
    mech: CK_MECHANISM_TYPE,
    rsa: Rsa<Public>,
    size: usize,
}

impl RsaSoftwareOp {
    pub fn new(
        mech: &Mechanism,
        key: &KeyObject,
        conf: &SoftwareConfig,
    ) -> Result<RsaSoftwareOp> {
        if mech.mechtype() != CKM_RSA_PKCS {
            log::error!(
                "Mechanism {} not supported for software operations",
                mech.mechtype()
            );
            return Err(CKR_MECHANISM_INVALID)?;
        }
        let rsa = rsa_from_object(key)?;
        let bits = usize::try_from(rsa.n().num_bits())?;
        if bits < conf.min_rsa_bits || bits > conf.max_rsa_bits {
            log::error!(
                "RSA key of {} bits outside of allowed range [{}, {}]",
                bits,
                conf.min_rsa_bits,
                conf.max_rsa_bits
            );
            return Err(CKR_KEY_SIZE_RANGE)?;
        }
        let size = usize::try_from(rsa.size())?;
        Ok(RsaSoftwareOp {
            mech: mech.mechtype(),
            rsa: rsa,
            size: size,
        })
    }

    pub fn mechanism(&self) -> CK_MECHANISM_TYPE {
        self.mech
    }

    pub fn output_len(&self) -> usize {
        self.size
    }

    /// PKCS#1 v1.5 public encryption of `plain`.
    ///
    /// The output must hold a full modulus sized block.
    pub fn encrypt(
        &self,
        plain: &[u8],
        cipher: Option<&mut [u8]>,
    ) -> Result<usize> {
        let cipher = match cipher {
            Some(c) if c.len() >= self.size => c,
            _ => return Err(Error::buf_too_small(self.size)),
        };
        if plain.len() > self.size.saturating_sub(PKCS1_PAD_OVERHEAD) {
            log::error!("Data too large for the RSA modulus");
            return Err(CKR_GENERAL_ERROR)?;
        }
        match self.rsa.public_encrypt(plain, cipher, Padding::PKCS1) {
            Ok(len) => Ok(len),
            Err(e) => {
                log::error!("Could not perform RSA public encrypt: {}", e);
                Err(CKR_GENERAL_ERROR)?
            }
        }
    }

    /// Recovers the data of a block produced with the private key.
    ///
    /// Every failure, including bad padding, is reported the same way.
    pub fn decrypt(
        &self,
        cipher: &[u8],
        plain: Option<&mut [u8]>,
    ) -> Result<usize> {
        if cipher.is_empty() || cipher.len() > self.size {
            log::error!("Could not perform RSA public decrypt");
            return Err(CKR_GENERAL_ERROR)?;
        }
        let mut tmp = Zeroizing::new(vec![0u8; self.size]);
        let ret =
            self.rsa
                .public_decrypt(cipher, tmp.as_mut_slice(), Padding::PKCS1);
        let datalen = match ret {
            Ok(len) => len,
            Err(e) => {
                log::error!("Could not perform RSA public decrypt: {}", e);
                return Err(CKR_GENERAL_ERROR)?;
            }
        };
        match plain {
            Some(p) if p.len() >= datalen => {
                p[..datalen].copy_from_slice(&tmp[..datalen]);
                Ok(datalen)
            }
            _ => Err(Error::buf_too_small(datalen)),
        }
    }
}
