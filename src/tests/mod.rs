// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

pub use std::sync::Arc;

pub use crate::attribute::Attribute;
pub use crate::config::Config;
pub use crate::encryption::{OpContext, OpKind};
pub use crate::mechanism::Mechanism;
pub use crate::object::KeyObject;
pub use crate::pkcs11::*;
pub use crate::session::Session;
pub use crate::token::Token;

macro_rules! ret_or_panic {
    ($ret:expr) => {
        match $ret {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        }
    };
}

pub use sim::*;

pub mod util;
pub use util::*;

/// A token populated with the standard test keys and a simulated TPM
pub struct TestToken {
    pub token: Token,
    pub stats: Arc<SimStats>,
    pub rsa_pub: CK_OBJECT_HANDLE,
    pub rsa_tpm: CK_OBJECT_HANDLE,
    pub block: CK_OBJECT_HANDLE,
    pub faulty: CK_OBJECT_HANDLE,
}

impl TestToken {
    pub fn new() -> TestToken {
        TestToken::with_config(Config::new())
    }

    pub fn with_config(config: Config) -> TestToken {
        let stats = Arc::new(SimStats::default());
        let mut tpm = SimTpm::new(stats.clone());
        tpm.add_rsa_key(
            RSA_BLOB,
            &hex_vec(RSA_MODULUS),
            &RSA_PUBLIC_EXPONENT,
            &hex_vec(RSA_PRIVATE_EXPONENT),
        );
        tpm.add_block_key(BLOCK_BLOB, BLOCK_KEY);
        tpm.add_faulty_key(FAULTY_BLOB, BLOCK_KEY);

        let mut token = Token::with_tpm(config, Box::new(tpm));
        let rsa_pub = token.add_object(rsa_public_key());
        let rsa_tpm = token.add_object(rsa_tpm_key());
        let block = token.add_object(block_tpm_key());
        let faulty = token.add_object(faulty_tpm_key());
        TestToken {
            token: token,
            stats: stats,
            rsa_pub: rsa_pub,
            rsa_tpm: rsa_tpm,
            block: block,
            faulty: faulty,
        }
    }

    pub fn use_count(&self, handle: CK_OBJECT_HANDLE) -> usize {
        ret_or_panic!(self.token.use_count(handle))
    }
}
