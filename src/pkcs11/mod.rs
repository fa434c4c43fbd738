// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! PKCS#11 types and constants, plus the vendor values this module
//! defines on top of the standard ones.

pub use cryptoki_sys::*;

pub mod vendor;

pub use vendor::*;
