// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

use cryptoki_sys::*;

pub const TPM2_VENDOR_OFFSET: CK_ULONG = 0x0F000000;

/* Attributes */
pub const CKA_TPM2_PUB_BLOB: CK_ATTRIBUTE_TYPE =
    CKA_VENDOR_DEFINED | TPM2_VENDOR_OFFSET | 2;
pub const CKA_TPM2_PRIV_BLOB: CK_ATTRIBUTE_TYPE =
    CKA_VENDOR_DEFINED | TPM2_VENDOR_OFFSET | 3;

/* Errors */
pub const CKR_TPM2_CONFIG_ERROR: CK_RV = CKR_VENDOR_DEFINED + 1;
