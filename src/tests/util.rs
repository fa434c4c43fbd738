// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

use crate::tests::*;

/* 2048 bit RSA key, e = 65537 */
pub const RSA_MODULUS: &str = concat!(
    "c381c4c9cf25e882c1167730b6c6512ce590c3f2ce03e35007289594933e6474",
    "af75f1c65d393ead227d6084535877d701e9df81904f1ff1e4aff3c11849aaa7",
    "6b32f82173358921e850a231dbcf351d291c894062a308ace0e193381f7d2c19",
    "a0991e3c5fa8e6a244a51eafdd125711db718daff1e52a1a69a5a7dfd17231ac",
    "919b62603f461bc8bd520bb77cd875f21e304a80cab36f7067b0a3e349c65fe9",
    "92b02294a6a484e0a8320a35c6c049d21045af1020d967c521d41e994ea78b4a",
    "7e237c31a1399e4017de78e4ddee8f8851a2f42ba942a73509e556f413bc1c60",
    "9f9dd959fbd0a78c3725c69a891b4aa2f34da5abdaa601094b8e9477a03499cf",
);
pub const RSA_PRIVATE_EXPONENT: &str = concat!(
    "5f1995a6f11ba88149f96a9b089d6949249609aae7299efe03ad6b2d6d7e7111",
    "0d749ad9f9e8e9a3005eea7f13a7ba0b9d43ad53f1e57b4d88074ad3c7c3b5be",
    "6077d79935d879cf43994d7c6146e6b83b9244f54bc5b0679fb03a939745a519",
    "0634d52f5afce6cb5206dbe981e8f4ef9bc61dbcd336bd074212b1993ee18465",
    "6a7b99461d483e21022c24723e82594f6803f0754b001ebc42330c56791d6ba0",
    "49fecc066eb186dbd55359f3a9730f988c6a5a9be3948564189232a418bd2b87",
    "f3c1172e2fc27e480ea1c8b240fc655c4b348034a98804d88760d90679f7f14b",
    "dda2646192931797c6c660f23401d5c6e060db45b0e9a8b089b98a98a3da0cf9",
);
/* "hello" in a PKCS#1 v1.5 signature block, raised to the private exponent */
pub const RSA_SIGNED_HELLO: &str = concat!(
    "b340d6aeb48e177a6440b6ebfe128438a118b0aa4eb46d4f6ab71877a8655fd2",
    "3c9848cec2f2370d8f95f0bf3ac7a0427f7e9ad863c64b373ab32d2aa5b38488",
    "d48b7d251620cf7862bd019b70a6467e49203271288dd3ab9882d5ea07452ae3",
    "b5f94708550b741c9c238dbc71861a722c5e5f498ab99e69c3aa31010fd60121",
    "c3af5b032e1ca59c06cbfa2d120b3f0c4fe0f494641578645ba68c0a9c874243",
    "306779b84e7282a356aaadf727d6116b3db0caf3f5f1c1ed2506631d4e18e19d",
    "ffec52ad07ddc4f87323df634d2a3aceb590e4c2be6b118988c52d78c80582a0",
    "6452f834a486cee13cf094cc173e07cc41219d18215ffe0a002c16449eba742b",
);
/* "hello" in an encryption (type 2) block, raised to the private exponent */
pub const RSA_BAD_PADDING: &str = concat!(
    "4981c1f73a7bb40d55e0f67637f61370873ff1a17f9108e9f0eaac189e6367e5",
    "f309ae1bf37eed1b85005183eb88512a8dc5d5f2e7680fc9e5babfda6e058411",
    "edaca67c62e3768a5453123b31d861a25f9f8fbd188d969e6698f58cb6933bd9",
    "9e6a94de6cad739c986583e60bdd0246778276246bd7be8c3d0aa0b6db510976",
    "6cafd4c45c6306e8bdc98b9bf05ba57c9e366bfb87f51c544b109ea9c4d63081",
    "308da0ad90d0ea4683ec1a5da7ae6eb904c993b59013ffda5d66757962208e5e",
    "0150d76c8827e93688b1933f9bb42ae2547537831531ad30bf3b34f29dee3295",
    "45d6e90aa0e01c83f418743a657e43dec247dd1734ba5e7c13a2409143783fc4",
);

pub const RSA_PUBLIC_EXPONENT: [u8; 3] = [0x01, 0x00, 0x01];

pub const RSA_BLOB: &[u8] = b"sim-rsa-2048";
pub const BLOCK_BLOB: &[u8] = b"sim-block";
pub const FAULTY_BLOB: &[u8] = b"sim-faulty";
pub const BLOCK_IV: [u8; BLOCK_SIZE] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
    0x0c, 0x0d, 0x0e, 0x0f,
];
pub const BLOCK_KEY: [u8; BLOCK_SIZE] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88,
    0x09, 0xcf, 0x4f, 0x3c,
];

pub fn hex_vec(s: &str) -> Vec<u8> {
    ret_or_panic!(hex::decode(s))
}

fn rsa_attrs(key: &mut KeyObject) {
    key.set_attr(Attribute::from_ulong(CKA_KEY_TYPE, CKK_RSA))
        .unwrap();
    key.set_attr(Attribute::from_bytes(CKA_MODULUS, hex_vec(RSA_MODULUS)))
        .unwrap();
    key.set_attr(Attribute::from_bytes(
        CKA_PUBLIC_EXPONENT,
        RSA_PUBLIC_EXPONENT.to_vec(),
    ))
    .unwrap();
}

/// Public only RSA key, handled in software
pub fn rsa_public_key() -> KeyObject {
    let mut key = KeyObject::new(CKO_PUBLIC_KEY);
    rsa_attrs(&mut key);
    key
}

/// The matching private key, resident in the simulated TPM
pub fn rsa_tpm_key() -> KeyObject {
    let mut key = KeyObject::new(CKO_PRIVATE_KEY);
    rsa_attrs(&mut key);
    key.set_attr(Attribute::from_bytes(CKA_TPM2_PUB_BLOB, RSA_BLOB.to_vec()))
        .unwrap();
    key
}

pub fn block_tpm_key() -> KeyObject {
    let mut key = KeyObject::new(CKO_SECRET_KEY);
    key.set_attr(Attribute::from_bytes(
        CKA_TPM2_PUB_BLOB,
        BLOCK_BLOB.to_vec(),
    ))
    .unwrap();
    key
}

/// Block key whose TPM state fails every final call
pub fn faulty_tpm_key() -> KeyObject {
    let mut key = KeyObject::new(CKO_SECRET_KEY);
    key.set_attr(Attribute::from_bytes(
        CKA_TPM2_PUB_BLOB,
        FAULTY_BLOB.to_vec(),
    ))
    .unwrap();
    key
}

pub fn block_mech() -> Mechanism {
    Mechanism::with_params(CKM_AES_CBC_PAD, BLOCK_IV.to_vec())
}
