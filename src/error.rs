// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! Crate wide error type. Every error carries the PKCS#11 return code
//! that is surfaced to the caller, optionally the error that caused it
//! and, for the buffer sizing signal, the output length the caller needs.

use std::error;
use std::fmt;

use crate::pkcs11::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    origin: Option<Box<dyn error::Error>>,
    errmsg: Option<String>,
    ckrv: CK_RV,
    reqlen: usize,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /* A Cryptoki-style error, see ckrv Error field */
    CkError,
    /* The attribute was not found, see errmsg */
    AttributeNotFound,
    /* The output buffer is too small, see reqlen */
    BufferTooSmall,
    /* Other error, see origin */
    Nested,
}

impl Error {
    pub fn ck_rv(ckrv: CK_RV) -> Error {
        Error {
            kind: ErrorKind::CkError,
            origin: None,
            errmsg: None,
            ckrv: ckrv,
            reqlen: 0,
        }
    }

    pub fn ck_rv_from_error<E>(ckrv: CK_RV, error: E) -> Error
    where
        E: Into<Box<dyn error::Error>>,
    {
        Error {
            kind: ErrorKind::CkError,
            origin: Some(error.into()),
            errmsg: None,
            ckrv: ckrv,
            reqlen: 0,
        }
    }

    pub fn ck_rv_with_errmsg(ckrv: CK_RV, errmsg: String) -> Error {
        Error {
            kind: ErrorKind::CkError,
            origin: None,
            errmsg: Some(errmsg),
            ckrv: ckrv,
            reqlen: 0,
        }
    }

    pub fn not_found(errmsg: String) -> Error {
        Error {
            kind: ErrorKind::AttributeNotFound,
            origin: None,
            errmsg: Some(errmsg),
            ckrv: CKR_GENERAL_ERROR,
            reqlen: 0,
        }
    }

    /// The sizing signal of the two-call length negotiation: nothing was
    /// written and `reqlen` bytes are needed to complete the call.
    pub fn buf_too_small(reqlen: usize) -> Error {
        Error {
            kind: ErrorKind::BufferTooSmall,
            origin: None,
            errmsg: None,
            ckrv: CKR_BUFFER_TOO_SMALL,
            reqlen: reqlen,
        }
    }

    pub fn other_error<E>(error: E) -> Error
    where
        E: Into<Box<dyn error::Error>>,
    {
        Error {
            kind: ErrorKind::Nested,
            origin: Some(error.into()),
            errmsg: None,
            ckrv: CKR_GENERAL_ERROR,
            reqlen: 0,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn attr_not_found(&self) -> bool {
        self.kind == ErrorKind::AttributeNotFound
    }

    pub fn is_buf_too_small(&self) -> bool {
        self.kind == ErrorKind::BufferTooSmall
    }

    /// Returns the required output length if this is a sizing signal
    pub fn required_len(&self) -> Option<usize> {
        match self.kind {
            ErrorKind::BufferTooSmall => Some(self.reqlen),
            _ => None,
        }
    }

    pub fn rv(&self) -> CK_RV {
        self.ckrv
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::CkError => {
                if let Some(ref e) = self.errmsg {
                    write!(f, "{}", e)
                } else if let Some(ref e) = self.origin {
                    write!(f, "{} ({})", self.ckrv, e)
                } else {
                    match self.ckrv {
                        CKR_GENERAL_ERROR => write!(f, "CKR_GENERAL_ERROR"),
                        CKR_OPERATION_ACTIVE => {
                            write!(f, "CKR_OPERATION_ACTIVE")
                        }
                        CKR_OPERATION_NOT_INITIALIZED => {
                            write!(f, "CKR_OPERATION_NOT_INITIALIZED")
                        }
                        CKR_MECHANISM_INVALID => {
                            write!(f, "CKR_MECHANISM_INVALID")
                        }
                        _ => write!(f, "{}", self.ckrv),
                    }
                }
            }
            ErrorKind::AttributeNotFound => match self.errmsg {
                Some(ref e) => write!(f, "attribute not found: {}", e),
                None => write!(f, "attribute not found"),
            },
            ErrorKind::BufferTooSmall => {
                write!(f, "buffer too small, {} bytes required", self.reqlen)
            }
            ErrorKind::Nested => match self.origin {
                Some(ref e) => e.fmt(f),
                None => write!(f, "{}", self.ckrv),
            },
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.origin.as_deref()
    }
}

impl From<CK_RV> for Error {
    fn from(rv: CK_RV) -> Error {
        Error::ck_rv(rv)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::other_error(error)
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(error: std::num::TryFromIntError) -> Error {
        Error::other_error(error)
    }
}

impl From<std::array::TryFromSliceError> for Error {
    fn from(error: std::array::TryFromSliceError) -> Error {
        Error::other_error(error)
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Error {
        Error::ck_rv_from_error(CKR_TPM2_CONFIG_ERROR, error)
    }
}
