// Copyright 2026 The tpm2-pkcs11 Authors
// See LICENSE.txt file for terms

//! Module configuration, read from a TOML file.
//!
//! All values have defaults so a missing file, or a file that only sets
//! some of the options, is fine.

use std::env;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::pkcs11::*;

use serde::{Deserialize, Serialize};

#[cfg(not(test))]
const DEFAULT_CONF_DIR: &str = {
    match option_env!("CONFDIR") {
        Some(p) => p,
        None => "/usr/local/etc",
    }
};
#[cfg(test)]
const DEFAULT_CONF_DIR: &str = "test";

pub const DEFAULT_CONF_NAME: &str = "tpm2-pkcs11.conf";

/* modulus sizes below this are never accepted, whatever the config says */
const RSA_FLOOR_BITS: usize = 512;

/// Settings for the software path used by objects that have no
/// TPM resident counterpart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftwareConfig {
    /// Allows public-only objects to be used for encryption operations
    pub enabled: bool,
    /// Smallest RSA modulus, in bits, the software path accepts
    pub min_rsa_bits: usize,
    /// Largest RSA modulus, in bits, the software path accepts
    pub max_rsa_bits: usize,
}

impl Default for SoftwareConfig {
    fn default() -> SoftwareConfig {
        SoftwareConfig {
            enabled: true,
            min_rsa_bits: 1024,
            max_rsa_bits: 16384,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub software: SoftwareConfig,
}

fn config_error(errmsg: String) -> Error {
    Error::ck_rv_with_errmsg(CKR_TPM2_CONFIG_ERROR, errmsg)
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Returns the path of the configuration file to use.
    ///
    /// The path is returned whether or not the file exists.
    pub fn find_conf() -> Result<String> {
        /* First check for our own env var,
         * this has the highest precedence */
        if let Ok(var) = env::var("TPM2_PKCS11_CONF") {
            return Ok(var);
        }
        let datafile = match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => format!("{}/tpm2-pkcs11/{}", xdg, DEFAULT_CONF_NAME),
            Err(_) => match env::var("HOME") {
                Ok(home) => format!(
                    "{}/.config/tpm2-pkcs11/{}",
                    home, DEFAULT_CONF_NAME
                ),
                Err(_) => format!(
                    "{}/tpm2-pkcs11/{}",
                    DEFAULT_CONF_DIR, DEFAULT_CONF_NAME
                ),
            },
        };
        Ok(datafile)
    }

    pub fn from_file(filename: &str) -> Result<Config> {
        let config_str = fs::read_to_string(filename)?;
        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_str: &str) -> Result<Config> {
        let conf: Config = toml::from_str(config_str)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Loads the configuration from the default location, or returns
    /// the built-in defaults if there is no configuration file
    pub fn default_config() -> Result<Config> {
        let filename = Self::find_conf()?;
        if !Path::new(&filename).is_file() {
            log::debug!("No configuration at {}, using defaults", filename);
            return Ok(Config::new());
        }
        Self::from_file(&filename)
    }

    fn validate(&self) -> Result<()> {
        let sw = &self.software;
        if sw.min_rsa_bits < RSA_FLOOR_BITS {
            return Err(config_error(format!(
                "min_rsa_bits must be at least {}",
                RSA_FLOOR_BITS
            )));
        }
        if sw.min_rsa_bits > sw.max_rsa_bits {
            return Err(config_error(format!(
                "min_rsa_bits ({}) is larger than max_rsa_bits ({})",
                sw.min_rsa_bits, sw.max_rsa_bits
            )));
        }
        Ok(())
    }
}
