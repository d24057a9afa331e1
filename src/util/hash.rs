//! Hashing utilities for checksums and install fingerprints.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::core::spec::TargetSpec;
use crate::core::variant::VariantValue;

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Short fingerprint of a spec's resolution-relevant content.
///
/// Two specs that resolve identically get the same fingerprint, so the
/// install prefix `<name>-<version>-<fingerprint>` is stable across
/// invocations.
pub fn spec_fingerprint(spec: &TargetSpec) -> String {
    let mut hasher = Sha256::new();

    let mut update = |s: &str| {
        hasher.update(s.as_bytes());
        hasher.update(b"\0");
    };

    update(&spec.name);
    update(spec.version.as_str());
    update(spec.toolchain.family.as_str());
    update(&spec.toolchain.version.to_string());

    for (name, value) in spec.variants.iter() {
        update(name);
        match value {
            VariantValue::Bool(b) => update(if *b { "1" } else { "0" }),
            VariantValue::List(values) => {
                for v in values {
                    update(v);
                }
            }
        }
    }

    for (slot, provider) in spec.providers.iter() {
        update(slot.as_str());
        update(&provider.name);
        update(&provider.version.to_string());
    }

    hex::encode(hasher.finalize())[..16].to_string()
}
