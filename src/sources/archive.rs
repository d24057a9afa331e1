//! Archive sources - checksummed tarballs.
//!
//! Downloads are cached under the slipway home keyed by checksum, and
//! every archive is verified against its declared sha256 before use -
//! including cache hits, so a corrupted cache never reaches a build.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::util::diagnostic::{ChecksumMismatchError, ManualDownloadError};
use crate::util::fs::ensure_dir;
use crate::util::hash::sha256_file;

/// Fetch an archive into `cache_dir` and return its cached path.
///
/// `manual` archives are never downloaded; the file must already sit in
/// `cwd` (license-restricted upstreams).
pub fn fetch(
    recipe: &str,
    url: &str,
    sha256: &str,
    manual: bool,
    cwd: &Path,
    cache_dir: &Path,
) -> Result<PathBuf> {
    ensure_dir(cache_dir)?;

    let filename = archive_filename(url);
    let cached = cache_dir.join(format!("{}-{}", &sha256[..16.min(sha256.len())], filename));

    if cached.exists() {
        verify(&cached, url, sha256)?;
        tracing::debug!("archive cache hit: {}", cached.display());
        return Ok(cached);
    }

    // Manual-download archives never hit the network; the declared url
    // only contributes the expected file name.
    if manual {
        let candidate = cwd.join(&filename);
        if !candidate.exists() {
            return Err(ManualDownloadError {
                recipe: recipe.to_string(),
                expected_file: filename,
            }
            .into());
        }
        verify(&candidate, url, sha256)?;
        fs::copy(&candidate, &cached).with_context(|| {
            format!("failed to cache {} as {}", candidate.display(), cached.display())
        })?;
        return Ok(cached);
    }

    let parsed = Url::parse(url).with_context(|| format!("invalid source url: {}", url))?;

    match parsed.scheme() {
        "file" => {
            let source = parsed
                .to_file_path()
                .map_err(|_| anyhow::anyhow!("unusable file url: {}", url))?;

            verify(&source, url, sha256)?;
            fs::copy(&source, &cached).with_context(|| {
                format!("failed to cache {} as {}", source.display(), cached.display())
            })?;
        }

        "http" | "https" => {
            download(&parsed, &cached)?;
            if let Err(e) = verify(&cached, url, sha256) {
                // Never leave a bad archive where a later run would trust it.
                let _ = fs::remove_file(&cached);
                return Err(e);
            }
        }

        other => anyhow::bail!("unsupported source url scheme `{}` in {}", other, url),
    }

    Ok(cached)
}

/// Extract a gzip-compressed tarball into `dest`.
pub fn extract_tgz(archive: &Path, dest: &Path) -> Result<()> {
    ensure_dir(dest)?;

    let file = fs::File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;
    let decoder = GzDecoder::new(file);
    let mut tar = tar::Archive::new(decoder);

    tar.unpack(dest)
        .with_context(|| format!("failed to extract {} into {}", archive.display(), dest.display()))?;
    Ok(())
}

fn verify(path: &Path, url: &str, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if actual != expected {
        return Err(ChecksumMismatchError {
            url: url.to_string(),
            expected: expected.to_string(),
            actual,
        }
        .into());
    }
    Ok(())
}

fn download(url: &Url, dest: &Path) -> Result<()> {
    tracing::info!("downloading {}", url);

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("slipway/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut response = client
        .get(url.as_str())
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .with_context(|| format!("failed to download {}", url))?;

    let bar = match response.content_length() {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::with_template("{bar:30} {bytes}/{total_bytes} {bytes_per_sec}")
                    .expect("static template"),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    };

    let tmp = tempfile::NamedTempFile::new_in(dest.parent().expect("cache file has a parent"))?;
    {
        let mut writer = tmp.as_file();
        let mut buffer = [0u8; 65536];
        loop {
            let n = response.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buffer[..n])?;
            bar.inc(n as u64);
        }
        writer.flush()?;
    }
    bar.finish_and_clear();

    tmp.persist(dest)
        .with_context(|| format!("failed to persist download to {}", dest.display()))?;
    Ok(())
}

/// Last path segment of a source url, used as the cached file name.
fn archive_filename(url: &str) -> String {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("archive.tgz")
        .to_string()
}
