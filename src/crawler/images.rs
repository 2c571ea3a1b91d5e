//! Image download and normalization
//!
//! Every image is fetched through the [`PageFetcher`] (so the politeness
//! delay applies), decoded to validate it, converted to 8-bit RGB and
//! re-encoded as JPEG at a fixed quality.

use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::model::image_file_name;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// JPEG quality used for every stored image
pub const JPEG_QUALITY: u8 = 85;

/// Why a single image could not be stored
#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid image data from {url}: {source}")]
    Decode {
        url: String,
        source: image::ImageError,
    },

    #[error("Failed to encode image from {url}: {source}")]
    Encode {
        url: String,
        source: image::ImageError,
    },

    #[error("Failed to write image {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of a successful [`ImageAcquirer::acquire`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    /// The image was fetched, normalized and written
    Downloaded,

    /// A file already existed at the destination; nothing was fetched
    AlreadyPresent,
}

/// Fetches remote images into deterministic local paths
#[derive(Debug, Clone)]
pub struct ImageAcquirer {
    fetcher: PageFetcher,
}

impl ImageAcquirer {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Stores the image at `remote_url` as a JPEG at `destination`
    ///
    /// Skips the network entirely when `destination` already exists, so
    /// re-running an interrupted item does not download its images twice.
    pub async fn acquire(
        &self,
        remote_url: &str,
        destination: &Path,
    ) -> Result<ImageOutcome, ImageError> {
        if destination.exists() {
            tracing::debug!("Image already exists: {}", destination.display());
            return Ok(ImageOutcome::AlreadyPresent);
        }

        let payload = self.fetcher.fetch_bytes(remote_url).await?;
        let encoded = normalize_to_jpeg(&payload).map_err(|e| match e {
            NormalizeError::Decode(source) => ImageError::Decode {
                url: remote_url.to_string(),
                source,
            },
            NormalizeError::Encode(source) => ImageError::Encode {
                url: remote_url.to_string(),
                source,
            },
        })?;

        let tmp_path = destination.with_extension("part");
        std::fs::write(&tmp_path, encoded).map_err(|source| ImageError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, destination).map_err(|source| ImageError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

        tracing::info!(
            "Downloaded image: {}",
            destination
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        Ok(ImageOutcome::Downloaded)
    }

    /// Stores every image of an item under `item_dir`, in order
    ///
    /// The n-th reference is written to `image_<n>.jpg`. Failures are logged
    /// and skipped; the returned list holds only the paths that now exist.
    pub async fn acquire_all(&self, image_refs: &[Url], item_dir: &Path) -> Vec<PathBuf> {
        let mut stored = Vec::with_capacity(image_refs.len());

        for (position, image_url) in image_refs.iter().enumerate() {
            let destination = item_dir.join(image_file_name(position));
            match self.acquire(image_url.as_str(), &destination).await {
                Ok(_) => stored.push(destination),
                Err(e) => {
                    tracing::error!(
                        "Error downloading image {} [{}]: {}",
                        position,
                        image_url,
                        e
                    );
                }
            }
        }

        stored
    }
}

#[derive(Debug)]
enum NormalizeError {
    Decode(image::ImageError),
    Encode(image::ImageError),
}

/// Decodes any supported format and re-encodes it as an RGB JPEG
fn normalize_to_jpeg(payload: &[u8]) -> Result<Vec<u8>, NormalizeError> {
    let decoded = image::load_from_memory(payload).map_err(NormalizeError::Decode)?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(NormalizeError::Encode)?;

    Ok(encoded)
}
