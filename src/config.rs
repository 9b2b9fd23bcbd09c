//! Configuration types for PDF image recompression.
//!
//! All behaviour is controlled through [`SqueezeConfig`], built via its
//! [`SqueezeConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across threads, serialise the interesting parts
//! for logging, and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely
//! on well-documented defaults for the rest.

use crate::error::SqueezeError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image streams smaller than this many raw bytes are never candidates.
///
/// Below this size the re-encode overhead eats the savings and the result
/// frequently comes out larger (icons, bullets, tiling patterns). The value
/// is inherited from the production service this engine was extracted from;
/// it has not been calibrated against a corpus. Override with
/// [`SqueezeConfigBuilder::min_candidate_bytes`].
pub const MIN_CANDIDATE_BYTES: usize = 5000;

/// A re-encoded image is committed only if it is strictly smaller than this
/// fraction of the original stream length.
///
/// Savings inside the margin (here: under 2%) are noise-level and not worth
/// rewriting the stream for. Like [`MIN_CANDIDATE_BYTES`] this default is
/// uncalibrated. Override with [`SqueezeConfigBuilder::max_commit_ratio`].
pub const MAX_COMMIT_RATIO: f64 = 0.98;

/// How aggressively to recompress, as exposed to callers.
///
/// Each level maps to a fixed [`CompressionProfile`]:
///
/// | Level | Quality | Max dimension (px) |
/// |-------|---------|--------------------|
/// | `extreme` | 18 | 900 |
/// | `recommended` | 45 | 1800 |
/// | `less` | 75 | 2800 |
///
/// `recommended` keeps screen-readable quality at a fraction of the size;
/// `extreme` is for email-attachment limits where legibility is negotiable;
/// `less` barely touches visual quality and mostly wins on oversized
/// originals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Quality 18, max dimension 900 px.
    Extreme,
    /// Quality 45, max dimension 1800 px. (default)
    #[default]
    Recommended,
    /// Quality 75, max dimension 2800 px.
    Less,
}

impl CompressionLevel {
    /// The fixed profile this level maps to.
    pub fn profile(self) -> CompressionProfile {
        match self {
            CompressionLevel::Extreme => CompressionProfile {
                quality: 18,
                max_dimension: 900,
            },
            CompressionLevel::Recommended => CompressionProfile {
                quality: 45,
                max_dimension: 1800,
            },
            CompressionLevel::Less => CompressionProfile {
                quality: 75,
                max_dimension: 2800,
            },
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompressionLevel::Extreme => "extreme",
            CompressionLevel::Recommended => "recommended",
            CompressionLevel::Less => "less",
        };
        f.write_str(s)
    }
}

impl FromStr for CompressionLevel {
    type Err = SqueezeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extreme" => Ok(CompressionLevel::Extreme),
            "recommended" => Ok(CompressionLevel::Recommended),
            "less" => Ok(CompressionLevel::Less),
            other => Err(SqueezeError::InvalidConfig(format!(
                "unknown compression level '{other}' (expected extreme, recommended, or less)"
            ))),
        }
    }
}

/// The concrete re-encode parameters for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionProfile {
    /// JPEG quality, 1–100.
    pub quality: u8,
    /// Longest-side pixel cap; images are shrunk (never enlarged) to fit.
    pub max_dimension: u32,
}

/// Configuration for one recompression run.
///
/// Built via [`SqueezeConfig::builder()`] or [`SqueezeConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_squeeze::{CompressionLevel, SqueezeConfig};
///
/// let config = SqueezeConfig::builder()
///     .level(CompressionLevel::Extreme)
///     .concurrency(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SqueezeConfig {
    /// Compression level selecting the active profile. Default: `recommended`.
    pub level: CompressionLevel,

    /// JPEG quality override. When set, replaces the level profile's quality
    /// while keeping its dimension cap. Range 1–100.
    pub quality: Option<u8>,

    /// Dimension-cap override in pixels. When set, replaces the level
    /// profile's `max_dimension` while keeping its quality.
    pub max_dimension: Option<u32>,

    /// Minimum raw stream length for a candidate, in bytes.
    /// Default: [`MIN_CANDIDATE_BYTES`].
    pub min_candidate_bytes: usize,

    /// Commit margin: a re-encoded image is committed only when strictly
    /// smaller than `original_len * max_commit_ratio`.
    /// Default: [`MAX_COMMIT_RATIO`].
    pub max_commit_ratio: f64,

    /// Number of images re-encoded concurrently. Default: 4.
    ///
    /// Re-encoding is CPU-bound, so values beyond the machine's core count
    /// buy nothing. Each worker holds one decoded image in memory; lower
    /// this for documents with very large images on small machines.
    pub concurrency: usize,

    /// Optional per-image progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SqueezeConfig {
    fn default() -> Self {
        Self {
            level: CompressionLevel::default(),
            quality: None,
            max_dimension: None,
            min_candidate_bytes: MIN_CANDIDATE_BYTES,
            max_commit_ratio: MAX_COMMIT_RATIO,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SqueezeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqueezeConfig")
            .field("level", &self.level)
            .field("quality", &self.quality)
            .field("max_dimension", &self.max_dimension)
            .field("min_candidate_bytes", &self.min_candidate_bytes)
            .field("max_commit_ratio", &self.max_commit_ratio)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SqueezeProgressCallback>"),
            )
            .finish()
    }
}

impl SqueezeConfig {
    /// Create a new builder for `SqueezeConfig`.
    pub fn builder() -> SqueezeConfigBuilder {
        SqueezeConfigBuilder {
            config: Self::default(),
        }
    }

    /// The profile in effect: the level profile with any per-field overrides
    /// applied.
    pub fn effective_profile(&self) -> CompressionProfile {
        let mut profile = self.level.profile();
        if let Some(q) = self.quality {
            profile.quality = q;
        }
        if let Some(d) = self.max_dimension {
            profile.max_dimension = d;
        }
        profile
    }
}

/// Builder for [`SqueezeConfig`].
#[derive(Debug)]
pub struct SqueezeConfigBuilder {
    config: SqueezeConfig,
}

impl SqueezeConfigBuilder {
    pub fn level(mut self, level: CompressionLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.config.quality = Some(quality.clamp(1, 100));
        self
    }

    pub fn max_dimension(mut self, px: u32) -> Self {
        self.config.max_dimension = Some(px.max(16));
        self
    }

    pub fn min_candidate_bytes(mut self, bytes: usize) -> Self {
        self.config.min_candidate_bytes = bytes;
        self
    }

    pub fn max_commit_ratio(mut self, ratio: f64) -> Self {
        self.config.max_commit_ratio = ratio;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SqueezeConfig, SqueezeError> {
        let c = &self.config;
        if let Some(q) = c.quality {
            if q == 0 || q > 100 {
                return Err(SqueezeError::InvalidConfig(format!(
                    "quality must be 1–100, got {q}"
                )));
            }
        }
        if !(c.max_commit_ratio > 0.0 && c.max_commit_ratio <= 1.0) {
            return Err(SqueezeError::InvalidConfig(format!(
                "max_commit_ratio must be in (0, 1], got {}",
                c.max_commit_ratio
            )));
        }
        if c.concurrency == 0 {
            return Err(SqueezeError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}
