//! track.rs
//! Simulated vehicle observation and its identifier.
//! - id: 16 bytes from the OS entropy source, rendered 4-2-2-2-6 as lowercase hex
//! - position/speed: non-cryptographic thread-local PRNG
//! - the id format only looks like a UUID: version/variant bits are left as drawn

use rand::{Rng, TryRngCore};
use thiserror::Error;

pub const LATITUDE_SPAN: f64 = 90.0;
pub const LONGITUDE_SPAN: f64 = 360.0;
pub const MAX_SPEED: u32 = 18;

const ID_LEN: usize = 16;
// byte groups of the rendered id (8-4-4-4-12 hex chars)
const ID_GROUPS: [usize; 5] = [4, 2, 2, 2, 6];

#[derive(Debug, Error)]
pub enum TrackError {
    /// The cryptographic random source could not deliver bytes for an id.
    #[error("random source unavailable: {0}")]
    EntropyUnavailable(String),
}

/// One simulated vehicle observation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    id: String,
    latitude: f64,
    longitude: f64,
    speed: u32,
}

impl Track {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, speed: u32) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            speed,
        }
    }

    /// Builds a fresh randomized track.
    ///
    /// `id_rng` must be a cryptographic source; its failure is returned as-is
    /// and no track is produced. `rng` drives latitude, longitude and speed.
    pub fn generate<I, R>(id_rng: &mut I, rng: &mut R) -> Result<Self, TrackError>
    where
        I: TryRngCore + ?Sized,
        R: Rng + ?Sized,
    {
        let id = generate_id(id_rng)?;

        Ok(Self {
            id,
            latitude: rng.random::<f64>() * LATITUDE_SPAN,
            longitude: rng.random::<f64>() * LONGITUDE_SPAN - LONGITUDE_SPAN / 2.0,
            speed: rng.random_range(0..=MAX_SPEED),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }
}

/// Draws 16 bytes from `rng` and renders them as a hyphenated hex id.
pub fn generate_id<I: TryRngCore + ?Sized>(rng: &mut I) -> Result<String, TrackError> {
    let mut bytes = [0u8; ID_LEN];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| TrackError::EntropyUnavailable(e.to_string()))?;
    Ok(format_id(&bytes))
}

pub fn format_id(bytes: &[u8; ID_LEN]) -> String {
    let mut groups = Vec::with_capacity(ID_GROUPS.len());
    let mut offset = 0;
    for len in ID_GROUPS {
        groups.push(hex::encode(&bytes[offset..offset + len]));
        offset += len;
    }
    groups.join("-")
}
