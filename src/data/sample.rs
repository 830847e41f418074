//! Synthetic track generation.
//!
//! Produces a recorded track and a matching reference profile:
//!
//! - the terrain is a sum of a few random sine hills along the distance
//! - the reference samples the terrain exactly
//! - the recorded elevation adds a constant bias, a linear drift, Gaussian
//!   noise and an optional lag of `sample_offset` samples

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::TAU;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{RunConfig, TrackSeries};
use crate::error::AppError;

/// Nominal seconds between samples.
const SAMPLE_INTERVAL_S: f64 = 5.0;
/// Base terrain elevation (m).
const TERRAIN_BASE_M: f64 = 420.0;
/// Standard deviation of the recorded elevation noise (m).
const NOISE_SIGMA_M: f64 = 0.8;
const HILLS: usize = 4;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub track: TrackSeries,
    pub start_time: DateTime<Utc>,
    pub stats: TrackStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStats {
    pub n_samples: usize,
    pub duration_s: f64,
    pub distance_m: f64,
    pub elevation_min: f64,
    pub elevation_max: f64,
}

pub fn generate_sample(config: &RunConfig) -> Result<SampleData, AppError> {
    if config.sample_count < 2 {
        return Err(AppError::new(2, "Sample count must be >= 2."));
    }
    if !(config.sample_bias.is_finite() && config.sample_drift.is_finite()) {
        return Err(AppError::new(2, "Invalid bias/drift settings."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let noise = Normal::new(0.0, NOISE_SIGMA_M)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let speed = Normal::new(3.2, 0.6)
        .map_err(|e| AppError::new(4, format!("Speed distribution error: {e}")))?;

    let n = config.sample_count;
    let mut time_s = Vec::with_capacity(n);
    let mut distance_m = Vec::with_capacity(n);
    let (mut t, mut d) = (0.0_f64, 0.0_f64);
    for i in 0..n {
        if i > 0 {
            t += SAMPLE_INTERVAL_S * rng.gen_range(0.8..=1.2);
            // Walking/riding speed in m/s, never backwards.
            let v: f64 = speed.sample(&mut rng);
            d += v.max(0.0) * SAMPLE_INTERVAL_S;
        }
        time_s.push(t);
        distance_m.push(d);
    }

    let hills: Vec<(f64, f64, f64)> = (0..HILLS)
        .map(|_| {
            let amplitude = rng.gen_range(15.0..=80.0);
            let wavelength = rng.gen_range(0.15..=0.6) * d.max(1.0);
            let phase = rng.gen_range(0.0..TAU);
            (amplitude, wavelength, phase)
        })
        .collect();
    let terrain: Vec<f64> = distance_m
        .iter()
        .map(|&x| {
            TERRAIN_BASE_M
                + hills
                    .iter()
                    .map(|&(a, w, p)| a * (TAU * x / w + p).sin())
                    .sum::<f64>()
        })
        .collect();

    let last = n - 1;
    let elevation: Vec<f64> = (0..n)
        .map(|i| {
            let lagged = (i as i64 - config.sample_offset).clamp(0, last as i64) as usize;
            let progress = i as f64 / last as f64;
            terrain[lagged] + config.sample_bias + config.sample_drift * progress + noise.sample(&mut rng)
        })
        .collect();

    let stats = compute_stats(&time_s, &distance_m, &elevation)
        .ok_or_else(|| AppError::new(4, "Failed to compute sample stats."))?;
    let track = TrackSeries::new(time_s, Some(distance_m), elevation, Some(terrain))?;

    Ok(SampleData {
        track,
        start_time: start_time(config.sample_seed),
        stats,
    })
}

/// Deterministic start time derived from the seed (a morning in 2024).
fn start_time(seed: u64) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2024, 6, 1, 7, 0, 0)
        .single()
        .unwrap_or_default();
    base.checked_add_signed(Duration::days((seed % 180) as i64))
        .unwrap_or(base)
}

fn sample_seed(config: &RunConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.sample_seed.hash(&mut hasher);
    config.sample_count.hash(&mut hasher);
    config.sample_bias.to_bits().hash(&mut hasher);
    config.sample_drift.to_bits().hash(&mut hasher);
    config.sample_offset.hash(&mut hasher);
    hasher.finish()
}

fn compute_stats(time_s: &[f64], distance_m: &[f64], elevation: &[f64]) -> Option<TrackStats> {
    let (lo, hi) = elevation
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    Some(TrackStats {
        n_samples: elevation.len(),
        duration_s: *time_s.last()?,
        distance_m: *distance_m.last()?,
        elevation_min: lo,
        elevation_max: hi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfig {
        RunConfig {
            sample_count: 200,
            sample_seed: 7,
            sample_bias: 12.0,
            sample_drift: -6.0,
            ..RunConfig::default()
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_sample(&config()).unwrap();
        let b = generate_sample(&config()).unwrap();
        assert_eq!(a.track.elevation, b.track.elevation);
        assert_eq!(a.start_time, b.start_time);

        let mut other = config();
        other.sample_seed = 8;
        let c = generate_sample(&other).unwrap();
        assert_ne!(a.track.elevation, c.track.elevation);
    }

    #[test]
    fn recorded_track_carries_bias_and_drift() {
        let s = generate_sample(&config()).unwrap();
        let reference = s.track.reference.as_ref().unwrap();
        let gap = |i: usize| s.track.elevation[i] - reference[i];

        // Noise is small relative to the bias.
        assert!((gap(0) - 12.0).abs() < 5.0);
        assert!((gap(199) - 6.0).abs() < 5.0);
        assert_eq!(s.stats.n_samples, 200);
        assert!(s.track.time_s.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn offset_lags_the_recorded_profile() {
        let mut cfg = config();
        cfg.sample_offset = 3;
        cfg.sample_bias = 0.0;
        cfg.sample_drift = 0.0;
        let s = generate_sample(&cfg).unwrap();
        let reference = s.track.reference.as_ref().unwrap();
        assert!((s.track.elevation[50] - reference[47]).abs() < 5.0);
    }

    #[test]
    fn rejects_tiny_sample_count() {
        let mut cfg = config();
        cfg.sample_count = 1;
        assert!(generate_sample(&cfg).is_err());
    }
}
