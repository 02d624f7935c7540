//! Stratified direction sampling over the unit sphere.

use std::f32::consts::PI;

use glam::{vec3a, Vec3A};
use rand::Rng;

/// One sample direction with its spherical coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Unit vector.
    pub direction: Vec3A,
    /// Polar angle from +z, in `[0, π]`.
    pub theta: f32,
    /// Azimuth from +x, in `[0, 2π)`.
    pub phi: f32,
}

impl Sample {
    pub fn from_spherical(theta: f32, phi: f32) -> Self {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        Self {
            direction: vec3a(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta),
            theta,
            phi,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Sampler {
    pub samples: Vec<Sample>,
}

impl Sampler {
    /// `sqrt_count * sqrt_count` directions, one jittered sample per cell of a square grid mapped
    /// onto the sphere with equal area per cell.
    pub fn stratified<R: Rng>(sqrt_count: usize, rng: &mut R) -> Self {
        let n = sqrt_count as f32;
        let mut samples = Vec::with_capacity(sqrt_count * sqrt_count);
        for i in 0..sqrt_count {
            for j in 0..sqrt_count {
                let x = (i as f32 + rng.random::<f32>()) / n;
                let y = (j as f32 + rng.random::<f32>()) / n;
                let theta = 2.0 * (1.0 - x).sqrt().acos();
                let phi = 2.0 * PI * y;
                samples.push(Sample::from_spherical(theta, phi));
            }
        }
        Self { samples }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
