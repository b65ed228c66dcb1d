use nalgebra::{Cholesky, Matrix3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::{offset_record, NoiseError, NoiseModel};
use crate::io::PoseRecord;

/// Correlated zero-mean Gaussian noise.
///
/// Position and angle offsets are drawn independently per record, each from
/// a trivariate normal with covariance `std^2 * C`, where `C` has ones on the
/// diagonal and `correlation` elsewhere. Angles are perturbed in degrees.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    pos_std: f64,
    rot_std: f64,
    seed: u64,
    factor: Matrix3<f64>,
}

impl GaussianNoise {
    pub fn new(pos_std: f64, rot_std: f64, correlation: f64, seed: u64) -> Result<Self, NoiseError> {
        for std in [pos_std, rot_std] {
            if !std.is_finite() || std < 0.0 {
                return Err(NoiseError::InvalidDeviation(std));
            }
        }
        if !(0.0..1.0).contains(&correlation) {
            return Err(NoiseError::InvalidCorrelation(correlation));
        }
        let c = correlation;
        let cov = Matrix3::new(1.0, c, c, c, 1.0, c, c, c, 1.0);
        let factor = Cholesky::new(cov)
            .ok_or(NoiseError::InvalidCorrelation(correlation))?
            .unpack();
        Ok(Self {
            pos_std,
            rot_std,
            seed,
            factor,
        })
    }

    fn correlated<R: Rng>(&self, rng: &mut R, std: f64) -> Vector3<f64> {
        let z = Vector3::from_fn(|_, _| rng.sample::<f64, _>(StandardNormal));
        self.factor * z * std
    }
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self {
            pos_std: 0.5,
            rot_std: 0.05,
            seed: 42,
            factor: Cholesky::new(Matrix3::new(1.0, 0.1, 0.1, 0.1, 1.0, 0.1, 0.1, 0.1, 1.0))
                .map(Cholesky::unpack)
                .unwrap_or_else(Matrix3::identity),
        }
    }
}

impl NoiseModel for GaussianNoise {
    fn apply(&self, records: &[PoseRecord]) -> Vec<PoseRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        records
            .iter()
            .map(|rec| {
                let dp = self.correlated(&mut rng, self.pos_std);
                let da = self.correlated(&mut rng, self.rot_std);
                offset_record(rec, dp, da)
            })
            .collect()
    }
}
