//! Synthetic placeholder volumes
//!
//! Builds a 3-D test volume of bright spheres, then applies Gaussian
//! noise, a small random affine and min-max intensity scaling.

use crate::error::{MedImageError, Result};
use crate::types::SyntheticConfig;
use log::debug;
use ndarray::{Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Number of distinct sphere intensities
const INTENSITY_CLASSES: f32 = 5.0;

/// Generates a volume shaped `(depth, height, width)` with values in `[0, 1]`
///
/// # Errors
///
/// Returns an error if the radius bounds are inconsistent or the volume
/// is too small to hold a sphere of radius `rad_max`.
pub fn generate_volume(config: &SyntheticConfig) -> Result<Array3<f32>> {
    let (depth, height, width) = config.dims;
    if config.rad_min == 0 || config.rad_max < config.rad_min {
        return Err(MedImageError::InvalidValue(format!(
            "sphere radius range [{}, {}] is invalid",
            config.rad_min, config.rad_max
        )));
    }
    if depth.min(height).min(width) <= 2 * config.rad_max {
        return Err(MedImageError::InvalidValue(format!(
            "volume {:?} too small for radius {}",
            config.dims, config.rad_max
        )));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut volume = Array3::<f32>::zeros((depth, height, width));
    place_spheres(&mut volume, config, &mut rng);
    add_gaussian_noise(&mut volume, config.noise_std, &mut rng)?;
    let mut volume = random_affine(&volume, config, &mut rng);
    scale_intensity(&mut volume);

    debug!("Generated synthetic volume {:?}", volume.dim());
    Ok(volume)
}

/// Cross-section at the middle depth index, shaped `(height, width)`
pub fn middle_slice(volume: &Array3<f32>) -> Array2<f32> {
    let mid = volume.len_of(Axis(0)) / 2;
    volume.index_axis(Axis(0), mid).to_owned()
}

fn place_spheres(volume: &mut Array3<f32>, config: &SyntheticConfig, rng: &mut StdRng) {
    let (depth, height, width) = volume.dim();
    let rad_max = config.rad_max;

    for _ in 0..config.num_objects {
        let cz = rng.gen_range(rad_max..depth - rad_max) as isize;
        let cy = rng.gen_range(rad_max..height - rad_max) as isize;
        let cx = rng.gen_range(rad_max..width - rad_max) as isize;
        let rad = rng.gen_range(config.rad_min..=rad_max) as isize;
        let intensity = (rng.gen::<f32>() * INTENSITY_CLASSES).ceil().max(1.0) / INTENSITY_CLASSES;

        let r2 = rad * rad;
        for z in (cz - rad)..=(cz + rad) {
            for y in (cy - rad)..=(cy + rad) {
                for x in (cx - rad)..=(cx + rad) {
                    let (dz, dy, dx) = (z - cz, y - cy, x - cx);
                    if dz * dz + dy * dy + dx * dx <= r2 {
                        volume[[z as usize, y as usize, x as usize]] = intensity;
                    }
                }
            }
        }
    }
}

/// Zero-mean Gaussian noise; a zero deviation leaves the volume untouched
fn add_gaussian_noise(volume: &mut Array3<f32>, std: f32, rng: &mut StdRng) -> Result<()> {
    if !(std >= 0.0) || !std.is_finite() {
        return Err(MedImageError::InvalidValue(format!(
            "noise std {} must be finite and non-negative",
            std
        )));
    }
    if std == 0.0 {
        return Ok(());
    }
    let normal = Normal::new(0.0, std)
        .map_err(|e| MedImageError::InvalidValue(format!("noise std {}: {}", std, e)))?;
    volume.iter_mut().for_each(|v| *v += normal.sample(rng));
    Ok(())
}

/// Random rotation about the volume centre plus translation
///
/// Nearest-neighbour sampling; voxels mapped from outside the volume are zero.
fn random_affine(volume: &Array3<f32>, config: &SyntheticConfig, rng: &mut StdRng) -> Array3<f32> {
    let mut sample = |limit: f32| {
        if limit > 0.0 {
            rng.gen_range(-limit..=limit)
        } else {
            0.0
        }
    };
    let angles = [
        sample(config.max_rotation),
        sample(config.max_rotation),
        sample(config.max_rotation),
    ];
    let shift = [
        sample(config.max_translation),
        sample(config.max_translation),
        sample(config.max_translation),
    ];
    let rot = rotation_matrix(angles);

    let (depth, height, width) = volume.dim();
    let centre = [
        (depth as f32 - 1.0) / 2.0,
        (height as f32 - 1.0) / 2.0,
        (width as f32 - 1.0) / 2.0,
    ];

    Array3::from_shape_fn((depth, height, width), |(z, y, x)| {
        let p = [
            z as f32 - centre[0] - shift[0],
            y as f32 - centre[1] - shift[1],
            x as f32 - centre[2] - shift[2],
        ];
        // inverse rotation is the transpose
        let src = [
            rot[0][0] * p[0] + rot[1][0] * p[1] + rot[2][0] * p[2] + centre[0],
            rot[0][1] * p[0] + rot[1][1] * p[1] + rot[2][1] * p[2] + centre[1],
            rot[0][2] * p[0] + rot[1][2] * p[1] + rot[2][2] * p[2] + centre[2],
        ];
        let (sz, sy, sx) = (src[0].round(), src[1].round(), src[2].round());
        if sz < 0.0 || sy < 0.0 || sx < 0.0 {
            return 0.0;
        }
        volume
            .get((sz as usize, sy as usize, sx as usize))
            .copied()
            .unwrap_or(0.0)
    })
}

/// Rotation about the three axes, applied x then y then z
fn rotation_matrix([a, b, c]: [f32; 3]) -> [[f32; 3]; 3] {
    let (sa, ca) = a.sin_cos();
    let (sb, cb) = b.sin_cos();
    let (sc, cc) = c.sin_cos();
    let rx = [[1.0, 0.0, 0.0], [0.0, ca, -sa], [0.0, sa, ca]];
    let ry = [[cb, 0.0, sb], [0.0, 1.0, 0.0], [-sb, 0.0, cb]];
    let rz = [[cc, -sc, 0.0], [sc, cc, 0.0], [0.0, 0.0, 1.0]];
    matmul(rz, matmul(ry, rx))
}

fn matmul(a: [[f32; 3]; 3], b: [[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Min-max scaling to `[0, 1]`; a constant volume becomes all zeros
fn scale_intensity(volume: &mut Array3<f32>) {
    let (lo, hi) = volume
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    if !range.is_finite() || range <= 0.0 {
        volume.fill(0.0);
        return;
    }
    volume.mapv_inplace(|v| ((v - lo) / range).clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: Option<u64>) -> SyntheticConfig {
        SyntheticConfig {
            dims: (24, 32, 32),
            num_objects: 3,
            rad_min: 2,
            rad_max: 5,
            seed,
            ..SyntheticConfig::default()
        }
    }

    #[test]
    fn test_volume_shape_and_range() {
        let volume = generate_volume(&small_config(Some(1))).unwrap();
        assert_eq!(volume.dim(), (24, 32, 32));
        assert!(volume.iter().all(|v| (0.0..=1.0).contains(v)));
        let max = volume.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = generate_volume(&small_config(Some(42))).unwrap();
        let b = generate_volume(&small_config(Some(42))).unwrap();
        let c = generate_volume(&small_config(Some(43))).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_middle_slice_shape() {
        let volume = generate_volume(&small_config(None)).unwrap();
        let slice = middle_slice(&volume);
        assert_eq!(slice.dim(), (32, 32));
        assert_eq!(slice, volume.index_axis(Axis(0), 12).to_owned());
    }

    #[test]
    fn test_spheres_without_noise_or_affine() {
        let config = SyntheticConfig {
            noise_std: 0.0,
            max_translation: 0.0,
            max_rotation: 0.0,
            ..small_config(Some(5))
        };
        let volume = generate_volume(&config).unwrap();
        // background stays at the minimum, spheres are brighter
        assert!(volume.iter().any(|&v| v == 0.0));
        assert!(volume.iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_volume_too_small() {
        let config = SyntheticConfig {
            dims: (10, 10, 10),
            rad_max: 5,
            ..SyntheticConfig::default()
        };
        assert!(matches!(
            generate_volume(&config),
            Err(MedImageError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_invalid_radius_range() {
        let config = SyntheticConfig {
            rad_min: 10,
            rad_max: 4,
            ..SyntheticConfig::default()
        };
        assert!(generate_volume(&config).is_err());
    }

    #[test]
    fn test_invalid_noise_std() {
        for noise_std in [-0.1, f32::NAN] {
            let config = SyntheticConfig {
                noise_std,
                ..small_config(Some(3))
            };
            assert!(matches!(
                generate_volume(&config),
                Err(MedImageError::InvalidValue(_))
            ));
        }
    }

    #[test]
    fn test_noise_statistics() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut volume = Array3::<f32>::zeros((20, 20, 20));
        add_gaussian_noise(&mut volume, 0.1, &mut rng).unwrap();
        let n = volume.len() as f32;
        let mean = volume.sum() / n;
        let var = volume.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        assert!(mean.abs() < 0.01);
        assert!((var.sqrt() - 0.1).abs() < 0.01);
    }

    #[test]
    fn test_rotation_matrix_identity() {
        let rot = rotation_matrix([0.0, 0.0, 0.0]);
        assert_eq!(rot, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_scale_intensity_constant_volume() {
        let mut volume = Array3::<f32>::from_elem((2, 2, 2), 3.0);
        scale_intensity(&mut volume);
        assert!(volume.iter().all(|&v| v == 0.0));
    }
}
