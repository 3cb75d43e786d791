//! Core Tensor Operations
//!
//! Device selection and the small set of tensor helpers the projection
//! pipeline is built on.
//!
//! ## Device selection
//!
//! Cohort batches are small (tens to low hundreds of vectors), so CPU is the
//! default everywhere in the crate. `best_device()` is available for callers
//! projecting large vocabularies:
//!
//! ```bash
//! # force CPU even when built with `metal` or `cuda`
//! export POLIVEC_NO_GPU=1
//! ```

use crate::{PolivecError, Result};
use candle_core::{Device, Tensor};
use tracing::info;

// ============================================================================
// Environment-controlled Device Selection
// ============================================================================

/// Check if GPU is disabled via environment variable.
///
/// Set `POLIVEC_NO_GPU=1` to force CPU-only mode.
pub fn gpu_disabled() -> bool {
    std::env::var("POLIVEC_NO_GPU")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

/// Get the best available device for tensor operations
///
/// Priority:
/// 1. Check `POLIVEC_NO_GPU` env var (forces CPU if set)
/// 2. Metal (Apple Silicon)
/// 3. CUDA (NVIDIA GPUs)
/// 4. CPU (fallback)
pub fn best_device() -> Device {
    if gpu_disabled() {
        info!("Using CPU device (POLIVEC_NO_GPU set)");
        return Device::Cpu;
    }

    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Using Metal device");
            return device;
        }
    }

    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Using CUDA device");
            return device;
        }
    }

    info!("Using CPU device");
    Device::Cpu
}

/// Force CPU device, ignoring GPU availability.
pub fn cpu_device() -> Device {
    Device::Cpu
}

// ============================================================================
// Slice <-> Tensor helpers
// ============================================================================

/// Build a 1D tensor from a vector slice
pub fn vector_tensor(values: &[f32], device: &Device) -> Result<Tensor> {
    Tensor::from_slice(values, values.len(), device)
        .map_err(|e| PolivecError::Tensor(format!("Vector upload failed: {}", e)))
}

/// Build a `(rows, cols)` tensor from row-major values
pub fn matrix_tensor(values: &[f32], rows: usize, cols: usize, device: &Device) -> Result<Tensor> {
    if values.len() != rows * cols {
        return Err(PolivecError::Tensor(format!(
            "Matrix upload failed: {} values for shape ({}, {})",
            values.len(),
            rows,
            cols
        )));
    }
    Tensor::from_slice(values, (rows, cols), device)
        .map_err(|e| PolivecError::Tensor(format!("Matrix upload failed: {}", e)))
}

/// Euclidean norm of a tensor
pub fn l2_norm(t: &Tensor) -> Result<f32> {
    t.sqr()?
        .sum_all()?
        .sqrt()?
        .to_scalar::<f32>()
        .map_err(|e| PolivecError::Tensor(format!("Norm failed: {}", e)))
}

/// Dot product of every row of a `(N, D)` matrix with a `(D,)` direction
///
/// Returns the `N` scalar components as one matmul.
pub fn row_dots(matrix: &Tensor, direction: &Tensor) -> Result<Vec<f32>> {
    let column = direction
        .unsqueeze(1)
        .map_err(|e| PolivecError::Tensor(format!("Direction reshape failed: {}", e)))?;
    matrix
        .matmul(&column)?
        .squeeze(1)?
        .to_vec1::<f32>()
        .map_err(|e| PolivecError::Tensor(format!("Row dot failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_device() {
        let device = cpu_device();
        assert!(matches!(device, Device::Cpu));
    }

    #[test]
    fn test_best_device() {
        let device = best_device();
        assert!(matches!(
            device,
            Device::Cpu | Device::Metal(_) | Device::Cuda(_)
        ));
    }

    #[test]
    fn test_gpu_disabled_flag() {
        // Depends on the environment; only checks it does not panic
        let _disabled = gpu_disabled();
    }

    #[test]
    fn test_l2_norm() {
        let device = Device::Cpu;
        let t = vector_tensor(&[3.0, 4.0], &device).unwrap();
        let norm = l2_norm(&t).unwrap();
        assert!((norm - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_matrix_tensor_rejects_bad_shape() {
        let device = Device::Cpu;
        assert!(matrix_tensor(&[1.0, 2.0, 3.0], 2, 2, &device).is_err());
    }

    #[test]
    fn test_row_dots() {
        let device = Device::Cpu;
        let m = matrix_tensor(&[1.0, 0.0, 0.0, 1.0, 2.0, 3.0], 3, 2, &device).unwrap();
        let d = vector_tensor(&[1.0, 1.0], &device).unwrap();
        let dots = row_dots(&m, &d).unwrap();
        assert_eq!(dots.len(), 3);
        assert!((dots[0] - 1.0).abs() < 1e-6);
        assert!((dots[1] - 1.0).abs() < 1e-6);
        assert!((dots[2] - 5.0).abs() < 1e-6);
    }
}
