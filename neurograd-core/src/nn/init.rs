use crate::error::NeurogradError;
use crate::value::Value;
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Fills the parameter with a sample from U(`low`, `high`).
///
/// Operates in-place on the parameter's value.
///
/// # Arguments
/// * `param`: The leaf value to fill.
/// * `low`, `high`: Bounds of the distribution, `low < high`.
/// * `rng`: Caller-supplied random source; seed it for reproducible runs.
///
/// # Returns
/// A `Result` indicating success or a `NeurogradError`.
pub fn uniform_<R: Rng + ?Sized>(
    param: &Value,
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<(), NeurogradError> {
    if !(low.is_finite() && high.is_finite() && low < high) {
        return Err(NeurogradError::InvalidOperation(format!(
            "uniform_ requires low < high, got [{}, {})",
            low, high
        )));
    }
    let sample = Uniform::new(low, high).sample(rng);
    fill_inplace(param, sample, "uniform_")
}

/// Fills the parameter with a sample from N(`mean`, `std`²).
pub fn normal_<R: Rng + ?Sized>(
    param: &Value,
    mean: f64,
    std: f64,
    rng: &mut R,
) -> Result<(), NeurogradError> {
    if !(mean.is_finite() && std.is_finite() && std >= 0.0) {
        return Err(NeurogradError::InvalidOperation(format!(
            "normal_ requires a finite mean and a finite std >= 0, got mean {} std {}",
            mean, std
        )));
    }
    let normal = Normal::new(mean, std).map_err(|e| {
        NeurogradError::InvalidOperation(format!("normal_ with std {}: {}", std, e))
    })?;
    fill_inplace(param, normal.sample(rng), "normal_")
}

/// Fills the parameter with `value`.
pub fn constant_(param: &Value, value: f64) -> Result<(), NeurogradError> {
    fill_inplace(param, value, "constant_")
}

/// Fills the parameter with 0.
pub fn zeros_(param: &Value) -> Result<(), NeurogradError> {
    fill_inplace(param, 0.0, "zeros_")
}

// --- Internal Helper for In-place Fill ---

/// Only leaves can be (re)initialised: overwriting a computed node would
/// leave it inconsistent with its operands.
fn fill_inplace(param: &Value, value: f64, operation: &str) -> Result<(), NeurogradError> {
    if !param.is_leaf() {
        return Err(NeurogradError::InvalidOperation(format!(
            "{} can only fill leaf values, got a node produced by '{}'",
            operation,
            param.op()
        )));
    }
    param.set_value(value);
    Ok(())
}

// --- Tests ---
#[cfg(test)]
#[path = "init_test.rs"]
mod tests; // Link to the test file
