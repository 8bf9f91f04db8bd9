use crate::error::NeurogradError;
use crate::value::Value;

/// Σ (ŷᵢ - yᵢ)² over paired predictions and targets.
///
/// # Errors
/// `DimensionMismatch` if the two slices differ in length,
/// `InvalidOperation` if they are empty.
pub fn sum_squared_error(predictions: &[Value], targets: &[f64]) -> Result<Value, NeurogradError> {
    if predictions.len() != targets.len() {
        return Err(NeurogradError::DimensionMismatch {
            expected: predictions.len(),
            actual: targets.len(),
            operation: "sum_squared_error".to_string(),
        });
    }
    let mut terms = predictions
        .iter()
        .zip(targets)
        .map(|(prediction, &target)| (prediction - target).powf(2.0));
    let first = terms.next().ok_or_else(|| {
        NeurogradError::InvalidOperation("sum_squared_error of an empty batch".to_string())
    })?;
    Ok(terms.fold(first, |acc, term| acc + term))
}

/// [`sum_squared_error`] divided by the number of pairs.
pub fn mean_squared_error(predictions: &[Value], targets: &[f64]) -> Result<Value, NeurogradError> {
    let total = sum_squared_error(predictions, targets)?;
    Ok(total / predictions.len() as f64)
}
