use crate::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};

/// One held-out label paired with the prediction at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub actual: f64,
    pub predicted: f64,
}

/// Parses a batch-transform output file. Values may be separated by newlines,
/// commas or both depending on how the platform assembled the output.
pub fn parse_predictions(text: &str) -> DataResult<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        for field in line.split(',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let value = field.parse::<f64>().map_err(|e| DataError::Parse {
                what: "predictions".to_string(),
                line: idx + 1,
                message: e.to_string(),
            })?;
            out.push(value);
        }
    }
    Ok(out)
}

/// Pairs predictions with labels by position. A count mismatch means rows were
/// dropped or duplicated somewhere between upload and download.
pub fn align_predictions(labels: &[f64], predictions: &[f64]) -> DataResult<Vec<AlignedPair>> {
    if labels.len() != predictions.len() {
        return Err(DataError::Alignment { predictions: predictions.len(), labels: labels.len() });
    }
    Ok(labels
        .iter()
        .zip(predictions)
        .map(|(&actual, &predicted)| AlignedPair { actual, predicted })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub count: usize,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Coefficient of determination; `None` when the labels have zero variance.
    pub r2: Option<f64>,
}

impl RegressionMetrics {
    #[must_use]
    pub fn from_pairs(pairs: &[AlignedPair]) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }
        let n = pairs.len() as f64;
        let mean_actual = pairs.iter().map(|p| p.actual).sum::<f64>() / n;

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut total_sq = 0.0;
        for p in pairs {
            let err = p.predicted - p.actual;
            abs_sum += err.abs();
            sq_sum += err * err;
            total_sq += (p.actual - mean_actual).powi(2);
        }

        let mse = sq_sum / n;
        let r2 = (total_sq > 0.0).then(|| 1.0 - sq_sum / total_sq);
        Some(Self { count: pairs.len(), mae: abs_sum / n, mse, rmse: mse.sqrt(), r2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predictions_accepts_lines_and_commas() {
        let values = parse_predictions("22.5\n19.25,31\n\n7.0\n").unwrap();
        assert_eq!(values, vec![22.5, 19.25, 31.0, 7.0]);
    }

    #[test]
    fn test_parse_predictions_rejects_garbage() {
        assert!(parse_predictions("1.0\nnope\n").is_err());
    }

    #[test]
    fn test_align_keeps_positional_order() {
        let pairs = align_predictions(&[1.0, 2.0, 3.0], &[1.5, 2.5, 2.0]).unwrap();
        assert_eq!(pairs[2], AlignedPair { actual: 3.0, predicted: 2.0 });
    }

    #[test]
    fn test_align_reports_count_mismatch() {
        let err = align_predictions(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, DataError::Alignment { predictions: 1, labels: 2 }));
    }

    #[test]
    fn test_metrics_for_known_errors() {
        let pairs = align_predictions(&[1.0, 2.0, 3.0, 4.0], &[2.0, 2.0, 3.0, 2.0]).unwrap();
        let m = RegressionMetrics::from_pairs(&pairs).unwrap();
        assert_eq!(m.count, 4);
        assert!((m.mae - 0.75).abs() < 1e-12);
        assert!((m.mse - 1.25).abs() < 1e-12);
        // Total sum of squares is 5.0, residual sum is 5.0.
        assert!((m.r2.unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_empty_and_constant_labels() {
        assert!(RegressionMetrics::from_pairs(&[]).is_none());
        let pairs = align_predictions(&[5.0, 5.0], &[4.0, 6.0]).unwrap();
        assert!(RegressionMetrics::from_pairs(&pairs).unwrap().r2.is_none());
    }
}
