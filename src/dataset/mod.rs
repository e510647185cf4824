//! Labelled datasets for the network.
//!
//! Samples are flattened on ingest: every image becomes a `1 x N` row
//! vector regardless of its original layout, so the network's input layer
//! only has to agree on `N`.

pub mod csv;

use std::fs;
use std::path::Path;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::scalar::Scalar;

/// Fashion-MNIST class names, indexed by label.
pub const FASHION_MNIST_CLASSES: [&str; 10] = [
    "T-shirt/top",
    "Trouser",
    "Pullover",
    "Dress",
    "Coat",
    "Sandal",
    "Shirt",
    "Sneaker",
    "Bag",
    "Ankle Boot",
];

/// Raw pixel intensities are scaled into `[0, 1]` by this factor.
pub const PIXEL_MAX: f64 = 255.0;

/// Name of a Fashion-MNIST class, if `label` is one.
pub fn class_name(label: usize) -> Option<&'static str> {
    FASHION_MNIST_CLASSES.get(label).copied()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T = f64> {
    pub samples: Vec<Matrix<T>>,
    pub labels: Vec<usize>,
}

impl<T: Scalar> Dataset<T> {
    /// Builds a dataset from flat feature vectors.
    pub fn from_vecs(features: Vec<Vec<T>>, labels: Vec<usize>) -> Result<Dataset<T>> {
        if features.len() != labels.len() {
            return Err(NnError::mismatch(
                "dataset",
                (features.len(), 1),
                (labels.len(), 1),
            ));
        }
        Ok(Dataset {
            samples: features.into_iter().map(Matrix::row_vector).collect(),
            labels,
        })
    }

    /// Reads a `label,feature...` CSV file, keeping at most `limit` rows.
    pub fn load<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Dataset<T>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| NnError::io(path, format!("dataset does not exist or is unreadable: {e}")))?;
        let rows = csv::parse_rows::<T>(&text, limit).map_err(|e| NnError::io(path, e))?;

        let mut samples = Vec::with_capacity(rows.len());
        let mut labels = Vec::with_capacity(rows.len());
        for row in rows {
            labels.push(row.label);
            samples.push(Matrix::row_vector(row.features));
        }

        let dataset = Dataset { samples, labels };
        log::info!(
            "loaded {} samples with {} features from {}",
            dataset.len(),
            dataset.feature_count().unwrap_or(0),
            path.display()
        );
        Ok(dataset)
    }

    /// Loads the training and testing files in one call.
    pub fn load_pair<P: AsRef<Path>, Q: AsRef<Path>>(
        train_path: P,
        test_path: Q,
        limit: Option<usize>,
    ) -> Result<(Dataset<T>, Dataset<T>)> {
        let training = Dataset::load(train_path, limit)?;
        let testing = Dataset::load(test_path, limit)?;
        Ok((training, testing))
    }

    /// Scales every feature by `1/255`.
    pub fn normalize(&mut self) -> &mut Self {
        let scale = T::from_f64(PIXEL_MAX);
        for sample in self.samples.iter_mut() {
            *sample /= scale;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Feature count of the first sample.
    pub fn feature_count(&self) -> Option<usize> {
        self.samples.first().map(|s| s.cols())
    }

    /// Fails unless every sample has `features` columns and every label is
    /// below `classes`.
    pub fn validate(&self, features: usize, classes: usize) -> Result<()> {
        for sample in &self.samples {
            if sample.shape() != (1, features) {
                return Err(NnError::mismatch("dataset sample", (1, features), sample.shape()));
            }
        }
        if let Some(&label) = self.labels.iter().find(|&&l| l >= classes) {
            return Err(NnError::LabelOutOfRange { label, outputs: classes });
        }
        Ok(())
    }
}

/// The four XOR samples with class labels `x ^ y`.
pub fn xor<T: Scalar>() -> Dataset<T> {
    let mut features = Vec::with_capacity(4);
    let mut labels = Vec::with_capacity(4);
    for (x, y) in [(0usize, 0usize), (0, 1), (1, 0), (1, 1)] {
        features.push(Matrix::row_vector(vec![
            T::from_f64(x as f64),
            T::from_f64(y as f64),
        ]));
        labels.push(x ^ y);
    }
    Dataset { samples: features, labels }
}

const SHADES: &[u8] = b" .:-=+*#%@";

/// Renders a normalized sample as ASCII art, `width` pixels per line.
pub fn render_ascii<T: Scalar>(sample: &Matrix<T>, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(sample.len() + sample.len() / width);
    for (i, &v) in sample.as_slice().iter().enumerate() {
        if i > 0 && i % width == 0 {
            out.push('\n');
        }
        let level = v.to_f64_lossy().clamp(0.0, 1.0);
        let idx = (level * (SHADES.len() - 1) as f64).round() as usize;
        out.push(SHADES[idx] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_flattens_and_normalizes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "label,p1,p2,p3,p4").unwrap();
        writeln!(file, "9,0,255,51,102").unwrap();
        writeln!(file, "2,255,255,0,0").unwrap();

        let mut data: Dataset<f64> = Dataset::load(file.path(), None).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.labels, vec![9, 2]);
        assert_eq!(data.feature_count(), Some(4));

        data.normalize();
        assert_eq!(data.samples[0].as_slice(), &[0.0, 1.0, 0.2, 0.4]);
        assert!(data.validate(4, 10).is_ok());
        assert!(matches!(
            data.validate(4, 5),
            Err(NnError::LabelOutOfRange { label: 9, outputs: 5 })
        ));
        assert!(data.validate(3, 10).is_err());
    }

    #[test]
    fn missing_file_names_path() {
        let err = Dataset::<f64>::load("/missing/train.csv", None).unwrap_err();
        assert!(err.to_string().contains("/missing/train.csv"));
    }

    #[test]
    fn parse_errors_carry_path_and_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0,1,2\n1,oops,2").unwrap();
        let err = Dataset::<f32>::load(file.path(), None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains(&file.path().display().to_string()));
    }

    #[test]
    fn xor_labels() {
        let data: Dataset<f64> = xor();
        assert_eq!(data.labels, vec![0, 1, 1, 0]);
        assert_eq!(data.samples[2].as_slice(), &[1.0, 0.0]);
    }

    #[test]
    fn class_names() {
        assert_eq!(class_name(0), Some("T-shirt/top"));
        assert_eq!(class_name(9), Some("Ankle Boot"));
        assert_eq!(class_name(10), None);
    }

    #[test]
    fn ascii_rendering() {
        let sample = Matrix::row_vector(vec![0.0f64, 1.0, 1.0, 0.0]);
        assert_eq!(render_ascii(&sample, 2), " @\n@ ");
    }

    #[test]
    fn from_vecs_checks_lengths() {
        assert!(Dataset::<f64>::from_vecs(vec![vec![1.0]], vec![]).is_err());
        let data = Dataset::<f64>::from_vecs(vec![vec![1.0, 2.0]], vec![0]).unwrap();
        assert_eq!(data.samples[0].shape(), (1, 2));
    }
}
