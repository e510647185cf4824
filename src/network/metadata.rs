use serde::{Deserialize, Serialize};

/// Optional annotations stored with a [`NetworkSpec`](crate::network::spec::NetworkSpec).
/// Every field is optional so older spec files still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    /// Human-readable names for the output neurons (e.g. Fashion-MNIST classes).
    pub output_labels: Option<Vec<String>>,
    /// Epochs the stored parameters were trained for.
    pub trained_epochs: Option<usize>,
}

impl ModelMetadata {
    /// Name for output neuron `index`, falling back to the index itself.
    pub fn label_name(&self, index: usize) -> String {
        self.output_labels
            .as_ref()
            .and_then(|labels| labels.get(index).cloned())
            .unwrap_or_else(|| index.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_name_falls_back_to_index() {
        let meta = ModelMetadata {
            output_labels: Some(vec!["zero".into(), "one".into()]),
            ..Default::default()
        };
        assert_eq!(meta.label_name(1), "one");
        assert_eq!(meta.label_name(5), "5");
        assert_eq!(ModelMetadata::default().label_name(0), "0");
    }

    #[test]
    fn missing_fields_deserialize() {
        let meta: ModelMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(meta, ModelMetadata::default());
    }
}
