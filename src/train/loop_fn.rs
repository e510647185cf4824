use std::time::Instant;

use crate::dataset::Dataset;
use crate::error::{NnError, Result};
use crate::math::scalar::Scalar;
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Trains `network` on `train` for `config.epochs` epochs of online SGD and
/// returns one [`EpochStats`] per completed epoch.
///
/// Samples are visited in dataset order every epoch. When `validation` is
/// given, its accuracy is measured according to `config.validate_every`.
pub fn train_loop<T: Scalar>(
    network: &mut Network<T>,
    train: &Dataset<T>,
    validation: Option<&Dataset<T>>,
    config: &TrainConfig,
) -> Result<Vec<EpochStats>> {
    if train.is_empty() {
        return Err(NnError::Architecture("training set is empty".into()));
    }

    log::info!(
        "training {} samples for {} epoch(s)",
        train.len(),
        config.epochs
    );

    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let train_loss = network
            .train_epoch(&train.samples, &train.labels)?
            .to_f64_lossy();

        let elapsed_ms = t_start.elapsed().as_millis() as u64;
        let last = epoch == config.epochs;

        let val_accuracy = match validation {
            Some(v) if last || is_due(epoch, config.validate_every) => {
                Some(network.evaluate(&v.samples, &v.labels)?)
            }
            _ => None,
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            val_accuracy,
            elapsed_ms,
        };

        if last || is_due(epoch, config.log_every) {
            match stats.val_accuracy {
                Some(acc) => log::info!(
                    "epoch {}/{}: loss = {:.6}, val accuracy = {:.2}% ({} ms)",
                    epoch, config.epochs, train_loss, acc, elapsed_ms
                ),
                None => log::info!(
                    "epoch {}/{}: loss = {:.6} ({} ms)",
                    epoch, config.epochs, train_loss, elapsed_ms
                ),
            }
        }

        history.push(stats);
    }

    Ok(history)
}

fn is_due(epoch: usize, every: usize) -> bool {
    every != 0 && epoch % every == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::dataset;
    use crate::layers::dense::Layer;
    use crate::loss::loss_type::LossFunction;

    fn xor_network() -> Network<f64> {
        let mut net = Network::new(0.5, LossFunction::SquareError).with_seed(11);
        net.add(Layer::new(2, Activation::Sigmoid))
            .add(Layer::new(4, Activation::Sigmoid))
            .add(Layer::new(2, Activation::Sigmoid));
        net.compile().unwrap();
        net
    }

    #[test]
    fn history_has_one_entry_per_epoch() {
        let data = dataset::xor::<f64>();
        let mut net = xor_network();
        let config = TrainConfig {
            epochs: 5,
            log_every: 0,
            validate_every: 2,
        };
        let history = train_loop(&mut net, &data, Some(&data), &config).unwrap();

        assert_eq!(history.len(), 5);
        assert_eq!(history[0].epoch, 1);
        assert!(history.iter().all(|s| s.total_epochs == 5));
        let validated: Vec<usize> = history
            .iter()
            .filter(|s| s.val_accuracy.is_some())
            .map(|s| s.epoch)
            .collect();
        assert_eq!(validated, vec![2, 4, 5]);
    }

    #[test]
    fn loss_trends_down() {
        let data = dataset::xor::<f64>();
        let mut net = xor_network();
        let history = train_loop(&mut net, &data, None, &TrainConfig::new(300)).unwrap();
        assert!(history.last().unwrap().train_loss < history[0].train_loss);
        assert!(history.iter().all(|s| s.val_accuracy.is_none()));
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let empty = Dataset::<f64> { samples: vec![], labels: vec![] };
        let mut net = xor_network();
        assert!(train_loop(&mut net, &empty, None, &TrainConfig::new(1)).is_err());
    }
}
