/// Configuration for a `train_loop` run.
///
/// - `epochs`         — total number of full passes over the training data
/// - `log_every`      — emit an `info!` line every this many epochs (the last
///                      epoch is always logged); `0` silences per-epoch logs
/// - `validate_every` — evaluate the validation set every this many epochs
///                      (and after the last one); `0` only validates at the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub log_every: usize,
    pub validate_every: usize,
}

impl TrainConfig {
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            log_every: 1,
            validate_every: 0,
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(10)
    }
}
