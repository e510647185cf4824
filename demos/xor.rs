use fmc_nn::{dataset, Activation, Layer, LossFunction, Network};

fn main() -> fmc_nn::Result<()> {
    let data = dataset::xor::<f64>();

    let mut network = Network::new(0.5, LossFunction::SquareError).with_seed(42);
    network
        .add(Layer::new(2, Activation::Sigmoid))
        .add(Layer::new(8, Activation::Sigmoid))
        .add(Layer::new(2, Activation::Sigmoid));
    network.compile()?;

    let epochs = 5000;

    for epoch in 0..epochs {
        let loss = network.train_epoch(&data.samples, &data.labels)?;
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: loss = {loss:.6}");
        }
    }

    for (sample, label) in data.samples.iter().zip(&data.labels) {
        let predicted = network.predict(sample)?;
        println!("Input: {:?} -> {} (expected {})", sample.as_slice(), predicted, label);
    }

    println!(
        "Accuracy: {:.1}%",
        network.evaluate(&data.samples, &data.labels)?
    );
    Ok(())
}
