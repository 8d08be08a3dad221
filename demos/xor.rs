use backprop::feed_forward::{Hyperparameters, Network, Policy};
use backprop::trainer::{Logging, StopCondition, Trainer};

use ndarray::array;

fn main() -> backprop::Result<()> {
    env_logger::init();

    // Column 0 is the bias input.
    let x = array![
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 0.0],
        [1.0, 1.0, 1.0]
    ];
    let t = array![[1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [1.0, 0.0]];

    let mut network = Network::new(Policy::Trick, &[3, 8, 2], 3)?;
    network.initialize()?;
    let report = Trainer::new(Hyperparameters::new(0.5).momentum(0.9))
        .logging(Logging::Iterations(500))
        .stop_condition(StopCondition::Iterations(3000))
        .train(&mut network, x.clone(), t)?;

    println!("accuracy after {} iterations: {}", report.iterations, report.accuracy);
    let y = network.run(x.clone())?;
    for (input, output) in x.outer_iter().zip(y.outer_iter()) {
        println!("{} xor {} -> {:.3}", input[1], input[2], output[1]);
    }
    Ok(())
}
