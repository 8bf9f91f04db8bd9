//! # Training a small MLP on four examples
//!
//! Fits a 3 -> 4 -> 4 -> 1 tanh network to a toy binary target with plain
//! SGD on the sum of squared errors, printing the loss every iteration.
//! The arena is rolled back to the parameters after each step, so memory
//! stays flat however long it runs.
//!
//! ## Running
//! `cargo run --example train_mlp`
//!
//! Set `RUST_LOG=debug` to see sweep and optimizer summaries.

use neurograd_core::nn::{sum_squared_error, Mlp, Module};
use neurograd_core::optim::{Optimizer, SgdConfig, SgdOptimizer};
use neurograd_core::{Graph, NeurogradError};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ITERATIONS: usize = 100;
const LEARNING_RATE: f64 = 0.1;
const SEED: u64 = 42;

fn main() -> Result<(), NeurogradError> {
    env_logger::init();

    let graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(SEED);
    let mlp = Mlp::new(&graph, 3, &[4, 4, 1], &mut rng)?;
    println!(
        "MLP {:?} with {} parameters",
        mlp.sizes(),
        mlp.num_parameters()
    );

    let xs = [
        [2.0, 3.0, -1.0],
        [3.0, -1.0, 0.5],
        [0.5, 1.0, 1.0],
        [1.0, 1.0, -1.0],
    ];
    let ys = [1.0, -1.0, -1.0, 1.0];

    let config = SgdConfig {
        lr: LEARNING_RATE,
        ..Default::default()
    };
    let mut optimizer = SgdOptimizer::new(mlp.parameters(), config)?;
    let mark = graph.mark();

    let mut first_loss = None;
    let mut last_loss = f64::NAN;
    let mut final_preds = Vec::new();
    for i in 0..ITERATIONS {
        // Forward pass
        let predictions = xs
            .iter()
            .map(|x| mlp.forward(x).map(|out| out.into_vec().remove(0)))
            .collect::<Result<Vec<_>, _>>()?;
        let loss = sum_squared_error(&predictions, &ys)?;

        // Backward pass
        optimizer.zero_grad();
        loss.backward();

        // Update
        optimizer.step()?;

        last_loss = loss.value();
        first_loss.get_or_insert(last_loss);
        final_preds = predictions.iter().map(|p| p.value()).collect();
        println!("{} Loss is {:.6}", i, last_loss);

        graph.truncate(mark);
    }

    println!("Predictions: {:?}", final_preds);
    println!("Targets:     {:?}", ys);
    println!("Graph holds {} nodes", graph.len());

    let first_loss = first_loss.unwrap_or(f64::NAN);
    if !(last_loss < first_loss) {
        return Err(NeurogradError::InvalidOperation(format!(
            "training did not reduce the loss: {} -> {}",
            first_loss, last_loss
        )));
    }
    Ok(())
}
