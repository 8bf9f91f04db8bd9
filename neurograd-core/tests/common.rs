use neurograd_core::{Graph, NeurogradError};
use neurograd_core::nn::Mlp;
use rand::rngs::StdRng;
use rand::SeedableRng;

// Each integration test binary uses a different subset of these helpers.
#[allow(dead_code)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The four-example toy dataset used by the training smoke tests.
#[allow(dead_code)]
pub(crate) fn toy_dataset() -> (Vec<[f64; 3]>, Vec<f64>) {
    let xs = vec![
        [2.0, 3.0, -1.0],
        [3.0, -1.0, 0.5],
        [0.5, 1.0, 1.0],
        [1.0, 1.0, -1.0],
    ];
    let ys = vec![1.0, -1.0, -1.0, 1.0];
    (xs, ys)
}

/// A seeded 3 -> 4 -> 4 -> 1 network.
#[allow(dead_code)]
pub(crate) fn seeded_mlp(seed: u64) -> Result<(Graph, Mlp), NeurogradError> {
    let graph = Graph::new();
    let mlp = Mlp::new(&graph, 3, &[4, 4, 1], &mut StdRng::seed_from_u64(seed))?;
    Ok((graph, mlp))
}
