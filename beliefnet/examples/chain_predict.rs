/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/


//! Fits a three variable chain on correlated gaussian columns, then predicts a
//! fresh batch. Run with `RUST_LOG=beliefnet=debug` to see the table updates.

use beliefnet::*;
use log::LevelFilter;
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn sample(rng: &mut SmallRng, rows: usize) -> Array2<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    let noise = Normal::new(0.0, 0.3).unwrap();
    let mut batch = Array2::zeros((rows, 3));
    for i in 0..rows {
        batch[[i, 0]] = normal.sample(rng);
        batch[[i, 1]] = batch[[i, 0]] + noise.sample(rng);
        batch[[i, 2]] = 0.5 * batch[[i, 1]] + noise.sample(rng);
    }
    batch
}

fn main() -> Result<(), BayesError> {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_default())
        .init();

    let mut rng = SmallRng::seed_from_u64(0);
    let mut component: BayesianNetworkComponent = ComponentBuilder::new(3)
        .set_learning_rate(0.2)
        .set_binning(BinningMode::Persisted)
        .set_unseen_parents(UnseenParents::Uniform)
        .build()?;

    let beliefs = component.update_beliefs(sample(&mut rng, 500).view(), None)?;
    for (name, belief) in beliefs.iter() {
        println!("{}: {}", name, belief);
    }
    for _ in 0..5 {
        component.update(sample(&mut rng, 200).view(), 0.2)?;
    }

    let batch = sample(&mut rng, 10);
    let predictions = component.predict(batch.view())?;
    for (row, predicted) in batch.rows().into_iter().zip(predictions.rows()) {
        println!("{:.3} -> {:.3}", row, predicted);
    }
    Ok(())
}
