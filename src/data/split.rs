//! Seeded random partitioning of sample sets.

use std::collections::BTreeSet;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::info;

use crate::{data::sample_set::SampleSet, error::Result};

/// Choose `round(len * fraction)` of `0..len` at random. Returns the chosen
/// and the remaining indices, each in ascending order.
pub fn split_indices(len: usize, fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let take = ((len as f64) * fraction.clamp(0.0, 1.0)).round() as usize;
    let mut rest = indices.split_off(take.min(len));
    indices.sort_unstable();
    rest.sort_unstable();
    (indices, rest)
}

/// Split `set` into a retained fraction and the leftover samples.
///
/// With `journals`, samples whose journal is not listed are dropped from
/// both outputs; sample types without a journal field are not filtered.
/// Both outputs keep the input's format and metadata.
pub fn split_sample_set(
    set: &SampleSet,
    fraction: f64,
    seed: u64,
    journals: Option<&BTreeSet<String>>,
) -> Result<(SampleSet, SampleSet)> {
    let candidates: Vec<_> = set
        .iter_samples(false)
        .filter(|sample| match (journals, sample.journal()) {
            (Some(keep), Some(journal)) => keep.contains(journal),
            _ => true,
        })
        .collect();

    let (chosen, rest) = split_indices(candidates.len(), fraction, seed);
    let mut retained = empty_like(set);
    let mut leftover = empty_like(set);
    retained.add_samples(chosen.into_iter().map(|i| candidates[i].clone()))?;
    leftover.add_samples(rest.into_iter().map(|i| candidates[i].clone()))?;

    info!(
        input = set.len(),
        considered = candidates.len(),
        retained = retained.len(),
        leftover = leftover.len(),
        "split samples"
    );
    Ok((retained, leftover))
}

fn empty_like(set: &SampleSet) -> SampleSet {
    let mut empty = SampleSet::with_format(set.sample_type(), set.format().clone());
    for (key, value) in set.metadata().iter() {
        empty.set_meta_item(key, value);
    }
    empty
}
