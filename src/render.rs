use rayon::prelude::*;

use crate::bus::OutputBus;
use crate::config::MixerConfig;
use crate::error::{MixerError, Result};

/// Mixes sources in parallel.
///
/// Sources are split into contiguous chunks, one per partition. Each chunk is
/// mixed on a rayon worker into its own partial bus, then the partials are
/// summed into the device bus in partition order. Every partial is allocated
/// up front so a quantum allocates nothing.
pub struct PartitionedMix {
    partials: Vec<OutputBus>,
    quantum_len: usize,
}

impl PartitionedMix {
    pub fn new(partitions: usize, quantum_len: usize) -> Result<Self> {
        if partitions == 0 {
            return Err(MixerError::NoPartitions);
        }
        log::debug!(
            "partitioned mix: {} partial buses of {} frames",
            partitions,
            quantum_len
        );
        Ok(Self {
            partials: (0..partitions).map(|_| OutputBus::new(quantum_len)).collect(),
            quantum_len,
        })
    }

    pub fn from_config(config: &MixerConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.partitions, config.quantum_length)
    }

    pub fn partitions(&self) -> usize {
        self.partials.len()
    }

    pub fn quantum_len(&self) -> usize {
        self.quantum_len
    }

    /// Runs `mix_source` on every source, then adds the result into `bus`.
    ///
    /// `mix_source` sees a cleared partial bus shared with the other sources
    /// of its chunk, and should only add into it. Click corrections written
    /// to the partials are merged too; [`OutputBus::apply_click_removal`] is
    /// still the caller's job once the whole quantum is mixed.
    pub fn mix<S, F>(&mut self, bus: &mut OutputBus, sources: &mut [S], mix_source: F)
    where
        S: Send,
        F: Fn(&mut S, &mut OutputBus) + Sync,
    {
        debug_assert!(bus.len() >= self.quantum_len);
        if sources.is_empty() {
            return;
        }
        let chunk = sources.len().div_ceil(self.partials.len());
        let used = sources.len().div_ceil(chunk);

        sources
            .par_chunks_mut(chunk)
            .zip(self.partials.par_iter_mut())
            .for_each(|(group, partial)| {
                partial.reset();
                for source in group {
                    mix_source(source, partial);
                }
            });

        for partial in &self.partials[..used] {
            bus.merge(partial);
        }
    }
}
