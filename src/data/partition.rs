use std::ops::Range;

use log::debug;

use crate::data::dataset::Example;
use crate::error::{try_vec, DataError, Result};

/// Training examples split into one contiguous shard per worker thread.
///
/// Shard sizes are `len / threads`, with the first `len % threads` shards
/// taking one extra example. The partition owns the single example vector;
/// shards are ranges into it, so their union is the whole set, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    examples: Vec<Example>,
    bounds: Vec<Range<usize>>,
}

impl Partition {
    /// Validates the example shapes and splits them across `threads`.
    ///
    /// Every input must be non-empty and as wide as the first one; every
    /// output must have exactly `output_width` values.
    pub fn new(examples: Vec<Example>, threads: usize, output_width: usize) -> Result<Partition> {
        if threads == 0 {
            return Err(DataError::ZeroThreads.into());
        }
        let input_width = match examples.first() {
            Some(first) if first.input.is_empty() => {
                return Err(DataError::InputWidth { index: 0, expected: 1, found: 0 }.into())
            }
            Some(first) => first.input.len(),
            None => return Err(DataError::Empty.into()),
        };
        for (index, example) in examples.iter().enumerate() {
            if example.input.len() != input_width {
                return Err(DataError::InputWidth {
                    index,
                    expected: input_width,
                    found: example.input.len(),
                }
                .into());
            }
            if example.output.len() != output_width {
                return Err(DataError::OutputWidth {
                    index,
                    expected: output_width,
                    found: example.output.len(),
                }
                .into());
            }
        }

        let base = examples.len() / threads;
        let remainder = examples.len() % threads;
        let mut bounds = try_vec(threads, "partitioning examples")?;
        let mut start = 0;
        for thread in 0..threads {
            let size = base + usize::from(thread < remainder);
            bounds.push(start..start + size);
            start += size;
        }
        debug!(
            "split {} examples across {} threads ({} each, {} with one extra)",
            examples.len(),
            threads,
            base,
            remainder
        );
        Ok(Partition { examples, bounds })
    }

    /// Total number of examples across all shards.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn thread_count(&self) -> usize {
        self.bounds.len()
    }

    pub fn base_size(&self) -> usize {
        self.examples.len() / self.bounds.len()
    }

    pub fn remainder(&self) -> usize {
        self.examples.len() % self.bounds.len()
    }

    pub fn shard(&self, thread: usize) -> &[Example] {
        &self.examples[self.bounds[thread].clone()]
    }

    pub fn shards(&self) -> impl Iterator<Item = &[Example]> + '_ {
        self.bounds.iter().map(move |range| &self.examples[range.clone()])
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn into_examples(self) -> Vec<Example> {
        self.examples
    }
}
