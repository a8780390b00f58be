//! Memoized pair/triple dissimilarity storage.
//!
//! Ordered index tuples with pairwise-distinct components are compressed onto a
//! flat array without wasted diagonal entries: a coordinate compared against
//! already-fixed coordinates drops one slot for every fixed coordinate strictly
//! below it. The lazy and eager variants share the same addressing.

use crate::error::{OrderError, Result};

/// Cost strategy for an ordered dimension pair.
pub trait PairWeight {
    fn weight(&self, dim1: usize, dim2: usize) -> f64;
}

impl<F> PairWeight for F
where
    F: Fn(usize, usize) -> f64,
{
    fn weight(&self, dim1: usize, dim2: usize) -> f64 {
        self(dim1, dim2)
    }
}

/// Cost strategy for an ordered dimension triple.
pub trait TripleWeight {
    fn weight(&self, dim1: usize, dim2: usize, dim3: usize) -> f64;
}

impl<F> TripleWeight for F
where
    F: Fn(usize, usize, usize) -> f64,
{
    fn weight(&self, dim1: usize, dim2: usize, dim3: usize) -> f64 {
        self(dim1, dim2, dim3)
    }
}

/// Dissimilarity between every ordered pair of distinct dimensions.
///
/// Unset entries hold NaN; `get` computes and stores them on first access.
#[derive(Debug)]
pub struct PairCache<W> {
    dim_count: usize,
    stride: usize,
    values: Vec<f64>,
    weight: W,
}

impl<W: PairWeight> PairCache<W> {
    pub fn lazy(dim_count: usize, weight: W) -> Result<Self> {
        if dim_count < 2 {
            return Err(OrderError::TooFewDimensions {
                needed: 2,
                got: dim_count,
            });
        }
        let stride = dim_count - 1;
        Ok(Self {
            dim_count,
            stride,
            values: vec![f64::NAN; dim_count * stride],
            weight,
        })
    }

    /// Builds the cache with every entry computed up front.
    pub fn eager(dim_count: usize, weight: W) -> Result<Self> {
        let mut cache = Self::lazy(dim_count, weight)?;
        for dim1 in 0..dim_count {
            for dim2 in 0..dim_count {
                if dim2 == dim1 {
                    continue;
                }
                let index = cache.index_of(dim1, dim2);
                cache.values[index] = cache.weight.weight(dim1, dim2);
            }
        }
        Ok(cache)
    }

    pub fn dim_count(&self) -> usize {
        self.dim_count
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bijection from ordered distinct pairs onto `0..dim_count * (dim_count - 1)`.
    pub fn index_of(&self, dim1: usize, dim2: usize) -> usize {
        self.stride * dim1 + dim2 - usize::from(dim2 > dim1)
    }

    pub fn get(&mut self, dim1: usize, dim2: usize) -> f64 {
        let index = self.index_of(dim1, dim2);
        let value = self.values[index];
        if value.is_nan() {
            let computed = self.weight.weight(dim1, dim2);
            self.values[index] = computed;
            return computed;
        }
        value
    }
}

/// Dissimilarity between every ordered triple of distinct dimensions.
#[derive(Debug)]
pub struct TripleCache<W> {
    dim_count: usize,
    stride1: usize,
    stride2: usize,
    values: Vec<f64>,
    weight: W,
}

impl<W: TripleWeight> TripleCache<W> {
    pub fn lazy(dim_count: usize, weight: W) -> Result<Self> {
        if dim_count < 3 {
            return Err(OrderError::TooFewDimensions {
                needed: 3,
                got: dim_count,
            });
        }
        let stride1 = (dim_count - 2) * (dim_count - 1);
        let stride2 = dim_count - 2;
        Ok(Self {
            dim_count,
            stride1,
            stride2,
            values: vec![f64::NAN; dim_count * stride1],
            weight,
        })
    }

    pub fn eager(dim_count: usize, weight: W) -> Result<Self> {
        let mut cache = Self::lazy(dim_count, weight)?;
        for dim1 in 0..dim_count {
            for dim2 in 0..dim_count {
                if dim2 == dim1 {
                    continue;
                }
                for dim3 in 0..dim_count {
                    if dim3 == dim1 || dim3 == dim2 {
                        continue;
                    }
                    let index = cache.index_of(dim1, dim2, dim3);
                    cache.values[index] = cache.weight.weight(dim1, dim2, dim3);
                }
            }
        }
        Ok(cache)
    }

    pub fn dim_count(&self) -> usize {
        self.dim_count
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bijection from ordered distinct triples onto
    /// `0..dim_count * (dim_count - 1) * (dim_count - 2)`.
    pub fn index_of(&self, dim1: usize, dim2: usize, dim3: usize) -> usize {
        self.stride1 * dim1 + self.stride2 * (dim2 - usize::from(dim2 > dim1)) + dim3
            - usize::from(dim3 > dim1)
            - usize::from(dim3 > dim2)
    }

    pub fn get(&mut self, dim1: usize, dim2: usize, dim3: usize) -> f64 {
        let index = self.index_of(dim1, dim2, dim3);
        let value = self.values[index];
        if value.is_nan() {
            let computed = self.weight.weight(dim1, dim2, dim3);
            self.values[index] = computed;
            return computed;
        }
        value
    }
}
