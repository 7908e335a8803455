use ndarray::{Array2, ArrayD, Axis, Ix4, IxDyn};
use std::fmt;

/// Normalized image tensor handed to a classifier
///
/// Two layouts are produced:
/// - `[1, H, W, C]` for DICOM and raster inputs
/// - `[1, H, W]` for the synthetic slice (leading axis is the channel)
///
/// Values are `f32` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: ArrayD<f32>,
}

impl ImageTensor {
    /// Wraps an array without checking its layout
    pub fn new(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    /// Returns the tensor shape
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of axes (3 for the synthetic slice, 4 otherwise)
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Spatial size as (height, width)
    pub fn spatial_dims(&self) -> Option<(usize, usize)> {
        let shape = self.shape();
        match shape.len() {
            3 | 4 => Some((shape[1], shape[2])),
            _ => None,
        }
    }

    /// Number of channels
    ///
    /// The last axis of a 4-D tensor, the leading axis of a 3-D one.
    pub fn channels(&self) -> Option<usize> {
        let shape = self.shape();
        match shape.len() {
            4 => Some(shape[3]),
            3 => Some(shape[0]),
            _ => None,
        }
    }

    /// Minimum and maximum value, or `None` for an empty tensor
    pub fn value_range(&self) -> Option<(f32, f32)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Checks that every value lies in `[0, 1]`
    pub fn is_normalized(&self) -> bool {
        self.data.iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Extracts one channel of a `[1, H, W, C]` tensor as an `H x W` array
    pub fn channel(&self, index: usize) -> Option<Array2<f32>> {
        let view = self.data.view().into_dimensionality::<Ix4>().ok()?;
        if index >= view.len_of(Axis(3)) {
            return None;
        }
        Some(
            view.index_axis(Axis(0), 0)
                .index_axis(Axis(2), index)
                .to_owned(),
        )
    }

    /// Borrows the underlying array
    pub fn as_array(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// Consumes the tensor and returns the underlying array
    pub fn into_array(self) -> ArrayD<f32> {
        self.data
    }

    /// Builds a tensor from a flat vector and a shape
    pub fn from_shape_vec(shape: &[usize], values: Vec<f32>) -> crate::Result<Self> {
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Ok(Self { data })
    }
}

impl fmt::Display for ImageTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.shape().iter().map(|d| d.to_string()).collect();
        write!(f, "({})", dims.join(", "))
    }
}
