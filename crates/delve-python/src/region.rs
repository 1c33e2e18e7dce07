//! NumPy arrays as observation regions.

use delve_core::{Channel, DType};
use delve_obs::Region;
use numpy::{PyArrayDescrMethods, PyUntypedArray, PyUntypedArrayMethods};
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;

/// A NumPy array bound as an observation buffer.
///
/// Holds a strong reference to the array, so the memory stays valid for as
/// long as the region is bound.
pub(crate) struct NumpyRegion {
    _array: Py<PyUntypedArray>,
    dtype: DType,
    shape: Vec<usize>,
    contiguous: bool,
    writable: bool,
    /// Data address, stored as an integer so the region is `Send`.
    data: usize,
}

fn dtype_of(array: &Bound<'_, PyUntypedArray>) -> Option<DType> {
    let py = array.py();
    let descr = array.dtype();
    [
        (DType::I8, numpy::dtype::<i8>(py)),
        (DType::U8, numpy::dtype::<u8>(py)),
        (DType::I16, numpy::dtype::<i16>(py)),
        (DType::I32, numpy::dtype::<i32>(py)),
        (DType::I64, numpy::dtype::<i64>(py)),
    ]
    .into_iter()
    .find(|(_, d)| descr.is_equiv_to(d))
    .map(|(t, _)| t)
}

impl NumpyRegion {
    /// Wrap `obj`, which must be a NumPy array of a supported element type.
    ///
    /// Shape, layout and writability are checked later by the buffer
    /// registry; only element types with no engine counterpart fail here.
    #[allow(unsafe_code)]
    pub(crate) fn new(channel: Channel, obj: &Bound<'_, PyAny>) -> PyResult<Self> {
        let array = obj.cast::<PyUntypedArray>().map_err(|_| {
            PyTypeError::new_err(format!(
                "{channel}: expected a numpy array, got {}",
                obj.get_type()
            ))
        })?;
        let dtype = dtype_of(array).ok_or_else(|| {
            PyTypeError::new_err(format!(
                "{channel}: buffer dtype mismatch (expected {}, got {})",
                channel.dtype(),
                array.dtype()
            ))
        })?;
        let writable: bool = array.getattr("flags")?.getattr("writeable")?.extract()?;
        // SAFETY: `array` is a live ndarray; reading its data field does not
        // dereference it.
        let data = unsafe { (*array.as_array_ptr()).data } as usize;
        Ok(Self {
            _array: array.clone().unbind(),
            dtype,
            shape: array.shape().to_vec(),
            contiguous: array.is_c_contiguous(),
            writable,
            data,
        })
    }
}

// SAFETY: the strong reference keeps the ndarray alive, and NumPy refuses
// to reallocate the data of an array with outstanding references, so
// `data` stays valid and fixed while the region exists.
#[allow(unsafe_code)]
unsafe impl Region for NumpyRegion {
    fn dtype(&self) -> DType {
        self.dtype
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn is_c_contiguous(&self) -> bool {
        self.contiguous
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn data_ptr(&mut self) -> *mut u8 {
        self.data as *mut u8
    }
}
