//! NumPy `.npy` persistence for tables and cost matrices.
//!
//! Only what the pipeline needs: little-endian `f32`/`f64`, C order.
//! Files are written as format version 1.0 with the header padded to a
//! 64-byte boundary, so the data section of a memory-mapped file is aligned.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use memmap2::Mmap;
use ndarray::{Array2, ArrayBase, Data, Dimension};

use crate::error::{Result, ViewCostError};
use crate::sat::TableLookup;

const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";
const NPY_PREAMBLE_V1: usize = 10;
const NPY_PREAMBLE_V2: usize = 12;
const NPY_ALIGNMENT: usize = 64;

/// Element types the pipeline persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NpyDtype {
    F32,
    F64,
}

impl NpyDtype {
    pub fn descr(&self) -> &'static str {
        match self {
            Self::F32 => "<f4",
            Self::F64 => "<f8",
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    fn from_descr(descr: &str) -> Result<Self> {
        match descr {
            "<f4" => Ok(Self::F32),
            "<f8" => Ok(Self::F64),
            other => Err(ViewCostError::InvalidNpy(format!(
                "unsupported dtype '{other}'"
            ))),
        }
    }
}

/// A scalar that can be stored in an `.npy` file.
pub trait NpyElement: Copy {
    const DTYPE: NpyDtype;

    fn write_le<W: Write + ?Sized>(self, w: &mut W) -> Result<()>;

    fn read_le(bytes: &[u8]) -> Self;
}

impl NpyElement for f32 {
    const DTYPE: NpyDtype = NpyDtype::F32;

    fn write_le<W: Write + ?Sized>(self, w: &mut W) -> Result<()> {
        w.write_f32::<LittleEndian>(self)?;
        Ok(())
    }

    fn read_le(bytes: &[u8]) -> Self {
        LittleEndian::read_f32(bytes)
    }
}

impl NpyElement for f64 {
    const DTYPE: NpyDtype = NpyDtype::F64;

    fn write_le<W: Write + ?Sized>(self, w: &mut W) -> Result<()> {
        w.write_f64::<LittleEndian>(self)?;
        Ok(())
    }

    fn read_le(bytes: &[u8]) -> Self {
        LittleEndian::read_f64(bytes)
    }
}

/// Parsed `.npy` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NpyHeader {
    pub dtype: NpyDtype,
    pub shape: Vec<usize>,
    /// Byte offset of the first element.
    pub data_offset: usize,
}

impl NpyHeader {
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

fn shape_literal(shape: &[usize]) -> String {
    match shape {
        [single] => format!("({single},)"),
        dims => {
            let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Write a version 1.0 header for a C-order array of `shape`.
pub fn write_header<W: Write + ?Sized>(w: &mut W, dtype: NpyDtype, shape: &[usize]) -> Result<()> {
    let dict = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
        dtype.descr(),
        shape_literal(shape)
    );
    // Header text ends in '\n' and is space-padded so data starts aligned.
    let unpadded = NPY_PREAMBLE_V1 + dict.len() + 1;
    let padding = (NPY_ALIGNMENT - unpadded % NPY_ALIGNMENT) % NPY_ALIGNMENT;
    let header_len = dict.len() + padding + 1;
    let header_len = u16::try_from(header_len)
        .map_err(|_| ViewCostError::InvalidNpy(format!("header too long: {header_len} bytes")))?;

    w.write_all(NPY_MAGIC)?;
    w.write_all(&[1u8, 0u8])?;
    w.write_u16::<LittleEndian>(header_len)?;
    w.write_all(dict.as_bytes())?;
    w.write_all(&vec![b' '; padding])?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write the elements of `array` in logical (row-major) order.
pub fn write_elements<A, S, D, W>(w: &mut W, array: &ArrayBase<S, D>) -> Result<()>
where
    A: NpyElement,
    S: Data<Elem = A>,
    D: Dimension,
    W: Write + ?Sized,
{
    for &value in array.iter() {
        value.write_le(w)?;
    }
    Ok(())
}

/// Write a complete `.npy` document holding `array`.
pub fn write_array<A, S, D, W>(w: &mut W, array: &ArrayBase<S, D>) -> Result<()>
where
    A: NpyElement,
    S: Data<Elem = A>,
    D: Dimension,
    W: Write + ?Sized,
{
    write_header(w, A::DTYPE, array.shape())?;
    write_elements(w, array)
}

fn dict_value<'a>(dict: &'a str, key: &str) -> Result<&'a str> {
    let needle = format!("'{key}':");
    let start = dict
        .find(&needle)
        .ok_or_else(|| ViewCostError::InvalidNpy(format!("header has no '{key}' field")))?;
    Ok(dict[start + needle.len()..].trim_start())
}

/// Parse the header at the start of `bytes`.
pub fn parse_header(bytes: &[u8]) -> Result<NpyHeader> {
    if bytes.len() < NPY_PREAMBLE_V1 || &bytes[..6] != NPY_MAGIC {
        return Err(ViewCostError::InvalidNpy("missing \\x93NUMPY magic".into()));
    }

    let (header_len, preamble) = match bytes[6] {
        1 => (LittleEndian::read_u16(&bytes[8..10]) as usize, NPY_PREAMBLE_V1),
        2 | 3 => {
            if bytes.len() < NPY_PREAMBLE_V2 {
                return Err(ViewCostError::InvalidNpy("truncated preamble".into()));
            }
            (LittleEndian::read_u32(&bytes[8..12]) as usize, NPY_PREAMBLE_V2)
        }
        major => {
            return Err(ViewCostError::InvalidNpy(format!(
                "unsupported format version {major}"
            )))
        }
    };

    let data_offset = preamble + header_len;
    if bytes.len() < data_offset {
        return Err(ViewCostError::InvalidNpy("truncated header".into()));
    }
    let dict = std::str::from_utf8(&bytes[preamble..data_offset])
        .map_err(|_| ViewCostError::InvalidNpy("header is not valid text".into()))?;

    let descr = dict_value(dict, "descr")?;
    let descr = descr
        .strip_prefix('\'')
        .and_then(|rest| rest.split('\'').next())
        .ok_or_else(|| ViewCostError::InvalidNpy("malformed 'descr'".into()))?;
    let dtype = NpyDtype::from_descr(descr)?;

    if dict_value(dict, "fortran_order")?.starts_with("True") {
        return Err(ViewCostError::InvalidNpy(
            "Fortran-ordered arrays are not supported".into(),
        ));
    }

    let shape_text = dict_value(dict, "shape")?;
    let shape_text = shape_text
        .strip_prefix('(')
        .and_then(|rest| rest.split(')').next())
        .ok_or_else(|| ViewCostError::InvalidNpy("malformed 'shape'".into()))?;
    let shape = shape_text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| ViewCostError::InvalidNpy(format!("bad dimension '{s}'")))
        })
        .collect::<Result<Vec<usize>>>()?;

    Ok(NpyHeader {
        dtype,
        shape,
        data_offset,
    })
}

/// Read a 2D `f32` array, e.g. a persisted cost matrix.
pub fn read_array2_f32(path: &Path) -> Result<Array2<f32>> {
    let bytes = std::fs::read(path)?;
    let header = parse_header(&bytes)?;
    let (rows, cols) = match header.shape.as_slice() {
        [rows, cols] => (*rows, *cols),
        other => {
            return Err(ViewCostError::InvalidNpy(format!(
                "expected a 2D array, got shape {other:?}"
            )))
        }
    };
    if header.dtype != NpyDtype::F32 {
        return Err(ViewCostError::InvalidNpy(format!(
            "expected <f4, got {}",
            header.dtype.descr()
        )));
    }

    let data = &bytes[header.data_offset..];
    if data.len() < rows * cols * 4 {
        return Err(ViewCostError::InvalidNpy("file truncated".into()));
    }
    let mut values = vec![0f32; rows * cols];
    LittleEndian::read_f32_into(&data[..rows * cols * 4], &mut values);

    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| ViewCostError::InvalidNpy(e.to_string()))
}

/// Memory-mapped 3D tensor of stacked 2D tables, shape `(count, height, width)`.
pub struct NpyTensor {
    mmap: Mmap,
    header: NpyHeader,
}

impl NpyTensor {
    /// Map a persisted table row.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let header = parse_header(&mmap)?;

        if header.shape.len() != 3 {
            return Err(ViewCostError::InvalidNpy(format!(
                "expected a 3D tensor, got shape {:?}",
                header.shape
            )));
        }
        let expected = header.data_offset + header.element_count() * header.dtype.size();
        if mmap.len() < expected {
            return Err(ViewCostError::InvalidNpy(format!(
                "file truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    pub fn shape(&self) -> &[usize] {
        &self.header.shape
    }

    pub fn table_count(&self) -> usize {
        self.header.shape[0]
    }

    /// Zero-copy view of table `index`.
    pub fn table(&self, index: usize) -> Result<MappedTable<'_>> {
        let count = self.table_count();
        if index >= count {
            return Err(ViewCostError::FrameIndexOutOfRange {
                index,
                total: count,
            });
        }
        let height = self.header.shape[1];
        let width = self.header.shape[2];
        let stride = height * width * self.header.dtype.size();
        let start = self.header.data_offset + index * stride;
        Ok(MappedTable {
            bytes: &self.mmap[start..start + stride],
            dtype: self.header.dtype,
            height,
            width,
        })
    }
}

/// One table inside a mapped tensor.
pub struct MappedTable<'a> {
    bytes: &'a [u8],
    dtype: NpyDtype,
    height: usize,
    width: usize,
}

impl MappedTable<'_> {
    /// Copy into an owned array.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.height, self.width), |(r, c)| self.value(r, c))
    }
}

impl TableLookup for MappedTable<'_> {
    fn dims(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn value(&self, row: usize, col: usize) -> f64 {
        let size = self.dtype.size();
        let offset = (row * self.width + col) * size;
        let bytes = &self.bytes[offset..offset + size];
        match self.dtype {
            NpyDtype::F32 => f32::read_le(bytes) as f64,
            NpyDtype::F64 => f64::read_le(bytes),
        }
    }
}
