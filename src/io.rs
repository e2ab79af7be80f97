//! Safetensors I/O for dF/F traces and stimulus segments.
//!
//! Session trace files hold two tensors:
//!
//! ```text
//! timestamps   F64  [T]      frame times in seconds
//! dff          F32  [C, T]   dF/F per cell per frame
//! ```
//!
//! [`write_segments`] stores segmented traces as `<stimulus>/dff` and
//! `<stimulus>/timestamps` pairs, optionally prefixed by a container id.
use std::collections::HashMap;
use std::path::Path;

use ndarray::{Array1, Array2};

use crate::cache::DffTraces;
use crate::epoch::StimulusTraces;
use crate::error::{Error, Result};

// ── Low-level safetensors parser (raw bytes → ndarray, no tensor crate) ──────

fn to_usize(v: u64) -> Result<usize> {
    usize::try_from(v).map_err(|_| Error::Tensor(format!("value {v} does not fit in usize")))
}

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        return Err(Error::Tensor("file too small".into()));
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let n = to_usize(u64::from_le_bytes(len))?;
    let data_start = 8usize
        .checked_add(n)
        .ok_or_else(|| Error::Tensor(format!("header length {n} overflows")))?;
    let header_bytes = bytes
        .get(8..data_start)
        .ok_or_else(|| Error::Tensor(format!("header of {n} bytes truncated")))?;
    let header: HashMap<String, serde_json::Value> = serde_json::from_slice(header_bytes)?;
    Ok((header, data_start))
}

fn entry<'a>(header: &'a HashMap<String, serde_json::Value>, name: &str) -> Result<&'a serde_json::Value> {
    header
        .get(name)
        .ok_or_else(|| Error::Tensor(format!("missing '{name}' tensor")))
}

fn shape_of(entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .ok_or_else(|| Error::Tensor("missing shape".into()))?
        .iter()
        .map(|v| {
            v.as_u64()
                .ok_or_else(|| Error::Tensor(format!("bad shape entry {v}")))
                .and_then(to_usize)
        })
        .collect()
}

fn raw_slice<'a>(
    bytes: &'a [u8],
    data_start: usize,
    entry: &serde_json::Value,
    dtype: &str,
) -> Result<&'a [u8]> {
    let found = entry["dtype"].as_str().unwrap_or("");
    if found != dtype {
        return Err(Error::Tensor(format!("expected {dtype}, found {found:?}")));
    }
    let offsets = entry["data_offsets"]
        .as_array()
        .ok_or_else(|| Error::Tensor("missing data_offsets".into()))?;
    let bound = |i: usize| -> Result<usize> {
        offsets
            .get(i)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| Error::Tensor("bad data_offsets".into()))
            .and_then(to_usize)?
            .checked_add(data_start)
            .ok_or_else(|| Error::Tensor("data_offsets overflow".into()))
    };
    let (s, e) = (bound(0)?, bound(1)?);
    bytes
        .get(s..e)
        .ok_or_else(|| Error::Tensor(format!("data [{s}, {e}) past end of file")))
}

fn read_f32_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f32>> {
    let raw = raw_slice(bytes, data_start, entry, "F32")?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn read_f64_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f64>> {
    let raw = raw_slice(bytes, data_start, entry, "F64")?;
    Ok(raw
        .chunks_exact(8)
        .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
        .collect())
}

// ── Trace files ──────────────────────────────────────────────────────────────

/// Load a session's `timestamps` / `dff` pair.
pub fn read_dff_traces(path: &Path) -> Result<DffTraces> {
    let bytes = std::fs::read(path)?;
    let (header, data_start) = parse_header(&bytes)?;

    let dff_entry = entry(&header, "dff")?;
    let shape = shape_of(dff_entry)?;
    if shape.len() != 2 {
        return Err(Error::Tensor(format!("dff must be 2-D, got shape {shape:?}")));
    }
    let dff = Array2::from_shape_vec((shape[0], shape[1]), read_f32_tensor(&bytes, data_start, dff_entry)?)?;

    let ts_entry = entry(&header, "timestamps")?;
    let ts_shape = shape_of(ts_entry)?;
    if ts_shape.len() != 1 {
        return Err(Error::Tensor(format!("timestamps must be 1-D, got shape {ts_shape:?}")));
    }
    let timestamps = Array1::from(read_f64_tensor(&bytes, data_start, ts_entry)?);

    log::debug!("read {} x {} traces from {}", dff.nrows(), dff.ncols(), path.display());
    DffTraces::new(timestamps, dff)
}

/// Write a session's `timestamps` / `dff` pair.
pub fn write_dff_traces(traces: &DffTraces, path: &Path) -> Result<()> {
    let mut w = StWriter::new();
    w.add_f64_arr1("timestamps", &traces.timestamps);
    w.add_f32_arr2("dff", &traces.dff);
    w.write(path)
}

// ── Generic safetensors builder ──────────────────────────────────────────────

/// Simple safetensors file writer for F32 and F64 tensors.
///
/// ```rust,no_run
/// use ophys::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("signal", &[1.0f32, 2.0, 3.0], &[1, 3]);
/// w.add_f64("times", &[0.0f64, 0.033, 0.066], &[3]);
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f32_arr2(&mut self, name: &str, arr: &Array2<f32>) {
        let data: Vec<f32> = arr.iter().copied().collect();
        self.add_f32(name, &data, &[arr.nrows(), arr.ncols()]);
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    pub fn add_f64_arr1(&mut self, name: &str, arr: &Array1<f64>) {
        let data: Vec<f64> = arr.iter().copied().collect();
        self.add_f64(name, &data, &[arr.len()]);
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

// ── Segment writer ───────────────────────────────────────────────────────────

/// Add every segment of `traces` to `w` under `<prefix><stimulus>/...`.
pub fn add_segments(w: &mut StWriter, prefix: &str, traces: &StimulusTraces) {
    for (stimulus, seg) in traces {
        w.add_f32_arr2(&format!("{prefix}{stimulus}/dff"), &seg.dff);
        w.add_f64_arr1(&format!("{prefix}{stimulus}/timestamps"), &seg.timestamps);
    }
}

/// Write one container's segmented traces.
pub fn write_segments(traces: &StimulusTraces, path: &Path) -> Result<()> {
    let mut w = StWriter::new();
    add_segments(&mut w, "", traces);
    w.write(path)
}
