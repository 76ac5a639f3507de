//! Safetensors storage for [`Table`]s.
//!
//! A table is stored as one 1-D tensor per column, written in column order
//! (the reader restores that order from the data offsets).  Table metadata
//! goes into the standard `__metadata__` string map.
//!
//! The reader accepts `F64`, `F32`, `I64`, `I32`, `U8` and `BOOL` tensors and
//! widens everything to `f64`; the writer always emits `F64`.
use anyhow::{bail, Context, Result};
use ndarray::Array1;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::table::Table;

const METADATA_KEY: &str = "__metadata__";

// ── Low-level safetensors parsing (raw bytes → columns). ────────────────────

fn parse_header(bytes: &[u8]) -> Result<(serde_json::Map<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let n = u64::from_le_bytes(bytes[..8].try_into()?);
    let end = usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_add(8))
        .filter(|&end| end <= bytes.len())
        .with_context(|| format!("safetensors header length {n} exceeds file size"))?;
    let header: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes[8..end]).context("failed to parse safetensors header")?;
    Ok((header, end))
}

fn offsets_of(name: &str, entry: &serde_json::Value) -> Result<(usize, usize)> {
    let offsets = entry["data_offsets"]
        .as_array()
        .with_context(|| format!("tensor '{name}': missing data_offsets"))?;
    let get = |i: usize| {
        offsets
            .get(i)
            .and_then(|v| v.as_u64())
            .and_then(|v| usize::try_from(v).ok())
            .with_context(|| format!("tensor '{name}': bad data_offsets"))
    };
    Ok((get(0)?, get(1)?))
}

fn shape_of(name: &str, entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .with_context(|| format!("tensor '{name}': missing shape"))?
        .iter()
        .map(|v| {
            v.as_u64()
                .map(|v| v as usize)
                .with_context(|| format!("tensor '{name}': bad shape"))
        })
        .collect()
}

fn decode(name: &str, dtype: &str, raw: &[u8]) -> Result<Vec<f64>> {
    Ok(match dtype {
        "F64" => raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect(),
        "F32" => raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect(),
        "I64" => raw
            .chunks_exact(8)
            .map(|b| i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f64)
            .collect(),
        "I32" => raw
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect(),
        "U8" | "BOOL" => raw.iter().map(|&b| b as f64).collect(),
        other => bail!("tensor '{name}': unsupported dtype {other}"),
    })
}

/// Parse a table from the bytes of a safetensors file.
pub fn parse_table(bytes: &[u8]) -> Result<Table> {
    let (header, data_start) = parse_header(bytes)?;

    let mut entries = Vec::new();
    let mut metadata = BTreeMap::new();
    for (name, entry) in &header {
        if name == METADATA_KEY {
            if let Some(map) = entry.as_object() {
                for (k, v) in map {
                    if let Some(v) = v.as_str() {
                        metadata.insert(k.clone(), v.to_string());
                    }
                }
            }
            continue;
        }
        let (s, e) = offsets_of(name, entry)?;
        entries.push((s, e, name, entry));
    }
    entries.sort_by_key(|&(s, _, _, _)| s);

    let mut table = Table::new();
    for (s, e, name, entry) in entries {
        let shape = shape_of(name, entry)?;
        if shape.len() != 1 {
            bail!("tensor '{name}': expected a 1-D column, got shape {shape:?}");
        }
        let raw = data_start
            .checked_add(s)
            .zip(data_start.checked_add(e))
            .and_then(|(s, e)| bytes.get(s..e))
            .with_context(|| format!("tensor '{name}': data out of bounds"))?;
        let dtype = entry["dtype"]
            .as_str()
            .with_context(|| format!("tensor '{name}': missing dtype"))?;
        let values = decode(name, dtype, raw)?;
        if values.len() != shape[0] {
            bail!("tensor '{name}': {} values for shape {shape:?}", values.len());
        }
        table.push_column(name.as_str(), Array1::from(values))?;
    }
    table.metadata = metadata;
    Ok(table)
}

/// Read a table from a safetensors file.
pub fn read_table(path: &Path) -> Result<Table> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_table(&bytes).with_context(|| format!("decoding {}", path.display()))
}

/// Write `table` as a safetensors file with one `F64` tensor per column.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let mut header_map = serde_json::Map::new();
    if !table.metadata.is_empty() {
        header_map.insert(METADATA_KEY.into(), serde_json::json!(table.metadata));
    }
    let mut offset: usize = 0;
    for (name, values) in table.iter() {
        let len = values.len() * 8;
        header_map.insert(
            name.to_string(),
            serde_json::json!({
                "dtype": "F64",
                "shape": [values.len()],
                "data_offsets": [offset, offset + len],
            }),
        );
        offset += len;
    }

    let header_bytes = serde_json::to_vec(&header_map)?;
    let pad = (8 - header_bytes.len() % 8) % 8;
    let header_padded: Vec<u8> = header_bytes
        .into_iter()
        .chain(std::iter::repeat(b' ').take(pad))
        .collect();

    let mut f = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    f.write_all(&(header_padded.len() as u64).to_le_bytes())?;
    f.write_all(&header_padded)?;
    for (_, values) in table.iter() {
        for v in values.iter() {
            f.write_all(&v.to_le_bytes())?;
        }
    }
    f.flush()?;
    Ok(())
}
