//! PCD (Point Cloud Data) reader.
//!
//! Reads the `x`, `y`, `z` fields of `DATA ascii` and `DATA binary` files.
//! Other fields are skipped; points with non-finite coordinates are dropped.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use super::PointCloud;

// Upper bound on the up-front allocation; larger clouds grow as data arrives
const MAX_PREALLOC_POINTS: usize = 1 << 20;

//
// ──────────────────────────────────────────────────────────────
//   Errors
// ──────────────────────────────────────────────────────────────
//

#[derive(Error, Debug)]
pub enum CloudError
{
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Invalid PCD header: {0}")]
  Header(String),

  #[error("PCD file has no `{0}` field")]
  MissingField(&'static str),

  #[error("Unsupported PCD data encoding: {0}")]
  Unsupported(String),

  #[error("Parse error on line {line}: {message}")]
  Parse
  {
    line: usize, message: String
  },

  #[error("Truncated PCD data: expected {expected} points, found {found}")]
  Truncated
  {
    expected: usize, found: usize
  },
}

//
// ──────────────────────────────────────────────────────────────
//   Header
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEncoding
{
  Ascii,
  Binary,
  BinaryCompressed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field
{
  pub name: String,
  pub size: usize,
  pub kind: char,
  pub count: usize,
}

#[derive(Debug, Clone)]
pub struct Header
{
  pub version: Option<String>,
  pub fields: Vec<Field>,
  pub points: usize,
  pub encoding: DataEncoding,
  stride: usize,
}

/// Where one scalar coordinate lives inside a point record.
#[derive(Debug, Clone, Copy)]
struct Slot
{
  value_index: usize,
  byte_offset: usize,
  size: usize,
}

impl Header
{
  fn values_per_point(&self) -> usize
  {
    self.fields.iter().map(|f| f.count).sum()
  }

  fn bytes_per_point(&self) -> usize
  {
    self.stride
  }

  fn locate(&self, name: &'static str) -> Result<Slot, CloudError>
  {
    let mut value_index = 0;
    let mut byte_offset = 0;

    for field in &self.fields
    {
      if field.name == name
      {
        if field.kind != 'F' || !(field.size == 4 || field.size == 8) || field.count != 1
        {
          return Err(CloudError::Header(format!(
            "field `{}` must be a single F4 or F8 value, found {}{} x{}",
            name, field.kind, field.size, field.count
          )));
        }

        return Ok(Slot { value_index, byte_offset, size: field.size });
      }

      value_index += field.count;
      byte_offset += field.size * field.count;
    }

    Err(CloudError::MissingField(name))
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Public API
// ──────────────────────────────────────────────────────────────
//

pub fn read_file(path: &Path) -> Result<PointCloud, CloudError>
{
  let file = File::open(path)?;
  read(&mut BufReader::new(file))
}

pub fn read<R: BufRead>(reader: &mut R) -> Result<PointCloud, CloudError>
{
  let (header, header_lines) = read_header(reader)?;
  let slots = [header.locate("x")?, header.locate("y")?, header.locate("z")?];

  log::debug!(
    "pcd header: version={:?} fields={} points={} encoding={:?}",
    header.version,
    header.fields.len(),
    header.points,
    header.encoding
  );

  let points = match header.encoding
  {
    DataEncoding::Ascii => read_ascii(reader, &header, &slots, header_lines)?,
    DataEncoding::Binary => read_binary(reader, &header, &slots)?,
    DataEncoding::BinaryCompressed =>
    {
      return Err(CloudError::Unsupported("binary_compressed".to_string()));
    }
  };

  let dropped = header.points.saturating_sub(points.len());
  if dropped > 0
  {
    log::debug!("dropped {} points with non-finite coordinates", dropped);
  }

  Ok(PointCloud::from_points(points))
}

//
// ──────────────────────────────────────────────────────────────
//   Header parsing
// ──────────────────────────────────────────────────────────────
//

fn read_header<R: BufRead>(reader: &mut R) -> Result<(Header, usize), CloudError>
{
  let mut version = None;
  let mut names: Vec<String> = Vec::new();
  let mut sizes: Vec<usize> = Vec::new();
  let mut kinds: Vec<char> = Vec::new();
  let mut counts: Vec<usize> = Vec::new();
  let mut width = None;
  let mut height = None;
  let mut points = None;

  let mut line = String::new();
  let mut line_no = 0;

  let encoding = loop
  {
    line.clear();
    if reader.read_line(&mut line)? == 0
    {
      return Err(CloudError::Header("missing DATA line".to_string()));
    }
    line_no += 1;

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#')
    {
      continue;
    }

    let mut parts = trimmed.split_whitespace();
    let key = parts.next().unwrap_or_default();
    let values: Vec<&str> = parts.collect();

    match key
    {
      "VERSION" => version = values.first().map(|v| v.to_string()),
      "FIELDS" => names = values.iter().map(|v| v.to_string()).collect(),
      "SIZE" => sizes = parse_list(key, &values)?,
      "TYPE" => kinds = values.iter().map(|v| v.chars().next().unwrap_or('?')).collect(),
      "COUNT" => counts = parse_list(key, &values)?,
      "WIDTH" => width = Some(parse_one(key, &values)?),
      "HEIGHT" => height = Some(parse_one(key, &values)?),
      "POINTS" => points = Some(parse_one(key, &values)?),
      "VIEWPOINT" =>
      {}
      "DATA" =>
      {
        break match values.first().copied()
        {
          Some("ascii") => DataEncoding::Ascii,
          Some("binary") => DataEncoding::Binary,
          Some("binary_compressed") => DataEncoding::BinaryCompressed,
          other => return Err(CloudError::Unsupported(other.unwrap_or("<none>").to_string())),
        };
      }
      other => log::debug!("ignoring PCD header key {}", other),
    }
  };

  if names.is_empty()
  {
    return Err(CloudError::Header("missing FIELDS".to_string()));
  }

  let fields = build_fields(names, sizes, kinds, counts)?;

  let stride = record_size(&fields)?;

  let points = match (points, width)
  {
    (Some(p), _) => p,
    (None, Some(w)) => w
      .checked_mul(height.unwrap_or(1))
      .ok_or_else(|| CloudError::Header("WIDTH x HEIGHT overflows".to_string()))?,
    (None, None) => return Err(CloudError::Header("missing POINTS and WIDTH".to_string())),
  };

  Ok((Header { version, fields, points, encoding, stride }, line_no))
}

/// Bytes in one binary record. Every field must be at least one byte wide,
/// so offsets and value counts derived from the fields stay below this.
fn record_size(fields: &[Field]) -> Result<usize, CloudError>
{
  fields.iter().try_fold(0_usize, |total, f| {
    if f.size == 0
    {
      return Err(CloudError::Header(format!("field `{}` has SIZE 0", f.name)));
    }

    f.size
      .checked_mul(f.count)
      .and_then(|bytes| total.checked_add(bytes))
      .ok_or_else(|| CloudError::Header(format!("field `{}` is too large", f.name)))
  })
}

fn build_fields(
  names: Vec<String>,
  sizes: Vec<usize>,
  kinds: Vec<char>,
  counts: Vec<usize>,
) -> Result<Vec<Field>, CloudError>
{
  let n = names.len();

  for (key, len) in [("SIZE", sizes.len()), ("TYPE", kinds.len()), ("COUNT", counts.len())]
  {
    if len != 0 && len != n
    {
      return Err(CloudError::Header(format!("{} has {} entries for {} fields", key, len, n)));
    }
  }

  let fields = names
    .into_iter()
    .enumerate()
    .map(|(i, name)| Field {
      name,
      size: sizes.get(i).copied().unwrap_or(4),
      kind: kinds.get(i).copied().unwrap_or('F'),
      count: counts.get(i).copied().unwrap_or(1),
    })
    .collect();

  Ok(fields)
}

fn parse_one(key: &str, values: &[&str]) -> Result<usize, CloudError>
{
  match values
  {
    [value] => value
      .parse()
      .map_err(|_| CloudError::Header(format!("invalid {} value: {}", key, value))),
    _ => Err(CloudError::Header(format!("{} expects one value", key))),
  }
}

fn parse_list(key: &str, values: &[&str]) -> Result<Vec<usize>, CloudError>
{
  values
    .iter()
    .map(|v| v.parse().map_err(|_| CloudError::Header(format!("invalid {} value: {}", key, v))))
    .collect()
}

//
// ──────────────────────────────────────────────────────────────
//   Point data
// ──────────────────────────────────────────────────────────────
//

fn read_ascii<R: BufRead>(
  reader: &mut R,
  header: &Header,
  slots: &[Slot; 3],
  header_lines: usize,
) -> Result<Vec<[f32; 3]>, CloudError>
{
  let per_point = header.values_per_point();
  let mut points = Vec::with_capacity(header.points.min(MAX_PREALLOC_POINTS));
  let mut rows = 0;
  let mut line_no = header_lines;
  let mut line = String::new();

  while rows < header.points
  {
    line.clear();
    if reader.read_line(&mut line)? == 0
    {
      break;
    }
    line_no += 1;

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty()
    {
      continue;
    }

    if tokens.len() < per_point
    {
      return Err(CloudError::Parse {
        line: line_no,
        message: format!("expected {} values, found {}", per_point, tokens.len()),
      });
    }

    let mut xyz = [0.0_f64; 3];
    for (value, slot) in xyz.iter_mut().zip(slots)
    {
      let token = tokens[slot.value_index];
      *value = token.parse().map_err(|_| CloudError::Parse {
        line: line_no,
        message: format!("not a number: {}", token),
      })?;
    }

    rows += 1;
    push_finite(&mut points, xyz);
  }

  if rows < header.points
  {
    return Err(CloudError::Truncated { expected: header.points, found: rows });
  }

  Ok(points)
}

fn read_binary<R: BufRead>(
  reader: &mut R,
  header: &Header,
  slots: &[Slot; 3],
) -> Result<Vec<[f32; 3]>, CloudError>
{
  let stride = header.bytes_per_point();
  let expected = stride
    .checked_mul(header.points)
    .ok_or_else(|| CloudError::Header(format!("{} points of {} bytes overflow", header.points, stride)))?;

  let mut data = Vec::with_capacity(expected.min(MAX_PREALLOC_POINTS.saturating_mul(stride)));
  reader.by_ref().take(expected as u64).read_to_end(&mut data)?;

  if data.len() < expected
  {
    return Err(CloudError::Truncated { expected: header.points, found: data.len() / stride.max(1) });
  }

  let mut points = Vec::with_capacity(header.points.min(MAX_PREALLOC_POINTS));

  for record in data.chunks_exact(stride)
  {
    let mut xyz = [0.0_f64; 3];
    for (value, slot) in xyz.iter_mut().zip(slots)
    {
      let bytes = &record[slot.byte_offset..slot.byte_offset + slot.size];
      *value = match slot.size
      {
        4 => f64::from(LittleEndian::read_f32(bytes)),
        _ => LittleEndian::read_f64(bytes),
      };
    }

    push_finite(&mut points, xyz);
  }

  Ok(points)
}

fn push_finite(points: &mut Vec<[f32; 3]>, xyz: [f64; 3])
{
  if xyz.iter().all(|v| v.is_finite())
  {
    points.push([xyz[0] as f32, xyz[1] as f32, xyz[2] as f32]);
  }
}

#[cfg(test)]
mod tests
{
  use super::*;
  use byteorder::WriteBytesExt;
  use std::io::Cursor;

  const ASCII_XYZ_RGB: &str = "\
# .PCD v0.7 - Point Cloud Data file format
VERSION 0.7
FIELDS x y z rgb
SIZE 4 4 4 4
TYPE F F F U
COUNT 1 1 1 1
WIDTH 3
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 3
DATA ascii
1.0 2.0 3.0 4278190080
-0.5 0 10 4278190080
nan nan nan 0
";

  fn binary_header(fields: &str, size: &str, types: &str, points: usize) -> Vec<u8>
  {
    format!(
      "VERSION .7\nFIELDS {}\nSIZE {}\nTYPE {}\nWIDTH {}\nHEIGHT 1\nPOINTS {}\nDATA binary\n",
      fields, size, types, points, points
    )
    .into_bytes()
  }

  #[test]
  fn reads_ascii_and_drops_nan_points()
  {
    let cloud = read(&mut Cursor::new(ASCII_XYZ_RGB)).unwrap();

    assert_eq!(cloud.points, vec![[1.0, 2.0, 3.0], [-0.5, 0.0, 10.0]]);
  }

  #[test]
  fn ascii_fields_may_come_in_any_order()
  {
    let text = "FIELDS intensity z y x\nPOINTS 1\nDATA ascii\n7 3 2 1\n";
    let cloud = read(&mut Cursor::new(text)).unwrap();

    assert_eq!(cloud.points, vec![[1.0, 2.0, 3.0]]);
  }

  #[test]
  fn reads_binary_f32_records_with_extra_fields()
  {
    let mut bytes = binary_header("x y z intensity", "4 4 4 2", "F F F U", 2);
    for (p, intensity) in [([1.5_f32, -2.0, 0.25], 9_u16), ([4.0, 5.0, 6.0], 10)]
    {
      for v in p
      {
        bytes.write_f32::<LittleEndian>(v).unwrap();
      }
      bytes.write_u16::<LittleEndian>(intensity).unwrap();
    }

    let cloud = read(&mut Cursor::new(bytes)).unwrap();

    assert_eq!(cloud.points, vec![[1.5, -2.0, 0.25], [4.0, 5.0, 6.0]]);
  }

  #[test]
  fn reads_binary_f64_coordinates()
  {
    let mut bytes = binary_header("x y z", "8 8 8", "F F F", 1);
    for v in [0.125_f64, 1e3, -7.5]
    {
      bytes.write_f64::<LittleEndian>(v).unwrap();
    }

    let cloud = read(&mut Cursor::new(bytes)).unwrap();

    assert_eq!(cloud.points, vec![[0.125, 1000.0, -7.5]]);
  }

  #[test]
  fn truncated_binary_is_reported()
  {
    let mut bytes = binary_header("x y z", "4 4 4", "F F F", 3);
    for v in [1.0_f32, 2.0, 3.0, 4.0]
    {
      bytes.write_f32::<LittleEndian>(v).unwrap();
    }

    let err = read(&mut Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, CloudError::Truncated { expected: 3, found: 1 }));
  }

  #[test]
  fn truncated_ascii_is_reported()
  {
    let text = "FIELDS x y z\nPOINTS 4\nDATA ascii\n1 2 3\n4 5 6\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::Truncated { expected: 4, found: 2 }));
  }

  #[test]
  fn oversized_ascii_point_count_is_truncation_not_allocation()
  {
    let text = "FIELDS x y z\nPOINTS 100000000000000\nDATA ascii\n1 2 3\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::Truncated { expected: 100000000000000, found: 1 }));
  }

  #[test]
  fn oversized_binary_point_count_is_truncation_not_allocation()
  {
    let mut bytes = binary_header("x y z", "4 4 4", "F F F", 100000000000000);
    for v in [1.0_f32, 2.0, 3.0]
    {
      bytes.write_f32::<LittleEndian>(v).unwrap();
    }

    let err = read(&mut Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, CloudError::Truncated { expected: 100000000000000, found: 1 }));
  }

  #[test]
  fn binary_size_overflow_is_a_header_error()
  {
    let bytes = binary_header("x y z", "4 4 4", "F F F", 2000000000000000000);
    let err = read(&mut Cursor::new(bytes)).unwrap_err();

    assert!(matches!(err, CloudError::Header(_)));
  }

  #[test]
  fn width_times_height_overflow_is_a_header_error()
  {
    let text = "FIELDS x y z\nWIDTH 18446744073709551615\nHEIGHT 2\nDATA ascii\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::Header(_)));
  }

  #[test]
  fn zero_sized_field_is_rejected()
  {
    let text = "FIELDS x y z pad\nSIZE 4 4 4 0\nTYPE F F F U\nPOINTS 1\nDATA ascii\n1 2 3 0\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::Header(_)));
  }

  #[test]
  fn width_and_height_stand_in_for_points()
  {
    let text = "FIELDS x y z\nWIDTH 2\nHEIGHT 1\nDATA ascii\n1 1 1\n2 2 2\n";
    let cloud = read(&mut Cursor::new(text)).unwrap();

    assert_eq!(cloud.len(), 2);
  }

  #[test]
  fn compressed_data_is_unsupported()
  {
    let text = "FIELDS x y z\nPOINTS 1\nDATA binary_compressed\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::Unsupported(ref e) if e == "binary_compressed"));
  }

  #[test]
  fn missing_coordinate_field()
  {
    let text = "FIELDS x y\nPOINTS 1\nDATA ascii\n1 2\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::MissingField("z")));
  }

  #[test]
  fn integer_coordinates_are_rejected()
  {
    let text = "FIELDS x y z\nSIZE 4 4 4\nTYPE I F F\nPOINTS 1\nDATA ascii\n1 2 3\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::Header(_)));
  }

  #[test]
  fn header_without_data_line()
  {
    let err = read(&mut Cursor::new("FIELDS x y z\nPOINTS 1\n")).unwrap_err();
    assert!(matches!(err, CloudError::Header(_)));
  }

  #[test]
  fn garbage_value_reports_its_line()
  {
    let text = "FIELDS x y z\nPOINTS 2\nDATA ascii\n1 2 3\n4 oops 6\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::Parse { line: 5, .. }));
  }

  #[test]
  fn mismatched_size_list()
  {
    let text = "FIELDS x y z\nSIZE 4 4\nPOINTS 1\nDATA ascii\n1 2 3\n";
    let err = read(&mut Cursor::new(text)).unwrap_err();

    assert!(matches!(err, CloudError::Header(_)));
  }
}
