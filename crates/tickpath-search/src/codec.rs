//! Binary persistence for [`GoalBounds`] tables.
//!
//! Preprocessing costs one flood fill per walkable cell, so tables are
//! worth saving between runs on the same map.
//!
//! ## Wire format
//!
//! All integers are little-endian.
//! ```text
//! [magic: b"GBND"]
//! [version: u16]           (currently 1)
//! [width: i32] [height: i32]
//! [fingerprint: u64]
//! [count: u32]
//! for each record:
//!   [x: i32] [y: i32] [direction: u8]
//!   [min_x: i32] [max_x: i32] [min_y: i32] [max_y: i32]
//! ```
//! Direction bytes are 0 = up, 1 = down, 2 = left, 3 = right.

use std::io::{self, Read, Write};

use tickpath_core::Point;

use crate::error::GoalBoundsError;
use crate::goalbound::{BoundBox, BoundRecord, Direction, GoalBounds, table_cells};

const MAGIC: &[u8; 4] = b"GBND";
const VERSION: u16 = 1;

/// Writes [`GoalBounds`] tables to a byte-oriented writer.
pub struct BoundsEncoder<W: Write> {
    writer: W,
}

impl<W: Write> BoundsEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn encode(&mut self, table: &GoalBounds) -> io::Result<()> {
        let count = u32::try_from(table.records().count())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many goal-bound records"))?;

        self.writer.write_all(MAGIC)?;
        self.writer.write_all(&VERSION.to_le_bytes())?;
        self.writer.write_all(&table.width().to_le_bytes())?;
        self.writer.write_all(&table.height().to_le_bytes())?;
        self.writer.write_all(&table.fingerprint().to_le_bytes())?;
        self.writer.write_all(&count.to_le_bytes())?;

        for r in table.records() {
            self.writer.write_all(&r.source.x.to_le_bytes())?;
            self.writer.write_all(&r.source.y.to_le_bytes())?;
            self.writer.write_all(&[r.direction.index() as u8])?;
            self.writer.write_all(&r.bounds.min_x.to_le_bytes())?;
            self.writer.write_all(&r.bounds.max_x.to_le_bytes())?;
            self.writer.write_all(&r.bounds.min_y.to_le_bytes())?;
            self.writer.write_all(&r.bounds.max_y.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads [`GoalBounds`] tables from a byte-oriented reader.
pub struct BoundsDecoder<R: Read> {
    reader: R,
}

impl<R: Read> BoundsDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read one table. Malformed content, including a header claiming more
    /// than [`MAX_TABLE_CELLS`](crate::MAX_TABLE_CELLS) cells, is reported
    /// as [`GoalBoundsError::Corrupt`], truncated input as
    /// [`GoalBoundsError::Io`].
    pub fn decode(&mut self) -> Result<GoalBounds, GoalBoundsError> {
        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(GoalBoundsError::Corrupt("bad magic".into()));
        }
        let version = u16::from_le_bytes(self.array()?);
        if version != VERSION {
            return Err(GoalBoundsError::Corrupt(format!("unsupported version {version}")));
        }
        let width = self.i32()?;
        let height = self.i32()?;
        let fingerprint = u64::from_le_bytes(self.array()?);
        let count = u32::from_le_bytes(self.array()?) as usize;

        let cells = table_cells(width, height)?;
        if count > cells * 4 {
            return Err(GoalBoundsError::Corrupt(format!(
                "{count} records for a {width}x{height} map"
            )));
        }

        // Grown as records arrive so a lying count cannot force a large
        // allocation before the input runs out.
        let mut records = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let source = Point::new(self.i32()?, self.i32()?);
            let [dir] = self.array()?;
            let direction = Direction::from_index(dir)
                .ok_or_else(|| GoalBoundsError::Corrupt(format!("unknown direction {dir}")))?;
            let bounds = BoundBox {
                min_x: self.i32()?,
                max_x: self.i32()?,
                min_y: self.i32()?,
                max_y: self.i32()?,
            };
            records.push(BoundRecord {
                source,
                direction,
                bounds,
            });
        }
        GoalBounds::from_records(width, height, fingerprint, records)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn i32(&mut self) -> io::Result<i32> {
        self.array().map(i32::from_le_bytes)
    }
}
