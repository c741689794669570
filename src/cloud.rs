//! Point-cloud record model.
//!
//! A [`RecordCloud`] is an ordered sequence of fixed-size records with named
//! fields, packed into a flat byte buffer with little-endian scalars. The
//! planner consumes clouds carrying a position run (`x,y,z`) and a normal
//! run (`normal_x,normal_y,normal_z`), and publishes diagnostic copies with
//! per-point label and cost fields appended.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{PlannerError, Result};

/// Scalar type of a cloud field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    U8,
    F32,
}

impl FieldType {
    /// Size of one scalar in bytes.
    pub fn size(self) -> usize {
        match self {
            FieldType::U8 => 1,
            FieldType::F32 => 4,
        }
    }
}

/// A named field inside each record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointField {
    pub name: String,
    /// Byte offset of the field inside a record.
    pub offset: usize,
    pub datatype: FieldType,
}

/// An ordered point cloud with named per-record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCloud {
    pub frame_id: String,
    /// Seconds since the Unix epoch.
    pub stamp: f64,
    pub width: usize,
    pub height: usize,
    pub fields: Vec<PointField>,
    /// Byte stride of one record.
    pub point_step: usize,
    /// Byte stride of one row; must equal `point_step * width`.
    pub row_step: usize,
    pub data: Vec<u8>,
}

/// Current wall time as f64 epoch seconds.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl RecordCloud {
    /// Build a cloud with the standard `x,y,z,normal_x,normal_y,normal_z`
    /// layout from position and normal triples.
    pub fn from_points(
        frame_id: &str,
        stamp: f64,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
    ) -> Self {
        let names = ["x", "y", "z", "normal_x", "normal_y", "normal_z"];
        let fields = names
            .iter()
            .enumerate()
            .map(|(i, name)| PointField {
                name: name.to_string(),
                offset: i * 4,
                datatype: FieldType::F32,
            })
            .collect();

        let n = positions.len().min(normals.len());
        let point_step = 24;
        let mut data = Vec::with_capacity(n * point_step);
        for i in 0..n {
            for c in 0..3 {
                data.extend_from_slice(&positions[i][c].to_le_bytes());
            }
            for c in 0..3 {
                data.extend_from_slice(&normals[i][c].to_le_bytes());
            }
        }

        Self {
            frame_id: frame_id.to_string(),
            stamp,
            width: n,
            height: 1,
            fields,
            point_step,
            row_step: point_step * n,
            data,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Check if the cloud has no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&PointField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Verify the records are packed: row stride must equal
    /// `point_step * width` and the buffer must cover all rows.
    pub fn check_layout(&self) -> Result<()> {
        if self.row_step != self.point_step * self.width {
            return Err(PlannerError::InputInvalid(format!(
                "row step {} does not match point step {} x width {}",
                self.row_step, self.point_step, self.width
            )));
        }
        if self.data.len() != self.row_step * self.height {
            return Err(PlannerError::InputInvalid(format!(
                "data length {} does not match {} rows of {} bytes",
                self.data.len(),
                self.height,
                self.row_step
            )));
        }
        Ok(())
    }

    /// Resolve `name` as the start of a run of three f32 scalars inside
    /// each record.
    pub fn float3_run(&self, name: &str) -> Result<&PointField> {
        let field = self
            .field(name)
            .ok_or_else(|| PlannerError::InputInvalid(format!("missing field {}", name)))?;
        if field.datatype != FieldType::F32 {
            return Err(PlannerError::InputInvalid(format!(
                "field {} has unsupported type {:?}",
                name, field.datatype
            )));
        }
        if field.offset + 12 > self.point_step {
            return Err(PlannerError::InputInvalid(format!(
                "field {} run of three floats exceeds record stride",
                name
            )));
        }
        Ok(field)
    }

    /// Copy a run of three f32 scalars out of every record into a
    /// contiguous array.
    pub fn extract_vec3(&self, name: &str) -> Result<Vec<[f32; 3]>> {
        let field = self.float3_run(name)?;
        let offset = field.offset;
        let mut out = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            let base = i * self.point_step + offset;
            let mut v = [0.0_f32; 3];
            for (c, slot) in v.iter_mut().enumerate() {
                *slot = read_f32(&self.data, base + c * 4);
            }
            out.push(v);
        }
        Ok(out)
    }

    /// Copy a scalar f32 field out of every record.
    pub fn extract_f32(&self, name: &str) -> Result<Vec<f32>> {
        let field = self.typed_field(name, FieldType::F32)?;
        let offset = field.offset;
        Ok((0..self.len())
            .map(|i| read_f32(&self.data, i * self.point_step + offset))
            .collect())
    }

    /// Copy a scalar u8 field out of every record.
    pub fn extract_u8(&self, name: &str) -> Result<Vec<u8>> {
        let field = self.typed_field(name, FieldType::U8)?;
        let offset = field.offset;
        Ok((0..self.len())
            .map(|i| self.data[i * self.point_step + offset])
            .collect())
    }

    /// Write one u8 per record into an existing field.
    pub fn fill_u8(&mut self, name: &str, values: &[u8]) -> Result<()> {
        let offset = self.typed_field(name, FieldType::U8)?.offset;
        self.check_fill_len(name, values.len())?;
        for (i, &v) in values.iter().enumerate() {
            self.data[i * self.point_step + offset] = v;
        }
        Ok(())
    }

    /// Write one f32 per record into an existing field.
    pub fn fill_f32(&mut self, name: &str, values: &[f32]) -> Result<()> {
        let offset = self.typed_field(name, FieldType::F32)?.offset;
        self.check_fill_len(name, values.len())?;
        for (i, &v) in values.iter().enumerate() {
            let base = i * self.point_step + offset;
            self.data[base..base + 4].copy_from_slice(&v.to_le_bytes());
        }
        Ok(())
    }

    fn typed_field(&self, name: &str, datatype: FieldType) -> Result<&PointField> {
        let field = self
            .field(name)
            .ok_or_else(|| PlannerError::InputInvalid(format!("missing field {}", name)))?;
        if field.datatype != datatype {
            return Err(PlannerError::InputInvalid(format!(
                "field {} has unsupported type {:?}",
                name, field.datatype
            )));
        }
        Ok(field)
    }

    fn check_fill_len(&self, name: &str, len: usize) -> Result<()> {
        if len != self.len() {
            return Err(PlannerError::InputInvalid(format!(
                "{} values for field {} in cloud of {} records",
                len,
                name,
                self.len()
            )));
        }
        Ok(())
    }
}

/// Names of the per-point diagnostic fields, in record order.
pub const DIAGNOSTIC_FIELDS: [(&str, FieldType); 5] = [
    ("normal_label", FieldType::U8),
    ("final_label", FieldType::U8),
    ("path_cost", FieldType::F32),
    ("utility", FieldType::F32),
    ("final_cost", FieldType::F32),
];

/// Copy a cloud and append the diagnostic fields to every record.
///
/// Labels initialize to `Unknown` and floats to NaN until a plan stage
/// fills them.
pub fn with_diagnostic_fields(cloud: &RecordCloud) -> RecordCloud {
    let mut fields = cloud.fields.clone();
    let mut offset = cloud.point_step;
    for (name, datatype) in DIAGNOSTIC_FIELDS {
        fields.push(PointField {
            name: name.to_string(),
            offset,
            datatype,
        });
        offset += datatype.size();
    }
    let point_step = offset;

    let n = cloud.len();
    let mut data = Vec::with_capacity(n * point_step);
    let nan = f32::NAN.to_le_bytes();
    for i in 0..n {
        let base = i * cloud.point_step;
        data.extend_from_slice(&cloud.data[base..base + cloud.point_step]);
        data.push(crate::planning::Label::Unknown.as_u8());
        data.push(crate::planning::Label::Unknown.as_u8());
        for _ in 0..3 {
            data.extend_from_slice(&nan);
        }
    }

    RecordCloud {
        frame_id: cloud.frame_id.clone(),
        stamp: cloud.stamp,
        width: cloud.width,
        height: cloud.height,
        fields,
        point_step,
        row_step: point_step * cloud.width,
        data,
    }
}

#[inline]
fn read_f32(data: &[u8], offset: usize) -> f32 {
    let mut bytes = [0_u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    f32::from_le_bytes(bytes)
}
