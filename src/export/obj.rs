//! Wavefront OBJ serialization of a single geometry.
//!
//! Only positions (`v`) and triangles (`f`) are written. Face indices are
//! 1-based.

use itertools::Itertools;
use std::io::{self, Write};

use crate::scene_graph::BufferGeometry;

pub const OBJ_HEADER: &str = "# OBJ File";

/// Writes `geometry` as OBJ text. A geometry without positions produces only
/// the header.
pub fn write_obj<W: Write>(geometry: &BufferGeometry, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{OBJ_HEADER}")?;

    let Some(positions) = &geometry.position else {
        return Ok(());
    };

    for v in positions {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    match &geometry.index {
        Some(index) => {
            // A trailing partial triple is dropped. Widened so u32::MAX stays exact.
            for (&a, &b, &c) in index.iter().tuples() {
                let (a, b, c) = (u64::from(a), u64::from(b), u64::from(c));
                writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
            }
        }
        None => {
            // Numbered by position in the vertex array, even past its end
            for i in (0..positions.len()).step_by(3) {
                writeln!(writer, "f {} {} {}", i + 1, i + 2, i + 3)?;
            }
        }
    }

    Ok(())
}

/// Serializes the geometry of mesh `name`, or returns `None` after a warning
/// when there is nothing exportable.
pub fn mesh_to_obj(name: &str, geometry: Option<&BufferGeometry>) -> Option<Vec<u8>> {
    let Some(geometry) = geometry.filter(|g| g.position.is_some()) else {
        log::warn!("Mesh {name} has no valid geometry");
        return None;
    };

    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    write_obj(geometry, &mut buf).ok()?;
    Some(buf)
}
