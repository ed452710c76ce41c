//! Export des morceaux de recouvrement en GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use ar5::summary::round2;
use ar5::Overlap;
use geo::Geometry;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

/// Exporte les recouvrements dans une FeatureCollection
pub fn export_overlaps(overlaps: &[Overlap<'_>], epsg: u32, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_collection(&mut writer, overlaps, epsg)?;
    writer.flush()?;

    Ok(())
}

/// Écrit la FeatureCollection complète, avec le membre `crs`
pub fn write_collection<W: Write>(writer: &mut W, overlaps: &[Overlap<'_>], epsg: u32) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::{}"}}}},"features":["#,
        epsg
    )?;

    for (i, overlap) in overlaps.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_overlap(writer, overlap)?;
    }

    write!(writer, "]}}")?;
    Ok(())
}

/// Écrit un recouvrement en GeoJSON
fn write_overlap<W: Write>(writer: &mut W, overlap: &Overlap<'_>) -> Result<()> {
    let feature = overlap.feature;

    write!(
        writer,
        r#"{{"type":"Feature","id":"{}","#,
        escape_json(&feature.id)
    )?;

    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::MultiPolygon(overlap.geometry.clone()).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(
        writer,
        r#","properties":{{"code":"{}","name":"{}","layer":"{}","area":{}}}}}"#,
        escape_json(&feature.code),
        escape_json(&overlap.name),
        escape_json(&feature.layer),
        round2(overlap.area)
    )?;

    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
