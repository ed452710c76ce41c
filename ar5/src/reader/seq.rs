//! Lecture d'une couche GeoJSON délimitée par lignes

use geojson::GeoJson;
use memchr::memchr_iter;

use super::LayerBuilder;
use crate::types::{Layer, LoadOptions};
use crate::Ar5Error;

/// Séparateur d'enregistrement RFC 8142
const RECORD_SEPARATOR: char = '\u{1e}';

/// Parse une couche contenant une feature par ligne
pub fn parse(name: &str, text: &str, options: &LoadOptions) -> Result<Layer, Ar5Error> {
    let mut builder = LayerBuilder::new(name, options);
    let bytes = text.as_bytes();

    let mut start = 0;
    let ends = memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len()));

    for (line_no, end) in ends.enumerate() {
        let record = text[start..end]
            .trim()
            .trim_start_matches(RECORD_SEPARATOR)
            .trim();
        start = end + 1;

        if record.is_empty() {
            continue;
        }

        let geojson: GeoJson = record.parse().map_err(|e: geojson::Error| {
            Ar5Error::parse_error(format!("{}:{}", name, line_no + 1), e.to_string())
        })?;

        match geojson {
            GeoJson::Feature(feature) => builder.push(feature),
            _ => {
                return Err(Ar5Error::parse_error(
                    format!("{}:{}", name, line_no + 1),
                    "expected a Feature",
                ))
            }
        }
    }

    Ok(builder.finish(options.default_epsg))
}
