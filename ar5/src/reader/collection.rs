//! Lecture d'une couche FeatureCollection

use geojson::GeoJson;

use super::{crs, LayerBuilder};
use crate::types::{Layer, LoadOptions};
use crate::Ar5Error;

/// Parse une couche GeoJSON complète
pub fn parse(name: &str, text: &str, options: &LoadOptions) -> Result<Layer, Ar5Error> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| Ar5Error::parse_error(name, e.to_string()))?;

    let mut builder = LayerBuilder::new(name, options);

    match geojson {
        GeoJson::FeatureCollection(collection) => {
            let epsg = match collection
                .foreign_members
                .as_ref()
                .and_then(|members| members.get("crs"))
            {
                Some(member) => crs::epsg_from_member(member)?,
                None => options.default_epsg,
            };

            for feature in collection.features {
                builder.push(feature);
            }
            Ok(builder.finish(epsg))
        }
        GeoJson::Feature(feature) => {
            builder.push(feature);
            Ok(builder.finish(options.default_epsg))
        }
        GeoJson::Geometry(_) => Err(Ar5Error::UnsupportedFormat(format!(
            "{}: a bare geometry is not a layer",
            name
        ))),
    }
}
