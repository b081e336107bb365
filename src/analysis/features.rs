//! GeoJSON point features for the map layer.

use crate::models::Record;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

/// Build one point feature per record, in input order.
pub fn to_feature_collection(records: &[&Record]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: records.iter().map(|record| to_feature(record)).collect(),
        foreign_members: None,
    }
}

fn to_feature(record: &Record) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("bank".to_string(), JsonValue::from(record.bank.as_str()));
    properties.insert("place".to_string(), JsonValue::from(record.place.as_str()));
    properties.insert("addr".to_string(), JsonValue::from(record.address.as_str()));
    properties.insert("city".to_string(), JsonValue::from(record.city.as_str()));
    properties.insert("town".to_string(), JsonValue::from(record.town.as_str()));
    properties.insert("tel".to_string(), JsonValue::from(record.phone.as_str()));

    let position = vec![record.coordinates.longitude, record.coordinates.latitude];

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(position))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
