//! The mapping family: one canonical key/value representation rendered
//! three ways (plain mapping, JSON, YAML).
//!
//! Keys are snake_case and independent of markup element names. Name/value
//! pair collections collapse to a `{name: value}` object with duplicates
//! resolved last-write-wins — a deliberate, lossy simplification; callers
//! needing duplicate and order fidelity use the markup codec.

use capwire_core::datetime::format_cap_datetime;
use capwire_core::{
    Alert, Area, CapVersion, Circle, Geocode, Info, Parameter, Point, Polygon, Resource,
};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::error::{DecodeError, EncodeError};

/// Renders an alert as the canonical key/value mapping.
///
/// Absent scalars and empty collections are omitted entirely.
pub fn alert_to_map(alert: &Alert, version: CapVersion) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        "cap_version".to_string(),
        Value::String(version.as_str().to_string()),
    );
    insert_str(&mut map, "identifier", &alert.identifier);
    insert_str(&mut map, "sender", &alert.sender);
    insert_timestamp(&mut map, "sent", &alert.sent);
    insert_str(&mut map, "status", &alert.status);
    insert_str(&mut map, "msg_type", &alert.msg_type);
    insert_str(&mut map, "password", &alert.password);
    insert_str(&mut map, "source", &alert.source);
    insert_str(&mut map, "scope", &alert.scope);
    insert_str(&mut map, "restriction", &alert.restriction);
    insert_str_list(&mut map, "addresses", &alert.addresses);
    insert_str_list(&mut map, "codes", &alert.codes);
    insert_str(&mut map, "note", &alert.note);
    insert_str_list(&mut map, "references", &alert.references);
    insert_str_list(&mut map, "incidents", &alert.incidents);
    if !alert.infos.is_empty() {
        let infos = alert
            .infos
            .iter()
            .map(|info| Value::Object(info_to_map(info)))
            .collect();
        map.insert("infos".to_string(), Value::Array(infos));
    }
    map
}

/// Rebuilds an alert from its canonical mapping. The `cap_version` key is
/// required.
pub fn alert_from_map(map: &Map<String, Value>) -> Result<(CapVersion, Alert), DecodeError> {
    let version_str = get_str(map, "cap_version")?
        .ok_or_else(|| DecodeError::MissingField("cap_version".to_string()))?;
    let version = CapVersion::from_version_str(&version_str)
        .ok_or(DecodeError::UnknownVersion(version_str))?;

    let mut alert = Alert::default();
    alert.identifier = get_str(map, "identifier")?;
    alert.sender = get_str(map, "sender")?;
    alert.sent = get_timestamp(map, "sent")?;
    alert.status = get_str(map, "status")?;
    alert.msg_type = get_str(map, "msg_type")?;
    alert.password = get_str(map, "password")?;
    alert.source = get_str(map, "source")?;
    alert.scope = get_str(map, "scope")?;
    alert.restriction = get_str(map, "restriction")?;
    alert.addresses = get_str_list(map, "addresses")?;
    alert.codes = get_str_list(map, "codes")?;
    alert.note = get_str(map, "note")?;
    alert.references = get_str_list(map, "references")?;
    alert.incidents = get_str_list(map, "incidents")?;
    for value in get_array(map, "infos")? {
        let object = as_object("infos", value)?;
        alert.infos.push(info_from_map(object)?);
    }
    Ok((version, alert))
}

/// Renders an alert as a JSON document (the mapping, textualized).
pub fn to_json(alert: &Alert, version: CapVersion) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(&Value::Object(alert_to_map(
        alert, version,
    )))?)
}

/// Parses a JSON document produced by [`to_json`].
pub fn from_json(json: &str) -> Result<(CapVersion, Alert), DecodeError> {
    let value: Value = serde_json::from_str(json)?;
    let map = value
        .as_object()
        .ok_or_else(|| DecodeError::InvalidStructure("document is not an object".to_string()))?;
    alert_from_map(map)
}

/// Renders an alert as a block-structured YAML document (the mapping under
/// the same key vocabulary).
pub fn to_yaml(alert: &Alert, version: CapVersion) -> Result<String, EncodeError> {
    Ok(serde_yaml::to_string(&Value::Object(alert_to_map(
        alert, version,
    )))?)
}

/// Parses a YAML document produced by [`to_yaml`].
pub fn from_yaml(yaml: &str) -> Result<(CapVersion, Alert), DecodeError> {
    let value: Value = serde_yaml::from_str(yaml)?;
    let map = value
        .as_object()
        .ok_or_else(|| DecodeError::InvalidStructure("document is not a mapping".to_string()))?;
    alert_from_map(map)
}

fn info_to_map(info: &Info) -> Map<String, Value> {
    let mut map = Map::new();
    insert_str(&mut map, "language", &info.language);
    insert_str_list(&mut map, "categories", &info.categories);
    insert_str(&mut map, "event", &info.event);
    insert_str_list(&mut map, "response_types", &info.response_types);
    insert_str(&mut map, "urgency", &info.urgency);
    insert_str(&mut map, "severity", &info.severity);
    insert_str(&mut map, "certainty", &info.certainty);
    insert_str(&mut map, "audience", &info.audience);
    insert_pairs(&mut map, "event_codes", &info.event_codes);
    insert_timestamp(&mut map, "effective", &info.effective);
    insert_timestamp(&mut map, "onset", &info.onset);
    insert_timestamp(&mut map, "expires", &info.expires);
    insert_str(&mut map, "sender_name", &info.sender_name);
    insert_str(&mut map, "headline", &info.headline);
    insert_str(&mut map, "description", &info.description);
    insert_str(&mut map, "instruction", &info.instruction);
    insert_str(&mut map, "web", &info.web);
    insert_str(&mut map, "contact", &info.contact);
    insert_pairs(&mut map, "parameters", &info.parameters);
    if !info.resources.is_empty() {
        let resources = info
            .resources
            .iter()
            .map(|resource| Value::Object(resource_to_map(resource)))
            .collect();
        map.insert("resources".to_string(), Value::Array(resources));
    }
    if !info.areas.is_empty() {
        let areas = info
            .areas
            .iter()
            .map(|area| Value::Object(area_to_map(area)))
            .collect();
        map.insert("areas".to_string(), Value::Array(areas));
    }
    map
}

fn info_from_map(map: &Map<String, Value>) -> Result<Info, DecodeError> {
    let mut info = Info::default();
    info.language = get_str(map, "language")?;
    info.categories = get_str_list(map, "categories")?;
    info.event = get_str(map, "event")?;
    info.response_types = get_str_list(map, "response_types")?;
    info.urgency = get_str(map, "urgency")?;
    info.severity = get_str(map, "severity")?;
    info.certainty = get_str(map, "certainty")?;
    info.audience = get_str(map, "audience")?;
    info.event_codes = get_pairs(map, "event_codes")?;
    info.effective = get_timestamp(map, "effective")?;
    info.onset = get_timestamp(map, "onset")?;
    info.expires = get_timestamp(map, "expires")?;
    info.sender_name = get_str(map, "sender_name")?;
    info.headline = get_str(map, "headline")?;
    info.description = get_str(map, "description")?;
    info.instruction = get_str(map, "instruction")?;
    info.web = get_str(map, "web")?;
    info.contact = get_str(map, "contact")?;
    info.parameters = get_pairs(map, "parameters")?;
    for value in get_array(map, "resources")? {
        let object = as_object("resources", value)?;
        info.resources.push(resource_from_map(object)?);
    }
    for value in get_array(map, "areas")? {
        let object = as_object("areas", value)?;
        info.areas.push(area_from_map(object)?);
    }
    Ok(info)
}

fn resource_to_map(resource: &Resource) -> Map<String, Value> {
    let mut map = Map::new();
    insert_str(&mut map, "resource_desc", &resource.resource_desc);
    insert_str(&mut map, "mime_type", &resource.mime_type);
    if let Some(size) = resource.size {
        map.insert("size".to_string(), Value::Number(size.into()));
    }
    insert_str(&mut map, "uri", &resource.uri);
    insert_str(&mut map, "deref_uri", &resource.deref_uri);
    insert_str(&mut map, "digest", &resource.digest);
    map
}

fn resource_from_map(map: &Map<String, Value>) -> Result<Resource, DecodeError> {
    let mut resource = Resource::default();
    resource.resource_desc = get_str(map, "resource_desc")?;
    resource.mime_type = get_str(map, "mime_type")?;
    resource.size = get_u64(map, "size")?;
    resource.uri = get_str(map, "uri")?;
    resource.deref_uri = get_str(map, "deref_uri")?;
    resource.digest = get_str(map, "digest")?;
    Ok(resource)
}

fn area_to_map(area: &Area) -> Map<String, Value> {
    let mut map = Map::new();
    insert_str(&mut map, "area_desc", &area.area_desc);
    insert_f64(&mut map, "altitude", &area.altitude);
    insert_f64(&mut map, "ceiling", &area.ceiling);
    if !area.circles.is_empty() {
        let circles = area.circles.iter().map(circle_to_value).collect();
        map.insert("circles".to_string(), Value::Array(circles));
    }
    insert_pairs(&mut map, "geocodes", &area.geocodes);
    if !area.polygons.is_empty() {
        let polygons = area.polygons.iter().map(polygon_to_value).collect();
        map.insert("polygons".to_string(), Value::Array(polygons));
    }
    map
}

fn area_from_map(map: &Map<String, Value>) -> Result<Area, DecodeError> {
    let mut area = Area::default();
    area.area_desc = get_str(map, "area_desc")?;
    area.altitude = get_f64(map, "altitude")?;
    area.ceiling = get_f64(map, "ceiling")?;
    for value in get_array(map, "circles")? {
        area.circles.push(circle_from_value(value)?);
    }
    area.geocodes = get_pairs(map, "geocodes")?;
    for value in get_array(map, "polygons")? {
        area.polygons.push(polygon_from_value(value)?);
    }
    Ok(area)
}

/// `[lat, lon, radius]`
fn circle_to_value(circle: &Circle) -> Value {
    Value::Array(vec![
        number(circle.point.lat),
        number(circle.point.lon),
        number(circle.radius),
    ])
}

fn circle_from_value(value: &Value) -> Result<Circle, DecodeError> {
    let parts = value.as_array().filter(|parts| parts.len() == 3).ok_or_else(|| {
        DecodeError::InvalidStructure(format!("circle must be a [lat, lon, radius] triple: {value}"))
    })?;
    Ok(Circle {
        point: Point::new(
            value_f64("circles", &parts[0])?,
            value_f64("circles", &parts[1])?,
        ),
        radius: value_f64("circles", &parts[2])?,
    })
}

/// An array of `[lat, lon]` pairs.
fn polygon_to_value(polygon: &Polygon) -> Value {
    Value::Array(
        polygon
            .points
            .iter()
            .map(|p| Value::Array(vec![number(p.lat), number(p.lon)]))
            .collect(),
    )
}

fn polygon_from_value(value: &Value) -> Result<Polygon, DecodeError> {
    let points = value.as_array().ok_or_else(|| {
        DecodeError::InvalidStructure(format!("polygon must be an array of [lat, lon] pairs: {value}"))
    })?;
    let mut polygon = Polygon::new();
    for point in points {
        let pair = point.as_array().filter(|pair| pair.len() == 2).ok_or_else(|| {
            DecodeError::InvalidStructure(format!("polygon point must be a [lat, lon] pair: {point}"))
        })?;
        polygon.points.push(Point::new(
            value_f64("polygons", &pair[0])?,
            value_f64("polygons", &pair[1])?,
        ));
    }
    Ok(polygon)
}

/// Collapses pairs to a `{name: value}` object; pairs without a name are
/// dropped and duplicate names keep the last value.
fn insert_pairs(map: &mut Map<String, Value>, key: &str, pairs: &[Parameter]) {
    if pairs.is_empty() {
        return;
    }
    let mut object = Map::new();
    for pair in pairs {
        if let Some(name) = &pair.name {
            object.insert(
                name.clone(),
                Value::String(pair.value.clone().unwrap_or_default()),
            );
        }
    }
    map.insert(key.to_string(), Value::Object(object));
}

fn get_pairs(map: &Map<String, Value>, key: &str) -> Result<Vec<Geocode>, DecodeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(object)) => object
            .iter()
            .map(|(name, value)| match value {
                Value::String(s) => Ok(Parameter {
                    name: Some(name.clone()),
                    value: Some(s.clone()),
                }),
                other => Err(DecodeError::InvalidStructure(format!(
                    "{key} values must be strings: {other}"
                ))),
            })
            .collect(),
        Some(other) => Err(DecodeError::InvalidStructure(format!(
            "{key} must be an object: {other}"
        ))),
    }
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn insert_str(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.clone()));
    }
}

fn insert_f64(map: &mut Map<String, Value>, key: &str, value: &Option<f64>) {
    if let Some(value) = value {
        map.insert(key.to_string(), number(*value));
    }
}

fn insert_timestamp(map: &mut Map<String, Value>, key: &str, value: &Option<DateTime<FixedOffset>>) {
    if let Some(dt) = value {
        map.insert(key.to_string(), Value::String(format_cap_datetime(dt)));
    }
}

fn insert_str_list(map: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        let list = values.iter().map(|v| Value::String(v.clone())).collect();
        map.insert(key.to_string(), Value::Array(list));
    }
}

fn get_str(map: &Map<String, Value>, key: &str) -> Result<Option<String>, DecodeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DecodeError::InvalidStructure(format!(
            "{key} must be a string: {other}"
        ))),
    }
}

fn get_f64(map: &Map<String, Value>, key: &str) -> Result<Option<f64>, DecodeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(value_f64(key, value)?)),
    }
}

fn get_u64(map: &Map<String, Value>, key: &str) -> Result<Option<u64>, DecodeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| DecodeError::invalid_number(key, value.to_string())),
    }
}

fn value_f64(key: &str, value: &Value) -> Result<f64, DecodeError> {
    value
        .as_f64()
        .ok_or_else(|| DecodeError::invalid_number(key, value.to_string()))
}

fn get_timestamp(
    map: &Map<String, Value>,
    key: &str,
) -> Result<Option<DateTime<FixedOffset>>, DecodeError> {
    match get_str(map, key)? {
        None => Ok(None),
        Some(text) => capwire_core::datetime::parse_cap_datetime(&text)
            .map(Some)
            .map_err(|_| DecodeError::invalid_timestamp(key, text)),
    }
}

fn get_str_list(map: &Map<String, Value>, key: &str) -> Result<Vec<String>, DecodeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| match value {
                Value::String(s) => Ok(s.clone()),
                other => Err(DecodeError::InvalidStructure(format!(
                    "{key} elements must be strings: {other}"
                ))),
            })
            .collect(),
        Some(other) => Err(DecodeError::InvalidStructure(format!(
            "{key} must be an array: {other}"
        ))),
    }
}

fn get_array<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a [Value], DecodeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(values)) => Ok(values),
        Some(other) => Err(DecodeError::InvalidStructure(format!(
            "{key} must be an array: {other}"
        ))),
    }
}

fn as_object<'a>(key: &str, value: &'a Value) -> Result<&'a Map<String, Value>, DecodeError> {
    value.as_object().ok_or_else(|| {
        DecodeError::InvalidStructure(format!("{key} elements must be objects: {value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use capwire_core::datetime::parse_cap_datetime;

    fn sample_alert() -> Alert {
        let mut alert = Alert::default();
        alert.identifier = Some("KSTO1055887203".to_string());
        alert.sender = Some("KSTO@CLETS.DOJ.CA.GOV".to_string());
        alert.sent = Some(parse_cap_datetime("2003-06-17T14:57:00-07:00").unwrap());
        alert.status = Some("Actual".to_string());
        alert.msg_type = Some("Alert".to_string());
        alert.scope = Some("Public".to_string());
        alert.add_info(|info| {
            info.categories.push("Security".to_string());
            info.event = Some("CHILD ABDUCTION".to_string());
            info.urgency = Some("Immediate".to_string());
            info.severity = Some("Severe".to_string());
            info.certainty = Some("Likely".to_string());
            info.add_parameter(|p| *p = Parameter::new("SAME", "CAE"));
            info.add_area(|area| {
                area.area_desc = Some("Sacramento County".to_string());
                area.add_geocode(|g| *g = Parameter::new("SAME", "006113"));
            });
        });
        alert
    }

    #[test]
    fn test_map_uses_canonical_keys() {
        let map = alert_to_map(&sample_alert(), CapVersion::V1_2);
        assert_eq!(map["cap_version"], Value::String("1.2".to_string()));
        assert_eq!(map["msg_type"], Value::String("Alert".to_string()));
        assert_eq!(map["sent"], Value::String("2003-06-17T14:57:00-07:00".to_string()));
        assert!(!map.contains_key("password"));
        assert!(!map.contains_key("addresses"));
    }

    #[test]
    fn test_pairs_collapse_to_object() {
        let map = alert_to_map(&sample_alert(), CapVersion::V1_2);
        let info = map["infos"][0].as_object().unwrap();
        assert_eq!(info["parameters"]["SAME"], Value::String("CAE".to_string()));
        let area = info["areas"][0].as_object().unwrap();
        assert_eq!(area["geocodes"]["SAME"], Value::String("006113".to_string()));
    }

    #[test]
    fn test_duplicate_pair_names_keep_last_value() {
        let mut alert = sample_alert();
        alert.infos[0].add_parameter(|p| *p = Parameter::new("SAME", "CEM"));
        let map = alert_to_map(&alert, CapVersion::V1_2);
        let info = map["infos"][0].as_object().unwrap();
        assert_eq!(info["parameters"]["SAME"], Value::String("CEM".to_string()));
    }

    #[test]
    fn test_map_round_trip() {
        let alert = sample_alert();
        let map = alert_to_map(&alert, CapVersion::V1_1);
        let (version, decoded) = alert_from_map(&map).unwrap();
        assert_eq!(version, CapVersion::V1_1);
        assert_eq!(decoded, alert);
    }

    #[test]
    fn test_json_round_trip() {
        let alert = sample_alert();
        let json = to_json(&alert, CapVersion::V1_2).unwrap();
        let (version, decoded) = from_json(&json).unwrap();
        assert_eq!(version, CapVersion::V1_2);
        assert_eq!(decoded, alert);
    }

    #[test]
    fn test_yaml_round_trip() {
        let alert = sample_alert();
        let yaml = to_yaml(&alert, CapVersion::V1_0).unwrap();
        let (version, decoded) = from_yaml(&yaml).unwrap();
        assert_eq!(version, CapVersion::V1_0);
        assert_eq!(decoded, alert);
    }

    #[test]
    fn test_missing_cap_version_is_an_error() {
        let map = Map::new();
        assert!(matches!(
            alert_from_map(&map),
            Err(DecodeError::MissingField(ref field)) if field == "cap_version"
        ));
    }

    #[test]
    fn test_unknown_cap_version_is_an_error() {
        let mut map = Map::new();
        map.insert("cap_version".to_string(), Value::String("3.0".to_string()));
        assert!(matches!(
            alert_from_map(&map),
            Err(DecodeError::UnknownVersion(ref v)) if v == "3.0"
        ));
    }

    #[test]
    fn test_wrong_typed_value_is_an_error() {
        let mut map = Map::new();
        map.insert("cap_version".to_string(), Value::String("1.2".to_string()));
        map.insert("identifier".to_string(), Value::Number(7.into()));
        assert!(matches!(
            alert_from_map(&map),
            Err(DecodeError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_circle_shape_in_mapping() {
        let mut alert = sample_alert();
        alert.infos[0].areas[0].add_circle(|c| *c = Circle::new(32.9525, -115.5527, 5.0));
        let map = alert_to_map(&alert, CapVersion::V1_2);
        let area = map["infos"][0]["areas"][0].as_object().unwrap();
        assert_eq!(area["circles"][0][0], Value::from(32.9525));
        assert_eq!(area["circles"][0][2], Value::from(5.0));
        let (_, decoded) = alert_from_map(&map).unwrap();
        assert_eq!(decoded, alert);
    }
}
