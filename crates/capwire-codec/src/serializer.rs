//! Markup serialization for alert messages.

use std::fmt::Write;

use capwire_core::datetime::format_cap_datetime;
use capwire_core::{Alert, Area, CapVersion, Circle, Info, Parameter, Polygon, Resource};
use chrono::{DateTime, FixedOffset};
use quick_xml::escape::escape;

use crate::error::EncodeError;
use crate::schema::{self, PairEncoding, VersionSpec};

/// Serializes an alert to a namespace-qualified XML document in the given
/// schema revision.
///
/// The codec does not validate: whatever the entity holds is written out.
/// The one exception is representability — a field the target revision has
/// no element for is reported as an [`EncodeError`] rather than silently
/// dropped.
pub fn serialize_alert(alert: &Alert, version: CapVersion) -> Result<String, EncodeError> {
    let spec = schema::for_version(version);
    check_representable(alert, spec)?;

    let mut xml = String::new();
    writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#).unwrap();
    write!(xml, r#"<alert xmlns="{}">"#, spec.xmlns).unwrap();

    text_element(&mut xml, "identifier", alert.identifier.as_deref());
    text_element(&mut xml, "sender", alert.sender.as_deref());
    timestamp_element(&mut xml, "sent", alert.sent.as_ref());
    text_element(&mut xml, "status", alert.status.as_deref());
    text_element(&mut xml, "msgType", alert.msg_type.as_deref());
    text_element(&mut xml, "password", alert.password.as_deref());
    text_element(&mut xml, "source", alert.source.as_deref());
    text_element(&mut xml, "scope", alert.scope.as_deref());
    text_element(&mut xml, "restriction", alert.restriction.as_deref());
    if !alert.addresses.is_empty() {
        text_element(&mut xml, "addresses", Some(&crate::caplist::pack(&alert.addresses)));
    }
    for code in &alert.codes {
        text_element(&mut xml, "code", Some(code));
    }
    text_element(&mut xml, "note", alert.note.as_deref());
    if !alert.references.is_empty() {
        text_element(&mut xml, "references", Some(&alert.references.join(" ")));
    }
    if !alert.incidents.is_empty() {
        text_element(&mut xml, "incidents", Some(&alert.incidents.join(" ")));
    }
    for info in &alert.infos {
        serialize_info(&mut xml, info, spec);
    }

    write!(xml, "</alert>").unwrap();
    Ok(xml)
}

fn serialize_info(xml: &mut String, info: &Info, spec: &VersionSpec) {
    write!(xml, "<info>").unwrap();
    text_element(xml, "language", info.language.as_deref());
    for category in &info.categories {
        text_element(xml, "category", Some(category));
    }
    text_element(xml, "event", info.event.as_deref());
    if spec.has_response_type {
        for response_type in &info.response_types {
            text_element(xml, "responseType", Some(response_type));
        }
    }
    text_element(xml, "urgency", info.urgency.as_deref());
    text_element(xml, "severity", info.severity.as_deref());
    text_element(xml, "certainty", info.certainty.as_deref());
    text_element(xml, "audience", info.audience.as_deref());
    if spec.has_event_code {
        for event_code in &info.event_codes {
            pair_element(xml, "eventCode", event_code, spec.event_code_encoding);
        }
    }
    timestamp_element(xml, "effective", info.effective.as_ref());
    timestamp_element(xml, "onset", info.onset.as_ref());
    timestamp_element(xml, "expires", info.expires.as_ref());
    text_element(xml, "senderName", info.sender_name.as_deref());
    text_element(xml, "headline", info.headline.as_deref());
    text_element(xml, "description", info.description.as_deref());
    text_element(xml, "instruction", info.instruction.as_deref());
    text_element(xml, "web", info.web.as_deref());
    text_element(xml, "contact", info.contact.as_deref());
    for parameter in &info.parameters {
        pair_element(xml, "parameter", parameter, spec.parameter_encoding);
    }
    for resource in &info.resources {
        serialize_resource(xml, resource, spec);
    }
    for area in &info.areas {
        serialize_area(xml, area, spec);
    }
    write!(xml, "</info>").unwrap();
}

fn serialize_resource(xml: &mut String, resource: &Resource, spec: &VersionSpec) {
    write!(xml, "<resource>").unwrap();
    text_element(xml, "resourceDesc", resource.resource_desc.as_deref());
    text_element(xml, "mimeType", resource.mime_type.as_deref());
    if let Some(size) = resource.size {
        text_element(xml, "size", Some(&size.to_string()));
    }
    text_element(xml, "uri", resource.uri.as_deref());
    if spec.has_deref_uri {
        text_element(xml, "derefUri", resource.deref_uri.as_deref());
    }
    text_element(xml, "digest", resource.digest.as_deref());
    write!(xml, "</resource>").unwrap();
}

fn serialize_area(xml: &mut String, area: &Area, spec: &VersionSpec) {
    write!(xml, "<area>").unwrap();
    text_element(xml, "areaDesc", area.area_desc.as_deref());
    for polygon in &area.polygons {
        text_element(xml, "polygon", Some(&polygon_text(polygon)));
    }
    for circle in &area.circles {
        text_element(xml, "circle", Some(&circle_text(circle)));
    }
    for geocode in &area.geocodes {
        pair_element(xml, "geocode", geocode, spec.geocode_encoding);
    }
    if let Some(altitude) = area.altitude {
        text_element(xml, "altitude", Some(&altitude.to_string()));
    }
    if let Some(ceiling) = area.ceiling {
        text_element(xml, "ceiling", Some(&ceiling.to_string()));
    }
    write!(xml, "</area>").unwrap();
}

/// `lat,lon radius`
fn circle_text(circle: &Circle) -> String {
    format!("{} {}", circle.point, circle.radius)
}

/// Space-joined `lat,lon` pairs.
fn polygon_text(polygon: &Polygon) -> String {
    polygon
        .points
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn pair_element(xml: &mut String, name: &str, pair: &Parameter, encoding: PairEncoding) {
    match encoding {
        PairEncoding::NameEqualsValue => {
            write!(
                xml,
                "<{name}>{}={}</{name}>",
                escape(pair.name.as_deref().unwrap_or_default()),
                escape(pair.value.as_deref().unwrap_or_default()),
            )
            .unwrap();
        }
        PairEncoding::ValueNameElements => {
            write!(xml, "<{name}>").unwrap();
            text_element(xml, "valueName", pair.name.as_deref());
            text_element(xml, "value", pair.value.as_deref());
            write!(xml, "</{name}>").unwrap();
        }
    }
}

fn text_element(xml: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        write!(xml, "<{name}>{}</{name}>", escape(value)).unwrap();
    }
}

fn timestamp_element(xml: &mut String, name: &str, value: Option<&DateTime<FixedOffset>>) {
    if let Some(dt) = value {
        text_element(xml, name, Some(&format_cap_datetime(dt)));
    }
}

/// Walks the tree for fields the descriptor says this revision cannot carry.
fn check_representable(alert: &Alert, spec: &VersionSpec) -> Result<(), EncodeError> {
    for (i, info) in alert.infos.iter().enumerate() {
        if !spec.has_event_code && !info.event_codes.is_empty() {
            return Err(EncodeError::FieldNotRepresentable {
                path: format!("infos[{i}].event_codes"),
                version: spec.version,
            });
        }
        if !spec.has_response_type && !info.response_types.is_empty() {
            return Err(EncodeError::FieldNotRepresentable {
                path: format!("infos[{i}].response_types"),
                version: spec.version,
            });
        }
        if !spec.has_deref_uri {
            for (j, resource) in info.resources.iter().enumerate() {
                if resource.deref_uri.is_some() {
                    return Err(EncodeError::FieldNotRepresentable {
                        path: format!("infos[{i}].resources[{j}].deref_uri"),
                        version: spec.version,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use capwire_core::datetime::parse_cap_datetime;

    fn minimal_alert() -> Alert {
        let mut alert = Alert::default();
        alert.identifier = Some("43b080713727".to_string());
        alert.sender = Some("hsas@dhs.gov".to_string());
        alert.sent = Some(parse_cap_datetime("2003-04-02T14:39:01-05:00").unwrap());
        alert.status = Some("Actual".to_string());
        alert.msg_type = Some("Alert".to_string());
        alert.scope = Some("Public".to_string());
        alert
    }

    #[test]
    fn test_root_carries_single_namespace() {
        let xml = serialize_alert(&minimal_alert(), CapVersion::V1_2).unwrap();
        assert!(xml.contains(r#"<alert xmlns="urn:oasis:names:tc:emergency:cap:1.2">"#));
        assert_eq!(xml.matches("xmlns").count(), 1);
    }

    #[test]
    fn test_absent_fields_emit_nothing() {
        let xml = serialize_alert(&minimal_alert(), CapVersion::V1_2).unwrap();
        assert!(!xml.contains("<password"));
        assert!(!xml.contains("<restriction"));
        assert!(!xml.contains("<addresses"));
        assert!(!xml.contains("<references"));
    }

    #[test]
    fn test_timestamp_profile() {
        let xml = serialize_alert(&minimal_alert(), CapVersion::V1_2).unwrap();
        assert!(xml.contains("<sent>2003-04-02T14:39:01-05:00</sent>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut alert = minimal_alert();
        alert.note = Some("flood <severe> & rising".to_string());
        let xml = serialize_alert(&alert, CapVersion::V1_2).unwrap();
        assert!(xml.contains("<note>flood &lt;severe&gt; &amp; rising</note>"));
    }

    #[test]
    fn test_addresses_use_list_quoting() {
        let mut alert = minimal_alert();
        alert.addresses = vec!["123 Main St".to_string(), "ops@example.org".to_string()];
        let xml = serialize_alert(&alert, CapVersion::V1_2).unwrap();
        assert!(xml.contains("<addresses>&quot;123 Main St&quot; ops@example.org</addresses>"));
    }

    #[test]
    fn test_geocode_encoding_differs_by_version() {
        let mut alert = minimal_alert();
        alert.add_info(|info| {
            info.add_area(|area| {
                area.area_desc = Some("US".to_string());
                area.add_geocode(|g| *g = Parameter::new("SAME", "006113"));
            });
        });

        let v12 = serialize_alert(&alert, CapVersion::V1_2).unwrap();
        assert!(v12.contains(
            "<geocode><valueName>SAME</valueName><value>006113</value></geocode>"
        ));

        let v10 = serialize_alert(&alert, CapVersion::V1_0).unwrap();
        assert!(v10.contains("<geocode>SAME=006113</geocode>"));
    }

    #[test]
    fn test_event_codes_unrepresentable_in_1_0() {
        let mut alert = minimal_alert();
        alert.add_info(|info| {
            info.add_event_code(|ec| *ec = Parameter::new("SAME", "CEM"));
        });
        let err = serialize_alert(&alert, CapVersion::V1_0).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::FieldNotRepresentable { ref path, .. } if path == "infos[0].event_codes"
        ));
        assert!(serialize_alert(&alert, CapVersion::V1_1).is_ok());
    }

    #[test]
    fn test_deref_uri_unrepresentable_in_1_0() {
        let mut alert = minimal_alert();
        alert.add_info(|info| {
            info.add_resource(|r| {
                r.resource_desc = Some("map".to_string());
                r.embed_content(b"bytes");
            });
        });
        let err = serialize_alert(&alert, CapVersion::V1_0).unwrap_err();
        assert!(matches!(err, EncodeError::FieldNotRepresentable { .. }));
    }

    #[test]
    fn test_element_order_within_area() {
        let mut alert = minimal_alert();
        alert.add_info(|info| {
            info.add_area(|area| {
                area.area_desc = Some("Valley".to_string());
                area.altitude = Some(100.0);
                area.ceiling = Some(150.0);
                area.add_polygon(|p| {
                    p.add_point(1.0, 1.0)
                        .add_point(1.0, 2.0)
                        .add_point(2.0, 2.0)
                        .add_point(1.0, 1.0);
                });
                area.add_circle(|c| *c = Circle::new(32.9525, -115.5527, 0.0));
            });
        });
        let xml = serialize_alert(&alert, CapVersion::V1_2).unwrap();
        let area_xml = &xml[xml.find("<area>").unwrap()..];
        let desc = area_xml.find("<areaDesc>").unwrap();
        let polygon = area_xml.find("<polygon>").unwrap();
        let circle = area_xml.find("<circle>").unwrap();
        let altitude = area_xml.find("<altitude>").unwrap();
        let ceiling = area_xml.find("<ceiling>").unwrap();
        assert!(desc < polygon && polygon < circle && circle < altitude && altitude < ceiling);
        assert!(xml.contains("<circle>32.9525,-115.5527 0</circle>"));
        assert!(xml.contains("<polygon>1,1 1,2 2,2 1,1</polygon>"));
    }
}
