//! Markup parsing for alert messages.
//!
//! Children are located by local name within the namespace declared on the
//! root element; anything else is skipped, never an error. Which elements
//! exist at all is decided by the version descriptor, so a 1.0 document
//! containing later-revision elements decodes cleanly as 1.0.

use capwire_core::{
    datetime, Alert, Area, CapVersion, Circle, Info, Parameter, Point, Polygon, Resource,
};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::debug;

use crate::caplist;
use crate::error::DecodeError;
use crate::schema::{self, PairEncoding, VersionSpec};

type XmlReader<'i> = NsReader<&'i [u8]>;

/// Parses an alert document, sniffing the schema revision from the root
/// element's declared namespace.
pub fn parse_alert(xml: &str) -> Result<(CapVersion, Alert), DecodeError> {
    parse_document(xml, None)
}

/// Parses an alert document as a specific schema revision, ignoring the
/// declared namespace URI for version selection.
pub fn parse_alert_with_version(xml: &str, version: CapVersion) -> Result<Alert, DecodeError> {
    parse_document(xml, Some(version)).map(|(_, alert)| alert)
}

/// Decode context: the descriptor row plus the namespace the root element
/// actually declared (children must resolve to the same one).
struct Ctx {
    spec: &'static VersionSpec,
    ns: Option<Vec<u8>>,
}

impl Ctx {
    fn in_ns(&self, resolve: &ResolveResult) -> bool {
        match (resolve, &self.ns) {
            (ResolveResult::Unbound, None) => true,
            (ResolveResult::Bound(Namespace(ns)), Some(expected)) => *ns == expected.as_slice(),
            _ => false,
        }
    }
}

fn parse_document(xml: &str, hint: Option<CapVersion>) -> Result<(CapVersion, Alert), DecodeError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        let (resolve, event) = reader.read_resolved_event()?;
        match event {
            XmlEvent::Start(e) => {
                let declared_ns = bound_ns(&resolve);
                check_root_name(&e)?;
                let version = resolve_version(hint, declared_ns.as_deref())?;
                debug!(version = %version, "decoding alert markup");
                let ctx = Ctx {
                    spec: schema::for_version(version),
                    ns: declared_ns,
                };
                let alert = parse_alert_body(&mut reader, &ctx)?;
                return Ok((version, alert));
            }
            XmlEvent::Empty(e) => {
                let declared_ns = bound_ns(&resolve);
                check_root_name(&e)?;
                let version = resolve_version(hint, declared_ns.as_deref())?;
                return Ok((version, Alert::default()));
            }
            XmlEvent::Eof => return Err(DecodeError::MissingField("alert".to_string())),
            _ => {}
        }
    }
}

fn check_root_name(e: &BytesStart) -> Result<(), DecodeError> {
    let name = local_name(e);
    if name != "alert" {
        return Err(DecodeError::InvalidStructure(format!(
            "unexpected root element <{name}>"
        )));
    }
    Ok(())
}

fn bound_ns(resolve: &ResolveResult) -> Option<Vec<u8>> {
    match resolve {
        ResolveResult::Bound(Namespace(ns)) => Some(ns.to_vec()),
        _ => None,
    }
}

fn resolve_version(
    hint: Option<CapVersion>,
    declared_ns: Option<&[u8]>,
) -> Result<CapVersion, DecodeError> {
    if let Some(version) = hint {
        return Ok(version);
    }
    let ns = declared_ns.ok_or_else(|| DecodeError::UnknownNamespace(String::new()))?;
    let ns = String::from_utf8_lossy(ns).into_owned();
    CapVersion::from_xmlns(&ns).ok_or(DecodeError::UnknownNamespace(ns))
}

fn parse_alert_body(reader: &mut XmlReader<'_>, ctx: &Ctx) -> Result<Alert, DecodeError> {
    let mut alert = Alert::default();
    loop {
        let (resolve, event) = reader.read_resolved_event()?;
        match event {
            XmlEvent::Start(e) => {
                let known = ctx.in_ns(&resolve);
                alert_child(reader, ctx, &mut alert, &e, false, known)?;
            }
            XmlEvent::Empty(e) => {
                let known = ctx.in_ns(&resolve);
                alert_child(reader, ctx, &mut alert, &e, true, known)?;
            }
            XmlEvent::End(_) => return Ok(alert),
            XmlEvent::Eof => return Err(DecodeError::UnexpectedEof("alert".to_string())),
            _ => {}
        }
    }
}

fn alert_child(
    reader: &mut XmlReader<'_>,
    ctx: &Ctx,
    alert: &mut Alert,
    e: &BytesStart,
    is_empty: bool,
    known_ns: bool,
) -> Result<(), DecodeError> {
    let name = local_name(e);
    if !known_ns {
        debug!(element = %name, "skipping element outside the alert namespace");
        return skip_element(reader, e, is_empty);
    }
    match name.as_str() {
        "identifier" => alert.identifier = Some(element_text(reader, e, is_empty)?),
        "sender" => alert.sender = Some(element_text(reader, e, is_empty)?),
        "sent" => {
            let text = element_text(reader, e, is_empty)?;
            alert.sent = Some(parse_timestamp_field("sent", &text)?);
        }
        "status" => alert.status = Some(element_text(reader, e, is_empty)?),
        "msgType" => alert.msg_type = Some(element_text(reader, e, is_empty)?),
        "password" => alert.password = Some(element_text(reader, e, is_empty)?),
        "source" => alert.source = Some(element_text(reader, e, is_empty)?),
        "scope" => alert.scope = Some(element_text(reader, e, is_empty)?),
        "restriction" => alert.restriction = Some(element_text(reader, e, is_empty)?),
        "addresses" => alert.addresses = caplist::unpack(&element_text(reader, e, is_empty)?),
        "code" => alert.codes.push(element_text(reader, e, is_empty)?),
        "note" => alert.note = Some(element_text(reader, e, is_empty)?),
        "references" => alert.references = split_list(&element_text(reader, e, is_empty)?),
        "incidents" => alert.incidents = split_list(&element_text(reader, e, is_empty)?),
        "info" => {
            if is_empty {
                alert.infos.push(Info::default());
            } else {
                alert.infos.push(parse_info_body(reader, ctx)?);
            }
        }
        _ => {
            debug!(element = %name, "ignoring unrecognized element");
            skip_element(reader, e, is_empty)?;
        }
    }
    Ok(())
}

fn parse_info_body(reader: &mut XmlReader<'_>, ctx: &Ctx) -> Result<Info, DecodeError> {
    let mut info = Info::default();
    loop {
        let (resolve, event) = reader.read_resolved_event()?;
        match event {
            XmlEvent::Start(e) => {
                let known = ctx.in_ns(&resolve);
                info_child(reader, ctx, &mut info, &e, false, known)?;
            }
            XmlEvent::Empty(e) => {
                let known = ctx.in_ns(&resolve);
                info_child(reader, ctx, &mut info, &e, true, known)?;
            }
            XmlEvent::End(_) => return Ok(info),
            XmlEvent::Eof => return Err(DecodeError::UnexpectedEof("info".to_string())),
            _ => {}
        }
    }
}

fn info_child(
    reader: &mut XmlReader<'_>,
    ctx: &Ctx,
    info: &mut Info,
    e: &BytesStart,
    is_empty: bool,
    known_ns: bool,
) -> Result<(), DecodeError> {
    let name = local_name(e);
    if !known_ns {
        debug!(element = %name, "skipping element outside the alert namespace");
        return skip_element(reader, e, is_empty);
    }
    match name.as_str() {
        "language" => info.language = Some(element_text(reader, e, is_empty)?),
        "category" => info.categories.push(element_text(reader, e, is_empty)?),
        "event" => info.event = Some(element_text(reader, e, is_empty)?),
        "responseType" if ctx.spec.has_response_type => {
            info.response_types.push(element_text(reader, e, is_empty)?)
        }
        "urgency" => info.urgency = Some(element_text(reader, e, is_empty)?),
        "severity" => info.severity = Some(element_text(reader, e, is_empty)?),
        "certainty" => info.certainty = Some(element_text(reader, e, is_empty)?),
        "audience" => info.audience = Some(element_text(reader, e, is_empty)?),
        "eventCode" if ctx.spec.has_event_code => {
            let pair = parse_pair(reader, ctx, e, is_empty, ctx.spec.event_code_encoding)?;
            info.event_codes.push(pair);
        }
        "effective" => {
            let text = element_text(reader, e, is_empty)?;
            info.effective = Some(parse_timestamp_field("effective", &text)?);
        }
        "onset" => {
            let text = element_text(reader, e, is_empty)?;
            info.onset = Some(parse_timestamp_field("onset", &text)?);
        }
        "expires" => {
            let text = element_text(reader, e, is_empty)?;
            info.expires = Some(parse_timestamp_field("expires", &text)?);
        }
        "senderName" => info.sender_name = Some(element_text(reader, e, is_empty)?),
        "headline" => info.headline = Some(element_text(reader, e, is_empty)?),
        "description" => info.description = Some(element_text(reader, e, is_empty)?),
        "instruction" => info.instruction = Some(element_text(reader, e, is_empty)?),
        "web" => info.web = Some(element_text(reader, e, is_empty)?),
        "contact" => info.contact = Some(element_text(reader, e, is_empty)?),
        "parameter" => {
            let pair = parse_pair(reader, ctx, e, is_empty, ctx.spec.parameter_encoding)?;
            info.parameters.push(pair);
        }
        "resource" => {
            if is_empty {
                info.resources.push(Resource::default());
            } else {
                info.resources.push(parse_resource_body(reader, ctx)?);
            }
        }
        "area" => {
            if is_empty {
                info.areas.push(Area::default());
            } else {
                info.areas.push(parse_area_body(reader, ctx)?);
            }
        }
        _ => {
            debug!(element = %name, "ignoring unrecognized element");
            skip_element(reader, e, is_empty)?;
        }
    }
    Ok(())
}

fn parse_resource_body(reader: &mut XmlReader<'_>, ctx: &Ctx) -> Result<Resource, DecodeError> {
    let mut resource = Resource::default();
    loop {
        let (resolve, event) = reader.read_resolved_event()?;
        match event {
            XmlEvent::Start(e) => {
                let known = ctx.in_ns(&resolve);
                resource_child(reader, ctx, &mut resource, &e, false, known)?;
            }
            XmlEvent::Empty(e) => {
                let known = ctx.in_ns(&resolve);
                resource_child(reader, ctx, &mut resource, &e, true, known)?;
            }
            XmlEvent::End(_) => return Ok(resource),
            XmlEvent::Eof => return Err(DecodeError::UnexpectedEof("resource".to_string())),
            _ => {}
        }
    }
}

fn resource_child(
    reader: &mut XmlReader<'_>,
    ctx: &Ctx,
    resource: &mut Resource,
    e: &BytesStart,
    is_empty: bool,
    known_ns: bool,
) -> Result<(), DecodeError> {
    let name = local_name(e);
    if !known_ns {
        debug!(element = %name, "skipping element outside the alert namespace");
        return skip_element(reader, e, is_empty);
    }
    match name.as_str() {
        "resourceDesc" => resource.resource_desc = Some(element_text(reader, e, is_empty)?),
        "mimeType" => resource.mime_type = Some(element_text(reader, e, is_empty)?),
        "size" => {
            let text = element_text(reader, e, is_empty)?;
            resource.size = Some(parse_u64_field("size", &text)?);
        }
        "uri" => resource.uri = Some(element_text(reader, e, is_empty)?),
        "derefUri" if ctx.spec.has_deref_uri => {
            resource.deref_uri = Some(element_text(reader, e, is_empty)?)
        }
        "digest" => resource.digest = Some(element_text(reader, e, is_empty)?),
        _ => {
            debug!(element = %name, "ignoring unrecognized element");
            skip_element(reader, e, is_empty)?;
        }
    }
    Ok(())
}

fn parse_area_body(reader: &mut XmlReader<'_>, ctx: &Ctx) -> Result<Area, DecodeError> {
    let mut area = Area::default();
    loop {
        let (resolve, event) = reader.read_resolved_event()?;
        match event {
            XmlEvent::Start(e) => {
                let known = ctx.in_ns(&resolve);
                area_child(reader, ctx, &mut area, &e, false, known)?;
            }
            XmlEvent::Empty(e) => {
                let known = ctx.in_ns(&resolve);
                area_child(reader, ctx, &mut area, &e, true, known)?;
            }
            XmlEvent::End(_) => return Ok(area),
            XmlEvent::Eof => return Err(DecodeError::UnexpectedEof("area".to_string())),
            _ => {}
        }
    }
}

fn area_child(
    reader: &mut XmlReader<'_>,
    ctx: &Ctx,
    area: &mut Area,
    e: &BytesStart,
    is_empty: bool,
    known_ns: bool,
) -> Result<(), DecodeError> {
    let name = local_name(e);
    if !known_ns {
        debug!(element = %name, "skipping element outside the alert namespace");
        return skip_element(reader, e, is_empty);
    }
    match name.as_str() {
        "areaDesc" => area.area_desc = Some(element_text(reader, e, is_empty)?),
        "polygon" => {
            let text = element_text(reader, e, is_empty)?;
            area.polygons.push(parse_polygon_text(&text)?);
        }
        "circle" => {
            let text = element_text(reader, e, is_empty)?;
            area.circles.push(parse_circle_text(&text)?);
        }
        "geocode" => {
            let pair = parse_pair(reader, ctx, e, is_empty, ctx.spec.geocode_encoding)?;
            area.geocodes.push(pair);
        }
        "altitude" => {
            let text = element_text(reader, e, is_empty)?;
            area.altitude = Some(parse_f64_field("altitude", &text)?);
        }
        "ceiling" => {
            let text = element_text(reader, e, is_empty)?;
            area.ceiling = Some(parse_f64_field("ceiling", &text)?);
        }
        _ => {
            debug!(element = %name, "ignoring unrecognized element");
            skip_element(reader, e, is_empty)?;
        }
    }
    Ok(())
}

fn parse_pair(
    reader: &mut XmlReader<'_>,
    ctx: &Ctx,
    e: &BytesStart,
    is_empty: bool,
    encoding: PairEncoding,
) -> Result<Parameter, DecodeError> {
    match encoding {
        PairEncoding::NameEqualsValue => {
            let element = local_name(e);
            let text = element_text(reader, e, is_empty)?;
            let (name, value) = text.split_once('=').ok_or_else(|| {
                DecodeError::InvalidStructure(format!(
                    "<{element}> content must be of the form name=value: {text:?}"
                ))
            })?;
            Ok(Parameter {
                name: Some(name.to_string()),
                value: Some(value.to_string()),
            })
        }
        PairEncoding::ValueNameElements => {
            let mut pair = Parameter::default();
            if is_empty {
                return Ok(pair);
            }
            loop {
                let (resolve, event) = reader.read_resolved_event()?;
                match event {
                    XmlEvent::Start(child) => {
                        let known = ctx.in_ns(&resolve);
                        pair_child(reader, &mut pair, &child, false, known)?;
                    }
                    XmlEvent::Empty(child) => {
                        let known = ctx.in_ns(&resolve);
                        pair_child(reader, &mut pair, &child, true, known)?;
                    }
                    XmlEvent::End(_) => return Ok(pair),
                    XmlEvent::Eof => return Err(DecodeError::UnexpectedEof(local_name(e))),
                    _ => {}
                }
            }
        }
    }
}

fn pair_child(
    reader: &mut XmlReader<'_>,
    pair: &mut Parameter,
    e: &BytesStart,
    is_empty: bool,
    known_ns: bool,
) -> Result<(), DecodeError> {
    let name = local_name(e);
    match name.as_str() {
        "valueName" if known_ns => pair.name = Some(element_text(reader, e, is_empty)?),
        "value" if known_ns => pair.value = Some(element_text(reader, e, is_empty)?),
        _ => {
            debug!(element = %name, "ignoring unrecognized element");
            skip_element(reader, e, is_empty)?;
        }
    }
    Ok(())
}

/// `lat,lon radius`
fn parse_circle_text(text: &str) -> Result<Circle, DecodeError> {
    let mut tokens = text.split_whitespace();
    let (point, radius) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(point), Some(radius), None) => (point, radius),
        _ => {
            return Err(DecodeError::InvalidStructure(format!(
                "circle content must be of the form lat,lon radius: {text:?}"
            )))
        }
    };
    Ok(Circle {
        point: parse_point_token("circle", point)?,
        radius: parse_f64_field("circle.radius", radius)?,
    })
}

/// Space-joined `lat,lon` pairs.
fn parse_polygon_text(text: &str) -> Result<Polygon, DecodeError> {
    let mut polygon = Polygon::new();
    for token in text.split_whitespace() {
        let point = parse_point_token("polygon", token)?;
        polygon.points.push(point);
    }
    Ok(polygon)
}

fn parse_point_token(field: &str, token: &str) -> Result<Point, DecodeError> {
    let (lat, lon) = token.split_once(',').ok_or_else(|| {
        DecodeError::InvalidStructure(format!(
            "{field} point must be of the form lat,lon: {token:?}"
        ))
    })?;
    Ok(Point::new(
        parse_f64_field(&format!("{field}.lat"), lat)?,
        parse_f64_field(&format!("{field}.lon"), lon)?,
    ))
}

fn parse_f64_field(field: &str, text: &str) -> Result<f64, DecodeError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| DecodeError::invalid_number(field, text))
}

fn parse_u64_field(field: &str, text: &str) -> Result<u64, DecodeError> {
    text.trim()
        .parse::<u64>()
        .map_err(|_| DecodeError::invalid_number(field, text))
}

fn parse_timestamp_field(
    field: &str,
    text: &str,
) -> Result<chrono::DateTime<chrono::FixedOffset>, DecodeError> {
    datetime::parse_cap_datetime(text.trim())
        .map_err(|_| DecodeError::invalid_timestamp(field, text))
}

fn split_list(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn element_text(
    reader: &mut XmlReader<'_>,
    e: &BytesStart,
    is_empty: bool,
) -> Result<String, DecodeError> {
    if is_empty {
        return Ok(String::new());
    }
    read_element_text(reader, e)
}

fn read_element_text(reader: &mut XmlReader<'_>, e: &BytesStart) -> Result<String, DecodeError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            XmlEvent::Text(t) => text.push_str(&t.unescape()?),
            XmlEvent::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            XmlEvent::End(end) if end.name() == e.name() => return Ok(text),
            XmlEvent::Start(child) => {
                return Err(DecodeError::InvalidStructure(format!(
                    "unexpected <{}> inside <{}>",
                    local_name(&child),
                    local_name(e)
                )))
            }
            XmlEvent::Eof => return Err(DecodeError::UnexpectedEof(local_name(e))),
            _ => {}
        }
    }
}

fn skip_element(
    reader: &mut XmlReader<'_>,
    e: &BytesStart,
    is_empty: bool,
) -> Result<(), DecodeError> {
    if !is_empty {
        reader.read_to_end(e.name())?;
    }
    Ok(())
}
