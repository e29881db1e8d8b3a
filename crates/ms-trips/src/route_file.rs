//! SUMO route-file (`.rou.xml`) serialization and parsing.
//!
//! # Output format
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <routes>
//!     <vType id="pkw" accel="2.6" decel="4.5" sigma="0.5" length="4.5" maxSpeed="50"/>
//!     ...
//!     <trip id="bus_0" type="bus" depart="3.25" from="L2" to="L9"/>
//!     ...
//! </routes>
//! ```
//!
//! The vehicle-type catalog always comes first, in `VehicleClass::ALL` order,
//! followed by the trips in the order given (the generator hands them over
//! sorted by departure, which SUMO requires).

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use ms_core::{VehicleClass, VehicleType};

use crate::trip::Trip;
use crate::{TripError, TripResult};

/// Render the route document for `trips`.  Deterministic for a given input.
pub fn render_route_file(trips: &[Trip]) -> TripResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("routes")))?;

    for vtype in VehicleType::catalog() {
        writer.write_event(Event::Empty(vtype_element(&vtype)))?;
    }

    for trip in trips {
        let depart = format!("{:.2}", trip.depart);
        let mut e = BytesStart::new("trip");
        e.push_attribute(("id", trip.id.as_str()));
        e.push_attribute(("type", trip.class.as_str()));
        e.push_attribute(("depart", depart.as_str()));
        e.push_attribute(("from", trip.from.as_str()));
        e.push_attribute(("to", trip.to.as_str()));
        writer.write_event(Event::Empty(e))?;
    }

    writer.write_event(Event::End(BytesEnd::new("routes")))?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Render and write the route document to `path`, replacing any existing file.
pub fn write_route_file(path: &Path, trips: &[Trip]) -> TripResult<()> {
    let bytes = render_route_file(trips)?;
    std::fs::write(path, bytes).map_err(|source| TripError::File {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("wrote {} trips to {}", trips.len(), path.display());
    Ok(())
}

fn vtype_element(vtype: &VehicleType) -> BytesStart<'static> {
    let mut e = BytesStart::new("vType");
    e.push_attribute(("id", vtype.class.as_str()));
    e.push_attribute(("accel", vtype.accel.to_string().as_str()));
    e.push_attribute(("decel", vtype.decel.to_string().as_str()));
    e.push_attribute(("sigma", vtype.sigma.to_string().as_str()));
    e.push_attribute(("length", vtype.length.to_string().as_str()));
    e.push_attribute(("maxSpeed", vtype.max_speed.to_string().as_str()));
    e
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Read the `<trip>` elements of a route file, in document order.
///
/// Other elements (`vType`, `vehicle`, `flow`, …) are ignored.
pub fn read_trips(path: &Path) -> TripResult<Vec<Trip>> {
    let xml = std::fs::read_to_string(path).map_err(|source| TripError::File {
        path: path.to_path_buf(),
        source,
    })?;
    trips_from_str(&xml)
}

/// Like [`read_trips`] but from an in-memory document.
pub fn trips_from_str(xml: &str) -> TripResult<Vec<Trip>> {
    let mut reader = Reader::from_str(xml);
    let mut trips = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"trip" => {
                trips.push(parse_trip(&e)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(trips)
}

fn parse_trip(e: &BytesStart<'_>) -> TripResult<Trip> {
    let id = required(e, "id")?;
    let class_name = required(e, "type")?;
    let class: VehicleClass = class_name.parse()?;
    let depart_raw = required(e, "depart")?;
    let depart = depart_raw.parse::<f64>().map_err(|_| TripError::InvalidAttribute {
        attribute: "depart".to_owned(),
        value:     depart_raw.clone(),
    })?;
    Ok(Trip {
        id,
        class,
        depart,
        from: required(e, "from")?,
        to: required(e, "to")?,
    })
}

fn required(e: &BytesStart<'_>, attribute: &'static str) -> TripResult<String> {
    match e.try_get_attribute(attribute)? {
        Some(a) => Ok(a.unescape_value()?.into_owned()),
        None => Err(TripError::MissingAttribute { element: "trip", attribute }),
    }
}
