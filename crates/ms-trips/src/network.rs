//! Edge-pool extraction from a SUMO network file.
//!
//! Only direct children `<edge>` of the root element are considered.  Edges
//! whose id starts with [`INTERNAL_EDGE_PREFIX`] model junction-internal
//! geometry and can never be a trip origin or destination, so they are
//! dropped.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::{TripError, TripResult};

/// Id prefix SUMO reserves for internal junction edges.
pub const INTERNAL_EDGE_PREFIX: char = ':';

/// Read the usable edge ids of a `.net.xml` file, in document order.
pub fn read_edge_pool(path: &Path) -> TripResult<Vec<String>> {
    let xml = std::fs::read_to_string(path).map_err(|source| TripError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let edges = edge_pool_from_str(&xml)?;
    log::debug!("{}: {} usable edges", path.display(), edges.len());
    Ok(edges)
}

/// Like [`read_edge_pool`] but from an in-memory document.
pub fn edge_pool_from_str(xml: &str) -> TripResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut edges = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 1 {
                    push_edge(&e, &mut edges)?;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 1 {
                    push_edge(&e, &mut edges)?;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(edges)
}

fn push_edge(e: &BytesStart<'_>, edges: &mut Vec<String>) -> TripResult<()> {
    if e.name().as_ref() != b"edge" {
        return Ok(());
    }
    let Some(id) = e.try_get_attribute("id")? else {
        return Err(TripError::MissingAttribute { element: "edge", attribute: "id" });
    };
    let id = id.unescape_value()?;
    if !id.starts_with(INTERNAL_EDGE_PREFIX) {
        edges.push(id.into_owned());
    }
    Ok(())
}
