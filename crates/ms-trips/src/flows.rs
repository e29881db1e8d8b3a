//! Rewriting `<flow number=…>` counts of a hand-authored route file.
//!
//! An alternative to generating trips: the route file already declares one
//! or more flows per vehicle type, and each scenario only rescales how many
//! vehicles every flow emits.  All other content of the document is copied
//! through unchanged.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use ms_core::{ClassSampler, Proportions, VehicleClass};

use crate::{TripError, TripResult};

/// Total `number` of all flows per class, indexed by `VehicleClass::index`.
/// Flows whose `type` is not a known class are skipped.
pub fn class_flow_totals(xml: &str) -> TripResult<[u64; VehicleClass::COUNT]> {
    let mut totals = [0u64; VehicleClass::COUNT];
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"flow" => {
                if let Some(class) = flow_class(&e)? {
                    totals[class.index()] += flow_number(&e)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(totals)
}

/// Set every flow of a class to an absolute vehicle count.
///
/// Classes absent from `counts` keep their current numbers.
pub fn set_flow_numbers(xml: &str, counts: &[(VehicleClass, u64)]) -> TripResult<String> {
    rewrite_flows(xml, |class, current| {
        counts
            .iter()
            .find(|(c, _)| *c == class)
            .map_or(current, |(_, n)| *n)
    })
}

/// Redistribute the document's total flow volume according to `proportions`.
///
/// With `T` the total over all class flows, class `c` targets
/// `floor(share(c) * T)` vehicles, split across its flows in proportion to
/// their current numbers.  Every flow keeps at least one vehicle.
pub fn adjust_flow_shares(xml: &str, proportions: &Proportions) -> TripResult<String> {
    let shares = ClassSampler::new(proportions)?;
    let totals = class_flow_totals(xml)?;
    let grand_total: u64 = totals.iter().sum();

    let targets = VehicleClass::ALL.map(|c| (shares.probability(c) * grand_total as f64) as u64);
    for class in VehicleClass::ALL {
        log::info!(
            "  {class}: {} vehicles ({:.1}%)",
            targets[class.index()],
            shares.probability(class) * 100.0
        );
    }

    rewrite_flows(xml, |class, current| {
        let target = targets[class.index()];
        let class_total = totals[class.index()];
        let scaled = if class_total > 0 {
            target.saturating_mul(current) / class_total
        } else {
            target
        };
        scaled.max(1)
    })
}

/// File form of [`adjust_flow_shares`]: read `input`, write `output`.
pub fn adjust_flow_file(input: &Path, output: &Path, proportions: &Proportions) -> TripResult<()> {
    let xml = std::fs::read_to_string(input).map_err(|source| TripError::File {
        path: input.to_path_buf(),
        source,
    })?;
    let adjusted = adjust_flow_shares(&xml, proportions)?;
    std::fs::write(output, adjusted).map_err(|source| TripError::File {
        path: output.to_path_buf(),
        source,
    })?;
    log::debug!("flow-adjusted route file written to {}", output.display());
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Copy `xml` through, replacing the `number` of each known-class flow with
/// `f(class, current_number)`.
fn rewrite_flows<F>(xml: &str, mut f: F) -> TripResult<String>
where
    F: FnMut(VehicleClass, u64) -> u64,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"flow" => {
                let e = rewrite_flow(&e, &mut f)?;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) if e.name().as_ref() == b"flow" => {
                let e = rewrite_flow(&e, &mut f)?;
                writer.write_event(Event::Empty(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

fn rewrite_flow<F>(e: &BytesStart<'_>, f: &mut F) -> TripResult<BytesStart<'static>>
where
    F: FnMut(VehicleClass, u64) -> u64,
{
    let Some(class) = flow_class(e)? else {
        return Ok(e.clone().into_owned());
    };
    let current = match e.try_get_attribute("number")? {
        Some(_) => flow_number(e)?,
        None => 0,
    };
    let number = f(class, current).to_string();

    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    let mut replaced = false;
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"number" {
            out.push_attribute(("number", number.as_str()));
            replaced = true;
        } else {
            out.push_attribute(attr);
        }
    }
    if !replaced {
        out.push_attribute(("number", number.as_str()));
    }
    Ok(out)
}

fn flow_class(e: &BytesStart<'_>) -> TripResult<Option<VehicleClass>> {
    let Some(t) = e.try_get_attribute("type")? else {
        return Ok(None);
    };
    Ok(t.unescape_value()?.parse::<VehicleClass>().ok())
}

fn flow_number(e: &BytesStart<'_>) -> TripResult<u64> {
    let Some(n) = e.try_get_attribute("number")? else {
        return Err(TripError::MissingAttribute { element: "flow", attribute: "number" });
    };
    let raw = n.unescape_value()?;
    raw.trim().parse::<u64>().map_err(|_| TripError::InvalidAttribute {
        attribute: "number".to_owned(),
        value:     raw.to_string(),
    })
}
