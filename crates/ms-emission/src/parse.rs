//! Streaming parser for SUMO `<emission-export>` documents.
//!
//! Vehicle elements are read wherever they occur, nested in `<timestep>` or
//! directly under the root.  Pollutant attributes that are absent count as
//! zero; present but non-numeric values are an error.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::AddAssign;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::{EmissionError, EmissionResult};

// ── Data ──────────────────────────────────────────────────────────────────────

/// Sums (or means) of the six pollutant channels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmissionTotals {
    pub co2:  f64,
    pub co:   f64,
    pub hc:   f64,
    pub nox:  f64,
    pub pmx:  f64,
    pub fuel: f64,
}

impl EmissionTotals {
    /// Column names in [`as_array`](Self::as_array) order.
    pub const COLUMNS: [&'static str; 6] = ["co2", "co", "hc", "nox", "pmx", "fuel"];

    pub fn as_array(&self) -> [f64; 6] {
        [self.co2, self.co, self.hc, self.nox, self.pmx, self.fuel]
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            co2:  self.co2 * factor,
            co:   self.co * factor,
            hc:   self.hc * factor,
            nox:  self.nox * factor,
            pmx:  self.pmx * factor,
            fuel: self.fuel * factor,
        }
    }
}

/// `co2=… co=… hc=… nox=… pmx=… fuel=…` in [`EmissionTotals::COLUMNS`]
/// order; a precision (`{:.3}`) applies to every value.
impl fmt::Display for EmissionTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in Self::COLUMNS.iter().zip(self.as_array()).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match f.precision() {
                Some(p) => write!(f, "{name}={value:.p$}")?,
                None => write!(f, "{name}={value}")?,
            }
        }
        Ok(())
    }
}

impl AddAssign for EmissionTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.co2 += rhs.co2;
        self.co += rhs.co;
        self.hc += rhs.hc;
        self.nox += rhs.nox;
        self.pmx += rhs.pmx;
        self.fuel += rhs.fuel;
    }
}

/// One `<vehicle>` element of an emission file, tagged with the scenario it
/// came from.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleEmissionRow {
    pub scenario:     String,
    /// `time` of the enclosing `<timestep>`, if any.
    pub time:         Option<f64>,
    pub vehicle:      String,
    pub vehicle_type: String,
    pub emissions:    EmissionTotals,
    pub speed:        f64,
}

#[derive(Default)]
struct Sample {
    id:           String,
    vehicle_type: String,
    emissions:    EmissionTotals,
    speed:        f64,
}

// ── Totals ────────────────────────────────────────────────────────────────────

/// Sum every vehicle element of the file at `path`.
///
/// Returns `Ok(None)` if the file does not exist (the simulator produced no
/// output for this run).
pub fn aggregate_totals(path: &Path) -> EmissionResult<Option<EmissionTotals>> {
    let Some(reader) = open(path)? else {
        return Ok(None);
    };
    let mut totals = EmissionTotals::default();
    let mut vehicles = 0usize;
    visit(reader, |_, sample| {
        totals += sample.emissions;
        vehicles += 1;
    })?;
    log::debug!("{}: {vehicles} vehicle samples", path.display());
    Ok(Some(totals))
}

pub fn totals_from_str(xml: &str) -> EmissionResult<EmissionTotals> {
    let mut totals = EmissionTotals::default();
    visit(Reader::from_str(xml), |_, sample| totals += sample.emissions)?;
    Ok(totals)
}

// ── Per-vehicle rows ──────────────────────────────────────────────────────────

/// One row per vehicle element of the file at `path`, in document order.
/// `Ok(None)` if the file does not exist.
pub fn read_vehicle_rows(path: &Path, scenario: &str) -> EmissionResult<Option<Vec<VehicleEmissionRow>>> {
    let Some(reader) = open(path)? else {
        return Ok(None);
    };
    collect_rows(reader, scenario).map(Some)
}

pub fn vehicle_rows_from_str(xml: &str, scenario: &str) -> EmissionResult<Vec<VehicleEmissionRow>> {
    collect_rows(Reader::from_str(xml), scenario)
}

fn collect_rows<R: BufRead>(reader: Reader<R>, scenario: &str) -> EmissionResult<Vec<VehicleEmissionRow>> {
    let mut rows = Vec::new();
    visit(reader, |time, sample| {
        rows.push(VehicleEmissionRow {
            scenario: scenario.to_owned(),
            time,
            vehicle: sample.id,
            vehicle_type: sample.vehicle_type,
            emissions: sample.emissions,
            speed: sample.speed,
        });
    })?;
    Ok(rows)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open(path: &Path) -> EmissionResult<Option<Reader<BufReader<File>>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(Reader::from_reader(BufReader::new(file)))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("no emission output at {}", path.display());
            Ok(None)
        }
        Err(source) => Err(EmissionError::File {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn visit<R, F>(mut reader: Reader<R>, mut f: F) -> EmissionResult<()>
where
    R: BufRead,
    F: FnMut(Option<f64>, Sample),
{
    let mut buf = Vec::new();
    let mut time = None;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"timestep" => time = timestep_time(&e)?,
            Event::End(e) if e.name().as_ref() == b"timestep" => time = None,
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"vehicle" => {
                f(time, read_sample(&e)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn timestep_time(e: &BytesStart<'_>) -> EmissionResult<Option<f64>> {
    match e.try_get_attribute("time")? {
        Some(attr) => number("time", &attr.unescape_value()?).map(Some),
        None => Ok(None),
    }
}

fn read_sample(e: &BytesStart<'_>) -> EmissionResult<Sample> {
    let mut s = Sample::default();
    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"id" => s.id = value.into_owned(),
            b"type" => s.vehicle_type = value.into_owned(),
            b"CO2" => s.emissions.co2 = number("CO2", &value)?,
            b"CO" => s.emissions.co = number("CO", &value)?,
            b"HC" => s.emissions.hc = number("HC", &value)?,
            b"NOx" => s.emissions.nox = number("NOx", &value)?,
            b"PMx" => s.emissions.pmx = number("PMx", &value)?,
            b"fuel" => s.emissions.fuel = number("fuel", &value)?,
            b"speed" => s.speed = number("speed", &value)?,
            _ => {}
        }
    }
    Ok(s)
}

fn number(attribute: &str, raw: &str) -> EmissionResult<f64> {
    raw.trim().parse::<f64>().map_err(|_| EmissionError::InvalidNumber {
        attribute: attribute.to_owned(),
        value:     raw.to_owned(),
    })
}
