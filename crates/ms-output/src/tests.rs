//! Unit tests for ms-output.

use ms_core::Proportions;
use ms_emission::EmissionTotals;

use crate::ResultRow;

fn row(pkw: f64, co2: f64) -> ResultRow {
    ResultRow {
        proportions: Proportions::new([pkw, 0.2, 0.1, 0.0]).unwrap(),
        totals:      EmissionTotals { co2, co: 1.0, hc: 0.5, nox: 2.0, pmx: 0.25, fuel: 3.0 },
    }
}

mod results {
    use super::row;
    use crate::{OutputWriter, ResultRow, ResultsWriter};

    const HEADER: &str = "pkw,bus,scooter,bike,co2,co,hc,nox,pmx,fuel";

    #[test]
    fn header_columns() {
        assert_eq!(ResultRow::header().join(","), HEADER);
    }

    #[test]
    fn new_file_gets_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let mut w = ResultsWriter::open(&path).unwrap();
        w.write_result(&row(0.7, 10.0)).unwrap();
        w.write_result(&row(0.5, 12.5)).unwrap();
        w.finish().unwrap();
        assert_eq!(w.rows_written(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, [HEADER, "0.7,0.2,0.1,0,10,1,0.5,2,0.25,3", "0.5,0.2,0.1,0,12.5,1,0.5,2,0.25,3"]);
    }

    #[test]
    fn rows_are_flushed_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let mut w = ResultsWriter::open(&path).unwrap();
        w.write_result(&row(0.7, 10.0)).unwrap();
        // Still open: the row must already be on disk.
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn reopening_appends_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        {
            let mut w = ResultsWriter::open(&path).unwrap();
            w.write_result(&row(0.7, 10.0)).unwrap();
        }
        {
            let mut w = ResultsWriter::open(&path).unwrap();
            w.write_result(&row(0.6, 11.0)).unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.matches("pkw,bus").count(), 1);
    }

    #[test]
    fn empty_existing_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        std::fs::write(&path, "").unwrap();

        ResultsWriter::open(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim_end(), HEADER);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("results.csv");
        ResultsWriter::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ResultsWriter::open(&dir.path().join("r.csv")).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

mod vehicles {
    use ms_emission::{EmissionTotals, VehicleEmissionRow, class_means};

    use crate::{VehicleCsvWriter, write_class_means};

    fn vehicle(time: Option<f64>, id: &str, ty: &str, co2: f64) -> VehicleEmissionRow {
        VehicleEmissionRow {
            scenario:     "1".to_owned(),
            time,
            vehicle:      id.to_owned(),
            vehicle_type: ty.to_owned(),
            emissions:    EmissionTotals { co2, ..Default::default() },
            speed:        8.5,
        }
    }

    #[test]
    fn per_vehicle_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emissions.csv");

        let mut w = VehicleCsvWriter::create(&path).unwrap();
        w.write_rows(&[vehicle(Some(1.0), "pkw_0", "pkw", 2.5), vehicle(None, "bus_0", "bus", 4.0)])
            .unwrap();
        w.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,vehicle,type,co2,co,hc,nox,pmx,fuel,speed");
        assert_eq!(lines[1], "1,pkw_0,pkw,2.5,0,0,0,0,0,8.5");
        assert_eq!(lines[2], ",bus_0,bus,4,0,0,0,0,0,8.5");
    }

    #[test]
    fn class_mean_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("means.csv");
        let rows = [
            vehicle(Some(0.0), "pkw_0", "pkw", 2.0),
            vehicle(Some(1.0), "pkw_0", "pkw", 4.0),
        ];

        write_class_means(&path, &class_means(&rows)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["scenario,type,samples,co2,co,hc,nox,pmx,fuel", "1,pkw,2,3,0,0,0,0,0"]);
    }
}
