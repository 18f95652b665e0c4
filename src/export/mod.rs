//! Trace and summary export (JSON parallel arrays, CSV time series).

mod csv_export;
mod json_export;

pub use csv_export::{export_csv, export_csv_to, DayRecord};
pub use json_export::{export_json, export_json_to, SimulationExport, TraceExport};
