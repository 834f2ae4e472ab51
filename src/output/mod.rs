//! Output formatting module.
//!
//! Console text for interactive use, or a timestamped JSON file written once
//! the scan has finished.

mod json_format;
mod plain;

pub use json_format::{report_file_name, write_json_report};
pub use plain::{
    print_error, print_results, print_scan_header, print_success, print_warning, write_plain,
    write_summary,
};
