//! Table output for kubekit listings

mod style;
mod table;

pub use style::{color_status, installed_mark, status_color};
pub use table::Table;
