pub mod grade_panel;
pub mod table;

pub use table::FunnelReportPage;
