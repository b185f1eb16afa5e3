pub mod d400_funnel_report;
