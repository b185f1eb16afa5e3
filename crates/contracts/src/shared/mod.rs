pub mod report_table;
