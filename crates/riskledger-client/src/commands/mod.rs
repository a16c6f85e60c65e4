pub mod analyze;
pub mod columns;
