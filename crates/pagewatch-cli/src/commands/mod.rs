pub mod diff;
pub mod track;
