pub mod completions;
pub mod describe;
pub mod ops;
pub mod run;
