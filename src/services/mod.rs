pub mod slicer;
pub mod threemf;
