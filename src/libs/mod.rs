pub mod barcode;
pub mod estimate;
pub mod io;
pub mod jaccard;
pub mod pair;
pub mod params;
pub mod sample;
