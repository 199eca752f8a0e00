pub mod io;
pub mod plan;
pub mod sample_size;
pub mod select;
pub mod validate;
