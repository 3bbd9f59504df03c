pub mod award;
pub mod badge;
pub mod errors;
pub mod ids;
pub mod points;
pub mod snapshot;
