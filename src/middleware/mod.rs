pub mod bearer;

pub use bearer::MaybeBearer;
