pub(crate) mod core;
pub(crate) mod digest;
pub(crate) mod error;
pub(crate) mod math;
pub(crate) mod pool;
