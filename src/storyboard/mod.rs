pub(crate) mod diversity;
pub(crate) mod planner;
pub(crate) mod request;
pub(crate) mod role;
