pub(crate) mod copy;
pub(crate) mod elements;
pub(crate) mod layout;
pub(crate) mod page;
