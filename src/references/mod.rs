pub(crate) mod archetype;
pub(crate) mod cache;
pub(crate) mod fingerprint;
pub(crate) mod index;
pub(crate) mod selector;
