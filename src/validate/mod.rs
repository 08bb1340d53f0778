pub(crate) mod content;
pub(crate) mod issue;
pub(crate) mod layout;
pub(crate) mod text_fit;
