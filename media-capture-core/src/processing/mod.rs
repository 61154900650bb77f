pub mod mime;
pub mod uri;
