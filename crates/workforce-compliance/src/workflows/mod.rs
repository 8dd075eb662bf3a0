pub mod documents;
pub mod signatures;
