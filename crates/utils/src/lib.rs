pub mod fs;
pub mod sanitize;
pub mod tempdir;
