pub mod cover_letter;
pub mod filename;
pub mod handlers;
pub mod pdf;
pub mod storage;
