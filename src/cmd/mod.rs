pub mod init;
pub mod month;
pub mod notes;
pub mod root;
pub mod shopping;
