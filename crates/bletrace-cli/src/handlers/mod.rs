pub mod init;
pub mod replay;
pub mod run;
pub mod status;
