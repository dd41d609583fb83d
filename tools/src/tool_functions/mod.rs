pub mod list_files;
pub mod read_file;
pub mod run_command;
pub mod write_file;
