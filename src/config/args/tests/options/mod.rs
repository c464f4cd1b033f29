mod copy_options;
mod list_file;
mod performance;
mod timeout;
mod tracing;
