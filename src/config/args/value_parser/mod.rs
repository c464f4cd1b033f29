pub mod canned_acl;
pub mod list_file;
pub mod regex;
pub mod storage_class;
pub mod url;
