use std::path::PathBuf;

pub const STDIN_LIST_FILE: &str = "-";

/// Accepts "-" for standard input, otherwise an existing regular file.
pub fn check_list_file(list_file: &str) -> Result<String, String> {
    if list_file == STDIN_LIST_FILE {
        return Ok(list_file.to_string());
    }

    let file_path = PathBuf::from(list_file);
    if file_path.is_file() {
        Ok(file_path.to_string_lossy().to_string())
    } else {
        Err(format!("list file does not exist: {}", file_path.display()))
    }
}
