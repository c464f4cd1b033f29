#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::config::args::*;
    use crate::types::EnumerationCursor;

    #[test]
    fn list_file_from_stdin() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--list-file",
            "-",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.list_source, Some(ListSource::Stdin));
        assert_eq!(config.initial_cursor(), EnumerationCursor::Start);
    }

    #[test]
    fn list_file_from_file() {
        init_dummy_tracing_subscriber();

        let mut list_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(list_file, "dir1/data1").unwrap();
        let path = list_file.path().to_string_lossy().to_string();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--list-file",
            &path,
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(
            config.list_source,
            Some(ListSource::File(PathBuf::from(&path)))
        );
    }

    #[test]
    fn list_file_not_found() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--list-file",
            "./no_such_dir/keys.txt",
        ];

        assert!(build_config_from_args(args).is_err());
    }

    #[test]
    fn list_file_conflicts_with_marker() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3bulkcopy",
            "--source",
            "source-bucket",
            "--target",
            "target-bucket",
            "--list-file",
            "-",
            "--marker",
            "dir1/data1",
        ];

        assert!(parse_from_args(args).is_err());
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
