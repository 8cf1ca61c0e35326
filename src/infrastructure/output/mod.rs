//! Output service implementations

pub mod filesystem_output;

pub use filesystem_output::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::OutputService;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_filesystem_output_write_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();
        let path = temp_dir.path().join("tools/search.py");

        output_service
            .write_file(&path, "def search(q):\n    return q\n")
            .await
            .expect("write should succeed");

        let content = std::fs::read_to_string(&path).expect("Failed to read search.py");
        assert_eq!(content, "def search(q):\n    return q\n");
    }

    #[tokio::test]
    async fn test_filesystem_output_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();
        let path = temp_dir.path().join("main.py");

        output_service.write_file(&path, "a much longer first version").await.unwrap();
        output_service.write_file(&path, "short").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");
    }

    #[tokio::test]
    async fn test_filesystem_output_ensure_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();

        let nested_dir = temp_dir.path().join("a/b/c");
        let result = output_service.ensure_directory(&nested_dir).await;
        assert!(result.is_ok());
        assert!(nested_dir.exists());
        assert!(nested_dir.is_dir());
    }

    #[tokio::test]
    async fn test_filesystem_output_list_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();
        let root = temp_dir.path();

        for name in ["main.py", "pkg/models.py", "pkg/sub/api.py"] {
            output_service.write_file(&root.join(name), "x").await.unwrap();
        }
        output_service.ensure_directory(&root.join("empty")).await.unwrap();

        let files = output_service.list_files(root).await.unwrap();
        assert_eq!(files, ["main.py", "pkg/models.py", "pkg/sub/api.py"]);
    }

    #[tokio::test]
    async fn test_filesystem_output_list_missing_directory_errors() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new();
        assert!(output_service.list_files(&temp_dir.path().join("nope")).await.is_err());
    }
}
