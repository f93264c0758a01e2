//! Git test helper - builds hermetic repositories on disk without a git binary

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Commit id used for every ref unless a test picks its own
pub const COMMIT: &str = "3f1c2a9d8e7b6a5f4e3d2c1b0a9f8e7d6c5b4a39";

/// A repository made of a `.git` directory with refs and a work tree
pub struct GitTestRepo {
    /// Temporary directory containing the repository
    _temp_dir: TempDir,
    /// Path to the work tree root
    pub path: PathBuf,
}

impl GitTestRepo {
    /// An empty repository with `HEAD` on `main`
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().to_path_buf();

        fs::create_dir_all(path.join(".git/refs/heads")).expect("Failed to create .git");
        fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n").expect("Failed to write HEAD");

        let repo = GitTestRepo {
            _temp_dir: temp_dir,
            path,
        };
        repo.create_branch("main");
        repo
    }

    /// A repository with a few branches, a tag and some files
    pub fn with_sample_content() -> Self {
        let repo = Self::new();
        repo.create_branch("feature/search");
        repo.create_branch("release-1.0");
        repo.write_packed_refs(&[
            ("refs/remotes/origin/main", COMMIT),
            ("refs/tags/v1.0", COMMIT),
        ]);
        repo.create_file("README.md", "# Sample\n\nA repository for tests.\n");
        repo.create_file("src/main.rs", "fn main() {\n    println!(\"hello\");\n}\n");
        repo.create_file("src/lib.rs", "pub fn answer() -> u32 {\n    42\n}\n");
        repo.create_file("docs/guide.md", "Guide\n");
        repo
    }

    /// Create a file with content
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(relative_path);

        // Create parent directories if needed
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Write a loose branch ref
    pub fn create_branch(&self, name: &str) {
        self.create_file(&format!(".git/refs/heads/{name}"), &format!("{COMMIT}\n"));
    }

    /// Replace `packed-refs` with `refs`
    pub fn write_packed_refs(&self, refs: &[(&str, &str)]) {
        let mut content = String::from("# pack-refs with: peeled fully-peeled sorted\n");
        for (name, target) in refs {
            content.push_str(&format!("{target} {name}\n"));
        }
        self.create_file(".git/packed-refs", &content);
    }

    /// A file with `count` numbered lines, for scrolling tests
    pub fn create_numbered_file(&self, relative_path: &str, count: usize) -> PathBuf {
        let content: String = (1..=count).map(|i| format!("line {i}\n")).collect();
        self.create_file(relative_path, &content)
    }
}
