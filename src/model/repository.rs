//! Read-only access to a repository on disk.
//!
//! Refs are read straight from the git directory (`HEAD`, loose refs under
//! `refs/` and `packed-refs`); files come from a gitignore-aware walk of the
//! work tree.

use crate::error::EngineError;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

/// Kind of a ref, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefKind {
    Head,
    Branch,
    Remote,
    Tag,
    Other,
}

impl RefKind {
    fn of(name: &str) -> Self {
        if name == "HEAD" {
            RefKind::Head
        } else if name.starts_with("refs/heads/") {
            RefKind::Branch
        } else if name.starts_with("refs/remotes/") {
            RefKind::Remote
        } else if name.starts_with("refs/tags/") {
            RefKind::Tag
        } else {
            RefKind::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RefKind::Head => "head",
            RefKind::Branch => "branch",
            RefKind::Remote => "remote",
            RefKind::Tag => "tag",
            RefKind::Other => "ref",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    /// Full name, e.g. `refs/heads/main`
    pub name: String,
    /// Object id, or `ref: <name>` for a symbolic ref
    pub target: String,
    pub kind: RefKind,
}

impl GitRef {
    /// Name without the `refs/<kind>/` prefix
    pub fn short_name(&self) -> &str {
        ["refs/heads/", "refs/remotes/", "refs/tags/", "refs/"]
            .iter()
            .find_map(|prefix| self.name.strip_prefix(prefix))
            .unwrap_or(&self.name)
    }
}

/// How a changed path affects what is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKind {
    /// Internal bookkeeping, nothing to do
    Ignored,
    /// File content changed
    Content,
    /// Files or refs appeared, disappeared or moved
    Structural,
}

/// A repository: a work tree and its git directory.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    git_dir: PathBuf,
}

impl Repository {
    /// Find the repository containing `path` by walking up to the first
    /// directory with a `.git` entry.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let start = fs::canonicalize(path).map_err(|e| {
            EngineError::runtime(format!("Cannot open {}: {}", path.display(), e))
        })?;

        for dir in start.ancestors() {
            let dot_git = dir.join(".git");
            if dot_git.is_dir() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                    git_dir: dot_git,
                });
            }
            if dot_git.is_file() {
                let git_dir = read_gitdir_file(&dot_git, dir)?;
                return Ok(Self {
                    root: dir.to_path_buf(),
                    git_dir,
                });
            }
        }
        Err(EngineError::runtime(format!(
            "Not a git repository: {}",
            start.display()
        )))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Display name: the work tree's directory name.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// `HEAD` first, then every ref sorted by name. Loose refs win over
    /// packed ones.
    pub fn refs(&self) -> Result<Vec<GitRef>, EngineError> {
        let mut refs: BTreeMap<String, String> = BTreeMap::new();

        let packed = self.git_dir.join("packed-refs");
        if packed.is_file() {
            for line in fs::read_to_string(&packed)?.lines() {
                if line.starts_with('#') || line.starts_with('^') {
                    continue;
                }
                if let Some((target, name)) = line.split_once(' ') {
                    refs.insert(name.trim().to_string(), target.trim().to_string());
                }
            }
        }

        let refs_dir = self.git_dir.join("refs");
        if refs_dir.is_dir() {
            collect_loose_refs(&refs_dir, "refs", &mut refs)?;
        }

        let mut out = Vec::with_capacity(refs.len() + 1);
        if let Some(head) = self.head()? {
            out.push(head);
        }
        out.extend(refs.into_iter().map(|(name, target)| GitRef {
            kind: RefKind::of(&name),
            name,
            target,
        }));
        Ok(out)
    }

    fn head(&self) -> Result<Option<GitRef>, EngineError> {
        let path = self.git_dir.join("HEAD");
        if !path.is_file() {
            return Ok(None);
        }
        let target = fs::read_to_string(&path)?.trim().to_string();
        Ok(Some(GitRef {
            name: "HEAD".to_string(),
            target,
            kind: RefKind::Head,
        }))
    }

    /// Work tree files relative to the root, sorted. Honors `.gitignore`.
    pub fn files(&self) -> Result<Vec<PathBuf>, EngineError> {
        let mut files = Vec::new();
        let walker = ignore::WalkBuilder::new(&self.root)
            .hidden(false)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                files.push(relative.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Up to `max_lines` lines of a work tree file. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn read_file(&self, relative: &Path, max_lines: usize) -> Result<Vec<String>, EngineError> {
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(EngineError::runtime(format!(
                "Path outside repository: {}",
                relative.display()
            )));
        }
        let file = fs::File::open(self.root.join(relative))?;
        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        while lines.len() < max_lines {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            lines.push(line.trim_end_matches(['\n', '\r']).replace('\t', "    "));
        }
        Ok(lines)
    }

    /// Decide what a change to `path` means for the views. `structural` is
    /// true for creations, removals and renames.
    pub fn classify(&self, path: &Path, structural: bool) -> ChangeKind {
        if let Ok(inside_git) = path.strip_prefix(&self.git_dir) {
            let first = inside_git
                .components()
                .next()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .unwrap_or_default();
            return match first.as_str() {
                "HEAD" | "refs" | "packed-refs" => ChangeKind::Structural,
                _ => ChangeKind::Ignored,
            };
        }
        if !path.starts_with(&self.root) {
            return ChangeKind::Ignored;
        }
        if structural {
            ChangeKind::Structural
        } else {
            ChangeKind::Content
        }
    }
}

fn read_gitdir_file(dot_git: &Path, work_tree: &Path) -> Result<PathBuf, EngineError> {
    let contents = fs::read_to_string(dot_git)?;
    let target = contents
        .lines()
        .find_map(|line| line.strip_prefix("gitdir:"))
        .map(str::trim)
        .ok_or_else(|| EngineError::runtime(format!("Malformed {}", dot_git.display())))?;
    Ok(work_tree.join(target))
}

fn collect_loose_refs(
    dir: &Path,
    prefix: &str,
    out: &mut BTreeMap<String, String>,
) -> Result<(), EngineError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = format!("{}/{}", prefix, entry.file_name().to_string_lossy());
        let path = entry.path();
        if path.is_dir() {
            collect_loose_refs(&path, &name, out)?;
        } else {
            let target = fs::read_to_string(&path)?.trim().to_string();
            if !target.is_empty() {
                out.insert(name, target);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git/refs/heads/feature")).unwrap();
        fs::create_dir_all(root.join(".git/refs/tags")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(root.join(".git/refs/heads/main"), "1111\n").unwrap();
        fs::write(root.join(".git/refs/heads/feature/x"), "2222\n").unwrap();
        fs::write(
            root.join(".git/packed-refs"),
            "# pack-refs with: peeled\n3333 refs/tags/v1.0\n^4444\n9999 refs/heads/main\n",
        )
        .unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/lib.rs"), "fn a() {}\n\tfn b() {}\n").unwrap();
        fs::write(root.join("README.md"), "hello\n").unwrap();
        fs::write(root.join(".gitignore"), "target/\n").unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::write(root.join("target/out"), "x").unwrap();
        let repo = Repository::open(&root.join("src")).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_refs_merge_loose_and_packed() {
        let (_dir, repo) = fixture();
        let refs = repo.refs().unwrap();
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["HEAD", "refs/heads/feature/x", "refs/heads/main", "refs/tags/v1.0"]
        );
        assert_eq!(refs[0].target, "ref: refs/heads/main");
        assert_eq!(refs[2].target, "1111");
        assert_eq!(refs[3].kind, RefKind::Tag);
        assert_eq!(refs[1].short_name(), "feature/x");
    }

    #[test]
    fn test_files_honor_gitignore() {
        let (_dir, repo) = fixture();
        let files = repo.files().unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from(".gitignore"),
                PathBuf::from("README.md"),
                PathBuf::from("src/lib.rs"),
            ]
        );
    }

    #[test]
    fn test_read_file_expands_tabs_and_stops_at_limit() {
        let (_dir, repo) = fixture();
        let lines = repo.read_file(Path::new("src/lib.rs"), 10).unwrap();
        assert_eq!(lines, vec!["fn a() {}", "    fn b() {}"]);
        assert_eq!(repo.read_file(Path::new("src/lib.rs"), 1).unwrap().len(), 1);
        assert!(repo.read_file(Path::new("../etc/passwd"), 1).is_err());
    }

    #[test]
    fn test_classify_changes() {
        let (_dir, repo) = fixture();
        let git = repo.git_dir().to_path_buf();
        assert_eq!(repo.classify(&git.join("objects/ab/cd"), true), ChangeKind::Ignored);
        assert_eq!(repo.classify(&git.join("refs/heads/main"), false), ChangeKind::Structural);
        assert_eq!(repo.classify(&repo.root().join("README.md"), false), ChangeKind::Content);
        assert_eq!(repo.classify(&repo.root().join("new.rs"), true), ChangeKind::Structural);
    }

    #[test]
    fn test_open_outside_repository_fails() {
        let dir = TempDir::new().unwrap();
        // A temp dir may itself live inside a repository; only check when not
        if Repository::open(dir.path()).is_err() {
            assert!(Repository::open(&dir.path().join("missing")).is_err());
        }
    }
}
