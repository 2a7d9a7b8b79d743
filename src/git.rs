//! Git branch indicator with a short-lived cache.
//!
//! Every prompt render asks for the branch; the cache keeps us from
//! shelling out to git more than once per TTL window.

use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

pub const BRANCH_TTL: Duration = Duration::from_secs(5);

const ICON_MAIN: &str = "⚡";
const ICON_WORKTREE: &str = "🔀";
const WORKTREE_LABEL: &str = " (worktree)";

struct CachedBranch {
    dir: PathBuf,
    value: String,
    expires: Instant,
}

pub struct BranchCache {
    ttl: Duration,
    entry: RwLock<Option<CachedBranch>>,
}

impl Default for BranchCache {
    fn default() -> Self {
        Self::new(BRANCH_TTL)
    }
}

impl BranchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entry) = self.entry.write() {
            *entry = None;
        }
    }

    /// Formatted branch indicator for `dir`, e.g. `" ⚡ main"` or
    /// `" 🔀 feature (worktree)"`. Empty when `dir` is not in a git work tree
    /// or HEAD is detached.
    pub fn get_branch(&self, dir: &Path) -> String {
        if let Some(hit) = self.lookup(dir) {
            return hit;
        }

        let Some(value) = branch_indicator(dir) else {
            return String::new();
        };

        if let Ok(mut entry) = self.entry.write() {
            *entry = Some(CachedBranch {
                dir: dir.to_path_buf(),
                value: value.clone(),
                expires: Instant::now() + self.ttl,
            });
        }

        value
    }

    fn lookup(&self, dir: &Path) -> Option<String> {
        let entry = self.entry.read().ok()?;
        let cached = entry.as_ref()?;
        if cached.dir == dir && Instant::now() < cached.expires && !cached.value.is_empty() {
            Some(cached.value.clone())
        } else {
            None
        }
    }
}

fn branch_indicator(dir: &Path) -> Option<String> {
    if !dir.join(".git").exists() {
        git(dir, &["rev-parse", "--git-dir"])?;
    }

    let branch = git(dir, &["branch", "--show-current"])?;
    if branch.is_empty() {
        debug!("Detached HEAD in {}", dir.display());
        return None;
    }

    let (icon, label) = if is_linked_worktree(dir) {
        (ICON_WORKTREE, WORKTREE_LABEL)
    } else {
        (ICON_MAIN, "")
    };

    Some(format!(" {icon} {branch}{label}"))
}

/// A linked worktree has its own git-dir under the shared common dir.
/// git may report either path relative to `dir`, so both are resolved
/// before comparing.
fn is_linked_worktree(dir: &Path) -> bool {
    let (Some(git_dir), Some(common_dir)) = (
        git(dir, &["rev-parse", "--git-dir"]),
        git(dir, &["rev-parse", "--git-common-dir"]),
    ) else {
        return false;
    };

    resolve_path(dir, Path::new(&git_dir)) != resolve_path(dir, Path::new(&common_dir))
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return clean_path(path);
    }
    match std::path::absolute(base) {
        Ok(abs_base) => clean_path(&abs_base.join(path)),
        Err(_) => clean_path(&base.join(path)),
    }
}

/// Lexically normalise `.` and `..` components.
fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Run git in `dir` and return trimmed stdout, or `None` on any failure.
fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let mut cmd = Command::new("git");
    if !dir.as_os_str().is_empty() {
        cmd.arg("-C").arg(dir);
    }
    cmd.args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn run_git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .output()
            .unwrap_or_else(|e| panic!("git {} failed: {e}", args.join(" ")));
        assert!(
            output.status.success(),
            "git {} failed:\nstdout: {}\nstderr: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn init_repo() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().canonicalize().unwrap();
        run_git(&path, &["init"]);
        run_git(&path, &["config", "user.name", "Test User"]);
        run_git(&path, &["config", "user.email", "test@example.com"]);
        fs::write(path.join("README.md"), "test").unwrap();
        run_git(&path, &["add", "README.md"]);
        run_git(&path, &["commit", "-m", "Initial commit"]);
        (dir, path)
    }

    #[test]
    fn test_main_repo() {
        let (_guard, repo) = init_repo();
        let result = BranchCache::default().get_branch(&repo);

        assert!(result.contains(ICON_MAIN), "got {result:?}");
        assert!(!result.contains(ICON_WORKTREE), "got {result:?}");
        assert!(!result.contains("(worktree)"), "got {result:?}");
    }

    #[test]
    fn test_main_repo_with_worktrees_dir() {
        let (_guard, repo) = init_repo();
        fs::create_dir(repo.join(".worktrees")).unwrap();

        let result = BranchCache::default().get_branch(&repo);
        assert!(result.contains(ICON_MAIN), "got {result:?}");
        assert!(!result.contains("(worktree)"), "got {result:?}");
    }

    #[test]
    fn test_linked_worktree() {
        let (_guard, repo) = init_repo();
        let worktree = repo.join(".worktrees").join("test-branch");
        run_git(
            &repo,
            &["worktree", "add", "-b", "test-branch", worktree.to_str().unwrap()],
        );

        let result = BranchCache::default().get_branch(&worktree);
        assert!(result.contains(ICON_WORKTREE), "got {result:?}");
        assert!(result.contains("(worktree)"), "got {result:?}");
        assert!(result.contains("test-branch"), "got {result:?}");
        assert!(!result.contains(ICON_MAIN), "got {result:?}");
    }

    #[test]
    fn test_subdirectory_of_main_repo_is_not_worktree() {
        let (_guard, repo) = init_repo();
        let sub = repo.join("nested").join("deeper");
        fs::create_dir_all(&sub).unwrap();

        let result = BranchCache::default().get_branch(&sub);
        assert!(result.contains(ICON_MAIN), "got {result:?}");
        assert!(!result.contains("(worktree)"), "got {result:?}");
    }

    #[test]
    fn test_feature_branch_name() {
        let (_guard, repo) = init_repo();
        run_git(&repo, &["checkout", "-b", "feature-branch"]);

        let result = BranchCache::default().get_branch(&repo);
        assert!(result.contains("feature-branch"), "got {result:?}");
    }

    #[test]
    fn test_non_git_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(BranchCache::default().get_branch(dir.path()), "");
    }

    #[test]
    fn test_cache_serves_stale_branch_within_ttl() {
        let (_guard, repo) = init_repo();
        let cache = BranchCache::new(Duration::from_secs(60));
        let first = cache.get_branch(&repo);

        run_git(&repo, &["checkout", "-b", "renamed"]);
        assert_eq!(cache.get_branch(&repo), first);

        cache.clear();
        assert!(cache.get_branch(&repo).contains("renamed"));
    }

    #[test]
    fn test_cache_entry_expires_after_ttl() {
        let (_guard, repo) = init_repo();
        let cache = BranchCache::new(Duration::from_millis(50));
        assert!(!cache.get_branch(&repo).contains("renamed"));

        run_git(&repo, &["checkout", "-b", "renamed"]);
        std::thread::sleep(Duration::from_millis(120));

        let result = cache.get_branch(&repo);
        assert!(result.contains("renamed"), "got {result:?}");
    }

    #[test]
    fn test_cache_is_keyed_by_directory() {
        let (_guard, repo) = init_repo();
        let other = tempfile::tempdir().unwrap();
        let cache = BranchCache::new(Duration::from_secs(60));

        assert!(!cache.get_branch(&repo).is_empty());
        assert_eq!(cache.get_branch(other.path()), "");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(
            clean_path(Path::new("/repo/sub/../.git")),
            PathBuf::from("/repo/.git")
        );
        assert_eq!(clean_path(Path::new("/repo/./.git")), PathBuf::from("/repo/.git"));
    }
}
