// tiledash-panels/src/git.rs
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use git2::{BranchType, Repository, StatusOptions};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span, Text},
};
use serde::Deserialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tiledash_core::{
    AppContext, EventResult, FileSystem, Formatter, MultiSource, Overlays, Panel, PanelBase,
    PanelConfig, PanelConfigSource, PanelError,
};

pub const HELP_TEXT: &str = "
  Keyboard commands for Git:

    /: Show/hide this help window
    h: Previous git repository
    l: Next git repository
    o: Open the repository directory
    r: Refresh the data

    arrow left:  Previous git repository
    arrow right: Next git repository
";

#[derive(Debug, Deserialize)]
struct GitConfig {
    #[serde(flatten)]
    base: PanelConfig,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    repositories: Vec<String>,
    #[serde(default = "default_commit_count")]
    commit_count: usize,
}

fn default_commit_count() -> usize {
    5
}

/// Git repository status information
#[derive(Debug, Clone)]
pub struct GitStatus {
    pub branch: String,
    pub remote_branch: Option<String>,
    pub ahead: usize,
    pub behind: usize,
    pub staged: usize,
    pub unstaged: usize,
    pub untracked: usize,
    pub last_commits: Vec<CommitInfo>,
}

/// Git commit information for display
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: String,    // Short hash (7 chars)
    pub message: String, // First line only
    pub author: String,
}

impl GitStatus {
    /// Read branch, file and commit state from an open repository
    pub fn from_repo(repo: &Repository, commit_count: usize) -> Self {
        let branch = repo
            .head()
            .ok()
            .and_then(|head| head.shorthand().map(|s| s.to_string()))
            .unwrap_or_else(|| "detached".to_string());

        let (remote_branch, ahead, behind) = repo
            .head()
            .ok()
            .and_then(|head| head.resolve().ok())
            .and_then(|head| {
                let branch_name = head.shorthand()?;
                let branch = repo.find_branch(branch_name, BranchType::Local).ok()?;
                let upstream = branch.upstream().ok()?;
                let upstream_name = upstream.name().ok()??;

                let local_oid = head.target()?;
                let upstream_oid = upstream.get().target()?;

                let (ahead, behind) = repo.graph_ahead_behind(local_oid, upstream_oid).ok()?;

                Some((Some(upstream_name.to_string()), ahead, behind))
            })
            .unwrap_or((None, 0, 0));

        let (staged, unstaged, untracked) = repo
            .statuses(Some(StatusOptions::default().include_untracked(true)))
            .map(|statuses| {
                statuses
                    .iter()
                    .fold((0, 0, 0), |(staged, unstaged, untracked), entry| {
                        let status = entry.status();
                        let is_staged = status.is_index_new()
                            || status.is_index_modified()
                            || status.is_index_deleted();
                        let is_unstaged = status.is_wt_modified() || status.is_wt_deleted();

                        (
                            staged + usize::from(is_staged),
                            unstaged + usize::from(is_unstaged),
                            untracked + usize::from(status.is_wt_new()),
                        )
                    })
            })
            .unwrap_or((0, 0, 0));

        let last_commits = repo
            .head()
            .ok()
            .and_then(|head| head.resolve().ok())
            .and_then(|head| head.target())
            .and_then(|oid| {
                let mut revwalk = repo.revwalk().ok()?;
                revwalk.push(oid).ok()?;
                revwalk.set_sorting(git2::Sort::TIME).ok()?;

                let commits = revwalk
                    .take(commit_count)
                    .flatten()
                    .filter_map(|commit_oid| repo.find_commit(commit_oid).ok())
                    .map(|commit| CommitInfo {
                        hash: commit.id().to_string().chars().take(7).collect(),
                        message: commit
                            .message()
                            .unwrap_or("")
                            .lines()
                            .next()
                            .unwrap_or("")
                            .to_string(),
                        author: commit.author().name().unwrap_or("").to_string(),
                    })
                    .collect();
                Some(commits)
            })
            .unwrap_or_default();

        Self {
            branch,
            remote_branch,
            ahead,
            behind,
            staged,
            unstaged,
            untracked,
            last_commits,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.untracked == 0
    }
}

/// Status of one or more local git repositories, paged with h/l
pub struct GitPanel {
    base: PanelBase,
    repositories: Mutex<MultiSource>,
    /// Held for a whole refresh, so key-driven and scheduled refreshes
    /// never interleave their writes
    refreshing: Mutex<()>,
    commit_count: usize,
    fs: FileSystem,
    formatter: Formatter,
    overlays: Overlays,
}

impl GitPanel {
    pub fn new(source: &PanelConfigSource<'_>, ctx: &AppContext) -> Result<Self, PanelError> {
        let config: GitConfig = source.decode()?;

        let panel = Self {
            base: PanelBase::new("Git", &config.base, true, ctx),
            repositories: Mutex::new(MultiSource::new(config.repository, config.repositories)),
            refreshing: Mutex::new(()),
            commit_count: config.commit_count,
            fs: ctx.fs.clone(),
            formatter: Formatter::for_panel(&config.base),
            overlays: ctx.overlays.clone(),
        };
        panel.update_title(&panel.repositories().clone());
        Ok(panel)
    }

    fn repositories(&self) -> MutexGuard<'_, MultiSource> {
        self.repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn update_title(&self, repositories: &MultiSource) {
        let name = repositories
            .current()
            .map(repo_name)
            .unwrap_or_else(|| self.base.title().to_string());
        self.base
            .surface()
            .set_title(self.base.contextual_title(&name));
    }

    /// Status of the current repository of `repositories`
    pub fn status(&self, repositories: &MultiSource) -> Result<Option<GitStatus>, git2::Error> {
        let Some(path) = repositories.current() else {
            return Ok(None);
        };
        let path = self
            .fs
            .expand_home_dir(path)
            .map_err(|e| git2::Error::from_str(&e.to_string()))?;

        let repo = Repository::open(&path)?;
        Ok(Some(GitStatus::from_repo(&repo, self.commit_count)))
    }

    pub fn display(
        &self,
        repositories: &MultiSource,
        status: &Result<Option<GitStatus>, git2::Error>,
    ) -> Text<'static> {
        let mut lines = vec![Line::from(
            self.formatter
                .sigil_str(repositories.len(), repositories.index()),
        )];

        match status {
            Ok(Some(status)) => lines.extend(status_lines(status)),
            Ok(None) => lines.push(Line::from(" no repository configured")),
            Err(e) => lines.push(Line::styled(
                format!("No git repository found: {}", e.message()),
                Style::default().fg(Color::Gray),
            )),
        }

        Text::from(lines)
    }

    fn page(&self, forward: bool) {
        {
            let mut repositories = self.repositories();
            if forward {
                repositories.next();
            } else {
                repositories.prev();
            }
        }
        self.refresh();
    }

    fn open_current(&self) {
        let current = self.repositories().current().map(str::to_string);
        if let Some(path) = current
            && let Err(e) = self.fs.open_file(Path::new(&path))
        {
            tracing::warn!(path = %path, "could not open repository: {e}");
        }
    }
}

fn repo_name(path: &str) -> String {
    let name = Path::new(path)
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()));
    name.unwrap_or_else(|| path.to_string())
}

fn status_lines(status: &GitStatus) -> Vec<Line<'static>> {
    let label = |text: &str| Span::styled(text.to_string(), Style::default().fg(Color::Yellow));
    let mut lines = Vec::new();

    let mut branch = vec![
        label("Branch: "),
        Span::styled(status.branch.clone(), Style::default().fg(Color::White)),
    ];
    if let Some(remote) = &status.remote_branch {
        branch.push(Span::from(format!(" → {}", remote)));
    }
    if status.ahead > 0 {
        branch.push(Span::from(format!(" ↑{}", status.ahead)));
    }
    if status.behind > 0 {
        branch.push(Span::from(format!(" ↓{}", status.behind)));
    }
    lines.push(Line::from(branch));

    let mut files = vec![label("Status: ")];
    if status.staged > 0 {
        files.push(Span::styled(
            format!("+{} ", status.staged),
            Style::default().fg(Color::Green),
        ));
    }
    if status.unstaged > 0 {
        files.push(Span::styled(
            format!("~{} ", status.unstaged),
            Style::default().fg(Color::Red),
        ));
    }
    if status.untracked > 0 {
        files.push(Span::styled(
            format!("?{} ", status.untracked),
            Style::default().fg(Color::Gray),
        ));
    }
    if status.is_clean() {
        files.push(Span::styled("clean", Style::default().fg(Color::Green)));
    }
    lines.push(Line::from(files));

    if !status.last_commits.is_empty() {
        lines.push(Line::from(label("Recent commits:")));
        for commit in &status.last_commits {
            lines.push(Line::from(vec![
                Span::styled(commit.hash.clone(), Style::default().fg(Color::Cyan)),
                Span::from(" "),
                Span::from(commit.message.clone()),
                Span::styled(
                    format!(" ({})", commit.author),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
    }

    lines
}

impl Panel for GitPanel {
    fn base(&self) -> &PanelBase {
        &self.base
    }

    fn refresh(&self) {
        let _guard = self
            .refreshing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Title, page marker and status all come from this one snapshot
        let repositories = self.repositories().clone();

        let status = self.status(&repositories);
        if let Err(e) = &status {
            tracing::debug!("git status failed: {e}");
        }
        self.update_title(&repositories);
        self.base
            .surface()
            .set_text(self.display(&repositories, &status));
    }

    fn set_focus_key(&self, key: &str) {
        let _guard = self
            .refreshing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.base.set_focus_key(key);
        self.update_title(&self.repositories().clone());
    }

    fn handle_key(&self, key: KeyEvent) -> EventResult {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return EventResult::Ignored;
        }

        match key.code {
            KeyCode::Char('/') => self.overlays.show_help(self.title(), HELP_TEXT),
            KeyCode::Char('h') | KeyCode::Left => self.page(false),
            KeyCode::Char('l') | KeyCode::Right => self.page(true),
            KeyCode::Char('o') => self.open_current(),
            KeyCode::Char('r') => self.refresh(),
            _ => return EventResult::Ignored,
        }
        EventResult::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use git2::Signature;

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature = Signature::now("Dash Tester", "tester@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap();
    }

    fn doc(paths: &[&Path]) -> String {
        let list: Vec<String> = paths
            .iter()
            .map(|p| format!("{:?}", p.display().to_string()))
            .collect();
        format!(
            "[[widgets]]\ntype = \"git\"\nenabled = true\ncommit_count = 2\nrepositories = [{}]\n",
            list.join(", ")
        )
    }

    #[test]
    fn test_status_counts_and_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "a", "first");
        commit_file(&repo, "b.txt", "b", "second\n\nbody");
        commit_file(&repo, "c.txt", "c", "third");

        std::fs::write(dir.path().join("a.txt"), "changed").unwrap();
        std::fs::write(dir.path().join("new.txt"), "new").unwrap();
        std::fs::write(dir.path().join("staged.txt"), "s").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("staged.txt")).unwrap();
        index.write().unwrap();

        let status = GitStatus::from_repo(&repo, 2);
        assert_eq!(status.staged, 1);
        assert_eq!(status.unstaged, 1);
        assert_eq!(status.untracked, 1);
        assert_eq!(status.remote_branch, None);
        assert_eq!(status.last_commits.len(), 2);
        assert_eq!(status.last_commits[0].hash.len(), 7);
        assert_eq!(status.last_commits[0].author, "Dash Tester");
        assert!(!status.is_clean());
    }

    #[test]
    fn test_refresh_renders_repository() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "a", "initial commit");

        let panel = Fixture::new(&doc(&[dir.path()])).build(GitPanel::new).unwrap();
        panel.refresh();

        let content = panel.surface().content();
        assert!(content.contains("Status: clean"));
        assert!(content.contains("initial commit (Dash Tester)"));
        assert!(panel.focusable());
    }

    #[test]
    fn test_missing_repository_is_shown_in_panel() {
        let dir = tempfile::tempdir().unwrap();
        let panel = Fixture::new(&doc(&[dir.path()])).build(GitPanel::new).unwrap();

        panel.refresh();
        assert!(panel.surface().content().contains("No git repository found"));
    }

    #[test]
    fn test_paging_between_repositories() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        commit_file(&Repository::init(first.path()).unwrap(), "a.txt", "a", "one");
        commit_file(&Repository::init(second.path()).unwrap(), "b.txt", "b", "two");

        let panel = Fixture::new(&doc(&[first.path(), second.path()]))
            .build(GitPanel::new)
            .unwrap();
        panel.refresh();
        assert!(panel.surface().content().starts_with("_*"));

        let l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE);
        assert_eq!(panel.handle_key(l), EventResult::Consumed);
        let content = panel.surface().content();
        assert!(content.starts_with("*_"));
        assert!(content.contains("two"));

        let name = second.path().canonicalize().unwrap();
        let name = name.file_name().unwrap().to_string_lossy();
        assert!(panel.surface().title().contains(name.as_ref()));
    }

    #[test]
    fn test_refresh_and_paging_from_two_threads_stay_consistent() {
        let repo_dir = tempfile::tempdir().unwrap();
        let plain_dir = tempfile::tempdir().unwrap();
        commit_file(&Repository::init(repo_dir.path()).unwrap(), "a.txt", "a", "one");

        let panel = Fixture::new(&doc(&[repo_dir.path(), plain_dir.path()]))
            .build(GitPanel::new)
            .unwrap();
        let l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..40 {
                    panel.refresh();
                }
            });
            for _ in 0..15 {
                panel.handle_key(l);
            }
        });

        let index = panel.repositories().index();
        let content = panel.surface().content();
        let title = panel.surface().title();
        let plain_name = plain_dir.path().canonicalize().unwrap();
        let plain_name = plain_name.file_name().unwrap().to_string_lossy().to_string();

        if index == 0 {
            assert!(content.starts_with("_*"), "{content}");
            assert!(content.contains("Status: clean"), "{content}");
            assert!(!title.contains(&plain_name), "{title}");
        } else {
            assert!(content.starts_with("*_"), "{content}");
            assert!(content.contains("No git repository found"), "{content}");
            assert!(title.contains(&plain_name), "{title}");
        }
    }

    #[test]
    fn test_no_repositories() {
        let panel = Fixture::new("[[widgets]]\ntype = \"git\"\nenabled = true\n")
            .build(GitPanel::new)
            .unwrap();
        panel.refresh();
        assert!(panel.surface().content().contains("no repository configured"));
        assert_eq!(panel.surface().title(), " Git ");
    }
}
