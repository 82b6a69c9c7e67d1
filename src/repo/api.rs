//! Repository API - the session every command runs against.

use std::fs;

use tracing::{debug, info};

use crate::merge::{
    conflict_contents, find_split_point, is_ancestor, merge_message, plan_merge, MergeAction,
    MergeOutcome,
};
use crate::repo::config::{RepoLayout, RepositoryConfig};
use crate::repo::error::{BranchOp, RepoError, RepoResult};
use crate::repo::report::{LogEntry, StatusReport};
use crate::storage::{
    all_commits, epoch_timestamp, get_commit, history, resolve_commit, Blob, BlobId, BranchName,
    Commit, CommitBuilder, CommitId, ObjectStore, RefManager, RepoPath, StagingArea,
    StorageResult, Tree,
};
use crate::worktree::{
    checkout_path, guard_untracked, guard_untracked_overwrite, materialize, scan_status,
    WorkingTree,
};

/// An open repository: object store, refs, index and working tree.
///
/// All state lives in this value; every mutating operation persists what it
/// changed before returning.
#[derive(Debug)]
pub struct Repository {
    config: RepositoryConfig,
    layout: RepoLayout,
    objects: ObjectStore,
    refs: RefManager,
    stage: StagingArea,
    worktree: WorkingTree,
}

impl Repository {
    /// Create a new repository in `config.work_dir`.
    pub fn init(config: RepositoryConfig) -> RepoResult<Self> {
        let layout = config.layout();
        if layout.exists() {
            return Err(RepoError::AlreadyInitialized(layout.root().to_path_buf()));
        }

        fs::create_dir_all(layout.root())?;
        let objects = ObjectStore::create(layout.objects_dir())?;
        let staged = ObjectStore::create(layout.staging_dir())?;

        let root = CommitBuilder::new(&objects)
            .message(config.initial_message.clone())
            .timestamp(epoch_timestamp())
            .commit()?;

        let refs = RefManager::init(layout.refs_path(), config.default_branch.clone(), root.id());
        refs.save()?;
        let stage = StagingArea::create(layout.index_path(), staged);
        stage.save()?;

        info!(path = %layout.root().display(), root = %root.id().short(), "initialized repository");

        Ok(Self {
            worktree: WorkingTree::new(&config.work_dir),
            config,
            layout,
            objects,
            refs,
            stage,
        })
    }

    /// Open an existing repository.
    pub fn open(config: RepositoryConfig) -> RepoResult<Self> {
        let layout = config.layout();
        if !layout.exists() {
            return Err(RepoError::NotInitialized(config.work_dir.clone()));
        }

        let objects = ObjectStore::open(layout.objects_dir());
        let refs = RefManager::load(layout.refs_path())?;
        let stage = StagingArea::load(layout.index_path(), ObjectStore::open(layout.staging_dir()))?;
        debug!(path = %layout.root().display(), head = %refs.head().short(), "opened repository");

        Ok(Self {
            worktree: WorkingTree::new(&config.work_dir),
            config,
            layout,
            objects,
            refs,
            stage,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn stage(&self) -> &StagingArea {
        &self.stage
    }

    pub fn worktree(&self) -> &WorkingTree {
        &self.worktree
    }

    /// the commit HEAD points at
    pub fn head(&self) -> CommitId {
        self.refs.head()
    }

    pub fn current_branch(&self) -> &BranchName {
        self.refs.current_branch()
    }

    /// Load the HEAD commit.
    pub fn head_commit(&self) -> RepoResult<Commit> {
        Ok(get_commit(&self.objects, self.refs.head())?)
    }

    /// Load any commit by full or abbreviated id.
    pub fn find_commit(&self, spec: &str) -> RepoResult<Commit> {
        let id = resolve_commit(&self.objects, spec)?;
        Ok(get_commit(&self.objects, id)?)
    }

    // ==================== staging & history ====================

    /// Stage the current contents of a working file.
    ///
    /// Content identical to HEAD's version unstages the path instead.
    pub fn add(&mut self, name: &str) -> RepoResult<()> {
        let path = parse_path(name)?;
        let blob = self
            .worktree
            .blob(&path)?
            .ok_or_else(|| RepoError::FileNotFound(path.clone()))?;
        let head = self.head_commit()?;

        if head.blob_at(&path) == Some(blob.id()) {
            self.stage.unstage(&path)?;
            debug!(%path, "matches HEAD, nothing staged");
        } else {
            self.stage.stage_addition(path.clone(), &blob)?;
        }
        self.stage.save()?;

        info!(%path, "add");
        Ok(())
    }

    /// Record the staged changes as a new commit on the current branch.
    pub fn commit(&mut self, message: &str) -> RepoResult<Commit> {
        if message.trim().is_empty() {
            return Err(RepoError::EmptyMessage);
        }
        if self.stage.is_empty() {
            return Err(RepoError::NothingToCommit);
        }
        self.commit_with_parents(message.to_string(), None)
    }

    /// Untrack a file, deleting it from the working tree if HEAD tracks it.
    pub fn remove(&mut self, name: &str) -> RepoResult<()> {
        let path = parse_path(name)?;
        let head = self.head_commit()?;
        let staged = self.stage.added(&path).is_some();
        let tracked = head.tracks(&path);

        if !staged && !tracked {
            return Err(RepoError::NoReasonToRemove(path));
        }

        if tracked {
            self.stage.stage_removal(path.clone())?;
            self.worktree.remove(&path)?;
        } else {
            self.stage.unstage(&path)?;
        }
        self.stage.save()?;

        info!(%path, tracked, "rm");
        Ok(())
    }

    /// First-parent history from HEAD, newest first.
    pub fn log(&self) -> RepoResult<Vec<LogEntry>> {
        let entries = history(&self.objects, self.refs.head())
            .map(|commit| commit.map(|commit| LogEntry::from(&commit)))
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// Every commit ever made, in id order.
    pub fn global_log(&self) -> RepoResult<Vec<LogEntry>> {
        Ok(all_commits(&self.objects)?
            .iter()
            .map(LogEntry::from)
            .collect())
    }

    /// Ids of every commit whose message is exactly `message`.
    pub fn find(&self, message: &str) -> RepoResult<Vec<CommitId>> {
        let ids: Vec<CommitId> = all_commits(&self.objects)?
            .iter()
            .filter(|commit| commit.message() == message)
            .map(Commit::id)
            .collect();

        if ids.is_empty() {
            return Err(RepoError::MessageNotFound(message.to_string()));
        }
        Ok(ids)
    }

    /// Branches, index and working tree state.
    pub fn status(&self) -> RepoResult<StatusReport> {
        let head = self.head_commit()?;
        let worktree = scan_status(&self.worktree, &head, &self.stage)?;

        Ok(StatusReport {
            current_branch: self.refs.current_branch().clone(),
            branches: self.refs.branches().keys().cloned().collect(),
            staged: self.stage.additions().map(|(path, _)| path.clone()).collect(),
            removed: self.stage.removals().cloned().collect(),
            worktree,
        })
    }

    // ==================== checkout & branches ====================

    /// Restore a file from HEAD.
    pub fn checkout_file(&mut self, name: &str) -> RepoResult<()> {
        let path = parse_path(name)?;
        let head = self.head_commit()?;
        checkout_path(&self.worktree, &self.objects, &head, &path)?;
        Ok(())
    }

    /// Restore a file from the commit `spec` names.
    pub fn checkout_file_at(&mut self, spec: &str, name: &str) -> RepoResult<()> {
        let path = parse_path(name)?;
        let commit = self.find_commit(spec)?;
        checkout_path(&self.worktree, &self.objects, &commit, &path)?;
        Ok(())
    }

    /// Switch to another branch, replacing the working tree with its tip.
    pub fn checkout_branch(&mut self, name: &str) -> RepoResult<()> {
        let branch = self.existing_branch(name, BranchOp::Checkout)?;
        if branch == *self.refs.current_branch() {
            return Err(RepoError::CurrentBranch {
                name: name.to_string(),
                op: BranchOp::Checkout,
            });
        }

        let head = self.head_commit()?;
        let target = get_commit(&self.objects, self.refs.resolve_branch(&branch)?)?;
        guard_untracked_overwrite(&self.worktree, &head, &self.stage, &target)?;

        materialize(&self.worktree, &self.objects, &head, &target)?;
        self.stage.clear()?;
        self.stage.save()?;
        self.refs.switch_to(&branch)?;
        self.refs.save()?;

        info!(%branch, head = %target.id().short(), "checkout");
        Ok(())
    }

    /// Create a branch at HEAD without switching to it.
    pub fn branch(&mut self, name: &str) -> RepoResult<()> {
        let branch = BranchName::new(name).map_err(|e| RepoError::invalid_name(name, e))?;
        self.refs.create_branch(&branch, self.refs.head())?;
        self.refs.save()?;
        info!(%branch, "branch");
        Ok(())
    }

    /// Delete a branch pointer. Its commits stay in the store.
    pub fn remove_branch(&mut self, name: &str) -> RepoResult<()> {
        let branch = self.existing_branch(name, BranchOp::Remove)?;
        if branch == *self.refs.current_branch() {
            return Err(RepoError::CurrentBranch {
                name: name.to_string(),
                op: BranchOp::Remove,
            });
        }

        self.refs.delete_branch(&branch)?;
        self.refs.save()?;
        info!(%branch, "rm-branch");
        Ok(())
    }

    /// Move the current branch to `spec` and check that commit out.
    pub fn reset(&mut self, spec: &str) -> RepoResult<()> {
        let target = self.find_commit(spec)?;
        let head = self.head_commit()?;
        guard_untracked_overwrite(&self.worktree, &head, &self.stage, &target)?;

        materialize(&self.worktree, &self.objects, &head, &target)?;
        self.refs.set_head(target.id());
        self.refs.save()?;
        self.stage.clear()?;
        self.stage.save()?;

        info!(head = %target.id().short(), "reset");
        Ok(())
    }

    // ==================== merge ====================

    /// Merge branch `name` into the current branch.
    pub fn merge(&mut self, name: &str) -> RepoResult<MergeOutcome> {
        if !self.stage.is_empty() {
            return Err(RepoError::DirtyStaging);
        }
        let branch = self.existing_branch(name, BranchOp::Merge)?;
        if branch == *self.refs.current_branch() {
            return Err(RepoError::SelfMerge);
        }

        let head = self.head_commit()?;
        let given_id = self.refs.resolve_branch(&branch)?;
        let given = get_commit(&self.objects, given_id)?;
        let split = find_split_point(&self.objects, head.id(), given_id)?;

        // given may also be reachable only through a merge's second parent
        if split == Some(given_id) || is_ancestor(&self.objects, given_id, head.id())? {
            info!(%branch, "merge: already up to date");
            return Ok(MergeOutcome::UpToDate);
        }

        if split == Some(head.id()) {
            guard_untracked_overwrite(&self.worktree, &head, &self.stage, &given)?;
            materialize(&self.worktree, &self.objects, &head, &given)?;
            self.refs.set_head(given_id);
            self.refs.save()?;
            info!(%branch, to = %given_id.short(), "merge: fast-forward");
            return Ok(MergeOutcome::FastForward { to: given_id });
        }

        // disjoint histories merge against an empty base
        let base = match split {
            Some(id) => get_commit(&self.objects, id)?.tree().clone(),
            None => Tree::new(),
        };
        let plan = plan_merge(&base, head.tree(), given.tree());
        guard_untracked(&self.worktree, &head, &self.stage, |path| plan.touches(path))?;

        for action in plan.actions() {
            match action {
                MergeAction::Take { path, blob } => {
                    let blob: Blob = self.objects.get(blob.raw())?;
                    self.worktree.write(path, blob.contents())?;
                    self.stage.stage_addition(path.clone(), &blob)?;
                }
                MergeAction::Delete { path } => {
                    self.worktree.remove(path)?;
                    self.stage.stage_removal(path.clone())?;
                }
                MergeAction::Conflict {
                    path,
                    current,
                    given,
                } => {
                    let current = self.load_blob(*current)?;
                    let given = self.load_blob(*given)?;
                    let blob = Blob::new(conflict_contents(
                        current.as_ref().map(Blob::contents),
                        given.as_ref().map(Blob::contents),
                    ));
                    self.worktree.write(path, blob.contents())?;
                    self.stage.stage_addition(path.clone(), &blob)?;
                }
            }
        }

        let conflicts: Vec<RepoPath> = plan.conflicts().cloned().collect();
        let message = merge_message(branch.as_str(), self.refs.current_branch().as_str());
        let commit = self.commit_with_parents(message, Some(given_id))?;

        info!(
            %branch,
            commit = %commit.id().short(),
            conflicts = conflicts.len(),
            "merge"
        );
        Ok(MergeOutcome::Merged {
            commit: commit.id(),
            conflicts,
        })
    }

    // ==================== internals ====================

    /// Commit the index on top of HEAD, with `extra_parent` as second parent.
    fn commit_with_parents(
        &mut self,
        message: String,
        extra_parent: Option<CommitId>,
    ) -> RepoResult<Commit> {
        let head = self.head_commit()?;
        let tree = self.stage.apply_to(head.tree());
        self.stage.promote(&self.objects)?;

        let mut parents = vec![head.id()];
        parents.extend(extra_parent);

        let commit = CommitBuilder::new(&self.objects)
            .tree(tree)
            .parents(parents)
            .message(message)
            .commit()?;

        self.refs.set_head(commit.id());
        self.refs.save()?;
        self.stage.clear()?;
        self.stage.save()?;

        info!(commit = %commit.id().short(), branch = %self.refs.current_branch(), "commit");
        Ok(commit)
    }

    /// Look up a branch that must exist. Names that cannot be valid
    /// branches are reported as missing.
    fn existing_branch(&self, name: &str, op: BranchOp) -> RepoResult<BranchName> {
        let missing = || RepoError::NoSuchBranch {
            name: name.to_string(),
            op,
        };
        let branch = BranchName::new(name).map_err(|_| missing())?;
        if !self.refs.branch_exists(&branch) {
            return Err(missing());
        }
        Ok(branch)
    }

    fn load_blob(&self, id: Option<BlobId>) -> RepoResult<Option<Blob>> {
        match id {
            Some(id) => Ok(Some(self.objects.get(id.raw())?)),
            None => Ok(None),
        }
    }
}

fn parse_path(name: &str) -> RepoResult<RepoPath> {
    RepoPath::new(name).map_err(|e| RepoError::invalid_name(name, e))
}
