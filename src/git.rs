use crate::{config::Config, errors::Result};
use git2::{BranchType, Oid, Repository};
use std::path::Path;

/// Read-only queries the detector needs from version control
pub trait History {
    fn local_branches(&self) -> Result<Vec<String>>;
    /// `None` when HEAD is detached or unborn
    fn current_branch(&self) -> Result<Option<String>>;
    fn branch_tip(&self, branch: &str) -> Result<Oid>;
    /// Tip of `refs/remotes/<remote>/<branch>`, an error when it does not exist
    fn remote_tip(&self, remote: &str, branch: &str) -> Result<Oid>;
    /// Up to `limit` historical tips of the branch, newest first
    fn reflog_tips(&self, branch: &str, limit: usize) -> Result<Vec<Oid>>;
    /// True when `ancestor` is `descendant` or reachable from it
    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool>;
}

pub struct Git {
    pub repository: Repository,
    pub config: Config,
}

impl Git {
    /// Open the repository containing `path`, like `git -C <path>`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repository = Repository::discover(path.as_ref())?;
        let config = Config::from_git(&repository.config()?);
        log::debug!(
            "Opened repository at {} (remote: {}, reflog depth: {})",
            repository.path().display(),
            config.remote,
            config.reflog_depth
        );
        Ok(Self { repository, config })
    }
}

impl History for Git {
    fn local_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for branch in self.repository.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            match branch.name()? {
                Some(name) => names.push(name.to_string()),
                None => log::debug!("Skipping branch with a non utf-8 name"),
            }
        }
        Ok(names)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repository.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(|name| name.to_string()))
    }

    fn branch_tip(&self, branch: &str) -> Result<Oid> {
        let branch = self.repository.find_branch(branch, BranchType::Local)?;
        Ok(branch.get().peel_to_commit()?.id())
    }

    fn remote_tip(&self, remote: &str, branch: &str) -> Result<Oid> {
        let reference = self
            .repository
            .find_reference(&format!("refs/remotes/{}/{}", remote, branch))?;
        Ok(reference.peel_to_commit()?.id())
    }

    fn reflog_tips(&self, branch: &str, limit: usize) -> Result<Vec<Oid>> {
        let reflog = self.repository.reflog(&format!("refs/heads/{}", branch))?;
        Ok(reflog
            .iter()
            .take(limit)
            .map(|entry| entry.id_new())
            .filter(|id| !id.is_zero())
            .collect())
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.repository.graph_descendant_of(descendant, ancestor)?)
    }
}

#[cfg(test)]
pub mod mock {
    use super::History;
    use crate::errors::{DetectError, Result};
    use git2::Oid;
    use std::collections::{BTreeMap, HashMap, HashSet};

    pub fn oid(n: u32) -> Oid {
        Oid::from_str(&format!("{:040x}", n)).unwrap()
    }

    fn missing(what: &str) -> DetectError {
        DetectError::Git(git2::Error::from_str(&format!("{} not found", what)))
    }

    /// In-memory commit graph with branches, remote-tracking refs and reflogs
    #[derive(Default)]
    pub struct MockHistory {
        pub parents: HashMap<Oid, Vec<Oid>>,
        pub branches: BTreeMap<String, Oid>,
        pub remotes: HashMap<(String, String), Oid>,
        pub reflogs: HashMap<String, Vec<Oid>>,
        pub head: Option<String>,
        pub broken_reflogs: HashSet<String>,
    }

    impl MockHistory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn commit(mut self, id: u32, parents: &[u32]) -> Self {
            self.parents
                .insert(oid(id), parents.iter().map(|p| oid(*p)).collect());
            self
        }

        /// Points the branch at `id` and records it in the branch reflog
        pub fn branch(mut self, name: &str, id: u32) -> Self {
            self.branches.insert(name.to_string(), oid(id));
            self.reflogs
                .entry(name.to_string())
                .or_default()
                .insert(0, oid(id));
            self
        }

        pub fn remote(mut self, remote: &str, name: &str, id: u32) -> Self {
            self.remotes
                .insert((remote.to_string(), name.to_string()), oid(id));
            self
        }

        pub fn head(mut self, name: &str) -> Self {
            self.head = Some(name.to_string());
            self
        }

        pub fn broken_reflog(mut self, name: &str) -> Self {
            self.broken_reflogs.insert(name.to_string());
            self
        }
    }

    impl History for MockHistory {
        fn local_branches(&self) -> Result<Vec<String>> {
            Ok(self.branches.keys().cloned().collect())
        }

        fn current_branch(&self) -> Result<Option<String>> {
            Ok(self.head.clone())
        }

        fn branch_tip(&self, branch: &str) -> Result<Oid> {
            self.branches
                .get(branch)
                .copied()
                .ok_or_else(|| missing(branch))
        }

        fn remote_tip(&self, remote: &str, branch: &str) -> Result<Oid> {
            self.remotes
                .get(&(remote.to_string(), branch.to_string()))
                .copied()
                .ok_or_else(|| missing(&format!("{}/{}", remote, branch)))
        }

        fn reflog_tips(&self, branch: &str, limit: usize) -> Result<Vec<Oid>> {
            if self.broken_reflogs.contains(branch) {
                return Err(missing(&format!("reflog for {}", branch)));
            }
            Ok(self
                .reflogs
                .get(branch)
                .map(|tips| tips.iter().take(limit).copied().collect())
                .unwrap_or_default())
        }

        fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
            if !self.parents.contains_key(&descendant) {
                return Err(missing(&descendant.to_string()));
            }
            let mut pending = vec![descendant];
            let mut seen = HashSet::new();
            while let Some(id) = pending.pop() {
                if id == ancestor {
                    return Ok(true);
                }
                if seen.insert(id) {
                    pending.extend(self.parents.get(&id).into_iter().flatten().copied());
                }
            }
            Ok(false)
        }
    }
}
