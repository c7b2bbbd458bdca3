use crate::{
    config::Config,
    errors::{DetectError, Result},
    git::History,
    tree::BranchTree,
};
use git2::Oid;
use std::collections::{BTreeMap, HashMap};

/// Ways of proving that a branch was forked from another one, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The ancestor's tip is in the branch's history
    Direct,
    /// The ancestor's tip is in the history of the branch's remote-tracking ref
    RemoteTracking,
    /// The ancestor's tip is in the history of one of the branch's recent reflog entries
    Reflog,
}

pub const TIERS: [Tier; 3] = [Tier::Direct, Tier::RemoteTracking, Tier::Reflog];

pub struct Detector<'a, H: History> {
    history: &'a H,
    config: Config,
    tips: HashMap<String, Option<Oid>>,
    verdicts: HashMap<(String, String), bool>,
}

impl<'a, H: History> Detector<'a, H> {
    pub fn new(history: &'a H, config: Config) -> Self {
        Self {
            history,
            config,
            tips: HashMap::new(),
            verdicts: HashMap::new(),
        }
    }

    /// Build the tree of branches forked from `root`, or from the current branch
    pub fn detect(&mut self, root: Option<&str>) -> Result<BranchTree> {
        let root = match root {
            Some(root) => root.to_string(),
            None => self
                .history
                .current_branch()?
                .ok_or(DetectError::NoBranchSpecified)?,
        };

        let mut branches = self.history.local_branches()?;
        branches.sort();
        if !branches.contains(&root) {
            return Err(DetectError::BranchNotFound(root));
        }
        log::info!(
            "Looking for branches forked from '{}' among {} candidates",
            root,
            branches.len() - 1
        );

        let descendants: Vec<String> = branches
            .into_iter()
            .filter(|branch| *branch != root)
            .filter(|branch| self.descends_from(branch, &root))
            .collect();

        if descendants.is_empty() {
            log::info!("No downstream branches detected for '{}'", root);
            return Ok(BranchTree::new(root, BTreeMap::new()));
        }
        log::info!(
            "Found {} branches forked from '{}'",
            descendants.len(),
            root
        );

        let mut parents = BTreeMap::new();
        for descendant in &descendants {
            let parent = self.nearest_parent(descendant, &root, &descendants);
            log::debug!("'{}' is forked from '{}'", descendant, parent);
            parents.insert(descendant.clone(), parent);
        }

        Ok(BranchTree::new(root, parents))
    }

    /// The deepest branch among `candidates` that `branch` sits beneath, `root` if none.
    /// Depth is the number of other such ancestors the candidate itself sits beneath;
    /// equally deep candidates are ordered by name
    fn nearest_parent(&mut self, branch: &str, root: &str, candidates: &[String]) -> String {
        let ancestors: Vec<&String> = candidates
            .iter()
            .filter(|candidate| candidate.as_str() != branch)
            .filter(|candidate| self.sits_beneath(branch, candidate))
            .collect();

        let mut parent: Option<(&String, usize)> = None;
        for candidate in &ancestors {
            let depth = ancestors
                .iter()
                .filter(|other| other != &candidate)
                .filter(|other| self.sits_beneath(candidate, other))
                .count();
            if parent.map_or(true, |(_, deepest)| depth > deepest) {
                parent = Some((*candidate, depth));
            }
        }

        parent
            .map(|(parent, _)| parent.clone())
            .unwrap_or_else(|| root.to_string())
    }

    /// Strict version of `descends_from`: branches forked from each other at the
    /// same point are ordered by name, the smaller name being the parent
    fn sits_beneath(&mut self, branch: &str, ancestor: &str) -> bool {
        if !self.descends_from(branch, ancestor) {
            return false;
        }
        !self.descends_from(ancestor, branch) || ancestor < branch
    }

    /// Whether `branch` was forked from `ancestor`, according to the first tier that says so
    pub fn descends_from(&mut self, branch: &str, ancestor: &str) -> bool {
        let key = (branch.to_string(), ancestor.to_string());
        if let Some(verdict) = self.verdicts.get(&key) {
            return *verdict;
        }

        let verdict = match self.tip(ancestor) {
            Some(ancestor_tip) => TIERS.iter().any(|tier| {
                match self.check(*tier, branch, ancestor_tip) {
                    Ok(true) => {
                        log::debug!("'{}' descends from '{}' ({:?})", branch, ancestor, tier);
                        true
                    }
                    Ok(false) => false,
                    Err(e) => {
                        log::debug!(
                            "{:?} check of '{}' against '{}' was inconclusive: {}",
                            tier,
                            branch,
                            ancestor,
                            e
                        );
                        false
                    }
                }
            }),
            None => false,
        };

        self.verdicts.insert(key, verdict);
        verdict
    }

    fn check(&self, tier: Tier, branch: &str, ancestor_tip: Oid) -> Result<bool> {
        match tier {
            Tier::Direct => {
                let tip = self.history.branch_tip(branch)?;
                self.history.is_ancestor(ancestor_tip, tip)
            }
            Tier::RemoteTracking => {
                let tip = self.history.remote_tip(&self.config.remote, branch)?;
                self.history.is_ancestor(ancestor_tip, tip)
            }
            Tier::Reflog => {
                let tips = self
                    .history
                    .reflog_tips(branch, self.config.reflog_depth)?;
                Ok(tips.into_iter().any(|tip| {
                    self.history
                        .is_ancestor(ancestor_tip, tip)
                        .unwrap_or_else(|e| {
                            log::debug!("Skipping reflog entry {} of '{}': {}", tip, branch, e);
                            false
                        })
                }))
            }
        }
    }

    fn tip(&mut self, branch: &str) -> Option<Oid> {
        if let Some(tip) = self.tips.get(branch) {
            return *tip;
        }
        let tip = match self.history.branch_tip(branch) {
            Ok(tip) => Some(tip),
            Err(e) => {
                log::debug!("Cannot resolve tip of '{}': {}", branch, e);
                None
            }
        };
        self.tips.insert(branch.to_string(), tip);
        tip
    }
}
