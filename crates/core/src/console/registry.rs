//! Bookkeeping of running tasks and the parent chain of their subtasks

use indexmap::{IndexMap, IndexSet};

use crate::types::TaskKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubtaskParents<Id> {
    pub root_task: Id,
    pub parent_task: Id,
}

/// Insertion-ordered registry; the latest entries back the "latest task" lookup.
#[derive(Debug)]
pub(crate) struct Registry<Id> {
    tasks_in_progress: IndexSet<Id>,
    subtask_parents: IndexMap<Id, SubtaskParents<Id>>,
}

impl<Id> Default for Registry<Id> {
    fn default() -> Self {
        Self {
            tasks_in_progress: IndexSet::new(),
            subtask_parents: IndexMap::new(),
        }
    }
}

impl<Id: TaskKey> Registry<Id> {
    pub fn is_in_progress(&self, task_id: &Id) -> bool {
        self.tasks_in_progress.contains(task_id)
    }

    pub fn has_tasks_in_progress(&self) -> bool {
        !self.tasks_in_progress.is_empty()
    }

    /// Returns `false` when the task was already running.
    pub fn start_task(&mut self, task_id: Id) -> bool {
        self.tasks_in_progress.insert(task_id)
    }

    /// Removes the task together with every subtask rooted at it.
    /// Returns `false` when the task was not running.
    pub fn finish_task(&mut self, task_id: &Id) -> bool {
        if !self.tasks_in_progress.shift_remove(task_id) {
            return false;
        }
        self.subtask_parents
            .retain(|_, parents| parents.root_task != *task_id);
        true
    }

    /// Root a new subtask of `parent_task` would belong to. A parent that is
    /// not a known subtask is assumed to be a root task itself.
    pub fn root_for_parent<'a>(&'a self, parent_task: &'a Id) -> &'a Id {
        self.subtask_parents
            .get(parent_task)
            .map(|parents| &parents.root_task)
            .unwrap_or(parent_task)
    }

    pub fn insert_subtask(&mut self, subtask_id: Id, root_task: Id, parent_task: Id) {
        self.subtask_parents.insert(
            subtask_id,
            SubtaskParents {
                root_task,
                parent_task,
            },
        );
    }

    pub fn subtask(&self, subtask_id: &Id) -> Option<&SubtaskParents<Id>> {
        self.subtask_parents.get(subtask_id)
    }

    /// Root task of any known id: a running task is its own root.
    pub fn root_of(&self, task_id: &Id) -> Option<&Id> {
        if self.is_in_progress(task_id) {
            return self.tasks_in_progress.get(task_id);
        }
        self.subtask_parents
            .get(task_id)
            .map(|parents| &parents.root_task)
    }

    /// Immediate parent of a subtask; a running task is its own parent.
    pub fn parent_of(&self, task_id: &Id) -> Option<&Id> {
        if self.is_in_progress(task_id) {
            return self.tasks_in_progress.get(task_id);
        }
        self.subtask_parents
            .get(task_id)
            .map(|parents| &parents.parent_task)
    }

    /// Chain of ancestors from the immediate parent up to the root task.
    ///
    /// The walk is bounded by the number of registered subtasks so a corrupted
    /// parent chain can never loop forever.
    pub fn ancestors_of(&self, task_id: &Id) -> Vec<Id> {
        let mut ancestors = Vec::new();
        let mut current = task_id;
        for _ in 0..=self.subtask_parents.len() {
            if self.is_in_progress(current) {
                break;
            }
            let Some(parent) = self.parent_of(current) else {
                break;
            };
            if parent == current {
                break;
            }
            ancestors.push(parent.clone());
            current = parent;
        }
        ancestors
    }

    /// Removes a subtask and all of its transitive descendants.
    pub fn remove_subtree(&mut self, subtask_id: &Id) {
        let mut worklist = vec![subtask_id.clone()];
        while let Some(current) = worklist.pop() {
            self.subtask_parents.shift_remove(&current);
            worklist.extend(
                self.subtask_parents
                    .iter()
                    .filter(|(_, parents)| parents.parent_task == current)
                    .map(|(id, _)| id.clone()),
            );
        }
    }

    /// Most recently registered subtask, falling back to the most recently started task.
    pub fn latest(&self) -> Option<&Id> {
        self.subtask_parents
            .last()
            .map(|(id, _)| id)
            .or_else(|| self.tasks_in_progress.last())
    }

    pub fn subtask_ids(&self) -> Vec<Id> {
        self.subtask_parents.keys().cloned().collect()
    }

    pub fn task_ids(&self) -> Vec<Id> {
        self.tasks_in_progress.iter().cloned().collect()
    }
}
