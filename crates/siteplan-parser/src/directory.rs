//! `PlanningSource` over a directory of exported backend payloads.
//!
//! Layout, one directory per project:
//!
//! ```text
//! <root>/<project>/gantt.json
//! <root>/<project>/sprints/<sprint>/gantt.json
//! <root>/<project>/critical_path.json
//! <root>/<project>/health.json
//! <root>/<project>/progress.json
//! <root>/<project>/baselines/<baseline>.json
//! ```
//!
//! A missing `progress.json` falls back to the progress columns of
//! `gantt.json`.

use std::path::{Path, PathBuf};
use tracing::debug;

use siteplan_core::baseline::{ActualProgress, BaselineSnapshot};
use siteplan_core::{
    BaselineId, CriticalPath, PlanningSource, ScheduleHealthSnapshot, ScheduleQuery, ScheduleTask,
    SourceError,
};

use crate::{
    parse_actual_progress, parse_baseline, parse_critical_path, parse_gantt,
    parse_schedule_health, ParseError,
};

/// Reads planning payloads from JSON files
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, query: &ScheduleQuery) -> PathBuf {
        self.root.join(query.project.to_string())
    }

    fn gantt_path(&self, query: &ScheduleQuery) -> PathBuf {
        let dir = self.project_dir(query);
        match query.sprint {
            Some(sprint) => dir.join("sprints").join(sprint.to_string()).join("gantt.json"),
            None => dir.join("gantt.json"),
        }
    }

    fn load<T>(
        &self,
        path: &Path,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = content.len(), "reading payload");
        parse(&content).map_err(|e| {
            SourceError::InvalidPayload(format!("{}: {}", path.display(), e))
        })
    }
}

impl PlanningSource for DirectorySource {
    fn gantt_data(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleTask>, SourceError> {
        self.load(&self.gantt_path(query), parse_gantt)
    }

    fn critical_path(&self, query: &ScheduleQuery) -> Result<CriticalPath, SourceError> {
        self.load(
            &self.project_dir(query).join("critical_path.json"),
            parse_critical_path,
        )
    }

    fn schedule_health(&self, query: &ScheduleQuery) -> Result<ScheduleHealthSnapshot, SourceError> {
        self.load(
            &self.project_dir(query).join("health.json"),
            parse_schedule_health,
        )
    }

    fn baseline(
        &self,
        query: &ScheduleQuery,
        baseline: BaselineId,
    ) -> Result<BaselineSnapshot, SourceError> {
        let path = self
            .project_dir(query)
            .join("baselines")
            .join(format!("{baseline}.json"));
        self.load(&path, parse_baseline)
    }

    fn actual_progress(&self, query: &ScheduleQuery) -> Result<Vec<ActualProgress>, SourceError> {
        let path = self.project_dir(query).join("progress.json");
        if path.exists() {
            return self.load(&path, parse_actual_progress);
        }
        debug!(project = query.project, "no progress export; using gantt progress");
        let project_wide = ScheduleQuery::project(query.project);
        let tasks = self.gantt_data(&project_wide)?;
        Ok(tasks.iter().map(ActualProgress::from_task).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprint_gantt_path() {
        let source = DirectorySource::new("/data");
        let query = ScheduleQuery::project(4).sprint(2);
        assert_eq!(
            source.gantt_path(&query),
            PathBuf::from("/data/4/sprints/2/gantt.json")
        );
        assert_eq!(
            source.gantt_path(&ScheduleQuery::project(4)),
            PathBuf::from("/data/4/gantt.json")
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        let err = source.critical_path(&ScheduleQuery::project(1)).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
