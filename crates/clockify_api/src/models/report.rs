use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DetailedReport {
    #[serde(default)]
    pub timeentries: Vec<ReportEntry>,
}

/// One raw entry from the detailed report. Field presence varies between
/// workspaces and report revisions, so everything past the interval is
/// optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project: Option<ReportProjectRef>,
    pub time_interval: Option<ReportTimeInterval>,
}

impl ReportEntry {
    /// Returns the embedded project name, whichever report shape carried it.
    pub fn embedded_project_name(&self) -> Option<&str> {
        self.project_name
            .as_deref()
            .or_else(|| self.project.as_ref().and_then(|p| p.name.as_deref()))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportProjectRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportTimeInterval {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub duration: Option<DurationValue>,
}

/// The wire encoding of a duration. The time-entries endpoint returns
/// ISO-8601 period text ("PT1H30M"), the detailed report returns raw
/// seconds; both appear in the wild.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum DurationValue {
    Text(String),
    Seconds(f64),
}
