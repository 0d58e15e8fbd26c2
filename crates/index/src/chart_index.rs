//! Per-repository index structure and document rendering.

use crate::entry::{ChartVersionEntry, Rendered};
use crate::error::{IndexError, IndexResult};
use charthouse_core::generated_stamp;
use indexmap::IndexMap;

/// A repository's in-memory index: entries plus cached renderings.
///
/// All recomputation happens at mutation time; `render()` is a plain read
/// of the cached repo document. Mutating methods must only be called while
/// the owning repository's lock is held; the mutated index is then
/// published as a whole, so readers never see a half-rendered state.
///
/// All maps are insertion-ordered: rebuilds insert in file-store listing
/// order, incremental uploads append.
#[derive(Clone, Debug)]
pub struct ChartIndex {
    repo: String,
    base_url: String,
    versions: IndexMap<String, IndexMap<String, ChartVersionEntry>>,
    rendered_version: IndexMap<String, IndexMap<String, Rendered>>,
    rendered_chart: IndexMap<String, Rendered>,
    rendered_repo: Rendered,
}

impl ChartIndex {
    /// Create an empty index for a repository. The empty-repo documents
    /// are rendered immediately.
    pub fn new(repo: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut index = Self {
            repo: repo.into(),
            base_url: base_url.into(),
            versions: IndexMap::new(),
            rendered_version: IndexMap::new(),
            rendered_chart: IndexMap::new(),
            rendered_repo: Rendered::default(),
        };
        index.render_repo();
        index
    }

    /// Build an index from a scan's worth of entries in one pass.
    ///
    /// Used by full rebuilds: every chart is rendered once after all its
    /// versions are in, and the repo document once at the end.
    pub fn from_entries(
        repo: impl Into<String>,
        base_url: impl Into<String>,
        entries: impl IntoIterator<Item = ChartVersionEntry>,
    ) -> Self {
        let mut index = Self {
            repo: repo.into(),
            base_url: base_url.into(),
            versions: IndexMap::new(),
            rendered_version: IndexMap::new(),
            rendered_chart: IndexMap::new(),
            rendered_repo: Rendered::default(),
        };

        for entry in entries {
            index.insert_entry(entry);
        }

        let charts: Vec<String> = index.versions.keys().cloned().collect();
        for chart in charts {
            index.render_chart(&chart);
        }
        index.render_repo();
        index
    }

    /// The repository this index belongs to.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Whether the repository has no charts.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Whether a (chart, version) pair exists. This entry map is the
    /// canonical existence source for overwrite checks.
    pub fn contains(&self, chart: &str, version: &str) -> bool {
        self.versions
            .get(chart)
            .is_some_and(|bucket| bucket.contains_key(version))
    }

    /// Look up an entry.
    pub fn entry(&self, chart: &str, version: &str) -> Option<&ChartVersionEntry> {
        self.versions.get(chart).and_then(|bucket| bucket.get(version))
    }

    /// Whether a chart exists.
    pub fn contains_chart(&self, chart: &str) -> bool {
        self.versions.contains_key(chart)
    }

    /// The cached rendering of one chart's version list.
    pub fn chart_rendering(&self, chart: &str) -> Option<&Rendered> {
        self.rendered_chart.get(chart)
    }

    /// The cached rendering of one version entry.
    pub fn version_rendering(&self, chart: &str, version: &str) -> Option<&Rendered> {
        self.rendered_version
            .get(chart)
            .and_then(|bucket| bucket.get(version))
    }

    /// The current repo document pair. O(1); all rendering happened at
    /// mutation time.
    pub fn render(&self) -> &Rendered {
        &self.rendered_repo
    }

    /// Insert or overwrite an entry and re-render the affected chart and
    /// the repo document.
    pub fn upsert_version(&mut self, entry: ChartVersionEntry) {
        let chart = entry.chart.clone();
        self.insert_entry(entry);
        self.render_chart(&chart);
        self.render_repo();
    }

    /// Remove an entry. The chart disappears from every rendered level
    /// when its last version is removed; the repo document is always
    /// re-rendered.
    pub fn remove_version(&mut self, chart: &str, version: &str) -> IndexResult<()> {
        let bucket = self
            .versions
            .get_mut(chart)
            .ok_or_else(|| IndexError::ChartNotFound {
                repo: self.repo.clone(),
                chart: chart.to_string(),
            })?;

        if bucket.shift_remove(version).is_none() {
            return Err(IndexError::VersionNotFound {
                repo: self.repo.clone(),
                chart: chart.to_string(),
                version: version.to_string(),
            });
        }

        if let Some(rendered_bucket) = self.rendered_version.get_mut(chart) {
            rendered_bucket.shift_remove(version);
        }

        if bucket.is_empty() {
            self.versions.shift_remove(chart);
            self.rendered_version.shift_remove(chart);
            self.rendered_chart.shift_remove(chart);
        } else {
            self.render_chart(chart);
        }

        self.render_repo();
        Ok(())
    }

    fn insert_entry(&mut self, entry: ChartVersionEntry) {
        let rendered = entry.render(&self.base_url, &self.repo);
        let chart = entry.chart.clone();
        let version = entry.version.clone();

        self.versions
            .entry(chart.clone())
            .or_default()
            .insert(version.clone(), entry);
        self.rendered_version
            .entry(chart)
            .or_default()
            .insert(version, rendered);
    }

    fn render_chart(&mut self, chart: &str) {
        let Some(bucket) = self.rendered_version.get(chart) else {
            return;
        };

        let yaml_list: Vec<&str> = bucket.values().map(|r| r.yaml.as_str()).collect();
        let json_list: Vec<&str> = bucket.values().map(|r| r.json.as_str()).collect();

        self.rendered_chart.insert(
            chart.to_string(),
            Rendered {
                yaml: format!("  {chart}:\n{}", yaml_list.join("\n")),
                json: format!("[{}]", json_list.join(",")),
            },
        );
    }

    fn render_repo(&mut self) {
        let generated = generated_stamp();

        if self.rendered_chart.is_empty() {
            // The empty repository is a distinct literal document, not a
            // populated shape with an empty field.
            self.rendered_repo = Rendered {
                yaml: format!(
                    "apiVersion: v1\nentries: {{}}\ngenerated: \"{generated}\"\nserverInfo: {{}}\n"
                ),
                json: "{}".to_string(),
            };
            return;
        }

        let yaml_charts: Vec<&str> = self
            .rendered_chart
            .values()
            .map(|r| r.yaml.as_str())
            .collect();

        let json_charts: Vec<String> = self
            .rendered_chart
            .iter()
            .map(|(chart, r)| format!("\"{chart}\": {}", r.json))
            .collect();

        self.rendered_repo = Rendered {
            yaml: format!(
                "apiVersion: v1\nentries:\n{}\ngenerated: \"{generated}\"\nserverInfo: {{}}\n",
                yaml_charts.join("\n")
            ),
            json: format!("{{{}}}", json_charts.join(",")),
        };
    }
}

/// The empty-repository document pair, as served for repositories the
/// registry does not know yet.
pub fn empty_repo_rendering() -> Rendered {
    ChartIndex::new("", "").render().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use charthouse_core::{ContentDigest, CreatedStamps};
    use time::macros::datetime;

    fn entry(chart: &str, version: &str) -> ChartVersionEntry {
        ChartVersionEntry {
            chart: chart.to_string(),
            version: version.to_string(),
            filename: format!("{chart}-{version}.tgz"),
            digest: ContentDigest::compute(format!("{chart}-{version}").as_bytes()),
            created: CreatedStamps::from_time(datetime!(2022-01-25 11:48:46.0 UTC)),
        }
    }

    #[test]
    fn empty_repo_documents() {
        let index = ChartIndex::new("stable", "");
        let rendered = index.render();
        assert_eq!(rendered.json, "{}");
        assert!(rendered.yaml.starts_with("apiVersion: v1\nentries: {}\n"));
        assert!(rendered.yaml.ends_with("serverInfo: {}\n"));
    }

    #[test]
    fn upsert_renders_all_levels() {
        let mut index = ChartIndex::new("stable", "http://example.com");
        index.upsert_version(entry("foo", "1.0.0"));

        assert!(index.contains("foo", "1.0.0"));
        assert!(index.version_rendering("foo", "1.0.0").is_some());
        assert!(index.chart_rendering("foo").is_some());

        let rendered = index.render();
        assert!(rendered.json.starts_with("{\"foo\": ["));
        assert!(rendered.yaml.contains("entries:\n  foo:\n"));
        assert!(rendered.yaml.contains("name: foo"));
    }

    #[test]
    fn upsert_same_pair_keeps_one_entry() {
        let mut index = ChartIndex::new("stable", "");
        index.upsert_version(entry("foo", "1.0.0"));

        let mut replacement = entry("foo", "1.0.0");
        replacement.digest = ContentDigest::compute(b"new bytes");
        index.upsert_version(replacement.clone());

        let stored = index.entry("foo", "1.0.0").unwrap();
        assert_eq!(stored.digest, replacement.digest);
        // Exactly one occurrence of the entry in the repo document.
        assert_eq!(index.render().json.matches("\"version\":\"1.0.0\"").count(), 1);
    }

    #[test]
    fn multiple_versions_keep_insertion_order() {
        let mut index = ChartIndex::new("stable", "");
        index.upsert_version(entry("foo", "2.0.0"));
        index.upsert_version(entry("foo", "1.0.0"));

        let json = &index.chart_rendering("foo").unwrap().json;
        let pos_2 = json.find("\"version\":\"2.0.0\"").unwrap();
        let pos_1 = json.find("\"version\":\"1.0.0\"").unwrap();
        assert!(pos_2 < pos_1, "listing order is insertion order, not sorted");
    }

    #[test]
    fn remove_missing_fails() {
        let mut index = ChartIndex::new("stable", "");
        assert!(matches!(
            index.remove_version("foo", "1.0.0"),
            Err(IndexError::ChartNotFound { .. })
        ));

        index.upsert_version(entry("foo", "1.0.0"));
        assert!(matches!(
            index.remove_version("foo", "9.9.9"),
            Err(IndexError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn removing_last_version_drops_the_chart() {
        let mut index = ChartIndex::new("stable", "");
        index.upsert_version(entry("foo", "1.0.0"));
        index.upsert_version(entry("bar", "1.0.0"));

        index.remove_version("foo", "1.0.0").unwrap();
        assert!(!index.contains_chart("foo"));
        assert!(index.chart_rendering("foo").is_none());
        assert!(index.version_rendering("foo", "1.0.0").is_none());
        assert!(index.render().json.starts_with("{\"bar\": ["));
    }

    #[test]
    fn deleting_the_last_chart_restores_empty_forms() {
        let mut index = ChartIndex::new("stable", "");
        index.upsert_version(entry("foo", "1.0.0"));
        index.remove_version("foo", "1.0.0").unwrap();

        assert!(index.is_empty());
        assert_eq!(index.render().json, "{}");
        assert!(index.render().yaml.contains("entries: {}\n"));
    }

    #[test]
    fn remove_keeps_other_versions_rendered() {
        let mut index = ChartIndex::new("stable", "");
        index.upsert_version(entry("foo", "1.0.0"));
        index.upsert_version(entry("foo", "2.0.0"));

        index.remove_version("foo", "1.0.0").unwrap();
        let json = &index.chart_rendering("foo").unwrap().json;
        assert!(json.contains("\"version\":\"2.0.0\""));
        assert!(!json.contains("\"version\":\"1.0.0\""));
    }
}
