//! Chart version entries and their rendered forms.

use charthouse_core::{ContentDigest, CreatedStamps};

/// One archive file's metadata in the index.
///
/// (chart, version) is unique within a repository; the entry is created on
/// upload or rebuild scan, replaced on permitted overwrite, removed on
/// delete.
#[derive(Clone, Debug)]
pub struct ChartVersionEntry {
    /// Chart name.
    pub chart: String,
    /// Version string (never empty for an indexed entry).
    pub version: String,
    /// Archive filename in the repository directory.
    pub filename: String,
    /// Content digest of the archive bytes.
    pub digest: ContentDigest,
    /// Creation instant in both document encodings, from file mtime.
    pub created: CreatedStamps,
}

/// A document fragment rendered in both textual encodings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    /// YAML encoding.
    pub yaml: String,
    /// JSON encoding.
    pub json: String,
}

impl ChartVersionEntry {
    /// Derive the chart's download URL.
    pub fn download_url(&self, base_url: &str, repo: &str) -> String {
        format!("{base_url}/{repo}/charts/{}", self.filename)
    }

    /// Render this entry in both encodings.
    ///
    /// The YAML form is a list item indented for the repo document's
    /// `entries:` mapping; the JSON form is a standalone object.
    pub fn render(&self, base_url: &str, repo: &str) -> Rendered {
        let url = self.download_url(base_url, repo);

        let yaml = format!(
            "    - apiVersion: v1\n\
             \x20     appVersion: {version}\n\
             \x20     created: \"{created}\"\n\
             \x20     description: {chart} {version}\n\
             \x20     digest: {digest}\n\
             \x20     name: {chart}\n\
             \x20     urls:\n\
             \x20       - {url}\n\
             \x20     version: {version}",
            chart = self.chart,
            version = self.version,
            created = self.created.yaml,
            digest = self.digest,
        );

        let json = format!(
            "{{\"name\":\"{chart}\",\"version\":\"{version}\",\
             \"description\":\"{chart} {version}\",\"apiVersion\":\"v1\",\
             \"appVersion\":\"{version}\",\"urls\":[\"{url}\"],\
             \"created\":\"{created}\",\"digest\":\"{digest}\"}}",
            chart = self.chart,
            version = self.version,
            created = self.created.json,
            digest = self.digest,
        );

        Rendered { yaml, json }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn entry() -> ChartVersionEntry {
        ChartVersionEntry {
            chart: "mychart".to_string(),
            version: "1.2.3".to_string(),
            filename: "mychart-1.2.3.tgz".to_string(),
            digest: ContentDigest::compute(b"archive"),
            created: CreatedStamps::from_time(datetime!(2022-01-25 11:48:46.000001 UTC)),
        }
    }

    #[test]
    fn yaml_rendering() {
        let rendered = entry().render("http://charts.example.com", "stable");
        let expected = format!(
            "    - apiVersion: v1\n      appVersion: 1.2.3\n      created: \"2022-01-25T11:48:46.000001Z\"\n      description: mychart 1.2.3\n      digest: {digest}\n      name: mychart\n      urls:\n        - http://charts.example.com/stable/charts/mychart-1.2.3.tgz\n      version: 1.2.3",
            digest = ContentDigest::compute(b"archive"),
        );
        assert_eq!(rendered.yaml, expected);
    }

    #[test]
    fn json_rendering() {
        let rendered = entry().render("", "stable");
        assert!(rendered.json.starts_with("{\"name\":\"mychart\""));
        assert!(rendered.json.contains("\"urls\":[\"/stable/charts/mychart-1.2.3.tgz\"]"));
        assert!(rendered.json.contains("\"created\":\"2022-01-25T11:48:46.000001000+00:00\""));
        assert!(rendered.json.ends_with("\"}"));
    }
}
