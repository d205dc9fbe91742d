//! AQL query rendering.

use crate::domain::artifact::ArtifactIdentifier;

const FILENAME: &str = "{filename}";
const BUILD_PATH: &str = "{build_path}";

/// An AQL query with `{filename}` and `{build_path}` placeholders.
///
/// Substituted values are escaped for a JSON string literal, so a `"` in a
/// file name cannot end the string it is placed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AqlQueryTemplate {
    template: String,
}

impl AqlQueryTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Renders the query for one artifact.
    ///
    /// Values are substituted in a single pass: a file name that itself
    /// contains `{build_path}` is not expanded again.
    pub fn render(&self, identifier: &ArtifactIdentifier) -> String {
        let filename = escape(identifier.filename());
        let build_path = escape(identifier.build_path());

        self.template
            .split(FILENAME)
            .map(|part| part.replace(BUILD_PATH, &build_path))
            .collect::<Vec<_>>()
            .join(&filename)
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
