pub struct TreePath;

impl TreePath {
    /// Render a parent chain in the export's slash-delimited form:
    /// `["A", "B"]` becomes `/A/B/`; the root renders as `/`.
    pub fn render(segments: &[String]) -> String {
        if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", segments.join("/"))
        }
    }

    /// Split a user-supplied start path into folder names, tolerating
    /// leading/trailing slashes and whitespace.
    pub fn parse(path: &str) -> Vec<String> {
        path.trim_matches(|c: char| c == '/' || c.is_whitespace())
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    /// Folder names travel back into the remote session verbatim, so a
    /// separator inside one would desynchronize the mirrored position.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && !name.contains('/')
    }
}
