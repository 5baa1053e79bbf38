/// Language and optional filename carried by a fenced code block's info
/// string, written as `language` or `language:filename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTag {
    pub language: String,
    pub filename: Option<String>,
}

impl CodeTag {
    /// Split a fence tag on its first colon.
    ///
    /// A missing or empty tag, or an empty language before the colon, falls
    /// back to `default_language`. An empty filename counts as no filename.
    /// Everything after the first colon belongs to the filename, so
    /// `c:dir:file.c` names the file `dir:file.c`.
    pub fn parse(tag: Option<&str>, default_language: &str) -> Self {
        let tag = tag.map(str::trim).filter(|t| !t.is_empty());
        let (language, filename) = match tag {
            Some(tag) => match tag.split_once(':') {
                Some((language, filename)) => (language, Some(filename)),
                None => (tag, None),
            },
            None => (default_language, None),
        };

        let language = if language.is_empty() {
            default_language
        } else {
            language
        };

        Self {
            language: language.to_string(),
            filename: filename.filter(|f| !f.is_empty()).map(str::to_string),
        }
    }
}
