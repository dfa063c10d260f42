//! Splitting a rendered multi-document manifest into blocks

/// Literal line separating documents in a rendered manifest
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// One raw YAML document taken from a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock<'a> {
    /// Position of the block in the manifest, counting empty blocks
    pub index: usize,
    pub text: &'a str,
}

impl<'a> DocumentBlock<'a> {
    /// Chart-relative path of the template that rendered this document
    ///
    /// Helm prefixes each rendered document with `# Source: <path>`; the
    /// path is the last whitespace-delimited token of the first line.
    pub fn source(&self) -> Option<&'a str> {
        self.text.lines().next()?.split_whitespace().last()
    }
}

/// Split a manifest on the document separator, dropping blank blocks
pub fn split_documents(manifest: &str) -> Vec<DocumentBlock<'_>> {
    manifest
        .split(DOCUMENT_SEPARATOR)
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| DocumentBlock { index, text })
        .collect()
}
