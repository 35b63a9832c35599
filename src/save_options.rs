/// The `/ID` policy for a save operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identifier {
    /// Do not write an `/ID` entry.
    #[default]
    Omit,
    /// Derive both halves from an MD5 digest of the object bodies.
    Generate,
    /// Use the given bytes as the first half; the second half is the digest.
    Bytes(Vec<u8>),
}

/// Options for saving PDF documents
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// PDF version written in the header, "1.7" by default.
    ///
    /// The version is compared byte-lexicographically against "1.5" when
    /// deciding whether `compress` may use object streams; that ordering
    /// is correct for every version published so far.
    pub version: String,

    /// `/ID` policy for the trailer section.
    pub identifier: Identifier,

    /// Pack eligible objects into a compressed object stream and write a
    /// cross-reference stream instead of an xref table. Takes effect for
    /// version 1.5 and later; earlier versions fall back to the classic
    /// layout.
    pub compress: bool,
}

impl Default for SaveOptions {
    fn default() -> SaveOptions {
        SaveOptions {
            version: "1.7".to_string(),
            identifier: Identifier::Omit,
            compress: false,
        }
    }
}

impl SaveOptions {
    /// Create a builder for SaveOptions
    pub fn builder() -> SaveOptionsBuilder {
        SaveOptionsBuilder::default()
    }
}

/// Builder for SaveOptions
#[derive(Default)]
pub struct SaveOptionsBuilder {
    version: Option<String>,
    identifier: Identifier,
    compress: bool,
}

impl SaveOptionsBuilder {
    /// Set the PDF version written in the header
    pub fn version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the `/ID` policy
    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = identifier;
        self
    }

    /// Enable or disable object-stream compaction
    pub fn compress(mut self, value: bool) -> Self {
        self.compress = value;
        self
    }

    /// Build the SaveOptions
    pub fn build(self) -> SaveOptions {
        SaveOptions {
            version: self.version.unwrap_or_else(|| "1.7".to_string()),
            identifier: self.identifier,
            compress: self.compress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = SaveOptions::default();
        assert_eq!(options.version, "1.7");
        assert_eq!(options.identifier, Identifier::Omit);
        assert!(!options.compress);
    }

    #[test]
    fn builder_overrides() {
        let options = SaveOptions::builder()
            .version("1.5")
            .identifier(Identifier::Generate)
            .compress(true)
            .build();
        assert_eq!(options.version, "1.5");
        assert_eq!(options.identifier, Identifier::Generate);
        assert!(options.compress);
    }
}
