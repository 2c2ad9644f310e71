//! Configuration for encoding and decoding.
//!
//! Encoding and decoding have separate option types because their knobs
//! don't overlap except for `indent`: nothing on the encode side needs a
//! strictness flag, and nothing on the decode side needs a key-collapsing
//! mode. Keeping them apart means a caller who only decodes never has to
//! think about `flatten_depth`.

/// The row/cell delimiter used by inline and tabular arrays.
///
/// Comma is the default and renders no marker in the bracket header; `Tab`
/// and `Pipe` each render a one-character marker (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// The marker rendered inside `[N<marker>]`; `None` for comma.
    pub fn marker(self) -> Option<char> {
        match self {
            Delimiter::Comma => None,
            Delimiter::Tab => Some('\t'),
            Delimiter::Pipe => Some('|'),
        }
    }

    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '\t' => Some(Delimiter::Tab),
            '|' => Some(Delimiter::Pipe),
            _ => None,
        }
    }
}

/// Key-collapsing mode for the encoder (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFolding {
    #[default]
    Off,
    /// Fold single-key object chains into dotted paths, skipping any fold
    /// that would collide with a sibling or root-literal key.
    Safe,
}

/// Path-expansion mode for the decoder (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathExpansion {
    #[default]
    Off,
    /// Expand dotted identifier keys into nested objects, deep-merging on
    /// convergence.
    Safe,
}

/// Options for encoding a [`crate::Value`] to TOON text.
#[derive(Clone)]
pub struct EncodeOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    pub delimiter: Delimiter,
    pub key_folding: KeyFolding,
    /// Maximum number of segments a single collapsed key may span. Only
    /// consulted when `key_folding` is `Safe`.
    pub flatten_depth: usize,
    /// Invoked pre-order on every (key, value, path) triple, including the
    /// synthetic root (`""`, value, `[]`). Returning `None` at a non-root
    /// position omits the field or element; returning `None` at the root
    /// leaves the value unchanged.
    pub replacer: Option<std::rc::Rc<dyn Fn(&str, &crate::Value, &[String]) -> Option<crate::Value>>>,
}

impl std::fmt::Debug for EncodeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodeOptions")
            .field("indent", &self.indent)
            .field("delimiter", &self.delimiter)
            .field("key_folding", &self.key_folding)
            .field("flatten_depth", &self.flatten_depth)
            .field("replacer", &self.replacer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            delimiter: Delimiter::default(),
            key_folding: KeyFolding::Off,
            flatten_depth: usize::MAX,
            replacer: None,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_key_folding(mut self, key_folding: KeyFolding) -> Self {
        self.key_folding = key_folding;
        self
    }

    pub fn with_flatten_depth(mut self, depth: usize) -> Self {
        self.flatten_depth = depth;
        self
    }

    pub fn with_replacer(
        mut self,
        replacer: impl Fn(&str, &crate::Value, &[String]) -> Option<crate::Value> + 'static,
    ) -> Self {
        self.replacer = Some(std::rc::Rc::new(replacer));
        self
    }
}

/// Options for decoding TOON text to a [`crate::Value`].
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    /// When set, promotes length mismatches, invalid escapes, and
    /// non-dividing indentation to fatal errors (§7). When unset, lengths
    /// are tolerated, tabs are allowed in indentation, and unknown escapes
    /// pass through literally.
    pub strict: bool,
    pub expand_paths: PathExpansion,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            strict: true,
            expand_paths: PathExpansion::Off,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_expand_paths(mut self, expand_paths: PathExpansion) -> Self {
        self.expand_paths = expand_paths;
        self
    }
}
