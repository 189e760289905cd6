use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("Error"),
            Severity::Warning => f.write_str("Warning"),
        }
    }
}

/// A message reported back to the user of a data source. The summary is a short, fixed
/// description of what went wrong, and the detail carries the underlying error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// dotted path of the attribute that the diagnostic refers to, if any
    pub attribute: Option<String>,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.summary)?;
        if let Some(attr) = self.attribute.as_ref() {
            write!(f, " ({})", attr)?;
        }
        if !self.detail.is_empty() {
            write!(f, "\n\n{}", self.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Error, summary.into(), detail.into(), None);
    }

    pub fn add_attribute_error(
        &mut self,
        attribute: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(
            Severity::Error,
            summary.into(),
            detail.into(),
            Some(attribute.into()),
        );
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Warning, summary.into(), detail.into(), None);
    }

    fn push(&mut self, severity: Severity, summary: String, detail: String, attribute: Option<String>) {
        self.0.push(Diagnostic {
            severity,
            summary,
            detail,
            attribute,
        });
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn warnings_are_not_errors() {
        let mut diags = Diagnostics::new();
        diags.add_warning("Deprecated", "use something else");
        assert!(!diags.has_error());
        assert_eq!(1, diags.len());

        diags.add_error("Unable to GET resource", "boom");
        assert!(diags.has_error());
        assert_eq!(1, diags.errors().count());
    }

    #[test]
    fn display_includes_attribute_and_detail() {
        let mut diags = Diagnostics::new();
        diags.add_attribute_error("metadata.name", "Missing required attribute", "must be set");
        let diag = diags.iter().next().expect("no diagnostic");
        assert_eq!(
            "Error: Missing required attribute (metadata.name)\n\nmust be set",
            diag.to_string()
        );
    }
}
