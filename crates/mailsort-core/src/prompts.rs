//! Few-shot prompt construction
//!
//! The prompt template is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/mailsort/prompts/overrides/)
//! 2. Fall back to the embedded default (compiled into binary)
//!
//! Example selection is deterministic: the first examples of each department
//! in corpus order, never shuffled, so evaluation runs are reproducible.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::models::{Department, Email};

/// Embedded default prompt (compiled into binary)
const DEFAULT_TEMPLATE: &str = include_str!("../../../prompts/classify_email.md");

/// Identifier of the classification prompt (also the override file stem)
pub const PROMPT_ID: &str = "classify_email";

/// Examples taken per department
pub const EXAMPLES_PER_DEPARTMENT: usize = 2;

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
}

/// A loaded prompt template with metadata and content
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl PromptTemplate {
    /// The embedded default template
    ///
    /// A frontmatter problem in the compiled-in file degrades to using the
    /// whole file as the template body.
    pub fn embedded() -> Self {
        let (metadata, content) = parse_prompt(DEFAULT_TEMPLATE).unwrap_or_else(|_| {
            (
                PromptMetadata {
                    id: PROMPT_ID.to_string(),
                    version: 0,
                },
                DEFAULT_TEMPLATE.to_string(),
            )
        });
        Self {
            metadata,
            content,
            is_override: false,
            override_path: None,
        }
    }

    /// Load from the default override directory, else the embedded default
    pub fn load() -> Result<Self> {
        match default_prompts_dir() {
            Some(dir) => Self::load_from_dir(dir),
            None => Ok(Self::embedded()),
        }
    }

    /// Load `<dir>/classify_email.md` if present, else the embedded default
    pub fn load_from_dir(dir: PathBuf) -> Result<Self> {
        let override_path = dir.join(format!("{}.md", PROMPT_ID));
        if !override_path.exists() {
            return Ok(Self::embedded());
        }

        let content = fs::read_to_string(&override_path)?;
        let (metadata, content) = parse_prompt(&content)?;
        Ok(Self {
            metadata,
            content,
            is_override: true,
            override_path: Some(override_path),
        })
    }

    /// The `# System` section, sent as the chat system message
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// The `# User` section (or the whole body when there are no sections)
    pub fn user_section(&self) -> &str {
        extract_section(&self.content, "# User").unwrap_or(&self.content)
    }

    /// Render the user section with `{{var}}` placeholders replaced
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        render(self.user_section(), vars)
    }
}

/// Renders the few-shot classification prompt for an email
#[derive(Debug, Clone)]
pub struct FewShotPromptBuilder {
    template: PromptTemplate,
    examples_per_department: usize,
}

impl FewShotPromptBuilder {
    pub fn new(template: PromptTemplate) -> Self {
        Self {
            template,
            examples_per_department: EXAMPLES_PER_DEPARTMENT,
        }
    }

    /// Builder over the embedded template
    pub fn embedded() -> Self {
        Self::new(PromptTemplate::embedded())
    }

    pub fn with_examples_per_department(mut self, n: usize) -> Self {
        self.examples_per_department = n;
        self
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.template.system_section()
    }

    /// Render the user prompt for `email` with examples drawn from `corpus`
    pub fn build(&self, email: &Email, corpus: &Corpus, departments: &[Department]) -> String {
        let department_list = departments
            .iter()
            .map(|d| format!("- {}: {}", d, d.description()))
            .collect::<Vec<_>>()
            .join("\n");

        let examples = departments
            .iter()
            .flat_map(|&d| corpus.examples_for(d, self.examples_per_department))
            .enumerate()
            .map(|(i, example)| {
                format!(
                    "\nPrzykład {}:\nTemat: {}\nTreść: {}\nDział: {}\n",
                    i + 1,
                    example.subject,
                    example.body,
                    example.label
                )
            })
            .collect::<String>();

        let names = department_names(departments);

        let mut vars = HashMap::new();
        vars.insert("departments", department_list.as_str());
        vars.insert("examples", examples.as_str());
        vars.insert("subject", email.subject.as_str());
        vars.insert("body", email.body.as_str());
        vars.insert("department_names", names.as_str());
        self.template.render_user(&vars)
    }
}

impl Default for FewShotPromptBuilder {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Build the classification prompt with the embedded template
pub fn build_prompt(email: &Email, corpus: &Corpus, departments: &[Department]) -> String {
    FewShotPromptBuilder::embedded().build(email, corpus, departments)
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mailsort").join("prompts").join("overrides"))
}

/// "IT, Księgowość, Obsługa Klienta, lub Sprzedaż"
fn department_names(departments: &[Department]) -> String {
    match departments.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => {
            let head = rest
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}, lub {}", head, last)
        }
    }
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Find the next header or end of content
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Single-pass `{{var}}` substitution; substituted values are never rescanned,
/// so placeholders inside an email body stay literal. Unknown placeholders are kept.
fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = after_open[..close].trim();
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[open..open + 2 + close + 2]),
                }
                rest = &after_open[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
