//! Template directives and the file list they operate on.

use std::path::PathBuf;

use super::pattern::translate_pattern;
use super::TemplateError;
use crate::util::fs::list_files;

/// One parsed template directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Include(Vec<String>),
    Exclude(Vec<String>),
    GlobalInclude(Vec<String>),
    GlobalExclude(Vec<String>),
    RecursiveInclude { dir: String, patterns: Vec<String> },
    RecursiveExclude { dir: String, patterns: Vec<String> },
    Graft(String),
    Prune(String),
}

impl Directive {
    /// Parse a logical template line.
    pub fn parse(line: &str) -> Result<Self, TemplateError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&action, args)) = words.split_first() else {
            return Err(TemplateError::ExpectsPatterns {
                action: String::new(),
            });
        };

        let paths = |items: &[&str]| -> Result<Vec<String>, TemplateError> {
            items.iter().map(|p| convert_path(p)).collect()
        };

        match action {
            "include" | "exclude" | "global-include" | "global-exclude" => {
                if args.is_empty() {
                    return Err(TemplateError::ExpectsPatterns {
                        action: action.to_string(),
                    });
                }
                let patterns = paths(args)?;
                Ok(match action {
                    "include" => Directive::Include(patterns),
                    "exclude" => Directive::Exclude(patterns),
                    "global-include" => Directive::GlobalInclude(patterns),
                    _ => Directive::GlobalExclude(patterns),
                })
            }
            "recursive-include" | "recursive-exclude" => {
                if args.len() < 2 {
                    return Err(TemplateError::ExpectsDirAndPatterns {
                        action: action.to_string(),
                    });
                }
                let dir = convert_path(args[0])?;
                let patterns = paths(&args[1..])?;
                Ok(if action == "recursive-include" {
                    Directive::RecursiveInclude { dir, patterns }
                } else {
                    Directive::RecursiveExclude { dir, patterns }
                })
            }
            "graft" | "prune" => {
                if args.len() != 1 {
                    return Err(TemplateError::ExpectsSingleDir {
                        action: action.to_string(),
                    });
                }
                let dir = convert_path(args[0])?;
                Ok(if action == "graft" {
                    Directive::Graft(dir)
                } else {
                    Directive::Prune(dir)
                })
            }
            other => Err(TemplateError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

/// Validate a `/`-separated template path and drop `.` segments.
pub fn convert_path(path: &str) -> Result<String, TemplateError> {
    if path.starts_with('/') {
        return Err(TemplateError::AbsolutePath {
            path: path.to_string(),
        });
    }
    if path.ends_with('/') {
        return Err(TemplateError::TrailingSlash {
            path: path.to_string(),
        });
    }

    let parts: Vec<&str> = path.split('/').filter(|p| *p != ".").collect();
    if parts.is_empty() {
        return Ok(".".to_string());
    }
    Ok(parts.join("/"))
}

/// The accumulating set of selected files.
#[derive(Debug)]
pub struct FileList {
    root: PathBuf,
    allfiles: Option<Vec<String>>,
    files: Vec<String>,
}

impl FileList {
    /// Create an empty list over the working tree at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileList {
            root: root.into(),
            allfiles: None,
            files: Vec::new(),
        }
    }

    /// Create a list over an explicit set of candidate files.
    pub fn with_candidates(candidates: Vec<String>) -> Self {
        FileList {
            root: PathBuf::new(),
            allfiles: Some(candidates),
            files: Vec::new(),
        }
    }

    /// Files selected so far, in selection order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn into_files(self) -> Vec<String> {
        self.files
    }

    fn allfiles(&mut self) -> &[String] {
        if self.allfiles.is_none() {
            self.allfiles = Some(list_files(&self.root));
        }
        self.allfiles.as_deref().unwrap_or_default()
    }

    /// Add every candidate matching the pattern. Returns whether anything matched.
    pub fn include_pattern(
        &mut self,
        pattern: Option<&str>,
        anchor: bool,
        prefix: Option<&str>,
    ) -> Result<bool, TemplateError> {
        let re = translate_pattern(pattern, anchor, prefix)?;
        let matched: Vec<String> = self
            .allfiles()
            .iter()
            .filter(|name| re.is_match(name))
            .cloned()
            .collect();

        for name in &matched {
            tracing::debug!(" adding {}", name);
        }
        let found = !matched.is_empty();
        self.files.extend(matched);
        Ok(found)
    }

    /// Remove every selected file matching the pattern. Returns whether anything was removed.
    pub fn exclude_pattern(
        &mut self,
        pattern: Option<&str>,
        anchor: bool,
        prefix: Option<&str>,
    ) -> Result<bool, TemplateError> {
        let re = translate_pattern(pattern, anchor, prefix)?;
        let before = self.files.len();
        self.files.retain(|name| {
            let hit = re.is_match(name);
            if hit {
                tracing::debug!(" removing {}", name);
            }
            !hit
        });
        Ok(self.files.len() != before)
    }

    /// Parse and apply one logical template line.
    pub fn process_template_line(&mut self, line: &str) -> Result<(), TemplateError> {
        self.apply(&Directive::parse(line)?)
    }

    /// Apply a parsed directive.
    pub fn apply(&mut self, directive: &Directive) -> Result<(), TemplateError> {
        match directive {
            Directive::Include(patterns) => {
                for pattern in patterns {
                    if !self.include_pattern(Some(pattern), true, None)? {
                        tracing::warn!("warning: no files found matching '{}'", pattern);
                    }
                }
            }
            Directive::Exclude(patterns) => {
                for pattern in patterns {
                    if !self.exclude_pattern(Some(pattern), true, None)? {
                        tracing::warn!(
                            "warning: no previously-included files found matching '{}'",
                            pattern
                        );
                    }
                }
            }
            Directive::GlobalInclude(patterns) => {
                for pattern in patterns {
                    if !self.include_pattern(Some(pattern), false, None)? {
                        tracing::warn!(
                            "warning: no files found matching '{}' anywhere in distribution",
                            pattern
                        );
                    }
                }
            }
            Directive::GlobalExclude(patterns) => {
                for pattern in patterns {
                    if !self.exclude_pattern(Some(pattern), false, None)? {
                        tracing::warn!(
                            "warning: no previously-included files matching '{}' found anywhere in distribution",
                            pattern
                        );
                    }
                }
            }
            Directive::RecursiveInclude { dir, patterns } => {
                for pattern in patterns {
                    if !self.include_pattern(Some(pattern), true, Some(dir))? {
                        tracing::warn!(
                            "warning: no files found matching '{}' under directory '{}'",
                            pattern,
                            dir
                        );
                    }
                }
            }
            Directive::RecursiveExclude { dir, patterns } => {
                for pattern in patterns {
                    if !self.exclude_pattern(Some(pattern), true, Some(dir))? {
                        tracing::warn!(
                            "warning: no previously-included files matching '{}' found under directory '{}'",
                            pattern,
                            dir
                        );
                    }
                }
            }
            Directive::Graft(dir) => {
                if !self.include_pattern(None, true, Some(dir))? {
                    tracing::warn!("warning: no directories found matching '{}'", dir);
                }
            }
            Directive::Prune(dir) => {
                if !self.exclude_pattern(None, true, Some(dir))? {
                    tracing::warn!(
                        "no previously-included directories found matching '{}'",
                        dir
                    );
                }
            }
        }
        Ok(())
    }
}
