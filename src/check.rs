//! Static checks for scripts
//!
//! Finds problems a run would only report as diagnostics, before the script
//! is ever played:
//! - labels defined twice
//! - jumps and choice targets naming undefined labels
//! - empty choice lists and instructions missing a required field
//! - unrecognized instruction kinds
//! - character ids the resource table does not know

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::resources::ResourceTable;
use crate::types::{BgmAction, CharAction, Instruction, Script};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// The run will misbehave here
    Error,
    /// Probably unintended, but the run copes
    Warning,
}

/// A problem found at one script offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub offset: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub issues: Vec<Issue>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, severity: Severity, offset: usize, message: String) {
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        self.issues.push(Issue {
            severity,
            offset,
            message,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check `script`. Character ids are only verified when `resources` is given.
pub fn check(script: &Script, resources: Option<&dyn ResourceTable>) -> CheckReport {
    let mut report = CheckReport::new();
    let labels = collect_labels(script, &mut report);

    for (offset, instruction) in script.iter().enumerate() {
        match instruction {
            Instruction::Jump { to } => check_target(&labels, to, offset, "jump", &mut report),
            Instruction::Choice { choices } => {
                if choices.is_empty() {
                    report.add_issue(Severity::Error, offset, "choice has no options".to_string());
                }
                for option in choices {
                    if let Some(goto) = &option.goto {
                        let context = format!("choice '{}'", option.text);
                        check_target(&labels, goto, offset, &context, &mut report);
                    }
                }
            }
            Instruction::Char {
                id, action, state, ..
            } => {
                if *action == CharAction::SetState && state.is_none() {
                    report.add_issue(
                        Severity::Error,
                        offset,
                        format!("setState for '{id}' has no state"),
                    );
                }
                if let Some(resources) = resources
                    && !resources.has_character(id)
                {
                    report.add_issue(
                        Severity::Warning,
                        offset,
                        format!("character '{id}' is not defined in resources"),
                    );
                }
            }
            Instruction::Say { who: Some(who), .. } => {
                if let Some(resources) = resources
                    && !resources.has_character(who)
                {
                    report.add_issue(
                        Severity::Warning,
                        offset,
                        format!("speaker '{who}' is not defined in resources"),
                    );
                }
            }
            Instruction::Bgm {
                action: BgmAction::Play,
                id: None,
                ..
            } => report.add_issue(Severity::Error, offset, "bgm play has no id".to_string()),
            Instruction::Unknown => report.add_issue(
                Severity::Warning,
                offset,
                "unrecognized instruction kind will be skipped".to_string(),
            ),
            _ => {}
        }
    }

    report.issues.sort_by_key(|issue| issue.offset);
    report
}

fn collect_labels(script: &Script, report: &mut CheckReport) -> HashSet<String> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (offset, instruction) in script.iter().enumerate() {
        if let Instruction::Label { id } = instruction
            && let Some(previous) = first_seen.insert(id, offset)
        {
            report.add_issue(
                Severity::Warning,
                offset,
                format!("label '{id}' already defined at offset {previous}; this one wins"),
            );
        }
    }
    first_seen.into_keys().map(str::to_string).collect()
}

fn check_target(
    labels: &HashSet<String>,
    label: &str,
    offset: usize,
    context: &str,
    report: &mut CheckReport,
) {
    if !labels.contains(label) {
        report.add_issue(
            Severity::Error,
            offset,
            format!("{context} targets undefined label '{label}'"),
        );
    }
}
