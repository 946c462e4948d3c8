// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Top-level operation flows: analyze, refactor, recommend, ui-ux, plan,
//! new-project, usage.
//!
//! Every flow follows the same shape: build a prompt from the project
//! context, prepend the session transcript if one is active, call the
//! agents (parallel fan-out or primary-plus-fallback), render the merged
//! answer, and record the turn. The flows differ only in prompt wording
//! and in what happens to the answer afterwards.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::apply::{extract, Applicator, ConfirmPrompt, Confirmation, StdinPrompt};
use crate::config::{self, VigilConfig};
use crate::error::Result;
use crate::project::{detect_project_type, project_files, ProjectType};
use crate::providers::{
    dispatch, fallback, gateway, probe_providers, secondary_provider, synthesize, Provider,
    ProviderKind, SessionStats, ALL_FAILED_MESSAGE,
};
use crate::report::save_report;
use crate::session::{estimate_tokens, Role, SessionStore};

/// Where the plan flow writes its implementation plan.
pub const PLAN_FILE: &str = "vigil_plan.md";

/// Behavior switches resolved from the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpsOptions {
    /// Extract and apply code changes from the merged answer.
    pub apply: bool,
    /// Skip per-change review; one global confirmation applies everything.
    pub yes: bool,
    /// Force primary-then-fallback even when config says parallel.
    pub sequential: bool,
    /// Carry conversation context across invocations.
    pub session: bool,
}

/// One configured run against one project root.
pub struct Engine {
    project_root: PathBuf,
    options: OpsOptions,
    config: VigilConfig,
    providers: Vec<Provider>,
    stats: SessionStats,
    project_type: ProjectType,
    store: SessionStore,
}

impl Engine {
    pub fn new(project_root: PathBuf, options: OpsOptions) -> Self {
        let config = config::load_config(&project_root);
        let providers = probe_providers(&config);
        let project_type = detect_project_type(&project_root);
        let store = SessionStore::new(&project_root);

        Self {
            project_root,
            options,
            config,
            providers,
            stats: SessionStats::new(),
            project_type,
            store,
        }
    }

    /// Q&A mode: answer a question about the project without modifying it.
    pub async fn analyze(&mut self, question: &str) -> Result<()> {
        self.print_section("ANALYSIS");

        let prompt = format!(
            "Answer the following question about this {} project.\n\n\
             [Question]\n{}\n\n\
             [Project files]\n{}\n\n\
             Respond as an analysis report:\n\
             1. Summary\n\
             2. Detailed analysis\n\
             3. Relevant code and file locations\n\
             4. Further recommendations, if any\n\n\
             Do not modify any code; analysis only.",
            self.project_type,
            question,
            self.file_listing(30)
        );

        self.run_operation("analyze", question, prompt, false).await
    }

    /// Propose performance-oriented refactorings across the project.
    pub async fn refactor(&mut self) -> Result<()> {
        self.print_section("REFACTOR");

        let listing = self.file_listing(20);
        if listing.is_empty() {
            println!("{}", "No source files found to refactor.".yellow());
            return Ok(());
        }

        let prompt = format!(
            "Analyze this {} project and propose refactorings focused on \
             performance.\n\n\
             Key files:\n{}\n\n\
             Consider:\n\
             1. Performance (execution time, memory usage)\n\
             2. Removing duplicated code\n\
             3. Dropping unnecessary dependencies\n\
             4. Adopting current idioms and patterns\n\n\
             Show the concrete code change for each proposal.",
            self.project_type, listing
        );

        self.run_operation("refactor", "refactor the project", prompt, true)
            .await
    }

    /// Propose architecture, feature, and stack improvements.
    pub async fn recommend(&mut self) -> Result<()> {
        self.print_section("RECOMMEND");

        let prompt = format!(
            "Analyze this {} project and recommend improvements.\n\n\
             Project files:\n{}\n\n\
             1. Architecture: weaknesses of the current structure and \
                recommended patterns\n\
             2. New features: for users and for developers\n\
             3. Stack upgrades: dependencies to update, libraries worth \
                adopting\n\
             4. Testing and quality: coverage and CI improvements\n\n\
             Mark each recommendation with a priority (high/medium/low) and \
             an implementation complexity.",
            self.project_type,
            self.file_listing(30)
        );

        self.run_operation("recommend", "recommend improvements", prompt, true)
            .await
    }

    /// UI/UX review, restricted to React-family projects.
    pub async fn ui_ux(&mut self) -> Result<()> {
        self.print_section("UI/UX");

        if !matches!(self.project_type, ProjectType::Nextjs | ProjectType::React) {
            println!(
                "{}",
                "UI/UX review needs a React or Next.js project.".yellow()
            );
            return Ok(());
        }

        let listing = self.file_listing_filtered(20, Some(&["tsx", "jsx", "css", "scss"]));
        let prompt = format!(
            "Analyze the UI/UX of this {} project and propose improvements.\n\n\
             UI files:\n{}\n\n\
             Consider:\n\
             1. Component structure: reusability, where to split or merge\n\
             2. Styling: deduplicate CSS, keep the design system consistent\n\
             3. UX flows: user journeys, interactions, loading and error states\n\
             4. Accessibility: WCAG conformance, keyboard navigation, screen \
                readers\n\n\
             Include a concrete code example for each improvement.",
            self.project_type, listing
        );

        self.run_operation("ui-ux", "review ui and ux", prompt, false)
            .await
    }

    /// Design a new project from an idea: stack, layout, config, first steps.
    pub async fn new_project(&mut self, idea: &str) -> Result<()> {
        self.print_section("NEW PROJECT");

        let prompt = format!(
            "Design a new project from the following idea.\n\n\
             [Idea]\n{}\n\n\
             Include in the response:\n\
             1. Recommended tech stack (frontend/backend, database, tooling)\n\
             2. The folder structure as a tree\n\
             3. Contents of the essential configuration files\n\
             4. Initial setup commands\n\
             5. A getting-started guide: install, run, develop",
            idea
        );

        self.run_operation("new-project", idea, prompt, false).await
    }

    /// Produce an implementation plan for a described task.
    pub async fn plan(&mut self, task: &str) -> Result<()> {
        self.print_section("PLAN");

        let prompt = format!(
            "Write a detailed implementation plan for the following task.\n\n\
             [Task]\n{}\n\n\
             [Project type]\n{}\n\n\
             [Existing files]\n{}\n\n\
             Structure the plan as:\n\
             # Implementation Plan\n\
             ## 1. Overview (goal, scope)\n\
             ## 2. Technical approach (patterns, libraries)\n\
             ## 3. Files to modify or create, with per-file changes\n\
             ## 4. Implementation steps\n\
             ## 5. Test plan\n\
             ## 6. Risks and alternatives",
            task,
            self.project_type,
            self.file_listing(30)
        );

        let response = self.call_with_context("plan", task, prompt).await?;

        let plan_path = self.project_root.join(PLAN_FILE);
        std::fs::write(&plan_path, &response)?;
        println!("{}", response);
        println!("{} plan saved to {}", "✓".green(), plan_path.display());

        self.finish_operation("plan", &response)?;
        Ok(())
    }

    /// Show provider availability, project info, and run statistics.
    pub fn usage(&self) {
        self.print_section("USAGE & STATUS");

        println!("{}", "Agents:".bold());
        for provider in &self.providers {
            let status = if !provider.enabled {
                "disabled".dimmed().to_string()
            } else if provider.available {
                "✓ available".green().to_string()
            } else {
                "✗ not found".red().to_string()
            };
            println!("  {:<12} {}", provider.name(), status);
        }

        println!("\n{}", "Project:".bold());
        println!("  type:        {}", self.project_type);
        println!("  directory:   {}", self.project_root.display());

        println!("\n{}", "Paths:".bold());
        println!("  config:      {}", config::CONFIG_FILE);
        println!("  plan file:   {}", PLAN_FILE);
        println!("  reports:     {}", self.config.output.report_dir);

        match self.store.list_sessions() {
            Ok(sessions) if !sessions.is_empty() => {
                println!("\n{}", "Sessions:".bold());
                for summary in sessions.iter().take(5) {
                    println!("  {}", summary.format());
                }
            }
            _ => {}
        }

        self.print_dashboard();
    }

    /// Shared tail for prompt-driven flows: call agents, cross-check when
    /// asked, print, report, apply, and record the session turn.
    async fn run_operation(
        &mut self,
        operation: &str,
        user_line: &str,
        prompt: String,
        audit: bool,
    ) -> Result<()> {
        let mut response = self.call_with_context(operation, user_line, prompt).await?;

        if audit {
            if let Some(review) = self.cross_check(user_line, &response).await {
                response.push_str("\n\n## Auditor review\n\n");
                response.push_str(review.trim_end());
            }
        }

        println!("{}", response);
        self.finish_operation(operation, &response)?;

        if self.options.apply {
            self.apply_changes(&response);
        }

        Ok(())
    }

    /// Prepend session context, call the agents, and record both turns.
    async fn call_with_context(
        &mut self,
        operation: &str,
        user_line: &str,
        prompt: String,
    ) -> Result<String> {
        if self.options.session {
            self.ensure_session();
        }

        let prefix = self.store.context_prefix();
        let full_prompt = if prefix.is_empty() {
            prompt
        } else {
            format!("{}\n{}", prefix, prompt)
        };

        let (success, response) = self.call_agents(&full_prompt).await;

        if self.store.current().is_some() {
            // Session persistence is best-effort; a full disk must not eat
            // the answer we already have.
            if let Err(e) = self.store.add_context(Role::User, user_line, operation) {
                tracing::warn!("failed to record user turn: {}", e);
            } else if let Err(e) = self.store.add_context(Role::Assistant, &response, operation) {
                tracing::warn!("failed to record assistant turn: {}", e);
            }
        }

        if !success {
            anyhow::bail!("{}", response);
        }
        Ok(response)
    }

    /// Call the agents per the configured strategy.
    ///
    /// Parallel: fan out to every eligible agent and synthesize. Sequential:
    /// primary only. Either way, a fully failed primary path falls through
    /// to the auditor retry chain when fallback is enabled.
    async fn call_agents(&mut self, prompt: &str) -> (bool, String) {
        let timeout = Duration::from_secs(self.config.dispatch.timeout_secs);
        let spinner = self.spinner("consulting agents");

        if self.parallel() {
            let results = dispatch(
                prompt,
                &self.providers,
                self.config.dispatch.include_optional,
                timeout,
                &mut self.stats,
            )
            .await;
            if results.values().any(|r| r.success) {
                if let Some(s) = spinner {
                    s.finish_and_clear();
                }
                return (true, synthesize(&results));
            }
        } else if let Some(primary) = self.primary_provider().cloned() {
            let result = gateway::invoke(&primary, prompt, timeout).await;
            if result.success {
                self.stats.record(
                    &result.provider,
                    estimate_tokens(prompt) + estimate_tokens(&result.output),
                );
                if let Some(s) = spinner {
                    s.finish_and_clear();
                }
                return (true, result.output);
            }
        }

        let outcome = self.run_fallback(prompt, timeout).await;
        if let Some(s) = spinner {
            s.finish_and_clear();
        }
        outcome
    }

    /// Have the auditor review the primary answer.
    ///
    /// Parallel runs already carry both perspectives through the synthesized
    /// report, so the extra review call only happens on the sequential path.
    /// A failed review is dropped silently; it must never sink an answer we
    /// already have.
    async fn cross_check(&mut self, task: &str, answer: &str) -> Option<String> {
        if self.parallel() {
            return None;
        }
        let auditor = secondary_provider(&self.providers).cloned()?;

        let prompt = format!(
            "The following is a solution proposed by another AI agent. \
             Review it as a code reviewer.\n\n\
             [Task]\n{}\n\n\
             [Proposed solution]\n{}\n\n\
             Review for:\n\
             1. Code quality and readability\n\
             2. Potential bugs or security vulnerabilities\n\
             3. Performance\n\
             4. Adherence to best practices\n\n\
             Suggest concrete fixes for any problems found.",
            task, answer
        );

        let timeout = Duration::from_secs(self.config.dispatch.timeout_secs);
        let result = gateway::invoke(&auditor, &prompt, timeout).await;
        if result.success {
            self.stats.record(
                &result.provider,
                estimate_tokens(&prompt) + estimate_tokens(&result.output),
            );
            Some(result.output)
        } else {
            None
        }
    }

    async fn run_fallback(&mut self, prompt: &str, timeout: Duration) -> (bool, String) {
        if !self.config.fallback.enabled {
            return (false, ALL_FAILED_MESSAGE.to_string());
        }
        let secondary = match secondary_provider(&self.providers).cloned() {
            Some(p) => p,
            None => return (false, ALL_FAILED_MESSAGE.to_string()),
        };

        let (success, output) = fallback(
            prompt,
            &secondary,
            self.config.fallback.max_self_heal_attempts,
            timeout,
        )
        .await;
        if success {
            self.stats.record(
                secondary.name(),
                estimate_tokens(prompt) + estimate_tokens(&output),
            );
        }
        (success, output)
    }

    fn parallel(&self) -> bool {
        self.config.dispatch.parallel && !self.options.sequential
    }

    fn primary_provider(&self) -> Option<&Provider> {
        self.providers
            .iter()
            .find(|p| p.kind == ProviderKind::Claude && p.enabled && p.available)
    }

    /// Load the pointed-at session if it is still usable, otherwise start a
    /// fresh one. Corrupt or expired sessions are never resumed.
    fn ensure_session(&mut self) {
        if self.store.current().is_some() {
            return;
        }
        if self.store.load_latest().is_ok() {
            return;
        }
        let result = self.store.create_session(
            &self.project_type.to_string(),
            &self.project_root.display().to_string(),
        );
        match result {
            Ok(id) => info!(session = %id, "started fresh session"),
            Err(e) => tracing::warn!("could not create session: {}", e),
        }
    }

    fn apply_changes(&self, response: &str) {
        let changes = extract(response, &self.project_root);
        if changes.is_empty() {
            println!("{}", "No applicable code changes found in the answer.".dimmed());
            return;
        }

        println!(
            "\n{} {} proposed change(s)",
            "►".cyan(),
            changes.len()
        );

        let mut applicator = Applicator::new(&self.project_root);
        let (applied, other) = if self.options.yes {
            let mut auto = AutoConfirm;
            applicator.apply_all(&changes, &mut auto)
        } else {
            applicator.apply_with_confirmation(&changes, &mut StdinPrompt)
        };

        info!(applied, other, "apply pass finished");
        print!("{}", applicator.summary());
    }

    fn finish_operation(&mut self, operation: &str, response: &str) -> Result<()> {
        if self.config.output.save_reports {
            let report_dir = self.project_root.join(&self.config.output.report_dir);
            let path = save_report(&report_dir, operation, self.project_type, response)?;
            if self.config.output.verbose {
                println!("{} report saved to {}", "✓".green(), path.display());
            }
        }
        self.print_dashboard();
        Ok(())
    }

    fn file_listing(&self, limit: usize) -> String {
        self.file_listing_filtered(limit, None)
    }

    fn file_listing_filtered(&self, limit: usize, extensions: Option<&[&str]>) -> String {
        let files = project_files(&self.project_root, self.project_type, extensions);
        files
            .iter()
            .take(limit)
            .map(|f| {
                f.strip_prefix(&self.project_root)
                    .unwrap_or(f)
                    .display()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn spinner(&self, message: &'static str) -> Option<ProgressBar> {
        if !self.config.output.verbose {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }

    fn print_section(&self, title: &str) {
        if self.config.output.verbose {
            println!("\n{} {}", "►".cyan().bold(), title.bold());
        }
    }

    fn print_dashboard(&self) {
        if !self.config.output.verbose {
            return;
        }
        let elapsed = self.stats.elapsed();
        let calls: Vec<String> = ProviderKind::ALL
            .iter()
            .map(|k| format!("{} {}", k, self.stats.calls_for(&k.to_string())))
            .collect();
        println!(
            "\n{} calls: {} | tokens ~{} | elapsed {}m {}s",
            "●".dimmed(),
            calls.join(", "),
            self.stats.total_tokens_used,
            elapsed.as_secs() / 60,
            elapsed.as_secs() % 60
        );
    }
}

/// Prompt that answers yes to everything, for `--yes` runs.
struct AutoConfirm;

impl ConfirmPrompt for AutoConfirm {
    fn ask(&mut self, _question: &str) -> Confirmation {
        Confirmation::Yes
    }
}
