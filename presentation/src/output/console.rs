//! Console output formatter for workflow reports

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use warroom_domain::{
    AgentCatalog, AgentResponse, FinalReport, PhasePlan, RecommendationPriority, Severity, Synthesis,
};

const BAR_CELLS: usize = 10;

/// Formats reports and catalog listings for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &FinalReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("War Room Report"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Task:".cyan().bold(), report.task));
        output.push_str(&format!(
            "{} {} iteration(s), {:.1}s{}{}\n",
            "Run:".cyan().bold(),
            report.iteration,
            report.duration_ms as f64 / 1000.0,
            if report.learning_applied { ", learning applied" } else { "" },
            if report.iteration_capped { ", iteration cap reached" } else { "" },
        ));

        let s = &report.summary;
        output.push_str(&format!(
            "{} {} phases, {} agents ({} ok, {} fallback), avg confidence {}\n",
            "Summary:".cyan().bold(),
            s.phases_run,
            s.agents_activated,
            s.successful,
            s.failed,
            Self::percent(s.average_confidence)
        ));
        output.push_str(&format!(
            "         {} insights, {} decisions, {} blockers ({} high)\n",
            s.insights, s.decisions, s.blockers, s.high_blockers
        ));

        output.push_str(&Self::section_header("Phases"));
        for phase in &report.phases {
            let name = format!("{:<12}", phase.phase);
            let name = if phase.degraded { name.yellow().bold() } else { name.bold() };
            output.push_str(&format!(
                "{} {} {} agents{}\n",
                name,
                Self::colored_bar(phase.confidence),
                phase.agents_used.len(),
                if phase.degraded { " [degraded]" } else { "" }
            ));
            for decision in &phase.decisions {
                output.push_str(&format!("    {} {}\n", "decision:".dimmed(), decision.text));
            }
            for blocker in &phase.blockers {
                let label = match blocker.severity {
                    Severity::High => blocker.severity.as_str().red().bold(),
                    Severity::Medium => blocker.severity.as_str().yellow(),
                    Severity::Low => blocker.severity.as_str().normal(),
                };
                output.push_str(&format!("    {} [{}] {}\n", "blocker:".dimmed(), label, blocker.text));
            }
        }

        output.push_str(&Self::section_header("Consensus"));
        output.push_str(&format!(
            "Level: {} across {} cluster(s), {} responses\n",
            Self::colored_bar(report.consensus.consensus_level),
            report.consensus.cluster_count(),
            report.consensus.total_responses
        ));
        for point in &report.consensus.consensus_points {
            output.push_str(&format!("  {} {} ({}%)\n", "+".green(), point.theme, point.agreement));
        }
        for point in &report.consensus.divergence_points {
            output.push_str(&format!("  {} {} ({}%)\n", "~".yellow(), point.theme, point.agreement));
        }

        output.push_str(&Self::section_header("Synthesis"));
        output.push_str(&Self::synthesis_body(&report.synthesis));

        if !report.recommendations.is_empty() {
            output.push_str(&Self::section_header("Recommendations"));
            for rec in &report.recommendations {
                let priority = match rec.priority {
                    RecommendationPriority::Critical => "critical".red().bold(),
                    RecommendationPriority::High => "high".yellow().bold(),
                    RecommendationPriority::Medium => "medium".normal(),
                };
                output.push_str(&format!("  [{}] {}\n        {}\n", priority, rec.recommendation, rec.action));
            }
        }

        if !report.next_steps.is_empty() {
            output.push_str(&Self::section_header("Next Steps"));
            for (i, step) in report.next_steps.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }

        if report.history.len() > 1 {
            output.push_str(&Self::section_header("Iterations"));
            for entry in &report.history {
                output.push_str(&format!(
                    "  #{} {} agents, mean confidence {}{}\n",
                    entry.iteration,
                    entry.agents_activated,
                    Self::percent(entry.mean_confidence),
                    if entry.has_high_blocker { ", high blocker" } else { "" }
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &FinalReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(report: &FinalReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n\n", "=== War Room Conclusion ===".cyan().bold()));
        output.push_str(&format!("{} {}\n\n", "Task:".bold(), report.task));
        output.push_str(&Self::synthesis_body(&report.synthesis));
        output
    }

    fn synthesis_body(synthesis: &Synthesis) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n\n", synthesis.executive_summary));
        output.push_str(&format!("{} {}\n", "Recommendation:".green().bold(), synthesis.key_recommendation));
        output.push_str(&format!(
            "{} {} ({})\n",
            "Confidence:".bold(),
            Self::colored_bar(synthesis.confidence.overall),
            synthesis.confidence.label
        ));

        if !synthesis.critical_considerations.is_empty() {
            output.push_str(&format!("\n{}\n", "Critical considerations:".yellow().bold()));
            for item in &synthesis.critical_considerations {
                output.push_str(&format!("  * {}\n", item));
            }
        }

        if let Some(tradeoff) = &synthesis.essential.top_tradeoff {
            output.push_str(&format!("\n{} {}\n", "Trade-off:".bold(), tradeoff.title));
            for option in &tradeoff.options {
                output.push_str(&format!("  - {} ({})\n", option.name, Self::percent(option.support)));
                for pro in &option.pros {
                    output.push_str(&format!("      {} {}\n", "+".green(), pro));
                }
                for con in &option.cons {
                    output.push_str(&format!("      {} {}\n", "-".red(), con));
                }
            }
        }

        if !synthesis.exploration.options.is_empty() {
            output.push_str(&format!("\n{}\n", "Explore further:".dimmed()));
            for option in &synthesis.exploration.options {
                output.push_str(&format!("  > {}\n", option.label()));
            }
        }

        if let Some(deep) = &synthesis.deep_analysis {
            output.push_str(&format!(
                "\n{} {} clusters over {} responses ({} similarity)\n",
                "Deep analysis:".bold(),
                deep.clusters.len(),
                deep.total_responses,
                deep.similarity
            ));
            for cluster in &deep.clusters {
                output.push_str(&format!(
                    "  {} size {} weight {:.2} mean confidence {}\n",
                    cluster.id,
                    cluster.size,
                    cluster.weight,
                    Self::percent(cluster.mean_confidence)
                ));
            }
        }
        output
    }

    /// Catalog grouped by category
    pub fn format_agents(catalog: &AgentCatalog) -> String {
        let mut output = String::new();
        for (category, agents) in catalog.by_category() {
            output.push_str(&format!("{} ({})\n", category.cyan().bold(), agents.len()));
            for agent in agents {
                output.push_str(&format!(
                    "  {:<26} {} - {}\n",
                    agent.id.as_str(),
                    agent.name,
                    agent.role.dimmed()
                ));
            }
        }
        output
    }

    /// Phase plan with eligible agents
    pub fn format_phases(plan: &PhasePlan, catalog: &AgentCatalog) -> String {
        let mut output = String::new();
        for (i, phase) in plan.phases().iter().enumerate() {
            output.push_str(&format!("{}. {}", i + 1, phase.name.cyan().bold()));
            if !phase.description.is_empty() {
                output.push_str(&format!(" - {}", phase.description));
            }
            output.push('\n');
            if phase.eligible_agent_ids.is_empty() {
                output.push_str(&format!("   {}\n", "any agent (keyword selection)".dimmed()));
            }
            for agent in catalog.resolve(&phase.eligible_agent_ids) {
                output.push_str(&format!("   - {} ({})\n", agent.name, agent.role));
            }
        }
        output
    }

    /// A direct consultation answer
    pub fn format_consult(response: &AgentResponse) -> String {
        let title = format!("── {} ──", response.agent_name);
        let title = if response.succeeded { title.yellow().bold() } else { title.red().bold() };
        let mut output = format!("{}\n{}\n\n", title, response.content);
        output.push_str(&format!(
            "{} {} via {}{}\n",
            "Confidence:".dimmed(),
            Self::colored_bar(response.confidence),
            response.provider,
            if response.cached { " (cached)" } else { "" }
        ));
        output
    }

    /// Ten-cell bar followed by the percentage, uncoloured.
    pub fn confidence_bar(score: f64) -> String {
        let score = score.clamp(0.0, 1.0);
        let filled = (score * BAR_CELLS as f64).round() as usize;
        format!(
            "{}{} {}",
            "█".repeat(filled),
            "░".repeat(BAR_CELLS - filled),
            Self::percent(score)
        )
    }

    /// Green above 70%, yellow above 40%, red otherwise.
    pub fn colored_bar(score: f64) -> ColoredString {
        let bar = Self::confidence_bar(score);
        if score > 0.7 {
            bar.green()
        } else if score > 0.4 {
            bar.yellow()
        } else {
            bar.red()
        }
    }

    fn percent(score: f64) -> String {
        format!("{}%", (score * 100.0).round() as i64)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &FinalReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &FinalReport) -> String {
        Self::format_json(report)
    }

    fn format_synthesis_only(&self, report: &FinalReport) -> String {
        Self::format_synthesis_only(report)
    }
}
